use crate::config::Listener as ListenerConfig;
use aggregator::{Aggregator, UpstreamError, World};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;

pub async fn serve(listener: ListenerConfig, aggregator: Aggregator) -> Result<(), std::io::Error> {
    let app = router(aggregator);

    let addr = format!("{}:{}", listener.host, listener.port);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

pub fn router(aggregator: Aggregator) -> Router {
    Router::new()
        .route("/api/character", get(character))
        .route("/healthz", get(healthz))
        .route("/favicon.ico", get(favicon))
        .with_state(aggregator)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}

#[derive(Deserialize, Debug)]
struct Params {
    /// Character name, or a 64-hex ocid to skip resolution.
    q: String,
    world_name: World,
}

async fn character(
    State(aggregator): State<Aggregator>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, ApiError> {
    let document = aggregator
        .resolve_and_aggregate(&params.q, params.world_name)
        .await?;
    Ok(Json((*document).clone()))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error_message: String,
}

/// Translates core failures into transport responses: upstream client errors
/// echo their status, retry exhaustion maps to 429, unresolved characters to
/// 404, transport trouble to 502.
struct ApiError(UpstreamError);

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            UpstreamError::Status { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            UpstreamError::RetriesExhausted => StatusCode::TOO_MANY_REQUESTS,
            UpstreamError::CharacterNotFound { .. } => StatusCode::NOT_FOUND,
            UpstreamError::Transport(_) => StatusCode::BAD_GATEWAY,
            UpstreamError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "request failed");
        }

        let body = Json(ApiErrorResponse {
            error_message: self.0.to_string(),
        });

        (status, body).into_response()
    }
}
