use crate::config::UpstreamConfig;
use crate::errors::UpstreamError;
use http::StatusCode;
use http::header::RETRY_AFTER;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;

const API_KEY_HEADER: &str = "x-nxopen-api-key";

/// Single chokepoint for upstream GETs.
///
/// Every call acquires a permit from one process-wide semaphore before the
/// request goes on the wire, and the retry loop absorbs 429/5xx responses
/// with exponential backoff. The client knows nothing about sections, ocids
/// or caching.
#[derive(Clone)]
pub struct NxClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    semaphore: Arc<Semaphore>,
    max_retries: u32,
    backoff_unit: Duration,
}

impl NxClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(NxClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrency)),
            max_retries: config.max_retries,
            backoff_unit: config.backoff_unit,
        })
    }

    /// Perform one logical GET against `path` and parse the JSON body.
    ///
    /// Query parameters with empty values are dropped before the request is
    /// sent. 429 responses honor a numeric `Retry-After` (in backoff units,
    /// minimum one); 5xx responses always back off `2^attempt` units without
    /// header inspection; any other 4xx fails immediately with the raw body.
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, UpstreamError> {
        let query: Vec<(&str, &str)> = params
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .copied()
            .collect();
        let url = format!("{}{}", self.base_url, path);

        for attempt in 0..self.max_retries {
            let response = {
                // Permit covers the request only; a backoff sleep must not
                // hold a slot other callers could use.
                let _permit = self
                    .semaphore
                    .acquire()
                    .await
                    .map_err(|_| UpstreamError::Internal("semaphore closed".into()))?;

                self.client
                    .get(&url)
                    .query(&query)
                    .header(API_KEY_HEADER, &self.api_key)
                    .send()
                    .await?
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = retry_after_units(&response)
                    .map(|units| self.backoff_unit.saturating_mul(units))
                    .unwrap_or_else(|| self.backoff_unit.saturating_mul(2u32.pow(attempt)));
                tracing::warn!(path, attempt, wait_ms = wait.as_millis() as u64, "upstream throttled");
                sleep(wait).await;
                continue;
            }

            if status.is_server_error() {
                let wait = self.backoff_unit.saturating_mul(2u32.pow(attempt));
                tracing::warn!(path, attempt, status = status.as_u16(), "upstream errored, retrying");
                sleep(wait).await;
                continue;
            }

            if status.is_client_error() {
                let body = response.text().await.unwrap_or_default();
                return Err(UpstreamError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            return Ok(response.json::<Value>().await?);
        }

        Err(UpstreamError::RetriesExhausted)
    }
}

/// `Retry-After` seconds, expressed in backoff units with a minimum of one.
/// Non-numeric forms (HTTP dates) are ignored and fall back to the
/// exponential schedule.
fn retry_after_units(response: &reqwest::Response) -> Option<u32> {
    let secs: u64 = response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;
    Some(secs.clamp(1, u32::MAX as u64) as u32)
}
