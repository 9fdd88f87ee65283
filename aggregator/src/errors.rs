use thiserror::Error;

/// Errors surfaced by the upstream client and the aggregation pipeline.
///
/// The type is `Clone` because a single pipeline failure is fanned out to
/// every caller coalesced onto the same flight; transport failures therefore
/// carry the rendered message rather than the source `reqwest::Error`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// Non-429 4xx from the upstream. Never retried; the raw body is kept
    /// for diagnosis and the status is echoed at the API boundary.
    #[error("upstream error {status}: {body}")]
    Status { status: u16, body: String },

    /// All retry attempts consumed on 429/5xx responses.
    #[error("rate-limited by upstream after retries")]
    RetriesExhausted,

    /// The id lookup answered but carried no ocid.
    #[error("no character named '{name}' found in world '{world}'")]
    CharacterNotFound { name: String, world: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Transport(err.to_string())
    }
}
