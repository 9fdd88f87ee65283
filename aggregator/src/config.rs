use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://open.api.nexon.com";

/// Settings for the upstream client and the aggregation pipeline.
///
/// Owned by the `Aggregator` and passed in at construction so request
/// handlers share one explicit component instead of module-level globals.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: String,
    /// Hard ceiling on simultaneous upstream calls, shared by the resolver
    /// and every pipeline.
    pub max_concurrency: usize,
    /// Total attempts per logical GET, including the first one.
    pub max_retries: u32,
    /// One backoff unit. The retry schedule is fixed (`2^attempt` units, and
    /// `Retry-After` seconds map to that many units); only the unit duration
    /// is tunable so tests can run in milliseconds.
    pub backoff_unit: Duration,
    /// Per-call transport timeout.
    pub timeout: Duration,
    /// Pause between section fetches of one pipeline.
    pub section_pacing: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl UpstreamConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        UpstreamConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            max_concurrency: 3,
            max_retries: 4,
            backoff_unit: Duration::from_secs(1),
            timeout: Duration::from_secs(20),
            section_pacing: Duration::from_millis(100),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 512,
        }
    }
}
