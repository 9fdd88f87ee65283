// Bounded result cache for aggregated character documents. Entries expire a
// fixed interval after insertion; when full, the least valuable entries are
// evicted by moka's size policy.
use moka::sync::Cache;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct DocumentCache {
    cache: Cache<String, Arc<Value>>,
}

impl DocumentCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        DocumentCache { cache }
    }

    pub fn get(&self, ocid: &str) -> Option<Arc<Value>> {
        self.cache.get(ocid)
    }

    pub fn insert(&self, ocid: &str, document: Arc<Value>) {
        self.cache.insert(ocid.to_string(), document);
    }
}
