use crate::cache::DocumentCache;
use crate::config::UpstreamConfig;
use crate::errors::UpstreamError;
use crate::fetcher::NxClient;
use crate::normalize::normalize_icons;
use crate::resolver;
use crate::sections::Section;
use crate::singleflight::SingleFlight;
use crate::world::World;
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Synthesized document key holding the collected asset URLs.
const ASSETS_KEY: &str = "_assets";

/// Entry point of the core: resolve a query to an ocid and produce the
/// aggregated character document for it.
///
/// All shared state (upstream client with its semaphore, the TTL cache and
/// the in-flight registry) lives here and is injected into request handlers
/// as one cloneable component.
#[derive(Clone)]
pub struct Aggregator {
    client: NxClient,
    cache: DocumentCache,
    inflight: SingleFlight<Result<Arc<Value>, UpstreamError>>,
    section_pacing: Duration,
}

impl Aggregator {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        Ok(Aggregator {
            client: NxClient::new(&config)?,
            cache: DocumentCache::new(config.cache_capacity, config.cache_ttl),
            inflight: SingleFlight::new(),
            section_pacing: config.section_pacing,
        })
    }

    /// The single inbound operation: character name or ocid plus world in,
    /// full aggregated document out.
    pub async fn resolve_and_aggregate(
        &self,
        query: &str,
        world: World,
    ) -> Result<Arc<Value>, UpstreamError> {
        let ocid = resolver::resolve_ocid(&self.client, query, world).await?;
        self.aggregate(&ocid).await
    }

    /// Return the aggregated document for `ocid`: from cache if fresh, from
    /// the in-flight pipeline if one is running, otherwise by starting a new
    /// pipeline. Concurrent callers for one ocid share a single upstream
    /// workload.
    pub async fn aggregate(&self, ocid: &str) -> Result<Arc<Value>, UpstreamError> {
        if let Some(document) = self.cache.get(ocid) {
            tracing::debug!(ocid, "serving cached document");
            return Ok(document);
        }

        let client = self.client.clone();
        let cache = self.cache.clone();
        let pacing = self.section_pacing;
        let ocid_owned = ocid.to_string();

        self.inflight
            .run(ocid, move || {
                fetch_all_sections(client, cache, ocid_owned, pacing)
            })
            .await
            .unwrap_or_else(|| Err(UpstreamError::Internal("aggregation task failed".into())))
    }
}

/// Drive one full pipeline: fetch every section sequentially in the fixed
/// order with a pacing pause between calls, normalize icon fields, attach
/// the URL set and cache the finished document. The first section failure
/// aborts the rest and nothing is cached.
async fn fetch_all_sections(
    client: NxClient,
    cache: DocumentCache,
    ocid: String,
    pacing: Duration,
) -> Result<Arc<Value>, UpstreamError> {
    let mut sections = Map::new();
    for section in Section::ORDER {
        let payload = client.get(section.path(), &[("ocid", &ocid)]).await?;
        sections.insert(section.key().to_string(), payload);
        // Sequential fetching plus pacing keeps one character's pipeline
        // from bursting into the upstream rate limit.
        sleep(pacing).await;
    }

    let mut document = Value::Object(sections);
    let mut urls = BTreeSet::new();
    normalize_icons(&mut document, &mut urls);

    let icon_urls: Vec<String> = urls.into_iter().collect();
    if let Some(map) = document.as_object_mut() {
        map.insert(ASSETS_KEY.to_string(), json!({ "icon_urls": icon_urls }));
    }

    let document = Arc::new(document);
    cache.insert(&ocid, Arc::clone(&document));
    tracing::debug!(ocid = %ocid, sections = Section::ORDER.len(), "aggregated document cached");
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::ICON_BASE;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OCID: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
    const HASH: &str = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";

    fn test_aggregator(server: &MockServer) -> Aggregator {
        let mut config = UpstreamConfig::new("test-key");
        config.base_url = server.uri();
        config.backoff_unit = Duration::from_millis(5);
        config.section_pacing = Duration::from_millis(1);
        Aggregator::new(config).unwrap()
    }

    /// Mount one mock per section endpoint, each expecting `expect` calls.
    /// The basic section carries a bare icon hash to exercise normalization.
    async fn mount_section_mocks(server: &MockServer, expect: u64) {
        for section in Section::ORDER {
            let body = if section == Section::Basic {
                serde_json::json!({
                    "character_name": "단풍잎",
                    "character_image": HASH
                })
            } else {
                serde_json::json!({ "section": section.key() })
            };
            Mock::given(method("GET"))
                .and(path(section.path()))
                .and(query_param("ocid", OCID))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .expect(expect)
                .mount(server)
                .await;
        }
    }

    #[tokio::test]
    async fn resolves_then_fetches_all_sections_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maplestorym/v1/id"))
            .and(query_param("character_name", "단풍잎"))
            .and(query_param("world_name", "스카니아"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ocid": OCID})),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_section_mocks(&server, 1).await;

        let aggregator = test_aggregator(&server);
        let document = aggregator
            .resolve_and_aggregate("단풍잎", World::Scania)
            .await
            .unwrap();

        // One resolver call, then the eleven sections in the defined order.
        let requests = server.received_requests().await.unwrap();
        let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
        let mut expected = vec!["/maplestorym/v1/id"];
        expected.extend(Section::ORDER.iter().map(|s| s.path()));
        assert_eq!(paths, expected);

        // Document holds every section key plus _assets, insertion-ordered.
        let map = document.as_object().unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        let mut expected_keys: Vec<&str> = Section::ORDER.iter().map(|s| s.key()).collect();
        expected_keys.push(ASSETS_KEY);
        assert_eq!(keys, expected_keys);

        // The bare hash got promoted and collected.
        let expected_url = format!("{ICON_BASE}{HASH}");
        assert_eq!(document["basic"]["character_image"], expected_url);
        let icon_urls = document[ASSETS_KEY]["icon_urls"].as_array().unwrap();
        assert!(icon_urls.iter().any(|u| u == &expected_url));
        for url in icon_urls {
            assert!(url.as_str().unwrap().starts_with("https://"));
        }
    }

    #[tokio::test]
    async fn concurrent_callers_trigger_one_fetch_sequence() {
        let server = MockServer::start().await;
        mount_section_mocks(&server, 1).await;

        let aggregator = test_aggregator(&server);
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..5 {
            let aggregator = aggregator.clone();
            tasks.spawn(async move { aggregator.aggregate(OCID).await });
        }

        let mut documents = Vec::new();
        while let Some(result) = tasks.join_next().await {
            documents.push(result.unwrap().unwrap());
        }
        // Everyone observed the same shared document.
        for document in &documents[1..] {
            assert!(Arc::ptr_eq(&documents[0], document));
        }
    }

    #[tokio::test]
    async fn cached_documents_require_no_upstream_calls() {
        let server = MockServer::start().await;
        mount_section_mocks(&server, 1).await;

        let aggregator = test_aggregator(&server);
        let first = aggregator.aggregate(OCID).await.unwrap();
        let second = aggregator.aggregate(OCID).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn expired_cache_entries_trigger_a_full_refetch() {
        let server = MockServer::start().await;
        mount_section_mocks(&server, 2).await;

        let mut config = UpstreamConfig::new("test-key");
        config.base_url = server.uri();
        config.section_pacing = Duration::from_millis(1);
        config.cache_ttl = Duration::from_millis(50);
        let aggregator = Aggregator::new(config).unwrap();

        aggregator.aggregate(OCID).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        aggregator.aggregate(OCID).await.unwrap();
    }

    #[tokio::test]
    async fn a_section_failure_aborts_the_pipeline_and_caches_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(Section::Basic.path()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
            )
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(Section::Stat.path()))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such character"))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(Section::ItemEquipment.path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let aggregator = test_aggregator(&server);
        let err = aggregator.aggregate(OCID).await.unwrap_err();
        assert_eq!(
            err,
            UpstreamError::Status {
                status: 404,
                body: "no such character".into()
            }
        );

        // Nothing was cached and the in-flight slot was released, so the
        // next call runs the pipeline again and fails the same way.
        let err = aggregator.aggregate(OCID).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 404, .. }));
    }
}
