use crate::errors::UpstreamError;
use crate::fetcher::NxClient;
use crate::world::World;
use serde_json::Value;

const ID_PATH: &str = "/maplestorym/v1/id";

/// True for a 64-character hex token, the upstream's ocid format. Upstream
/// emits lowercase but the check is case-insensitive, matching what the API
/// accepts back.
pub fn is_hex64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Resolve a character name to its ocid, or pass an ocid through untouched.
pub async fn resolve_ocid(
    client: &NxClient,
    query: &str,
    world: World,
) -> Result<String, UpstreamError> {
    if is_hex64(query) {
        return Ok(query.to_string());
    }

    let data = client
        .get(ID_PATH, &[("character_name", query), ("world_name", world.as_str())])
        .await?;

    match data.get("ocid").and_then(Value::as_str) {
        Some(ocid) if !ocid.is_empty() => Ok(ocid.to_string()),
        _ => Err(UpstreamError::CharacterNotFound {
            name: query.to_string(),
            world: world.as_str().to_string(),
        }),
    }
}
