use crate::resolver::is_hex64;
use serde_json::Value;
use std::collections::BTreeSet;

/// Base URL the upstream serves icon assets from; icon fields sometimes
/// carry just the content hash instead of the full URL.
pub const ICON_BASE: &str = "https://open.api.nexon.com/static/maplestorym/asset/icon/";

fn is_icon_key(key: &str) -> bool {
    key.ends_with("_icon") || key == "character_image"
}

/// Walk a section payload, promoting bare icon hashes to full asset URLs in
/// place and collecting every URL seen at an icon field into `urls`.
///
/// The walk recurses into all values whether or not the current key matched,
/// so icon fields are found at any nesting depth. Strings that already carry
/// a scheme are left as they are; anything that is neither a URL nor a
/// 64-hex hash is untouched and not collected.
pub fn normalize_icons(value: &mut Value, urls: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if is_icon_key(key)
                    && let Value::String(s) = child
                {
                    if s.starts_with("http://") || s.starts_with("https://") {
                        urls.insert(s.clone());
                    } else if is_hex64(s) {
                        *s = format!("{ICON_BASE}{s}");
                        urls.insert(s.clone());
                    }
                }
                normalize_icons(child, urls);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                normalize_icons(item, urls);
            }
        }
        _ => {}
    }
}
