use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of live MapleStory M worlds.
///
/// The upstream only understands the Korean world names, so serialization
/// always emits those; deserialization additionally accepts an ASCII alias
/// for each world so API clients are not forced to send Korean.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum World {
    #[serde(rename = "아케인", alias = "Arcane")]
    Arcane,
    #[serde(rename = "크로아", alias = "Croa")]
    Croa,
    #[serde(rename = "엘리시움", alias = "Elysium")]
    Elysium,
    #[serde(rename = "루나", alias = "Luna")]
    Luna,
    #[serde(rename = "스카니아", alias = "Scania")]
    Scania,
    #[serde(rename = "유니온", alias = "Union")]
    Union,
    #[serde(rename = "제니스", alias = "Zenith")]
    Zenith,
}

impl World {
    /// The name the upstream expects in the `world_name` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            World::Arcane => "아케인",
            World::Croa => "크로아",
            World::Elysium => "엘리시움",
            World::Luna => "루나",
            World::Scania => "스카니아",
            World::Union => "유니온",
            World::Zenith => "제니스",
        }
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
