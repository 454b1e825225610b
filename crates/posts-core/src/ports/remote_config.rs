//! Centralized configuration port.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

/// Configuration served for one application and profile set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profiles: Vec<String>,
    pub label: Option<String>,
    pub version: Option<String>,
    /// Ordered most specific first.
    #[serde(default)]
    pub property_sources: Vec<PropertySource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertySource {
    pub name: String,
    #[serde(default)]
    pub source: HashMap<String, serde_json::Value>,
}

impl RemoteConfig {
    /// First string value for `key` among the leading `depth` property sources.
    pub fn string_property(&self, key: &str, depth: usize) -> Option<&str> {
        self.property_sources
            .iter()
            .take(depth)
            .find_map(|ps| ps.source.get(key).and_then(|v| v.as_str()))
    }
}

#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn fetch(
        &self,
        application: &str,
        profile: &str,
    ) -> Result<RemoteConfig, RemoteConfigError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteConfigError {
    #[error("Config server unavailable: {0}")]
    Unavailable(String),

    #[error("Config server returned status {0}")]
    Status(u16),

    #[error("Malformed configuration payload: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(json: serde_json::Value) -> RemoteConfig {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_string_property_prefers_first_source() {
        let config = config_from(serde_json::json!({
            "name": "posts",
            "profiles": ["dev"],
            "propertySources": [
                { "name": "posts-dev.yml", "source": { "key": "first" } },
                { "name": "posts.yml", "source": { "key": "second" } }
            ]
        }));

        assert_eq!(config.string_property("key", 2), Some("first"));
    }

    #[test]
    fn test_string_property_falls_back_to_second_source() {
        let config = config_from(serde_json::json!({
            "propertySources": [
                { "name": "posts-dev.yml", "source": {} },
                { "name": "posts.yml", "source": { "key": "second" } }
            ]
        }));

        assert_eq!(config.string_property("key", 2), Some("second"));
    }

    #[test]
    fn test_string_property_respects_depth() {
        let config = config_from(serde_json::json!({
            "propertySources": [
                { "name": "a", "source": {} },
                { "name": "b", "source": {} },
                { "name": "c", "source": { "key": "third" } }
            ]
        }));

        assert_eq!(config.string_property("key", 2), None);
        assert_eq!(config.string_property("key", 3), Some("third"));
    }

    #[test]
    fn test_string_property_ignores_non_string_values() {
        let config = config_from(serde_json::json!({
            "propertySources": [ { "name": "a", "source": { "key": 42 } } ]
        }));

        assert_eq!(config.string_property("key", 2), None);
    }
}
