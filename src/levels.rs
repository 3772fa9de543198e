//! Event type to severity level mapping

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::event::EventKind;

/// Resolved level table
///
/// Starts from the built-in defaults; overrides replace only the keys they
/// name and may add new ones. Deserializing reads a partial table and merges
/// it the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LevelConfig {
    levels: IndexMap<String, String>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        let levels = EventKind::ALL
            .iter()
            .map(|kind| (kind.as_str().to_string(), default_level(*kind).to_string()))
            .collect();
        Self { levels }
    }
}

impl<'de> Deserialize<'de> for LevelConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = IndexMap::<String, String>::deserialize(deserializer)?;
        Ok(Self::with_overrides(overrides))
    }
}

/// Built-in level for a known event type
pub fn default_level(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Ops => "debug",
        EventKind::Response => "info",
        EventKind::Log => "info",
        EventKind::Error => "error",
        EventKind::Request => "info",
    }
}

impl LevelConfig {
    /// Defaults merged with a partial override table
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut config = Self::default();
        config.merge(overrides);
        config
    }

    pub fn merge<I, K, V>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (event_type, level) in overrides {
            self.levels.insert(event_type.into(), level.into());
        }
    }

    pub fn get(&self, event_type: &str) -> Option<&str> {
        self.levels.get(event_type).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.levels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_levels() {
        let config = LevelConfig::default();
        assert_eq!(config.get("ops"), Some("debug"));
        assert_eq!(config.get("response"), Some("info"));
        assert_eq!(config.get("log"), Some("info"));
        assert_eq!(config.get("error"), Some("error"));
        assert_eq!(config.get("request"), Some("info"));
        assert_eq!(config.len(), 5);
    }

    #[test]
    fn test_override_replaces_only_named_keys() {
        let config = LevelConfig::with_overrides([("ops", "warn")]);

        let mut expected = LevelConfig::default();
        expected.levels.insert("ops".to_string(), "warn".to_string());

        assert_eq!(config, expected);
        assert_eq!(config.get("ops"), Some("warn"));
        assert_eq!(config.get("response"), Some("info"));
    }

    #[test]
    fn test_override_adds_new_type() {
        let config = LevelConfig::with_overrides([("ping", "trace")]);
        assert_eq!(config.get("ping"), Some("trace"));
        assert_eq!(config.len(), 6);
    }

    #[test]
    fn test_unknown_type_has_no_level() {
        assert_eq!(LevelConfig::default().get("ping"), None);
    }

    #[test]
    fn test_iteration_keeps_default_order() {
        let config = LevelConfig::with_overrides([("error", "warn")]);
        let keys: Vec<&str> = config.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ops", "response", "log", "error", "request"]);
    }

    #[test]
    fn test_partial_yaml_merges_over_defaults() {
        let parsed: LevelConfig = serde_yaml::from_str("ops: warn").expect("Failed to deserialize");

        assert_eq!(parsed, LevelConfig::with_overrides([("ops", "warn")]));
        assert_eq!(parsed.get("response"), Some("info"));
        assert_eq!(parsed.len(), 5);
    }

    #[test]
    fn test_empty_yaml_table_gives_defaults() {
        let parsed: LevelConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(parsed, LevelConfig::default());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = LevelConfig::with_overrides([("ops", "trace"), ("ping", "debug")]);
        let yaml = serde_yaml::to_string(&config).expect("Failed to serialize");
        let parsed: LevelConfig = serde_yaml::from_str(&yaml).expect("Failed to deserialize");
        assert_eq!(parsed, config);
    }
}
