use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SUGGESTION_URL: &str = "https://652f91320b8d8ddac0b2b62b.mockapi.io/autocomplete";
pub const DEFAULT_CACHE_TTL_MS: u64 = 60_000;
pub const DEFAULT_FALLBACK_MAX: u32 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid widget config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Widget settings. Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetConfig {
    /// Autocomplete endpoint; the query goes in the `search` parameter.
    pub suggestion_url: String,
    /// How long a fetched suggestion list may be reused for the same query.
    pub cache_ttl_ms: u64,
    /// Options attached to every tag created from a suggestion.
    pub tag_options: Vec<String>,
    /// Exclusive upper bound for substituted tag values.
    pub fallback_max: u32,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            suggestion_url: DEFAULT_SUGGESTION_URL.to_string(),
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            tag_options: vec![
                "Option 1".to_string(),
                "Option 2".to_string(),
                "Option 3".to_string(),
            ],
            fallback_max: DEFAULT_FALLBACK_MAX,
        }
    }
}

impl WidgetConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(WidgetConfig::from_toml_str("").unwrap(), WidgetConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = WidgetConfig::from_toml_str(
            r#"
            cache_ttl_ms = 5000
            tag_options = ["Q1", "Q2"]
            "#,
        )
        .unwrap();
        assert_eq!(config.cache_ttl_ms, 5_000);
        assert_eq!(config.tag_options, vec!["Q1", "Q2"]);
        assert_eq!(config.suggestion_url, DEFAULT_SUGGESTION_URL);
        assert_eq!(config.fallback_max, DEFAULT_FALLBACK_MAX);
    }

    #[test]
    fn test_rejects_unknown_and_mistyped_fields() {
        assert!(WidgetConfig::from_toml_str("cache_ttl = 5").is_err());
        let error = WidgetConfig::from_toml_str("fallback_max = \"lots\"").unwrap_err();
        assert!(error.to_string().starts_with("Invalid widget config"));
    }
}
