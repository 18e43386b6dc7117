//! Configuration file parsing.
//!
//! Parses TOML into intermediate `RawConfig` structures that keep every field optional, so
//! defaults are applied in exactly one place.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use tracing::debug;

use crate::ConfigError;

/// Raw configuration as parsed directly from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Search-service translation section.
    pub search: Option<RawSearchSettings>,
    /// Document-store translation section.
    pub document: Option<RawDocumentSettings>,
}

/// Raw search-service settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Result limit when the query has no `limit` modifier.
    pub default_limit: Option<u64>,
    /// Result offset when the query has no `limit` modifier.
    pub default_offset: Option<u64>,
    /// Sort specification when the query has no `sort` modifier.
    pub default_sort: Option<String>,
    /// Field renames applied before rendering.
    pub aliases: Option<BTreeMap<String, String>>,
}

/// Raw document-store settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDocumentSettings {
    /// Field renames applied before calling the builder.
    pub aliases: Option<BTreeMap<String, String>>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    debug!(path = %path.display(), "reading rql config");
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config_str("", Path::new("test.toml")).unwrap();
        assert!(config.search.is_none());
        assert!(config.document.is_none());
    }

    #[test]
    fn test_parse_search_settings() {
        let toml = r#"
[search]
default_limit = 25
default_sort = "name:desc"

[search.aliases]
id = "key"
createdAt = "value.created"
"#;
        let config = parse_config_str(toml, Path::new("test.toml")).unwrap();
        let search = config.search.unwrap();
        assert_eq!(search.default_limit, Some(25));
        assert!(search.default_offset.is_none());
        assert_eq!(search.default_sort.as_deref(), Some("name:desc"));
        let aliases = search.aliases.unwrap();
        assert_eq!(aliases.get("createdAt").map(String::as_str), Some("value.created"));
        assert_eq!(aliases.len(), 2);
    }

    #[test]
    fn test_parse_document_settings() {
        let toml = r#"
[document.aliases]
id = "_id"
"#;
        let config = parse_config_str(toml, Path::new("test.toml")).unwrap();
        let aliases = config.document.unwrap().aliases.unwrap();
        assert_eq!(aliases.get("id").map(String::as_str), Some("_id"));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let toml = "this is not valid toml [[[";
        let err = parse_config_str(toml, Path::new("test.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }

    #[test]
    fn test_parse_wrong_type() {
        let toml = r#"
[search]
default_limit = "many"
"#;
        let err = parse_config_str(toml, Path::new("test.toml")).unwrap_err();
        assert!(err.to_string().contains("test.toml"));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_config_file(Path::new("/nonexistent/rql.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
