//! Backend translation settings for rql.
//!
//! Settings live in a TOML file with two sections:
//!
//! ```toml
//! [search]
//! default_limit = 100
//! default_offset = 0
//! default_sort = "key:asc"
//!
//! [search.aliases]
//! id = "key"
//!
//! [document.aliases]
//! id = "_id"
//! ```
//!
//! Every setting is optional. Missing values fall back to the defaults shown above, except
//! that the document store has no aliases by default. An `aliases` table replaces the default
//! table as a whole.

#![warn(missing_docs)]

mod error;
mod parse;
mod validate;

use std::{
    collections::{BTreeMap, btree_map},
    path::Path,
};

pub use error::ConfigError;
pub use parse::{
    RawConfig, RawDocumentSettings, RawSearchSettings, parse_config_file, parse_config_str,
};
use tracing::debug;
use validate::validate_config;

/// Result limit used by the search service when a query has no `limit` modifier.
pub const DEFAULT_SEARCH_LIMIT: u64 = 100;

/// Sort used by the search service when a query has no `sort` modifier.
pub const DEFAULT_SEARCH_SORT: &str = "key:asc";

/// A table renaming caller-visible field names to backend field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAliases(BTreeMap<String, String>);

impl FieldAliases {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an alias.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.0.insert(from.into(), to.into());
    }

    /// Returns the backend name for `field`, or `field` itself when no alias exists.
    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.0.get(field).map_or(field, String::as_str)
    }

    /// Returns true if no aliases are defined.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of aliases.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over `(from, to)` pairs in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldAliases {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        )
    }
}

/// Settings for the search-service translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Result limit when the query has no `limit` modifier.
    pub default_limit: u64,
    /// Result offset when the query has no `limit` modifier.
    pub default_offset: u64,
    /// Sort specification when the query has no `sort` modifier.
    pub default_sort: String,
    /// Field renames; the search service names its primary key `key`.
    pub aliases: FieldAliases,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_SEARCH_LIMIT,
            default_offset: 0,
            default_sort: DEFAULT_SEARCH_SORT.to_string(),
            aliases: [("id", "key")].into_iter().collect(),
        }
    }
}

/// Settings for the document-store translator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSettings {
    /// Field renames applied before calling the query builder.
    pub aliases: FieldAliases,
}

/// Resolved configuration for all translators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Search-service settings.
    pub search: SearchSettings,
    /// Document-store settings.
    pub document: DocumentSettings,
}

impl Config {
    /// Loads and validates configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = parse_config_file(path)?;
        Self::from_raw(raw)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw = parse_config_str(contents, Path::new("<inline>"))?;
        Self::from_raw(raw)
    }

    /// Applies defaults to a raw configuration and validates the result.
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let defaults = SearchSettings::default();
        let search = raw.search.unwrap_or_default();
        let document = raw.document.unwrap_or_default();

        let config = Self {
            search: SearchSettings {
                default_limit: search.default_limit.unwrap_or(defaults.default_limit),
                default_offset: search.default_offset.unwrap_or(defaults.default_offset),
                default_sort: search.default_sort.unwrap_or(defaults.default_sort),
                aliases: search.aliases.map_or(defaults.aliases, FieldAliases),
            },
            document: DocumentSettings {
                aliases: document.aliases.map(FieldAliases).unwrap_or_default(),
            },
        };

        validate_config(&config)?;
        debug!(
            search_aliases = config.search.aliases.len(),
            document_aliases = config.document.aliases.len(),
            default_limit = config.search.default_limit,
            "resolved rql config"
        );
        Ok(config)
    }
}
