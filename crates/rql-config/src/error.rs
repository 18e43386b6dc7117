//! Error types for rql configuration.

use std::{io, path::PathBuf};

use thiserror::Error;
use toml::de;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// An alias has an empty source or target field name.
    #[error("invalid field alias '{from}' -> '{to}': field names must not be empty")]
    InvalidAlias {
        /// Caller-visible field name.
        from: String,
        /// Backend field name.
        to: String,
    },

    /// The default result limit is zero.
    #[error("default_limit must be greater than zero")]
    InvalidLimit,

    /// The default sort is not of the form `field:asc` or `field:desc`.
    #[error("invalid default_sort '{value}': expected 'field:asc' or 'field:desc'")]
    InvalidSort {
        /// The rejected sort specification.
        value: String,
    },
}
