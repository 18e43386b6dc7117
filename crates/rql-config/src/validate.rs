//! Configuration validation.
//!
//! Rejects settings that would make every translated query malformed.

use crate::{Config, ConfigError, FieldAliases};

/// Validates a resolved configuration.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.search.default_limit == 0 {
        return Err(ConfigError::InvalidLimit);
    }
    validate_sort(&config.search.default_sort)?;
    validate_aliases(&config.search.aliases)?;
    validate_aliases(&config.document.aliases)
}

/// Checks that a sort specification reads `field:asc` or `field:desc`.
fn validate_sort(value: &str) -> Result<(), ConfigError> {
    let valid = value.split(',').all(|part| {
        part.rsplit_once(':').is_some_and(|(field, direction)| {
            !field.trim().is_empty() && matches!(direction.trim(), "asc" | "desc")
        })
    });
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidSort {
            value: value.to_string(),
        })
    }
}

/// Checks that no alias maps from or to an empty field name.
fn validate_aliases(aliases: &FieldAliases) -> Result<(), ConfigError> {
    match aliases
        .iter()
        .find(|(from, to)| from.trim().is_empty() || to.trim().is_empty())
    {
        Some((from, to)) => Err(ConfigError::InvalidAlias {
            from: from.to_string(),
            to: to.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn zero_limit_rejected() {
        let mut config = Config::default();
        config.search.default_limit = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidLimit)
        ));
    }

    #[test]
    fn sort_forms() {
        assert!(validate_sort("key:asc").is_ok());
        assert!(validate_sort("value.name:desc,key:asc").is_ok());
        assert!(validate_sort("key").is_err());
        assert!(validate_sort(":asc").is_err());
        assert!(validate_sort("key:up").is_err());
        assert!(validate_sort("").is_err());
    }

    #[test]
    fn empty_alias_rejected() {
        let mut config = Config::default();
        config.document.aliases.insert("id", "");
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("'id' -> ''"));
    }
}
