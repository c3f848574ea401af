//! Configuration error types.

use thiserror::Error;

/// Errors produced while reading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was present but did not parse.
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        /// Environment variable name.
        key: &'static str,
        /// The offending raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A parsed value violates a documented constraint.
    #[error("{key} must satisfy: {constraint}")]
    Constraint {
        /// Environment variable name.
        key: &'static str,
        /// The violated constraint.
        constraint: &'static str,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_display_names_key_and_value() {
        let err = ConfigError::Invalid {
            key: "CHANCE_TO_WIN",
            value: "abc".to_string(),
            reason: "not a number".to_string(),
        };
        let shown = err.to_string();
        assert!(shown.contains("CHANCE_TO_WIN"));
        assert!(shown.contains("abc"));
    }

    #[test]
    fn constraint_display_names_constraint() {
        let err = ConfigError::Constraint {
            key: "ROUND_COUNT_EACH_GAME",
            constraint: "min <= max",
        };
        assert!(err.to_string().contains("min <= max"));
    }
}
