//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (bind address parses, debounce bounded)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::AppConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `listener.bind_address`.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

const MAX_DEBOUNCE_MS: u64 = 60_000;

/// Check an already-deserialized config for semantic problems.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address".into(),
            message: format!(
                "not a valid socket address: {:?}",
                config.listener.bind_address
            ),
        });
    }

    for (field, value) in [
        ("paths.templates_dir", &config.paths.templates_dir),
        ("paths.static_dir", &config.paths.static_dir),
        ("paths.database", &config.paths.database),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError {
                field: field.into(),
                message: "must not be empty".into(),
            });
        }
    }

    if config.reload.enabled
        && !(1..=MAX_DEBOUNCE_MS).contains(&config.reload.debounce_ms)
    {
        errors.push(ValidationError {
            field: "reload.debounce_ms".into(),
            message: format!("must be between 1 and {MAX_DEBOUNCE_MS}"),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "listener.bind_address");
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nope".into();
        config.paths.templates_dir = "  ".into();
        config.reload.debounce_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn debounce_is_ignored_when_reload_disabled() {
        let mut config = AppConfig::default();
        config.reload.enabled = false;
        config.reload.debounce_ms = 0;
        assert!(validate_config(&config).is_ok());
    }
}
