//! Configuration validation rules.
//!
//! This module validates configuration for correctness:
//! - The negative TTL must be strictly shorter than the positive TTL
//! - The origin timeout must be non-zero
//! - The name prefix must be non-empty
//! - The URL template must have well-formed placeholders

use crate::config::schema::ResolverConfig;
use crate::error::{ResolverError, Result};
use crate::resolver::UrlTemplate;

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_config(config: &ResolverConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.local_cache.negative_ttl >= config.local_cache.ttl {
        errors.push(ValidationError::new(
            "negative-ttl",
            format!(
                "local_cache.negative_ttl ({}) must be shorter than local_cache.ttl ({})",
                config.local_cache.negative_ttl, config.local_cache.ttl
            ),
        ));
    }

    if config.origin.timeout == 0 {
        errors.push(ValidationError::new(
            "origin-timeout",
            "origin.timeout must be at least 1 second",
        ));
    }

    if config.name_prefix.is_empty() {
        errors.push(ValidationError::new(
            "name-prefix",
            "name_prefix must not be empty",
        ));
    }

    if let Some(pattern) = &config.origin.url_template {
        if let Err(e) = UrlTemplate::parse(pattern.as_str()) {
            errors.push(ValidationError::new("url-template", e.to_string()));
        }
    }

    if let Some(guard) = &config.guard {
        if guard.field.is_empty() {
            errors.push(ValidationError::new("guard", "guard.field must not be empty"));
        }
    }

    errors
}

/// Validate a configuration, failing on the first batch of errors.
///
/// # Errors
///
/// Returns `ConfigValidationError` listing every problem found.
pub fn validate(config: &ResolverConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    Err(ResolverError::ConfigValidationError { message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::GuardConfig;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&ResolverConfig::default()).is_ok());
    }

    #[test]
    fn negative_ttl_must_be_shorter() {
        let mut config = ResolverConfig::default();
        config.local_cache.negative_ttl = 60;

        let errors = validate_config(&config);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule, "negative-ttl");
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = ResolverConfig::default();
        config.origin.timeout = 0;

        assert_eq!(validate_config(&config)[0].rule, "origin-timeout");
    }

    #[test]
    fn empty_name_prefix_rejected() {
        let mut config = ResolverConfig::default();
        config.name_prefix = String::new();

        assert_eq!(validate_config(&config)[0].rule, "name-prefix");
    }

    #[test]
    fn malformed_url_template_rejected() {
        let mut config = ResolverConfig::default();
        config.origin.url_template = Some("http://origin.test/{name".into());

        assert_eq!(validate_config(&config)[0].rule, "url-template");
    }

    #[test]
    fn empty_guard_field_rejected() {
        let mut config = ResolverConfig::default();
        config.guard = Some(GuardConfig {
            field: String::new(),
            allowed: vec!["shop".into()],
        });

        assert_eq!(validate_config(&config)[0].rule, "guard");
    }

    #[test]
    fn validate_joins_all_messages() {
        let mut config = ResolverConfig::default();
        config.local_cache.negative_ttl = 90;
        config.origin.timeout = 0;

        let err = validate(&config).unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("negative_ttl"));
        assert!(msg.contains("origin.timeout"));
    }
}
