//! Configuration validation

use crate::schema::RawConfig;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid server URL '{value}': {message}")]
    InvalidServerUrl { value: String, message: String },

    #[error("Endpoint '{name}' must start with '/': {value}")]
    InvalidEndpointPath { name: &'static str, value: String },

    #[error("Storage key cannot be empty")]
    EmptyStorageKey,

    #[error("{name} must be greater than zero")]
    ZeroInterval { name: &'static str },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(url) = &config.server.base_url {
        if let Err(message) = validate_base_url(url) {
            errors.push(ValidationError::InvalidServerUrl {
                value: url.clone(),
                message,
            });
        }
    }

    let paths = [
        ("status_path", &config.server.status_path),
        ("start_path", &config.server.start_path),
        ("end_path", &config.server.end_path),
    ];
    for (name, path) in paths {
        if let Some(value) = path
            && !value.starts_with('/')
        {
            errors.push(ValidationError::InvalidEndpointPath {
                name,
                value: value.clone(),
            });
        }
    }

    if let Some(key) = &config.storage.key
        && key.trim().is_empty()
    {
        errors.push(ValidationError::EmptyStorageKey);
    }

    if config.display.tick_interval_ms == Some(0) {
        errors.push(ValidationError::ZeroInterval {
            name: "tick_interval_ms",
        });
    }
    if config.display.status_dismiss_ms == Some(0) {
        errors.push(ValidationError::ZeroInterval {
            name: "status_dismiss_ms",
        });
    }

    errors
}

/// Check that `url` is an http(s) URL with a host
pub fn validate_base_url(url: &str) -> Result<(), String> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or_else(|| "scheme must be http or https".to_string())?;

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err("missing host".into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawDisplayConfig, RawServerConfig, RawStorageConfig};

    fn raw() -> RawConfig {
        RawConfig {
            config_version: 1,
            server: RawServerConfig::default(),
            storage: RawStorageConfig::default(),
            display: RawDisplayConfig::default(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&raw()).is_empty());
    }

    #[test]
    fn test_base_url() {
        assert!(validate_base_url("http://127.0.0.1:5000").is_ok());
        assert!(validate_base_url("https://breaks.example.com/api").is_ok());
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("http://").is_err());
        assert!(validate_base_url("127.0.0.1:5000").is_err());
    }

    #[test]
    fn reports_every_problem() {
        let mut config = raw();
        config.server.base_url = Some("localhost".into());
        config.server.end_path = Some("end-break".into());
        config.storage.key = Some("  ".into());
        config.display.tick_interval_ms = Some(0);

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 4);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidEndpointPath { name: "end_path", .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::EmptyStorageKey)));
    }
}
