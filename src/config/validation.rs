//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the base URL is absolute http(s)
//! - Validate value ranges (timeouts > 0)
//! - Reject header names that can never be sent
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("base_url '{url}' is invalid: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("timeouts.{field} must be greater than 0")]
    ZeroTimeout { field: &'static str },

    #[error("header name '{0}' is empty or contains whitespace")]
    InvalidHeaderName(String),

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Validate a config, collecting every error found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "connect_secs" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "request_secs" });
    }

    for name in config.headers.keys() {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
        }
    }

    // Full filter directives are accepted; only bare levels are checked.
    let level = config.observability.log_level.to_ascii_lowercase();
    if !level.contains('=') && !level.contains(',') && !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
