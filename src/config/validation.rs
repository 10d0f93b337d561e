//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the upstream URL and request defaults
//! - Validate observability settings before logging starts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("upstream.base_url `{url}` is not a valid URL: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("upstream.base_url `{0}` must use http or https")]
    UnsupportedScheme(String),

    #[error("defaults.model must not be empty")]
    EmptyDefaultModel,

    #[error("defaults.temperature must be a finite, non-negative number (got {0})")]
    InvalidTemperature(f64),

    #[error("defaults.max_tokens must be greater than zero")]
    ZeroMaxTokens,

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("observability.log_level `{0}` is not a valid filter directive")]
    InvalidLogLevel(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if !matches!(url.scheme(), "http" | "https") => {
            errors.push(ValidationError::UnsupportedScheme(config.upstream.base_url.clone()));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.upstream.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.defaults.model.trim().is_empty() {
        errors.push(ValidationError::EmptyDefaultModel);
    }
    let temperature = config.defaults.temperature;
    if !temperature.is_finite() || temperature < 0.0 {
        errors.push(ValidationError::InvalidTemperature(temperature));
    }
    if config.defaults.max_tokens == 0 {
        errors.push(ValidationError::ZeroMaxTokens);
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }
    if EnvFilter::try_new(&observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
