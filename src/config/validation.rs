//! Configuration validation.
//!
//! Serde handles the syntax; this checks values the shim cannot run with.
//! All problems are collected, not just the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ShimConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &ShimConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.upstream.address.trim().is_empty() {
        errors.push(ValidationError::new("upstream.address", "must not be empty"));
    } else if tonic::transport::Endpoint::from_shared(config.upstream.endpoint_uri()).is_err() {
        errors.push(ValidationError::new(
            "upstream.address",
            format!("'{}' is not a valid endpoint", config.upstream.address),
        ));
    }

    if config.upstream.inbound_tag.is_empty() {
        errors.push(ValidationError::new("upstream.inbound_tag", "must not be empty"));
    }

    if config.timeouts.connect_secs == Some(0) {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == Some(0) {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
