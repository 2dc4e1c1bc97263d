//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require the `targets` table whenever a `[log]` section is present
//! - Reject blank sink names and blank sink types
//! - Validate the metrics bind address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Unregistered sink types are not errors here; the logger skips them
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("[log] section is missing the required `targets` table")]
    MissingTargets,

    #[error("log target names must not be blank")]
    BlankTargetName,

    #[error("log target `{0}` has a blank `type`")]
    BlankTargetType(String),

    #[error("invalid metrics address `{0}`")]
    InvalidMetricsAddress(String),
}

/// Check a parsed configuration before it is accepted.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(log) = &config.log {
        match &log.targets {
            None => errors.push(ValidationError::MissingTargets),
            Some(targets) => {
                for (name, target) in targets {
                    if name.trim().is_empty() {
                        errors.push(ValidationError::BlankTargetName);
                    }
                    if matches!(&target.kind, Some(kind) if kind.trim().is_empty()) {
                        errors.push(ValidationError::BlankTargetType(name.clone()));
                    }
                }
            }
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
