//! Error types for Sentia core operations

use thiserror::Error;

/// Errors raised by the Sentia core subsystem
///
/// Both validation and consent errors are raised synchronously to the
/// immediate caller; every operation is deterministic, so retrying with
/// unchanged input reproduces the identical error. Unknown-id lookups in the
/// distribution registry return `None` instead of erroring - that asymmetry
/// is intentional (lookup vs. stateful-operation semantics).
#[derive(Error, Debug)]
pub enum SentiaError {
    #[error("message validation failed: {}", .violations.join("; "))]
    Validation { violations: Vec<String> },

    #[error("no active consent record for validator {address}")]
    ConsentNotFound { address: String },

    #[error("invalid registry state: {0}")]
    InvalidState(String),

    #[error("consent registry lock poisoned")]
    LockPoisoned,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SentiaError {
    /// Build a validation error from the collected constraint violations
    pub fn validation(violations: Vec<String>) -> Self {
        SentiaError::Validation { violations }
    }

    /// Build a not-found error for the given validator address
    pub fn consent_not_found(address: &str) -> Self {
        SentiaError::ConsentNotFound {
            address: address.to_string(),
        }
    }
}
