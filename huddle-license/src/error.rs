//! Error types for the licensing module.

use thiserror::Error;

/// Failures produced while validating raw license bytes.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Input could not be parsed into a license (encoding, format, or JSON).
    #[error("malformed license: {0}")]
    Malformed(String),

    /// Ed25519 signature verification failed.
    #[error("license signature invalid")]
    InvalidSignature,

    /// License expiration is in the past.
    #[error("license expired on {0}")]
    Expired(String),
}

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Trial requests are refused while the system-admin restriction
    /// policy is active.
    #[error("trial requests are restricted")]
    Forbidden,

    /// Trial requested without accepting the terms of service.
    #[error("terms of service were not accepted")]
    TermsNotAccepted,

    /// Caller input rejected.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Requester account does not exist.
    #[error("no account found for {0}")]
    MissingAccount(String),

    /// Renewal requested while no license is active.
    #[error("no active license")]
    NoActiveLicense,

    /// License bytes failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Signing failed while issuing a renewal token.
    #[error("signing error: {0}")]
    Signing(String),

    /// Persistent license storage failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Network error while talking to the licensing service.
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected collaborator failure.
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
