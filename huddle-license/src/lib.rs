//! Licensing and renewal for Huddle.
//!
//! This crate owns the lifecycle of the server license:
//! - Validation of raw license bytes via Ed25519 signature verification
//! - The active license and its sanitized client projection
//! - Listener notification on every license transition
//! - Signed renewal tokens for requesting an extension from the
//!   customer portal
//! - Trial license requests, gated by policy and consent
//!
//! # License Format
//!
//! License files are formatted as: `base64url(payload).base64url(signature)`.
//! The payload is a JSON license record signed with Ed25519; the signature
//! covers the base64url-encoded payload string, matching the issuing service.
//!
//! The surrounding server provides persistence, user lookup, process
//! identity, and the outbound trial channel through the [`LicenseStorage`],
//! [`UserDirectory`], [`ServerIdentity`], [`TrialPolicy`], and
//! [`TrialService`] traits; the [`LicenseManager`] is constructed per server
//! instance from those collaborators.

mod directory;
mod error;
mod identity;
mod license;
mod manager;
mod policy;
mod renewal;
mod storage;
mod trial;
mod validate;

#[cfg(feature = "online")]
mod http;

pub use directory::{DirectoryError, UserDirectory, UserIdentity};
pub use error::{LicenseError, LicenseResult, ValidationError};
pub use identity::ServerIdentity;
pub use license::{Customer, Features, License, CLIENT_LICENSE_KEYS};
pub use manager::{LicenseManager, LicenseListener, LICENSE_ENV};
pub use policy::TrialPolicy;
pub use renewal::{
    decode_renewal_claims, Ed25519Signer, RenewalClaims, RenewalSigner, LICENSE_RENEWAL_URL,
    RENEWAL_TOKEN_EXPIRATION_SECS,
};
pub use storage::LicenseStorage;
pub use trial::{TrialLicenseRequest, TrialService, REQUEST_TRIAL_URL};
pub use validate::LicenseValidator;

#[cfg(feature = "online")]
pub use http::HttpTrialService;
