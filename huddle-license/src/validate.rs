//! Raw license parsing and Ed25519 signature verification.
//!
//! License files use the format: `base64url(payload).base64url(signature)`
//!
//! The payload is the JSON license record. The signature covers
//! `payload_b64.as_bytes()` (the base64url-encoded payload string, not the
//! decoded JSON), matching the issuing service.

use crate::error::ValidationError;
use crate::license::License;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Embedded Ed25519 public key for production license verification (32 bytes).
const LICENSE_PUBLIC_KEY: [u8; 32] = [
    215, 90, 152, 1, 130, 177, 10, 183, 213, 75, 254, 211, 201, 100, 7, 58,
    14, 225, 114, 243, 218, 166, 35, 37, 175, 2, 26, 104, 247, 7, 81, 26,
];

/// Validates raw license bytes against a trusted verifying key.
///
/// Validation never touches license state; the caller decides whether to
/// install the result.
#[derive(Debug, Clone)]
pub struct LicenseValidator {
    public_key: [u8; 32],
}

impl Default for LicenseValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl LicenseValidator {
    /// Creates a validator trusting the embedded production key.
    #[must_use]
    pub fn new() -> Self {
        Self {
            public_key: LICENSE_PUBLIC_KEY,
        }
    }

    /// Creates a validator trusting a custom public key.
    /// Used for testing with a generated key pair.
    #[must_use]
    pub fn with_key(public_key: [u8; 32]) -> Self {
        Self { public_key }
    }

    /// Parses and verifies raw license bytes, returning the fully-formed
    /// license on success.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::Malformed`] when the bytes are not UTF-8, not in
    ///   two-part base64url form, or the payload is not a license record
    /// - [`ValidationError::InvalidSignature`] when verification fails
    /// - [`ValidationError::Expired`] when the license expiration has passed
    pub fn validate_bytes(&self, raw: &[u8]) -> Result<License, ValidationError> {
        let text = std::str::from_utf8(raw)
            .map_err(|_| ValidationError::Malformed("license is not valid UTF-8".to_string()))?
            .trim();

        // Split into payload and signature parts
        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() != 2 {
            return Err(ValidationError::Malformed(
                "license must have exactly two parts separated by a dot".to_string(),
            ));
        }

        let payload_b64 = parts[0];
        let signature_b64 = parts[1];

        // Decode signature
        let sig_bytes = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|e| ValidationError::Malformed(format!("invalid signature base64: {e}")))?;

        let signature = Signature::from_slice(&sig_bytes)
            .map_err(|_| ValidationError::Malformed("invalid signature length".to_string()))?;

        // Build verifying key
        let verifying_key = VerifyingKey::from_bytes(&self.public_key)
            .map_err(|_| ValidationError::Malformed("invalid public key".to_string()))?;

        // Verify signature over the base64url-encoded payload bytes
        verifying_key
            .verify(payload_b64.as_bytes(), &signature)
            .map_err(|_| ValidationError::InvalidSignature)?;

        // Decode payload JSON
        let payload_json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| ValidationError::Malformed(format!("invalid payload base64: {e}")))?;

        let license: License = serde_json::from_slice(&payload_json)
            .map_err(|e| ValidationError::Malformed(format!("invalid license JSON: {e}")))?;

        if license.is_expired() {
            return Err(ValidationError::Expired(license.expires_at.to_rfc3339()));
        }

        Ok(license)
    }
}
