//! Renewal tokens: short-lived signed claims proving license identity.
//!
//! Tokens use the same wire convention as license files:
//! `base64url(claims).base64url(signature)`, with the signature covering the
//! base64url-encoded claims string.

use crate::error::{LicenseError, LicenseResult, ValidationError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

/// Default renewal-token lifetime: 7 days.
pub const RENEWAL_TOKEN_EXPIRATION_SECS: i64 = 7 * 24 * 60 * 60;

/// Endpoint where a renewal token can be redeemed.
pub const LICENSE_RENEWAL_URL: &str = "https://customers.huddle-app.com/subscribe/renew";

/// Claims carried by a renewal token.
///
/// Built per request from the license active at issuance time; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalClaims {
    /// Id of the license being renewed.
    pub license_id: String,
    /// Active user count at issuance.
    pub active_users: i64,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expires-at (seconds since epoch).
    pub exp: i64,
}

/// Signs renewal claims.
///
/// The signing algorithm is a deployment detail behind this seam; the
/// manager only needs `sign`.
pub trait RenewalSigner: Send + Sync {
    /// Signs a message, returning the detached signature bytes.
    fn sign(&self, message: &[u8]) -> LicenseResult<Vec<u8>>;
}

/// Ed25519 renewal signer holding the process signing key.
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    /// Generates a fresh random signing key.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Creates a signer from a raw 32-byte seed.
    #[must_use]
    pub fn from_bytes(seed: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(seed),
        }
    }

    /// Returns the raw 32-byte public key for verification.
    #[must_use]
    pub fn verifying_key_bytes(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }
}

impl RenewalSigner for Ed25519Signer {
    fn sign(&self, message: &[u8]) -> LicenseResult<Vec<u8>> {
        Ok(self.key.sign(message).to_bytes().to_vec())
    }
}

/// Encodes claims into an opaque signed token string.
pub(crate) fn encode_renewal_token(
    claims: &RenewalClaims,
    signer: &dyn RenewalSigner,
) -> LicenseResult<String> {
    let payload = serde_json::to_vec(claims)?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(&payload);
    let signature = signer.sign(payload_b64.as_bytes())?;
    let sig_b64 = URL_SAFE_NO_PAD.encode(&signature);
    Ok(format!("{payload_b64}.{sig_b64}"))
}

/// Decodes and verifies a renewal token against an Ed25519 public key.
///
/// Used by the receiving side of the renewal flow (and by tests); rejects
/// tokens whose `exp` has passed.
///
/// # Errors
///
/// Returns [`LicenseError::Validation`] with the same failure classes as
/// license validation: malformed, bad signature, or expired.
pub fn decode_renewal_claims(token: &str, public_key: &[u8; 32]) -> LicenseResult<RenewalClaims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(ValidationError::Malformed(
            "token must have exactly two parts separated by a dot".to_string(),
        )
        .into());
    }

    let payload_b64 = parts[0];
    let signature_b64 = parts[1];

    let sig_bytes = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|e| ValidationError::Malformed(format!("invalid signature base64: {e}")))?;
    let signature = Signature::from_slice(&sig_bytes)
        .map_err(|_| ValidationError::Malformed("invalid signature length".to_string()))?;

    let verifying_key = VerifyingKey::from_bytes(public_key)
        .map_err(|_| ValidationError::Malformed("invalid public key".to_string()))?;

    verifying_key
        .verify(payload_b64.as_bytes(), &signature)
        .map_err(|_| ValidationError::InvalidSignature)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|e| ValidationError::Malformed(format!("invalid claims base64: {e}")))?;
    let claims: RenewalClaims = serde_json::from_slice(&payload)
        .map_err(|e| ValidationError::Malformed(format!("invalid claims JSON: {e}")))?;

    if claims.exp <= chrono::Utc::now().timestamp() {
        return Err(ValidationError::Expired(claims.exp.to_string()).into());
    }

    Ok(claims)
}
