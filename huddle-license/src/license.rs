//! The license record and its sanitized client projection.
//!
//! A [`License`] is immutable once issued. The manager replaces the whole
//! record on every transition; nothing in this module mutates one in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys allowed to appear in the client-visible license projection.
///
/// Everything not listed here (license id, customer identity, raw payload)
/// stays server-side.
pub const CLIENT_LICENSE_KEYS: &[&str] = &[
    "IsLicensed",
    "IsTrial",
    "IssuedAt",
    "StartsAt",
    "ExpiresAt",
    "SkuName",
    "SkuShortName",
    "Users",
    "AdvancedAuth",
    "ComplianceExport",
    "GuestAccounts",
    "Company",
];

/// The customer a license was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer id at the licensing service.
    pub id: String,
    /// Contact name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Company name.
    pub company: String,
}

/// Entitlements granted by a license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    /// Licensed seat count.
    pub users: u32,
    #[serde(default)]
    pub advanced_auth: bool,
    #[serde(default)]
    pub compliance_export: bool,
    #[serde(default)]
    pub guest_accounts: bool,
}

/// A license issued to a running server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// Unique license id assigned by the issuing service.
    pub id: String,
    /// When the license was issued (seconds since epoch on the wire).
    #[serde(with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,
    /// When the license becomes effective.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub starts_at: DateTime<Utc>,
    /// When the license expires.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
    /// Who the license was issued to.
    pub customer: Customer,
    /// Granted entitlements.
    pub features: Features,
    /// Full SKU name (e.g. "Huddle Enterprise").
    pub sku_name: String,
    /// Short SKU code (e.g. "enterprise").
    pub sku_short_name: String,
    /// True for trial licenses.
    #[serde(default)]
    pub is_trial: bool,
}

impl License {
    /// Returns true if the license expiration is in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Returns true if the license start date has been reached.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.starts_at <= Utc::now()
    }

    /// Builds the sanitized client projection.
    ///
    /// Only keys in [`CLIENT_LICENSE_KEYS`] are emitted; timestamps are
    /// rendered as epoch seconds.
    #[must_use]
    pub fn client_view(&self) -> BTreeMap<String, String> {
        let mut view = BTreeMap::new();
        view.insert("IsLicensed".to_string(), "true".to_string());
        view.insert("IsTrial".to_string(), self.is_trial.to_string());
        view.insert(
            "IssuedAt".to_string(),
            self.issued_at.timestamp().to_string(),
        );
        view.insert(
            "StartsAt".to_string(),
            self.starts_at.timestamp().to_string(),
        );
        view.insert(
            "ExpiresAt".to_string(),
            self.expires_at.timestamp().to_string(),
        );
        view.insert("SkuName".to_string(), self.sku_name.clone());
        view.insert("SkuShortName".to_string(), self.sku_short_name.clone());
        view.insert("Users".to_string(), self.features.users.to_string());
        view.insert(
            "AdvancedAuth".to_string(),
            self.features.advanced_auth.to_string(),
        );
        view.insert(
            "ComplianceExport".to_string(),
            self.features.compliance_export.to_string(),
        );
        view.insert(
            "GuestAccounts".to_string(),
            self.features.guest_accounts.to_string(),
        );
        view.insert("Company".to_string(), self.customer.company.clone());
        view
    }
}
