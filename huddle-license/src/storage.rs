//! Persistent license storage seam.

use crate::error::LicenseResult;
use async_trait::async_trait;

/// Persistent storage for raw license bytes.
///
/// The config/storage subsystem that physically owns the bytes implements
/// this; the license core only reads and writes through it.
#[async_trait]
pub trait LicenseStorage: Send + Sync {
    /// Returns the stored license bytes, or `None` when no license is saved.
    async fn load_license_bytes(&self) -> LicenseResult<Option<Vec<u8>>>;

    /// Persists raw license bytes, replacing any previously stored license.
    async fn save_license_bytes(&self, raw: &[u8]) -> LicenseResult<()>;
}
