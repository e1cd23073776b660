//! Process identity seam.

/// Read-only process-wide identity: who this server installation is and
/// where it lives.
pub trait ServerIdentity: Send + Sync {
    /// Stable telemetry identifier for this server installation.
    fn telemetry_id(&self) -> String;

    /// Configured site name.
    fn site_name(&self) -> String;

    /// Configured site URL.
    fn site_url(&self) -> String;
}
