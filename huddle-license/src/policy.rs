//! Policy seam gating trial requests.

/// Policy flags consulted at request time, never cached.
pub trait TrialPolicy: Send + Sync {
    /// When true, trial requests are refused outright.
    fn restrict_system_admin(&self) -> bool;
}
