//! Trial license requests.

use crate::error::LicenseResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Endpoint accepting trial license requests.
pub const REQUEST_TRIAL_URL: &str = "https://customers.huddle-app.com/api/v1/trials";

/// A request for a trial license.
///
/// Assembled per call from the requester identity, the process identity, and
/// the caller's consent flags; it only exists for the duration of one
/// outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialLicenseRequest {
    /// Telemetry id of the requesting server.
    pub server_id: String,
    /// Requester display name.
    pub name: String,
    /// Requester email.
    pub email: String,
    /// Configured site name.
    pub site_name: String,
    /// Configured site URL.
    pub site_url: String,
    /// Requested seat count.
    pub users: u32,
    /// Terms-of-service consent.
    pub terms_accepted: bool,
    /// Marketing email consent.
    pub receive_emails_accepted: bool,
}

/// Outbound channel to the trial-issuing service.
#[async_trait]
pub trait TrialService: Send + Sync {
    /// Submits an assembled trial request to the licensing service.
    async fn submit_trial_request(&self, request: &TrialLicenseRequest) -> LicenseResult<()>;
}
