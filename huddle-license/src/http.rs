//! Online trial submission over HTTPS.

use crate::error::{LicenseError, LicenseResult};
use crate::trial::{TrialLicenseRequest, TrialService, REQUEST_TRIAL_URL};
use async_trait::async_trait;

/// Submits trial requests to the licensing service as JSON over HTTPS.
pub struct HttpTrialService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTrialService {
    /// Creates a service pointed at the production trial endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoint(REQUEST_TRIAL_URL)
    }

    /// Creates a service pointed at a custom endpoint.
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for HttpTrialService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrialService for HttpTrialService {
    async fn submit_trial_request(&self, request: &TrialLicenseRequest) -> LicenseResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| LicenseError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LicenseError::Network(format!(
                "trial request failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
