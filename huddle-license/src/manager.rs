//! License state ownership and orchestration.
//!
//! [`LicenseManager`] holds the active license together with its sanitized
//! client projection, fans out transitions to registered listeners, and
//! orchestrates the flows that touch collaborators: boot-time load,
//! save-and-install, renewal-token issuance, and trial requests.
//!
//! One manager is constructed per server instance from its collaborators;
//! there is no global license state.

use crate::directory::{DirectoryError, UserDirectory};
use crate::error::{LicenseError, LicenseResult};
use crate::identity::ServerIdentity;
use crate::license::License;
use crate::policy::TrialPolicy;
use crate::renewal::{
    encode_renewal_token, RenewalClaims, RenewalSigner, LICENSE_RENEWAL_URL,
    RENEWAL_TOKEN_EXPIRATION_SECS,
};
use crate::storage::LicenseStorage;
use crate::trial::{TrialLicenseRequest, TrialService};
use crate::validate::LicenseValidator;
use chrono::{Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

/// Environment variable consulted before persistent storage on load.
pub const LICENSE_ENV: &str = "HUDDLE_LICENSE";

/// Callback invoked with (old, new) on every license transition.
pub type LicenseListener = Arc<dyn Fn(Option<&License>, Option<&License>) + Send + Sync>;

/// The license and its client projection, replaced together so readers
/// never observe one without the other.
#[derive(Default)]
struct State {
    license: Option<Arc<License>>,
    client: BTreeMap<String, String>,
}

/// Owns the active license for one server instance.
pub struct LicenseManager {
    state: RwLock<State>,
    listeners: Mutex<HashMap<String, LicenseListener>>,
    /// Serializes transitions so every listener observes them in order.
    transition_lock: Mutex<()>,
    validator: LicenseValidator,
    signer: Arc<dyn RenewalSigner>,
    storage: Arc<dyn LicenseStorage>,
    users: Arc<dyn UserDirectory>,
    trials: Arc<dyn TrialService>,
    identity: Arc<dyn ServerIdentity>,
    policy: Arc<dyn TrialPolicy>,
}

impl LicenseManager {
    /// Creates a manager with no active license.
    pub fn new(
        validator: LicenseValidator,
        signer: Arc<dyn RenewalSigner>,
        storage: Arc<dyn LicenseStorage>,
        users: Arc<dyn UserDirectory>,
        trials: Arc<dyn TrialService>,
        identity: Arc<dyn ServerIdentity>,
        policy: Arc<dyn TrialPolicy>,
    ) -> Self {
        Self {
            state: RwLock::new(State::default()),
            listeners: Mutex::new(HashMap::new()),
            transition_lock: Mutex::new(()),
            validator,
            signer,
            storage,
            users,
            trials,
            identity,
            policy,
        }
    }

    // ── State holder ─────────────────────────────────────────────

    /// Installs a license as current and notifies listeners with
    /// (previous, new).
    ///
    /// Returns false without a transition when the candidate is already
    /// expired. Every successful call notifies, including repeated installs
    /// of an identical license.
    pub fn set(&self, license: License) -> bool {
        if license.is_expired() {
            warn!(license_id = %license.id, "rejecting expired license");
            return false;
        }
        self.install(Arc::new(license));
        true
    }

    /// Returns the currently active license. Never blocks on I/O.
    #[must_use]
    pub fn get(&self) -> Option<Arc<License>> {
        self.state.read().unwrap().license.clone()
    }

    /// Clears the current license and notifies listeners with
    /// (previous, absent).
    ///
    /// Idempotent: removing when no license is active is a no-op success and
    /// does not emit a redundant (absent, absent) notification.
    pub fn remove(&self) -> LicenseResult<()> {
        let _transition = self.transition_lock.lock().unwrap();
        let old = {
            let mut state = self.state.write().unwrap();
            let old = state.license.take();
            state.client.clear();
            old
        };
        if let Some(old) = old {
            debug!(license_id = %old.id, "license removed");
            self.notify(Some(&old), None);
        }
        Ok(())
    }

    /// Returns the sanitized client projection of the current license.
    ///
    /// Always consistent with [`get`](Self::get); absent license yields an
    /// empty map.
    #[must_use]
    pub fn client_license(&self) -> BTreeMap<String, String> {
        self.state.read().unwrap().client.clone()
    }

    /// Validates raw license bytes and installs the result.
    ///
    /// Returns false on any validation failure; the failure is logged, not
    /// propagated.
    pub fn validate_and_set_bytes(&self, raw: &[u8]) -> bool {
        match self.validator.validate_bytes(raw) {
            Ok(license) => self.set(license),
            Err(err) => {
                warn!(error = %err, "license validation failed");
                false
            }
        }
    }

    fn install(&self, new: Arc<License>) {
        let _transition = self.transition_lock.lock().unwrap();
        let old = {
            let mut state = self.state.write().unwrap();
            let old = state.license.replace(Arc::clone(&new));
            state.client = new.client_view();
            old
        };
        debug!(license_id = %new.id, "license installed");
        self.notify(old.as_deref(), Some(&new));
    }

    // ── Listener registry ────────────────────────────────────────

    /// Registers a listener invoked on every license transition.
    ///
    /// Safe to call while a notification fan-out is in progress; the new
    /// listener may miss the in-flight transition but sees every later one.
    pub fn add_listener<F>(&self, listener: F) -> String
    where
        F: Fn(Option<&License>, Option<&License>) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4().to_string();
        self.listeners
            .lock()
            .unwrap()
            .insert(id.clone(), Arc::new(listener));
        id
    }

    /// Unregisters a listener. Unknown ids are a silent no-op.
    pub fn remove_listener(&self, id: &str) {
        self.listeners.lock().unwrap().remove(id);
    }

    /// Snapshot-iterate-invoke: the registry lock is released before any
    /// callback runs, and a panicking callback cannot stop delivery to the
    /// rest. Callers hold `transition_lock`.
    fn notify(&self, old: Option<&License>, new: Option<&License>) {
        let snapshot: Vec<LicenseListener> = {
            let listeners = self.listeners.lock().unwrap();
            listeners.values().cloned().collect()
        };
        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(old, new))).is_err() {
                warn!("license listener panicked during notification");
            }
        }
    }

    // ── Load / save ──────────────────────────────────────────────

    /// Boot-time load: reads license bytes from the `HUDDLE_LICENSE`
    /// environment variable, falling back to persistent storage, and
    /// installs them if valid.
    ///
    /// Best-effort: every failure is logged and leaves the state absent so
    /// the server boots unlicensed.
    pub async fn load(&self) -> Option<Arc<License>> {
        let raw = match std::env::var(LICENSE_ENV) {
            Ok(value) if !value.is_empty() => {
                debug!("loading license from environment");
                Some(value.into_bytes())
            }
            _ => match self.storage.load_license_bytes().await {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(error = %err, "failed to read stored license");
                    None
                }
            },
        };
        let raw = raw?;
        if self.validate_and_set_bytes(&raw) {
            self.get()
        } else {
            None
        }
    }

    /// Validates license bytes, persists them, and installs the result.
    ///
    /// # Errors
    ///
    /// Returns the validation failure, or a storage error if persisting
    /// fails; in either case nothing is installed.
    pub async fn save_license(&self, raw: &[u8]) -> LicenseResult<Arc<License>> {
        let license = self.validator.validate_bytes(raw)?;
        self.storage.save_license_bytes(raw).await?;
        let installed = Arc::new(license);
        self.install(Arc::clone(&installed));
        Ok(installed)
    }

    // ── Renewal ──────────────────────────────────────────────────

    /// Issues a signed renewal token that expires after `expiration`.
    ///
    /// The claims snapshot the license active at issuance time and the
    /// current active user count.
    ///
    /// # Errors
    ///
    /// [`LicenseError::NoActiveLicense`] when no license is active;
    /// [`LicenseError::Internal`] when the user count cannot be read.
    pub fn generate_renewal_token(&self, expiration: Duration) -> LicenseResult<String> {
        let license = self.get().ok_or(LicenseError::NoActiveLicense)?;
        let active_users = self
            .users
            .active_user_count()
            .map_err(|err| LicenseError::Internal(format!("active user count: {err}")))?;
        let now = Utc::now();
        let claims = RenewalClaims {
            license_id: license.id.clone(),
            active_users,
            iat: now.timestamp(),
            exp: (now + expiration).timestamp(),
        };
        encode_renewal_token(&claims, self.signer.as_ref())
    }

    /// Returns a renewal link for the customer portal together with the
    /// token it embeds, using the default 7-day token expiration.
    pub fn generate_renewal_link(&self) -> LicenseResult<(String, String)> {
        let token =
            self.generate_renewal_token(Duration::seconds(RENEWAL_TOKEN_EXPIRATION_SECS))?;
        let url = format!("{LICENSE_RENEWAL_URL}?token={token}");
        Ok((url, token))
    }

    // ── Trial requests ───────────────────────────────────────────

    /// Validates and submits a trial license request.
    ///
    /// Gates are checked in order and fail fast: restriction policy, terms
    /// consent, user count, requester lookup. The submission result is
    /// propagated verbatim.
    pub async fn request_trial(
        &self,
        requester_id: &str,
        users: u32,
        terms_accepted: bool,
        receive_emails_accepted: bool,
    ) -> LicenseResult<()> {
        if self.policy.restrict_system_admin() {
            return Err(LicenseError::Forbidden);
        }
        if !terms_accepted {
            return Err(LicenseError::TermsNotAccepted);
        }
        if users == 0 {
            return Err(LicenseError::BadRequest(
                "trial license requires a nonzero user count".to_string(),
            ));
        }

        let requester = self.users.get_user(requester_id).map_err(|err| match err {
            DirectoryError::NotFound => LicenseError::MissingAccount(requester_id.to_string()),
            DirectoryError::Other(msg) => LicenseError::Internal(msg),
        })?;

        let request = TrialLicenseRequest {
            server_id: self.identity.telemetry_id(),
            name: requester.display_name,
            email: requester.email,
            site_name: self.identity.site_name(),
            site_url: self.identity.site_url(),
            users,
            terms_accepted,
            receive_emails_accepted,
        };

        debug!(users, "submitting trial license request");
        self.trials.submit_trial_request(&request).await
    }
}
