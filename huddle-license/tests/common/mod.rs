//! Shared test helpers for license tests.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{Signer, SigningKey};
use huddle_license::{
    DirectoryError, Ed25519Signer, License, LicenseError, LicenseManager, LicenseResult,
    LicenseStorage, LicenseValidator, ServerIdentity, TrialLicenseRequest, TrialPolicy,
    TrialService, UserDirectory, UserIdentity,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Returns a deterministic Ed25519 key pair from a fixed seed.
pub fn test_keypair() -> (SigningKey, [u8; 32]) {
    let seed: [u8; 32] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29, 30, 31, 32,
    ];
    let signing_key = SigningKey::from_bytes(&seed);
    let verifying_key = signing_key.verifying_key();
    (signing_key, verifying_key.to_bytes())
}

/// Builds the JSON license record used across tests.
pub fn license_payload(id: &str, expires_in_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    serde_json::json!({
        "id": id,
        "issued_at": now - 86_400,
        "starts_at": now - 86_400,
        "expires_at": now + expires_in_secs,
        "customer": {
            "id": "cus_1",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "company": "Analytical Engines Ltd",
        },
        "features": {
            "users": 50,
            "advanced_auth": true,
            "compliance_export": false,
            "guest_accounts": false,
        },
        "sku_name": "Huddle Enterprise",
        "sku_short_name": "enterprise",
        "is_trial": false,
    })
    .to_string()
}

/// Creates signed license bytes: `base64url(payload_json).base64url(signature)`.
/// Signs over the base64url-encoded payload bytes (matching the issuing service).
pub fn sign_license(signing_key: &SigningKey, payload_json: &str) -> Vec<u8> {
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());
    let signature = signing_key.sign(payload_b64.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());
    format!("{payload_b64}.{sig_b64}").into_bytes()
}

/// Creates signed license bytes for a license expiring `expires_in_secs`
/// from now.
pub fn make_license_bytes(signing_key: &SigningKey, id: &str, expires_in_secs: i64) -> Vec<u8> {
    sign_license(signing_key, &license_payload(id, expires_in_secs))
}

/// Builds a `License` value directly (bypassing signing) for state tests.
pub fn make_license(id: &str, expires_in_secs: i64) -> License {
    serde_json::from_str(&license_payload(id, expires_in_secs)).unwrap()
}

// ── Collaborator fakes ──────────────────────────────────────────

/// In-memory license storage.
#[derive(Default)]
pub struct MemoryStorage {
    bytes: Mutex<Option<Vec<u8>>>,
    fail_load: AtomicBool,
    fail_save: AtomicBool,
}

impl MemoryStorage {
    pub fn preload(&self, raw: Vec<u8>) {
        *self.bytes.lock().unwrap() = Some(raw);
    }

    pub fn stored(&self) -> Option<Vec<u8>> {
        self.bytes.lock().unwrap().clone()
    }

    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LicenseStorage for MemoryStorage {
    async fn load_license_bytes(&self) -> LicenseResult<Option<Vec<u8>>> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(LicenseError::Storage("read failed".to_string()));
        }
        Ok(self.bytes.lock().unwrap().clone())
    }

    async fn save_license_bytes(&self, raw: &[u8]) -> LicenseResult<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(LicenseError::Storage("write failed".to_string()));
        }
        *self.bytes.lock().unwrap() = Some(raw.to_vec());
        Ok(())
    }
}

/// User directory stub with one known account ("u1") by default.
pub struct StubDirectory {
    users: Mutex<HashMap<String, UserIdentity>>,
    active_users: Mutex<i64>,
    fail_lookup: AtomicBool,
    fail_count: AtomicBool,
}

impl Default for StubDirectory {
    fn default() -> Self {
        let mut users = HashMap::new();
        users.insert(
            "u1".to_string(),
            UserIdentity {
                id: "u1".to_string(),
                display_name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
            },
        );
        Self {
            users: Mutex::new(users),
            active_users: Mutex::new(25),
            fail_lookup: AtomicBool::new(false),
            fail_count: AtomicBool::new(false),
        }
    }
}

impl StubDirectory {
    pub fn add_user(&self, user: UserIdentity) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    pub fn set_active_users(&self, count: i64) {
        *self.active_users.lock().unwrap() = count;
    }

    pub fn fail_lookup(&self, fail: bool) {
        self.fail_lookup.store(fail, Ordering::SeqCst);
    }

    pub fn fail_count(&self, fail: bool) {
        self.fail_count.store(fail, Ordering::SeqCst);
    }
}

impl UserDirectory for StubDirectory {
    fn get_user(&self, id: &str) -> Result<UserIdentity, DirectoryError> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(DirectoryError::Other("directory unavailable".to_string()));
        }
        self.users
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(DirectoryError::NotFound)
    }

    fn active_user_count(&self) -> Result<i64, DirectoryError> {
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(DirectoryError::Other("count unavailable".to_string()));
        }
        Ok(*self.active_users.lock().unwrap())
    }
}

/// Trial service that records submitted requests.
#[derive(Default)]
pub struct RecordingTrialService {
    requests: Mutex<Vec<TrialLicenseRequest>>,
    fail: AtomicBool,
}

impl RecordingTrialService {
    pub fn submitted(&self) -> Vec<TrialLicenseRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TrialService for RecordingTrialService {
    async fn submit_trial_request(&self, request: &TrialLicenseRequest) -> LicenseResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(LicenseError::Network("trial service unreachable".to_string()));
        }
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// Fixed process identity.
pub struct FixedIdentity;

impl ServerIdentity for FixedIdentity {
    fn telemetry_id(&self) -> String {
        "srv_telemetry_01".to_string()
    }

    fn site_name(&self) -> String {
        "Huddle HQ".to_string()
    }

    fn site_url(&self) -> String {
        "https://huddle.example.com".to_string()
    }
}

/// Mutable restriction-policy flag.
#[derive(Default)]
pub struct FlagPolicy {
    restrict: AtomicBool,
}

impl FlagPolicy {
    pub fn restrict(&self, restrict: bool) {
        self.restrict.store(restrict, Ordering::SeqCst);
    }
}

impl TrialPolicy for FlagPolicy {
    fn restrict_system_admin(&self) -> bool {
        self.restrict.load(Ordering::SeqCst)
    }
}

// ── Harness ─────────────────────────────────────────────────────

/// A manager wired to in-memory fakes, plus handles to drive them.
pub struct Harness {
    pub manager: LicenseManager,
    pub storage: Arc<MemoryStorage>,
    pub directory: Arc<StubDirectory>,
    pub trials: Arc<RecordingTrialService>,
    pub policy: Arc<FlagPolicy>,
    pub license_signing_key: SigningKey,
    pub renewal_public_key: [u8; 32],
}

/// Builds a manager over fresh fakes with deterministic keys.
pub fn harness() -> Harness {
    let (license_signing_key, license_public_key) = test_keypair();
    let renewal_seed = [9u8; 32];
    let signer = Arc::new(Ed25519Signer::from_bytes(&renewal_seed));
    let renewal_public_key = signer.verifying_key_bytes();

    let storage = Arc::new(MemoryStorage::default());
    let directory = Arc::new(StubDirectory::default());
    let trials = Arc::new(RecordingTrialService::default());
    let policy = Arc::new(FlagPolicy::default());

    let manager = LicenseManager::new(
        LicenseValidator::with_key(license_public_key),
        signer,
        Arc::clone(&storage) as Arc<dyn LicenseStorage>,
        Arc::clone(&directory) as Arc<dyn UserDirectory>,
        Arc::clone(&trials) as Arc<dyn TrialService>,
        Arc::new(FixedIdentity),
        Arc::clone(&policy) as Arc<dyn TrialPolicy>,
    );

    Harness {
        manager,
        storage,
        directory,
        trials,
        policy,
        license_signing_key,
        renewal_public_key,
    }
}
