//! Shared fixtures for the session flow tests

use std::sync::Arc;
use std::sync::Once;

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Notify, watch};

use auth_session::{
    IdentityError, IdentityProvider, MemoryIdentityProvider, MemoryProfileStore, Principal,
    ProfileError, ProfileRecord, ProfileStore, SessionManager,
};

/// Opt-in test logging, enabled once per process via RUST_LOG
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A manager on fresh in-memory backends, plus handles to both backends
pub fn new_manager() -> (
    SessionManager,
    Arc<MemoryIdentityProvider>,
    Arc<MemoryProfileStore>,
) {
    init_tracing();
    let identity = Arc::new(MemoryIdentityProvider::new());
    let profiles = Arc::new(MemoryProfileStore::new());
    let manager = SessionManager::new(
        Arc::clone(&identity) as Arc<dyn IdentityProvider>,
        Arc::clone(&profiles) as Arc<dyn ProfileStore>,
    );
    (manager, identity, profiles)
}

/// Identity provider whose sign-in operations block until released, so tests
/// can observe the in-flight loading state deterministically.
pub struct GatedIdentityProvider {
    inner: MemoryIdentityProvider,
    gate: Arc<Notify>,
}

impl GatedIdentityProvider {
    pub fn new() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                inner: MemoryIdentityProvider::new(),
                gate: Arc::clone(&gate),
            },
            gate,
        )
    }

    pub fn inner(&self) -> &MemoryIdentityProvider {
        &self.inner
    }
}

#[async_trait]
impl IdentityProvider for GatedIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError> {
        self.inner.create_account(email, password).await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError> {
        self.gate.notified().await;
        self.inner.sign_in_with_password(email, password).await
    }

    async fn sign_in_anonymously(&self) -> Result<Principal, IdentityError> {
        self.gate.notified().await;
        self.inner.sign_in_anonymously().await
    }

    async fn sign_in_with_google(&self, id_token: &str) -> Result<Principal, IdentityError> {
        self.gate.notified().await;
        self.inner.sign_in_with_google(id_token).await
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.inner.sign_out().await
    }

    async fn update_display_name(&self, display_name: &str) -> Result<(), IdentityError> {
        self.inner.update_display_name(display_name).await
    }

    async fn update_email(&self, email: &str) -> Result<(), IdentityError> {
        self.inner.update_email(email).await
    }

    async fn update_password(&self, password: &str) -> Result<(), IdentityError> {
        self.inner.update_password(password).await
    }

    fn current_principal(&self) -> Option<Principal> {
        self.inner.current_principal()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.inner.subscribe()
    }
}

/// Profile store whose reads can be failed on demand, for exercising the
/// stale-session path of the auth-state listener.
pub struct FlakyProfileStore {
    inner: MemoryProfileStore,
    fail_reads: AtomicBool,
}

impl FlakyProfileStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryProfileStore::new(),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProfileStore for FlakyProfileStore {
    async fn get(&self, uid: &str) -> Result<Option<ProfileRecord>, ProfileError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ProfileError::Storage("document store unreachable".to_string()));
        }
        self.inner.get(uid).await
    }

    async fn put(&self, uid: &str, record: &ProfileRecord) -> Result<(), ProfileError> {
        self.inner.put(uid, record).await
    }

    async fn exists(&self, uid: &str) -> Result<bool, ProfileError> {
        self.inner.exists(uid).await
    }
}
