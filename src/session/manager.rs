use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::identity::{IdentityProvider, Principal};
use crate::profile::{AccountOrigin, ProfileRecord, ProfileStore};

use super::errors::SessionError;
use super::types::{ProfileChanges, Session, SessionState};

/// Maintains the current [`Session`] and forwards authentication operations
/// to the identity backend and the profile document store.
///
/// Construction spawns a listener on the identity provider's auth-state
/// stream: every notification re-fetches the principal's profile record and
/// replaces the session wholesale; an absent principal clears it. The
/// listener is aborted when the manager is dropped.
///
/// Mutating operations are single-flight: they serialize behind one lock so
/// overlapping calls (a sign-in racing a sign-out) cannot interleave their
/// loading/error updates. Requires a tokio runtime.
pub struct SessionManager {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    state: Arc<watch::Sender<SessionState>>,
    op_gate: Mutex<()>,
    listener: JoinHandle<()>,
}

impl SessionManager {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        let state = Arc::new(state);
        let listener = tokio::spawn(run_auth_state_listener(
            identity.subscribe(),
            Arc::clone(&profiles),
            Arc::clone(&state),
        ));
        Self {
            identity,
            profiles,
            state,
            op_gate: Mutex::new(()),
            listener,
        }
    }

    /// Subscribe to session-state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Snapshot of the current session state.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Create an email/password account, set its display name, and write the
    /// default profile record.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<(), SessionError> {
        let _guard = self.op_gate.lock().await;
        self.begin_operation();
        let result = async {
            let principal = self.identity.create_account(email, password).await?;
            self.identity.update_display_name(display_name).await?;
            let record = ProfileRecord::new_default(AccountOrigin::Standard {
                email: email.to_string(),
                display_name: display_name.to_string(),
            });
            self.profiles.put(&principal.uid, &record).await?;
            tracing::debug!("Created account and default profile record for {}", principal.uid);
            Ok(())
        }
        .await;
        self.finish_operation(result)
    }

    /// Verify an email/password credential. No document writes.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let _guard = self.op_gate.lock().await;
        self.begin_operation();
        let result = async {
            self.identity.sign_in_with_password(email, password).await?;
            Ok(())
        }
        .await;
        self.finish_operation(result)
    }

    /// Federated sign-in. Writes a default profile record only when none
    /// exists yet, so repeat sign-ins by an existing account never overwrite.
    pub async fn sign_in_with_google(&self, id_token: &str) -> Result<(), SessionError> {
        let _guard = self.op_gate.lock().await;
        self.begin_operation();
        let result = async {
            let principal = self.identity.sign_in_with_google(id_token).await?;
            if !self.profiles.exists(&principal.uid).await? {
                let record = ProfileRecord::new_default(AccountOrigin::Federated {
                    email: principal.email.clone(),
                    display_name: principal.display_name.clone(),
                });
                self.profiles.put(&principal.uid, &record).await?;
                tracing::debug!("Created default profile record for {}", principal.uid);
            }
            Ok(())
        }
        .await;
        self.finish_operation(result)
    }

    /// Anonymous sign-in. Every call creates a new identity, and each new
    /// identity gets its own minimal guest record.
    pub async fn continue_as_guest(&self) -> Result<(), SessionError> {
        let _guard = self.op_gate.lock().await;
        self.begin_operation();
        let result = async {
            let principal = self.identity.sign_in_anonymously().await?;
            let record = ProfileRecord::new_default(AccountOrigin::Guest);
            self.profiles.put(&principal.uid, &record).await?;
            tracing::debug!("Created guest profile record for {}", principal.uid);
            Ok(())
        }
        .await;
        self.finish_operation(result)
    }

    /// Give the current guest principal an email, password and display name.
    ///
    /// Fails synchronously, without contacting any backend and without
    /// touching loading/error, unless there is an active principal and the
    /// current session is a guest.
    pub async fn upgrade_guest_to_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<(), SessionError> {
        let is_guest_session = self
            .state
            .borrow()
            .session
            .as_ref()
            .is_some_and(|session| session.is_guest);
        if self.identity.current_principal().is_none() || !is_guest_session {
            return Err(SessionError::NotGuest);
        }

        let _guard = self.op_gate.lock().await;
        self.begin_operation();
        let result = async {
            self.identity.update_email(email).await?;
            self.identity.update_password(password).await?;
            self.identity.update_display_name(display_name).await?;
            // TODO: migrate the guest's profile record to the upgraded
            // account (clear isGuest, attach email/displayName) once the
            // identity backend supports linking an anonymous principal to a
            // credential instead of mutating it in place.
            Ok(())
        }
        .await;
        self.finish_operation(result)
    }

    /// Sign out of the identity backend and clear the local session.
    ///
    /// The local session is dropped even when the backend call fails.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let _guard = self.op_gate.lock().await;
        self.begin_operation();
        let result = self
            .identity
            .sign_out()
            .await
            .map_err(SessionError::from);
        self.state.send_modify(|state| state.session = None);
        self.finish_operation(result)
    }

    /// Forward profile changes to the identity backend. No-op without an
    /// active principal. Does not touch the loading flag.
    pub async fn update_profile(&self, changes: ProfileChanges) -> Result<(), SessionError> {
        if self.identity.current_principal().is_none() {
            return Ok(());
        }

        let _guard = self.op_gate.lock().await;
        if let Some(display_name) = changes.display_name.as_deref() {
            if let Err(err) = self.identity.update_display_name(display_name).await {
                let err = SessionError::from(err);
                self.state
                    .send_modify(|state| state.error = Some(err.to_string()));
                return Err(err);
            }
        }
        // TODO: merge display-name changes into the stored profile record so
        // the document and the principal stop drifting apart.
        Ok(())
    }

    /// Whether the current session is premium with an expiry strictly in the
    /// future. Pure local computation, no backend call.
    pub fn check_premium_status(&self) -> bool {
        self.state
            .borrow()
            .session
            .as_ref()
            .is_some_and(|session| session.has_active_premium(Utc::now()))
    }

    fn begin_operation(&self) {
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
    }

    /// Reset loading on both paths; record the error text on failure.
    fn finish_operation(&self, result: Result<(), SessionError>) -> Result<(), SessionError> {
        match result {
            Ok(()) => {
                self.state.send_modify(|state| state.loading = false);
                Ok(())
            }
            Err(err) => {
                self.state.send_modify(|state| {
                    state.error = Some(err.to_string());
                    state.loading = false;
                });
                Err(err)
            }
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Outcome of one auth-state notification
enum AuthStateUpdate {
    Refreshed(Session),
    FetchFailed(String),
    Cleared,
}

async fn run_auth_state_listener(
    mut principals: watch::Receiver<Option<Principal>>,
    profiles: Arc<dyn ProfileStore>,
    state: Arc<watch::Sender<SessionState>>,
) {
    loop {
        let principal = principals.borrow_and_update().clone();
        let update = resolve_auth_state(principal, profiles.as_ref()).await;
        // A notification that arrived during the fetch supersedes this one
        if !principals.has_changed().unwrap_or(false) {
            publish_auth_state(update, &state);
        }
        if principals.changed().await.is_err() {
            tracing::debug!("Identity provider dropped, stopping auth-state listener");
            break;
        }
    }
}

/// Resolve one auth-state notification into a session update by fetching the
/// principal's profile record.
async fn resolve_auth_state(
    principal: Option<Principal>,
    profiles: &dyn ProfileStore,
) -> AuthStateUpdate {
    match principal {
        Some(principal) => match profiles.get(&principal.uid).await {
            Ok(record) => AuthStateUpdate::Refreshed(Session::compose(&principal, record.as_ref())),
            Err(err) => {
                tracing::warn!("Failed to load profile record for {}: {}", principal.uid, err);
                AuthStateUpdate::FetchFailed(format!("Failed to load profile record: {err}"))
            }
        },
        None => AuthStateUpdate::Cleared,
    }
}

/// Publish a resolved update. Always clears loading; a failed fetch leaves
/// the session stale on purpose, the last good view beats none.
fn publish_auth_state(update: AuthStateUpdate, state: &watch::Sender<SessionState>) {
    state.send_modify(|state| {
        match update {
            AuthStateUpdate::Refreshed(session) => state.session = Some(session),
            AuthStateUpdate::FetchFailed(message) => state.error = Some(message),
            AuthStateUpdate::Cleared => state.session = None,
        }
        state.loading = false;
    });
}
