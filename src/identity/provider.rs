use async_trait::async_trait;
use tokio::sync::watch;

use super::errors::IdentityError;
use super::types::Principal;

/// Interface to the managed identity backend.
///
/// Every sign-in style operation both returns the resulting [`Principal`] and
/// publishes it on the auth-state stream, so callers can either await the
/// result directly or react through [`subscribe`](IdentityProvider::subscribe).
/// In-place updates (display name, email, password) re-publish the updated
/// principal.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an email/password credential. The new principal is signed in.
    async fn create_account(&self, email: &str, password: &str)
    -> Result<Principal, IdentityError>;

    /// Verify an email/password credential.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError>;

    /// Create and sign in an anonymous (guest) principal.
    async fn sign_in_anonymously(&self) -> Result<Principal, IdentityError>;

    /// Federated sign-in with a Google ID token obtained on the device.
    async fn sign_in_with_google(&self, id_token: &str) -> Result<Principal, IdentityError>;

    /// Drop the current principal. The auth-state stream yields `None`.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Update the current principal's display name in place.
    async fn update_display_name(&self, display_name: &str) -> Result<(), IdentityError>;

    /// Update the current principal's email in place.
    async fn update_email(&self, email: &str) -> Result<(), IdentityError>;

    /// Update the current principal's password in place.
    async fn update_password(&self, password: &str) -> Result<(), IdentityError>;

    /// Current signed-in principal, if any.
    fn current_principal(&self) -> Option<Principal>;

    /// Auth-state change stream. The receiver holds the current principal and
    /// is notified on every sign-in, sign-out and in-place update.
    fn subscribe(&self) -> watch::Receiver<Option<Principal>>;
}
