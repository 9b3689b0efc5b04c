//! auth-session - Reactive authentication session management
//!
//! This crate wraps a managed identity backend (email-password, anonymous
//! guest, federated Google sign-in) and its companion document store into a
//! single reactive session value for a mobile application.
//!
//! [`SessionManager`] listens to the identity provider's auth-state stream,
//! merges each principal with its stored profile record, and publishes the
//! result on a watch channel together with a loading flag and an error slot.
//! Both backends are injected through seams ([`IdentityProvider`],
//! [`ProfileStore`]) with REST and in-memory implementations provided.
//!
//! ```no_run
//! use std::sync::Arc;
//! use auth_session::{RestIdentityProvider, RestProfileStore, SessionManager};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! auth_session::init();
//! let manager = SessionManager::new(
//!     Arc::new(RestIdentityProvider::from_env()),
//!     Arc::new(RestProfileStore::from_env()),
//! );
//!
//! let mut session_changes = manager.subscribe();
//! manager.sign_in("user@example.com", "password").await?;
//! session_changes.wait_for(|state| state.session.is_some()).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod identity;
mod profile;
mod session;
mod utils;

pub use identity::{
    IdentityError, IdentityProvider, MemoryIdentityProvider, Principal, RestIdentityProvider,
};

pub use profile::{
    AccountOrigin, AchievementProgress, AppearancePreferences, AudioPreferences,
    ChallengeProgress, DarkMode, LevelProgress, LevelsProgress, MemoryProfileStore,
    NotificationPreferences, PracticePreferences, Preferences, ProfileError, ProfileInfo,
    ProfileRecord, ProfileStore, Progress, RestProfileStore, USERS_COLLECTION,
};

pub use session::{ProfileChanges, Session, SessionError, SessionManager, SessionState};

// Re-export the backend connection parameters
pub use config::{
    AUTH_API_KEY, AUTH_APP_ID, AUTH_DOMAIN, AUTH_MEASUREMENT_ID, AUTH_MESSAGING_SENDER_ID,
    AUTH_PROJECT_ID, AUTH_STORAGE_BUCKET, DOCSTORE_API_URL, IDENTITY_API_URL,
};

/// Load backend connection parameters from the process environment.
///
/// Reads `.env` through dotenvy first so native binaries and tests mirror the
/// mobile shell's build-time configuration, then forces the required
/// parameters so misconfiguration fails at startup rather than on first use.
///
/// # Panics
///
/// Panics when a required parameter (`AUTH_API_KEY`, `AUTH_PROJECT_ID`,
/// `DOCSTORE_API_URL`) is missing.
pub fn init() {
    dotenvy::dotenv().ok();
    std::sync::LazyLock::force(&config::AUTH_API_KEY);
    std::sync::LazyLock::force(&config::AUTH_PROJECT_ID);
    std::sync::LazyLock::force(&config::DOCSTORE_API_URL);
}
