//! Error types for session operations

use thiserror::Error;

use crate::identity::IdentityError;
use crate::profile::ProfileError;

/// Errors surfaced by session operations
#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// Guest upgrade invoked without an active anonymous session. Raised
    /// before any backend call and leaves loading/error untouched.
    #[error("Only guest accounts can be upgraded")]
    NotGuest,

    /// Error from the identity backend
    #[error("Identity error: {0}")]
    Identity(IdentityError),

    /// Error from the document store
    #[error("Profile error: {0}")]
    Profile(ProfileError),
}

impl SessionError {
    /// Log the error and return self, allowing method chaining where a
    /// variant is constructed in place.
    pub fn log(self) -> Self {
        match &self {
            Self::NotGuest => tracing::error!("Only guest accounts can be upgraded"),
            Self::Identity(err) => tracing::error!("Identity error: {}", err),
            Self::Profile(err) => tracing::error!("Profile error: {}", err),
        }
        self
    }
}

// Custom From implementations that automatically log errors

impl From<IdentityError> for SessionError {
    fn from(err: IdentityError) -> Self {
        let error = Self::Identity(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<ProfileError> for SessionError {
    fn from(err: ProfileError) -> Self {
        let error = Self::Profile(err);
        tracing::error!("{}", error);
        error
    }
}
