use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum IdentityError {
    /// Credential verification failed (wrong password, unknown or disabled
    /// account). The backend reports all of these identically.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Account state conflict, e.g. signing up an email that is already
    /// registered.
    #[error("Account error: {0}")]
    Account(String),

    /// An operation that needs a signed-in principal was called without one.
    #[error("No signed-in principal")]
    NotSignedIn,

    /// Transport or unexpected backend failure.
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serde error: {0}")]
    Serde(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<IdentityError>();
    }

    #[test]
    fn test_error_display() {
        let err = IdentityError::Authentication("invalid email or password".to_string());
        assert_eq!(
            err.to_string(),
            "Authentication failed: invalid email or password"
        );

        let err = IdentityError::Account("email already registered".to_string());
        assert_eq!(err.to_string(), "Account error: email already registered");

        let err = IdentityError::NotSignedIn;
        assert_eq!(err.to_string(), "No signed-in principal");

        let err = IdentityError::Backend("503".to_string());
        assert_eq!(err.to_string(), "Backend error: 503");
    }
}
