//! Central configuration for the auth-session crate
//!
//! Backend connection parameters are read from the process environment once,
//! at first use. The mobile shell injects them at build time; native binaries
//! and tests load them through `dotenvy` (see [`crate::init`]).

use std::sync::LazyLock;

/// API key identifying this app installation to both managed backends.
pub static AUTH_API_KEY: LazyLock<String> =
    LazyLock::new(|| std::env::var("AUTH_API_KEY").expect("AUTH_API_KEY must be set"));

/// Project identifier shared by the identity and document-store backends.
pub static AUTH_PROJECT_ID: LazyLock<String> =
    LazyLock::new(|| std::env::var("AUTH_PROJECT_ID").expect("AUTH_PROJECT_ID must be set"));

/// Domain that hosts the federated sign-in redirect handler.
///
/// Defaults to the hosted handler for the configured project.
pub static AUTH_DOMAIN: LazyLock<String> = LazyLock::new(|| {
    std::env::var("AUTH_DOMAIN").unwrap_or_else(|_| format!("{}.auth.app", *AUTH_PROJECT_ID))
});

/// Bucket name for user-content uploads. Optional; only the mobile shell
/// consumes it.
pub static AUTH_STORAGE_BUCKET: LazyLock<Option<String>> =
    LazyLock::new(|| std::env::var("AUTH_STORAGE_BUCKET").ok());

/// Push-notification sender id. Optional; only the mobile shell consumes it.
pub static AUTH_MESSAGING_SENDER_ID: LazyLock<Option<String>> =
    LazyLock::new(|| std::env::var("AUTH_MESSAGING_SENDER_ID").ok());

/// Registered application id. Optional; only the mobile shell consumes it.
pub static AUTH_APP_ID: LazyLock<Option<String>> =
    LazyLock::new(|| std::env::var("AUTH_APP_ID").ok());

/// Analytics measurement id. Optional; only the mobile shell consumes it.
pub static AUTH_MEASUREMENT_ID: LazyLock<Option<String>> =
    LazyLock::new(|| std::env::var("AUTH_MEASUREMENT_ID").ok());

/// Base URL of the identity backend's REST API.
pub static IDENTITY_API_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("IDENTITY_API_URL")
        .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com/v1".to_string())
});

/// Base URL of the document-store backend's REST API.
pub static DOCSTORE_API_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("DOCSTORE_API_URL").expect("DOCSTORE_API_URL must be set")
});
