use serde::{Deserialize, Serialize};

/// Authenticated identity descriptor yielded by the identity backend.
///
/// A principal carries only the claims the backend owns; everything else
/// about a user lives in their profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque backend-assigned identifier, the key for the profile record
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// Whether the principal was created without credentials (guest mode)
    pub is_anonymous: bool,
}

impl Principal {
    /// Create a principal for a credentialed account
    pub fn new(uid: String, email: Option<String>, display_name: Option<String>) -> Self {
        Self {
            uid,
            email,
            display_name,
            is_anonymous: false,
        }
    }

    /// Create an anonymous (guest) principal
    pub fn anonymous(uid: String) -> Self {
        Self {
            uid,
            email: None,
            display_name: None,
            is_anonymous: true,
        }
    }
}
