use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Principal;
use crate::profile::ProfileRecord;

/// The merged view of principal and profile record exposed to consumers.
///
/// Replaced wholesale on every auth-state notification; cleared on sign-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// Mirrors the identity backend's anonymous designation, never set
    /// independently
    pub is_guest: bool,
    pub is_premium: bool,
    pub premium_expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Merge a principal with its profile record (when readable).
    ///
    /// The display name falls back to the stored value; premium fields
    /// default to not-premium when the record is absent.
    pub(crate) fn compose(principal: &Principal, record: Option<&ProfileRecord>) -> Self {
        Self {
            uid: principal.uid.clone(),
            email: principal.email.clone(),
            display_name: principal
                .display_name
                .clone()
                .or_else(|| record.and_then(|r| r.profile.display_name.clone())),
            is_guest: principal.is_anonymous,
            is_premium: record.map(|r| r.profile.is_premium).unwrap_or(false),
            premium_expires_at: record.and_then(|r| r.profile.premium_expires_at),
        }
    }

    /// Whether the premium flag is set with an expiry strictly in the future.
    pub fn has_active_premium(&self, now: DateTime<Utc>) -> bool {
        self.is_premium
            && self
                .premium_expires_at
                .is_some_and(|expires_at| expires_at > now)
    }
}

/// Snapshot published to consumers on every state change
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub session: Option<Session>,
    /// True while an operation or the initial auth-state fetch is in flight
    pub loading: bool,
    /// Message of the most recent failure, cleared when an operation starts
    pub error: Option<String>,
}

impl SessionState {
    pub(crate) fn initial() -> Self {
        Self {
            session: None,
            loading: true,
            error: None,
        }
    }
}

/// Requested in-place changes to the current principal's profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
}
