//! Profile record model and document-store abstraction
//!
//! The per-user document persisted by the managed document store: profile
//! info, preferences, and practice progress. The store itself is consumed
//! through the [`ProfileStore`] seam; records are keyed by the identity
//! backend's uid under the fixed `users` collection.

mod errors;
mod memory;
mod rest;
mod store;
mod types;

pub use errors::ProfileError;
pub use memory::MemoryProfileStore;
pub use rest::RestProfileStore;
pub use store::{ProfileStore, USERS_COLLECTION};
pub use types::{
    AccountOrigin, AchievementProgress, AppearancePreferences, AudioPreferences,
    ChallengeProgress, DarkMode, LevelProgress, LevelsProgress, NotificationPreferences,
    PracticePreferences, Preferences, ProfileInfo, ProfileRecord, Progress,
};
