use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a new account came from. Selects the default-record variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountOrigin {
    /// Email/password sign-up with a caller-supplied display name
    Standard { email: String, display_name: String },
    /// First federated sign-in; claims come from the federated provider
    Federated {
        email: Option<String>,
        display_name: Option<String>,
    },
    /// Anonymous sign-in
    Guest,
}

/// Identity subsection of the profile record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_guest: bool,
    pub is_premium: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DarkMode {
    Auto,
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPreferences {
    pub max_volume: f64,
    /// Fade-in length in seconds
    pub fade_in_duration: u32,
    /// Fade-out length in seconds
    pub fade_out_duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub daily_reminder: bool,
    /// Local wall-clock time of the reminder, `HH:MM`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearancePreferences {
    pub dark_mode: DarkMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticePreferences {
    /// Default practice length in minutes
    pub default_duration: u32,
    pub show_timer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub audio: AudioPreferences,
    pub notifications: NotificationPreferences,
    pub appearance: AppearancePreferences,
    pub practice: PracticePreferences,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub sessions_completed: u32,
    pub minutes_completed: u32,
    pub reward_progress: f64,
    pub reward_complete: bool,
    pub unlocked: bool,
    pub average_presence_rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_track: Option<String>,
}

impl LevelProgress {
    /// The first level, open from the start and tracking completion detail
    fn first() -> Self {
        Self {
            sessions_completed: 0,
            minutes_completed: 0,
            reward_progress: 0.0,
            reward_complete: false,
            unlocked: true,
            average_presence_rating: 0.0,
            completion_rate: Some(0.0),
            favorite_track: None,
        }
    }

    fn locked() -> Self {
        Self {
            sessions_completed: 0,
            minutes_completed: 0,
            reward_progress: 0.0,
            reward_complete: false,
            unlocked: false,
            average_presence_rating: 0.0,
            completion_rate: None,
            favorite_track: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelsProgress {
    pub level1: LevelProgress,
    pub level2: LevelProgress,
    pub level3: LevelProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeProgress {
    pub total_challenges: u32,
    pub selected_sounds: Vec<String>,
    pub sound_mastery: HashMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgress {
    pub unlocked: Vec<String>,
    pub unlocked_dates: HashMap<String, DateTime<Utc>>,
    pub progress: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub total_sessions: u32,
    pub total_minutes: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub levels: LevelsProgress,
    pub challenges: ChallengeProgress,
    pub achievements: AchievementProgress,
}

/// The persisted per-user document.
///
/// Written in full exactly once, at account creation; progress and
/// preferences are updated elsewhere in the app. Serde names mirror the
/// stored document keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub profile: ProfileInfo,
    pub preferences: Preferences,
    pub progress: Progress,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl ProfileRecord {
    /// Default record for a newly created account.
    ///
    /// Guest records omit email and display name and default the daily
    /// reminder off; credentialed records default it on at 08:00.
    pub fn new_default(origin: AccountOrigin) -> Self {
        let now = Utc::now();
        let (email, display_name, is_guest) = match origin {
            AccountOrigin::Standard {
                email,
                display_name,
            } => (Some(email), Some(display_name), false),
            AccountOrigin::Federated {
                email,
                display_name,
            } => (email, display_name, false),
            AccountOrigin::Guest => (None, None, true),
        };

        Self {
            profile: ProfileInfo {
                email,
                display_name,
                created_at: now,
                is_guest,
                is_premium: false,
                premium_expires_at: None,
            },
            preferences: Preferences {
                audio: AudioPreferences {
                    max_volume: 0.65,
                    fade_in_duration: 5,
                    fade_out_duration: 5,
                },
                notifications: NotificationPreferences {
                    daily_reminder: !is_guest,
                    reminder_time: (!is_guest).then(|| "08:00".to_string()),
                },
                appearance: AppearancePreferences {
                    dark_mode: DarkMode::Auto,
                },
                practice: PracticePreferences {
                    default_duration: 10,
                    show_timer: true,
                },
            },
            progress: Progress {
                total_sessions: 0,
                total_minutes: 0,
                current_streak: 0,
                longest_streak: 0,
                levels: LevelsProgress {
                    level1: LevelProgress::first(),
                    level2: LevelProgress::locked(),
                    level3: LevelProgress::locked(),
                },
                challenges: ChallengeProgress {
                    total_challenges: 0,
                    selected_sounds: Vec::new(),
                    sound_mastery: HashMap::new(),
                },
                achievements: AchievementProgress {
                    unlocked: Vec::new(),
                    unlocked_dates: HashMap::new(),
                    progress: HashMap::new(),
                },
            },
            created_at: now,
            last_active: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_standard_default_record() {
        // Given a standard sign-up
        let record = ProfileRecord::new_default(AccountOrigin::Standard {
            email: "a@x.com".to_string(),
            display_name: "Alex".to_string(),
        });

        // Then the record carries the claims and the credentialed defaults
        assert_eq!(record.profile.email.as_deref(), Some("a@x.com"));
        assert_eq!(record.profile.display_name.as_deref(), Some("Alex"));
        assert!(!record.profile.is_guest);
        assert!(!record.profile.is_premium);
        assert!(record.preferences.notifications.daily_reminder);
        assert_eq!(
            record.preferences.notifications.reminder_time.as_deref(),
            Some("08:00")
        );
        assert_eq!(record.progress.total_sessions, 0);
        assert!(record.progress.levels.level1.unlocked);
        assert!(!record.progress.levels.level2.unlocked);
        assert!(!record.progress.levels.level3.unlocked);
    }

    #[test]
    fn test_guest_default_record() {
        let record = ProfileRecord::new_default(AccountOrigin::Guest);

        // Guest records have no identity claims and notifications off
        assert!(record.profile.email.is_none());
        assert!(record.profile.display_name.is_none());
        assert!(record.profile.is_guest);
        assert!(!record.preferences.notifications.daily_reminder);
        assert!(record.preferences.notifications.reminder_time.is_none());
    }

    #[test]
    fn test_federated_default_record_accepts_missing_claims() {
        let record = ProfileRecord::new_default(AccountOrigin::Federated {
            email: Some("g@x.com".to_string()),
            display_name: None,
        });

        assert_eq!(record.profile.email.as_deref(), Some("g@x.com"));
        assert!(record.profile.display_name.is_none());
        assert!(!record.profile.is_guest);
        assert!(record.preferences.notifications.daily_reminder);
    }

    #[test]
    fn test_record_serializes_with_document_keys() {
        // The stored document uses camelCase keys throughout
        let record = ProfileRecord::new_default(AccountOrigin::Guest);

        let value = serde_json::to_value(&record).expect("Failed to serialize record");

        assert!(value["profile"]["isGuest"].as_bool().unwrap());
        assert!(value["profile"].get("email").is_none());
        assert_eq!(value["preferences"]["audio"]["maxVolume"], 0.65);
        assert_eq!(value["preferences"]["appearance"]["darkMode"], "auto");
        assert_eq!(value["progress"]["totalSessions"], 0);
        assert_eq!(
            value["progress"]["levels"]["level1"]["completionRate"],
            0.0
        );
        assert!(
            value["progress"]["levels"]["level2"]
                .get("completionRate")
                .is_none()
        );
        assert!(value.get("createdAt").is_some());
        assert!(value.get("lastActive").is_some());
    }

    #[test]
    fn test_record_roundtrip() {
        let record = ProfileRecord::new_default(AccountOrigin::Standard {
            email: "a@x.com".to_string(),
            display_name: "Alex".to_string(),
        });

        let serialized = serde_json::to_string(&record).expect("Failed to serialize");
        let deserialized: ProfileRecord =
            serde_json::from_str(&serialized).expect("Failed to deserialize");

        assert_eq!(record, deserialized);
    }

    proptest! {
        /// Whatever the origin claims, a fresh record never starts premium
        /// and always starts with zeroed progress
        #[test]
        fn test_new_default_never_premium(
            email in "[a-z]{1,16}@[a-z]{1,16}\\.[a-z]{2,4}",
            display_name in "[A-Za-z ]{1,32}"
        ) {
            let record = ProfileRecord::new_default(AccountOrigin::Standard {
                email,
                display_name,
            });

            prop_assert!(!record.profile.is_premium);
            prop_assert!(record.profile.premium_expires_at.is_none());
            prop_assert_eq!(record.progress.total_sessions, 0);
            prop_assert_eq!(record.progress.total_minutes, 0);
            prop_assert_eq!(record.progress.current_streak, 0);
        }
    }
}
