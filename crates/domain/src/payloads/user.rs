//! `user.*` payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;

fn default_version() -> i64 {
    1
}

/// Snapshot carried by `user.created`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact_info: UserContactInfo,

    #[serde(default, deserialize_with = "null_as_default")]
    pub profile: UserProfile,

    /// Optimistic-locking version of the source document.
    #[serde(default = "default_version")]
    pub version: i64,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserContactInfo {
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}
