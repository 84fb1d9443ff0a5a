//! `post.*` payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Snapshot carried by `post.created` and `post.published`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPayload {
    #[serde(default)]
    pub post_type: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub author: PostAuthor,

    #[serde(default)]
    pub text_content: Option<String>,

    /// Attached media, kept opaque and stored as a JSON blob.
    #[serde(default, deserialize_with = "null_as_default")]
    pub media: Vec<serde_json::Value>,

    #[serde(default)]
    pub link_preview: Option<LinkPreview>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub stats: PostStats,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostAuthor {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    /// `user` or `supplier`.
    #[serde(default)]
    pub author_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkPreview {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostStats {
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub share_count: i64,
    #[serde(default)]
    pub save_count: i64,
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub last_comment_at: Option<DateTime<Utc>>,
}
