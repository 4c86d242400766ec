use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Role;

// -- Requests --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSubmissionRequest {
    pub prompt_id: Uuid,
    pub user_id: Option<Uuid>,
    /// "text" or "image"; validated by the handler so a bad value gets a
    /// proper 400 body rather than a deserialization rejection.
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LikeRequest {
    pub liked: bool,
    /// A like belongs to a user; an anonymous actor cannot hold one.
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub content: String,
    pub user_id: Option<Uuid>,
}

// -- Responses --

/// Embedded creator identity, with an anonymous fallback for rows that
/// have no user reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

impl UserRef {
    pub fn anonymous() -> Self {
        Self {
            id: "anonymous".to_string(),
            name: "Anonymous".to_string(),
            avatar: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResponse {
    pub id: Uuid,
    pub creator: UserRef,
    pub creator_role: Role,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub is_active: bool,
    pub is_daily: bool,
    pub contributions_count: i64,
    pub likes: i64,
    pub time_ago: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub prompt_id: Uuid,
    pub creator: UserRef,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub likes: i64,
    pub comments: i64,
    pub is_liked: bool,
    pub time_ago: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub creator: UserRef,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub time_ago: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub success: bool,
    pub likes: i64,
}

/// Derived pairing of a text prompt with an image submission. Never
/// persisted; recomputed on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationResponse {
    pub id: String,
    pub prompt_id: Uuid,
    pub image: String,
    pub image_alt: String,
    pub text: String,
    pub collaborators: Vec<UserRef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Error body for every non-2xx response: `{message, status, errors?}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<std::collections::BTreeMap<String, Vec<String>>>,
}
