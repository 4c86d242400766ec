use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two sides of the collaboration: writers post text prompts for
/// sketchers to illustrate, sketchers post image prompts for writers to
/// write about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Writer,
    Sketcher,
}

impl Role {
    /// A viewer's feed shows prompts made by the other role. Inverting
    /// this mapping breaks the product, so it lives in exactly one place.
    pub fn opposite(self) -> Self {
        match self {
            Self::Writer => Self::Sketcher,
            Self::Sketcher => Self::Writer,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Writer => "writer",
            Self::Sketcher => "sketcher",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "writer" => Ok(Self::Writer),
            "sketcher" => Ok(Self::Sketcher),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a prompt's or submission's `content` field is interpreted: a text
/// body, or a URL/path to an image. Consumers never coerce across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

impl FromStr for ContentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub creator_role: Role,
    pub kind: ContentKind,
    pub content: String,
    pub is_active: bool,
    pub is_daily: bool,
    pub likes: i64,
    /// Denormalized count of submissions, bumped in the same transaction
    /// as each submission insert.
    pub contributions: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub prompt_id: Uuid,
    /// Anonymous submissions are allowed.
    pub user_id: Option<Uuid>,
    pub kind: ContentKind,
    pub content: String,
    pub likes: i64,
    pub comments: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub user_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// -- Insert shapes --

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// Credential placeholder; nothing in this system verifies it.
    pub password: String,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPrompt {
    pub creator_id: Uuid,
    pub creator_role: Role,
    pub kind: ContentKind,
    pub content: String,
    pub is_active: bool,
    pub is_daily: bool,
    /// Starting popularity; only seeding sets this to anything but zero.
    pub likes: i64,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub prompt_id: Uuid,
    pub user_id: Option<Uuid>,
    pub kind: ContentKind,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub submission_id: Uuid,
    pub user_id: Option<Uuid>,
    pub content: String,
}
