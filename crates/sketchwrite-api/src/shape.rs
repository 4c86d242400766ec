//! Response shaping: domain rows plus their creator lookups, folded into
//! the wire DTOs.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sketchwrite_store::{Store, StoreResult};
use sketchwrite_types::api::{PromptResponse, SubmissionResponse, UserRef};
use sketchwrite_types::models::{Prompt, Submission};

use crate::timefmt::time_ago;

pub(crate) fn user_ref(store: &dyn Store, user_id: Option<Uuid>) -> StoreResult<UserRef> {
    let Some(id) = user_id else {
        return Ok(UserRef::anonymous());
    };
    Ok(match store.get_user(id)? {
        Some(user) => UserRef {
            id: user.id.to_string(),
            name: user.name,
            avatar: user.avatar.unwrap_or_default(),
        },
        // Dangling reference reads as anonymous rather than failing the
        // whole listing.
        None => UserRef::anonymous(),
    })
}

pub(crate) fn prompt_response(
    store: &dyn Store,
    prompt: &Prompt,
    now: DateTime<Utc>,
) -> StoreResult<PromptResponse> {
    Ok(PromptResponse {
        id: prompt.id,
        creator: user_ref(store, Some(prompt.creator_id))?,
        creator_role: prompt.creator_role,
        kind: prompt.kind.as_str().to_string(),
        content: prompt.content.clone(),
        is_active: prompt.is_active,
        is_daily: prompt.is_daily,
        contributions_count: prompt.contributions,
        likes: prompt.likes,
        time_ago: time_ago(prompt.created_at, now),
    })
}

pub(crate) fn submission_response(
    store: &dyn Store,
    submission: &Submission,
    viewer: Option<Uuid>,
    now: DateTime<Utc>,
) -> StoreResult<SubmissionResponse> {
    let is_liked = match viewer {
        Some(viewer) => store.has_like(viewer, submission.id)?,
        // An anonymous viewer never has a like.
        None => false,
    };
    Ok(SubmissionResponse {
        id: submission.id,
        prompt_id: submission.prompt_id,
        creator: user_ref(store, submission.user_id)?,
        kind: submission.kind.as_str().to_string(),
        content: submission.content.clone(),
        likes: submission.likes,
        comments: submission.comments,
        is_liked,
        time_ago: time_ago(submission.created_at, now),
    })
}
