use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use sketchwrite_types::api::{PromptResponse, SubmissionResponse};
use sketchwrite_types::models::Role;

use crate::error::{or_not_found, parse_id, run_blocking};
use crate::{ApiError, AppState, shape};

const DEFAULT_POPULAR_LIMIT: u32 = 6;

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerQuery {
    // Kept as a raw string so a malformed value surfaces as our own
    // validation body instead of an extractor rejection.
    pub user_id: Option<String>,
}

impl ViewerQuery {
    fn viewer(&self) -> Result<Option<Uuid>, ApiError> {
        match self.user_id.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ApiError::field("userId", "userId must be a UUID")),
        }
    }
}

/// GET /prompts?role= — the opposite-role feed: writers get prompts made
/// by sketchers and vice versa. The client treats the first entry as
/// today's featured prompt.
pub async fn list_prompts(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<Vec<PromptResponse>>, ApiError> {
    let role: Role = query
        .role
        .as_deref()
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| ApiError::field("role", "Role parameter must be 'writer' or 'sketcher'"))?;

    let store = state.store.clone();
    let prompts = run_blocking(move || {
        let now = Utc::now();
        let prompts = store.list_prompts_for_role(role)?;
        prompts
            .iter()
            .map(|p| shape::prompt_response(store.as_ref(), p, now))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApiError::from)
    })
    .await?;

    debug!("Retrieved {} prompts for role {role}", prompts.len());
    Ok(Json(prompts))
}

/// GET /prompts/popular — top prompts by like count.
pub async fn popular_prompts(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<PromptResponse>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_POPULAR_LIMIT).clamp(1, 50);

    let store = state.store.clone();
    let prompts = run_blocking(move || {
        let now = Utc::now();
        let prompts = store.list_popular_prompts(limit)?;
        prompts
            .iter()
            .map(|p| shape::prompt_response(store.as_ref(), p, now))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(prompts))
}

/// GET /prompts/daily
pub async fn daily_prompts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PromptResponse>>, ApiError> {
    let store = state.store.clone();
    let prompts = run_blocking(move || {
        let now = Utc::now();
        let prompts = store.list_daily_prompts()?;
        prompts
            .iter()
            .map(|p| shape::prompt_response(store.as_ref(), p, now))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(prompts))
}

/// GET /prompts/{id}
pub async fn get_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PromptResponse>, ApiError> {
    let id = parse_id(&id, "Prompt")?;

    let store = state.store.clone();
    let prompt = run_blocking(move || {
        let prompt = store.get_prompt(id).map_err(|e| or_not_found(e, "Prompt"))?;
        shape::prompt_response(store.as_ref(), &prompt, Utc::now()).map_err(ApiError::from)
    })
    .await?;

    Ok(Json(prompt))
}

/// GET /prompts/{id}/submissions — newest first, `[]` when the prompt has
/// none. The optional `userId` query lets the client learn which entries
/// the viewer already liked.
pub async fn list_prompt_submissions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(viewer): Query<ViewerQuery>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let prompt_id = parse_id(&id, "Prompt")?;
    let viewer_id = viewer.viewer()?;

    let store = state.store.clone();
    let submissions = run_blocking(move || {
        // Distinguish "no such prompt" (404) from "no submissions" ([]).
        store
            .get_prompt(prompt_id)
            .map_err(|e| or_not_found(e, "Prompt"))?;

        let now = Utc::now();
        let submissions = store.list_submissions_for_prompt(prompt_id)?;
        submissions
            .iter()
            .map(|s| shape::submission_response(store.as_ref(), s, viewer_id, now))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApiError::from)
    })
    .await?;

    debug!(
        "Retrieved {} submissions for prompt {prompt_id}",
        submissions.len()
    );
    Ok(Json(submissions))
}
