use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use sketchwrite_types::api::{CreateSubmissionRequest, SubmissionResponse};
use sketchwrite_types::models::{ContentKind, NewSubmission};

use crate::error::{or_not_found, run_blocking};
use crate::{ApiError, AppState, shape};

/// POST /submissions — a response to a prompt. Text content comes in the
/// body; image content is a path previously returned by the upload
/// endpoint.
pub async fn create_submission(
    State(state): State<AppState>,
    Json(req): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    let kind: ContentKind = req
        .kind
        .parse()
        .map_err(|()| ApiError::field("type", "type must be 'text' or 'image'"))?;
    if req.content.trim().is_empty() {
        return Err(ApiError::field("content", "content is required"));
    }

    let store = state.store.clone();
    let submission = run_blocking(move || {
        store
            .get_prompt(req.prompt_id)
            .map_err(|e| or_not_found(e, "Prompt"))?;
        if let Some(user_id) = req.user_id {
            store
                .get_user(user_id)?
                .ok_or_else(|| ApiError::not_found("User"))?;
        }

        let submission = store.create_submission(NewSubmission {
            prompt_id: req.prompt_id,
            user_id: req.user_id,
            kind,
            content: req.content,
        })?;
        shape::submission_response(store.as_ref(), &submission, req.user_id, Utc::now())
            .map_err(ApiError::from)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(submission)))
}
