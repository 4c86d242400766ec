use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use sketchwrite_types::api::{CommentResponse, CreateCommentRequest};
use sketchwrite_types::models::NewComment;

use crate::error::{or_not_found, parse_id, run_blocking};
use crate::timefmt::time_ago;
use crate::{ApiError, AppState, shape};

/// POST /submissions/{id}/comments — append-only; retried requests add a
/// second comment by design.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let submission_id = parse_id(&id, "Submission")?;
    if req.content.trim().is_empty() {
        return Err(ApiError::field("content", "content is required"));
    }

    let store = state.store.clone();
    let comment = run_blocking(move || {
        store
            .get_submission(submission_id)
            .map_err(|e| or_not_found(e, "Submission"))?;
        if let Some(user_id) = req.user_id {
            store
                .get_user(user_id)?
                .ok_or_else(|| ApiError::not_found("User"))?;
        }

        let comment = store.create_comment(NewComment {
            submission_id,
            user_id: req.user_id,
            content: req.content,
        })?;
        let creator = shape::user_ref(store.as_ref(), comment.user_id)?;
        Ok(CommentResponse {
            id: comment.id,
            creator,
            content: comment.content,
            created_at: comment.created_at,
            time_ago: time_ago(comment.created_at, Utc::now()),
        })
    })
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /submissions/{id}/comments — oldest first.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let submission_id = parse_id(&id, "Submission")?;

    let store = state.store.clone();
    let comments = run_blocking(move || {
        store
            .get_submission(submission_id)
            .map_err(|e| or_not_found(e, "Submission"))?;

        let now = Utc::now();
        let comments = store.list_comments_for_submission(submission_id)?;
        comments
            .into_iter()
            .map(|comment| {
                let creator = shape::user_ref(store.as_ref(), comment.user_id)?;
                Ok(CommentResponse {
                    id: comment.id,
                    creator,
                    content: comment.content,
                    created_at: comment.created_at,
                    time_ago: time_ago(comment.created_at, now),
                })
            })
            .collect::<Result<Vec<_>, sketchwrite_store::StoreError>>()
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(comments))
}
