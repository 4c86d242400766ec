use axum::{
    Json,
    extract::{Path, State},
};

use sketchwrite_types::api::{LikeRequest, LikeResponse};

use crate::error::{or_not_found, parse_id, run_blocking};
use crate::{ApiError, AppState};

/// POST /submissions/{id}/like — sets the like state for (user,
/// submission) to `liked`. Repeating the same request is a no-op; the
/// store's unique pair constraint is what keeps the counter honest.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<LikeRequest>,
) -> Result<Json<LikeResponse>, ApiError> {
    let submission_id = parse_id(&id, "Submission")?;
    let user_id = req
        .user_id
        .ok_or_else(|| ApiError::field("userId", "userId is required"))?;

    let store = state.store.clone();
    let likes = run_blocking(move || {
        store
            .get_submission(submission_id)
            .map_err(|e| or_not_found(e, "Submission"))?;
        store
            .get_user(user_id)?
            .ok_or_else(|| ApiError::not_found("User"))?;

        if req.liked {
            store.create_like(user_id, submission_id)?;
        } else {
            store.delete_like(user_id, submission_id)?;
        }

        let submission = store.get_submission(submission_id)?;
        Ok(submission.likes)
    })
    .await?;

    Ok(Json(LikeResponse {
        success: true,
        likes,
    }))
}
