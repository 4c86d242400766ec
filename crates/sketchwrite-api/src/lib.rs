pub mod collaborations;
pub mod comments;
pub mod error;
pub mod likes;
pub mod prompts;
mod shape;
pub mod submissions;
pub mod timefmt;
pub mod uploads;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use sketchwrite_store::Store;

pub use error::ApiError;

/// Shared state for all handlers. The store handle is constructed once at
/// startup and injected here; handlers never reach for global state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub upload_dir: PathBuf,
}

/// The full API surface. The server nests this under `/api`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/prompts", get(prompts::list_prompts))
        .route("/prompts/popular", get(prompts::popular_prompts))
        .route("/prompts/daily", get(prompts::daily_prompts))
        .route("/prompts/{id}", get(prompts::get_prompt))
        .route("/prompts/{id}/submissions", get(prompts::list_prompt_submissions))
        .route("/collaborations", get(collaborations::list_collaborations))
        .route("/submissions", post(submissions::create_submission))
        .route("/submissions/{id}/like", post(likes::toggle_like))
        .route(
            "/submissions/{id}/comments",
            post(comments::create_comment).get(comments::list_comments),
        )
        .route("/upload/image", post(uploads::upload_image))
        // Image uploads cap at 5 MB; leave headroom for multipart framing.
        .layer(DefaultBodyLimit::max(uploads::MAX_IMAGE_BYTES + 64 * 1024))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
