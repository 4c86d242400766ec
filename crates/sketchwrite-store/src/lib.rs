pub mod memory;
pub mod migrations;
pub mod seed;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;
use uuid::Uuid;

use sketchwrite_types::models::{
    Comment, NewComment, NewPrompt, NewSubmission, NewUser, Prompt, Role, Submission, User,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced row does not exist.
    #[error("not found")]
    NotFound,
    /// A uniqueness constraint was violated (duplicate username, duplicate
    /// like pair). Like toggling never surfaces this; it no-ops instead.
    #[error("conflict")]
    Conflict,
    /// Anything the underlying store did that we cannot interpret. Mapped
    /// to a generic 500 at the API boundary, with the cause logged there.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::QueryReturnedNoRows => Self::NotFound,
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Conflict
            }
            _ => Self::Storage(anyhow::Error::from(err)),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Narrow repository interface mediating all reads and writes. One handle
/// is constructed at startup and injected into the API layer; there is no
/// module-level singleton.
///
/// All methods are synchronous; async callers run them through
/// `tokio::task::spawn_blocking`. Counter maintenance (prompt
/// contributions, submission likes/comments) is co-transactional with the
/// mutation that triggers it — implementations must not read-modify-write
/// counters from the application side.
pub trait Store: Send + Sync {
    // -- Users --

    fn create_user(&self, new: NewUser) -> StoreResult<User>;
    fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    fn count_users(&self) -> StoreResult<u64>;

    // -- Prompts --

    fn create_prompt(&self, new: NewPrompt) -> StoreResult<Prompt>;
    fn get_prompt(&self, id: Uuid) -> StoreResult<Prompt>;

    /// Prompts for a viewer of role `viewer`: authored by the *opposite*
    /// role, daily-flagged first, then newest first. The first element is
    /// what the client shows as today's featured prompt.
    fn list_prompts_for_role(&self, viewer: Role) -> StoreResult<Vec<Prompt>>;

    /// Top prompts by like count, descending, truncated to `limit`.
    fn list_popular_prompts(&self, limit: u32) -> StoreResult<Vec<Prompt>>;

    fn list_daily_prompts(&self) -> StoreResult<Vec<Prompt>>;

    /// Text-kind prompts in creation order, capped at `limit`. Candidate
    /// side of collaboration synthesis.
    fn list_text_prompts(&self, limit: u32) -> StoreResult<Vec<Prompt>>;

    // -- Submissions --

    /// Persists with zeroed counters and a server-assigned timestamp, and
    /// increments the parent prompt's contributions counter in the same
    /// transaction. `NotFound` when the prompt does not exist, or when a
    /// named author does not.
    fn create_submission(&self, new: NewSubmission) -> StoreResult<Submission>;

    fn get_submission(&self, id: Uuid) -> StoreResult<Submission>;

    /// Newest first; empty for a prompt with no submissions.
    fn list_submissions_for_prompt(&self, prompt_id: Uuid) -> StoreResult<Vec<Submission>>;

    /// The newest image-kind submission to a prompt, if any. Pairing side
    /// of collaboration synthesis.
    fn newest_image_submission(&self, prompt_id: Uuid) -> StoreResult<Option<Submission>>;

    // -- Likes --

    /// Whether `user_id` currently likes `submission_id`.
    fn has_like(&self, user_id: Uuid, submission_id: Uuid) -> StoreResult<bool>;

    /// Idempotent on the unique (user, submission) pair: a duplicate
    /// insert is a no-op and never double-counts. Bumps the submission's
    /// like counter only when a row was actually inserted. `NotFound`
    /// when either side of the pair does not exist.
    fn create_like(&self, user_id: Uuid, submission_id: Uuid) -> StoreResult<()>;

    /// Idempotent; decrements the like counter (clamped at zero) only
    /// when a row was actually deleted.
    fn delete_like(&self, user_id: Uuid, submission_id: Uuid) -> StoreResult<()>;

    // -- Comments --

    /// Appends and bumps the submission's comment counter in the same
    /// transaction. `NotFound` when the submission does not exist, or
    /// when a named author does not.
    fn create_comment(&self, new: NewComment) -> StoreResult<Comment>;

    /// Oldest first.
    fn list_comments_for_submission(&self, submission_id: Uuid) -> StoreResult<Vec<Comment>>;
}
