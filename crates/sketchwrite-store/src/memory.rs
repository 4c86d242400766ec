use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::anyhow;
use chrono::Utc;
use uuid::Uuid;

use sketchwrite_types::models::{
    Comment, ContentKind, NewComment, NewPrompt, NewSubmission, NewUser, Prompt, Role, Submission,
    User,
};

use crate::{Store, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    prompts: HashMap<Uuid, Prompt>,
    submissions: HashMap<Uuid, Submission>,
    comments: HashMap<Uuid, Comment>,
    /// Keyed by the unique (user, submission) pair; existence is the only
    /// state a like carries.
    likes: HashMap<(Uuid, Uuid), Uuid>,
}

/// Map-backed store with the same semantics as [`crate::SqliteStore`].
/// Used by tests and as a throwaway dev backend; state lives and dies
/// with the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Inner) -> StoreResult<T>,
    {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| StoreError::Storage(anyhow!("store lock poisoned: {e}")))?;
        f(&mut inner)
    }
}

impl Store for MemoryStore {
    // -- Users --

    fn create_user(&self, new: NewUser) -> StoreResult<User> {
        self.with_inner(|inner| {
            if inner.users.values().any(|u| u.username == new.username) {
                return Err(StoreError::Conflict);
            }
            let user = User {
                id: Uuid::new_v4(),
                username: new.username,
                name: new.name,
                avatar: new.avatar,
                created_at: Utc::now(),
            };
            inner.users.insert(user.id, user.clone());
            Ok(user)
        })
    }

    fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.with_inner(|inner| Ok(inner.users.get(&id).cloned()))
    }

    fn count_users(&self) -> StoreResult<u64> {
        self.with_inner(|inner| Ok(inner.users.len() as u64))
    }

    // -- Prompts --

    fn create_prompt(&self, new: NewPrompt) -> StoreResult<Prompt> {
        self.with_inner(|inner| {
            let prompt = Prompt {
                id: Uuid::new_v4(),
                creator_id: new.creator_id,
                creator_role: new.creator_role,
                kind: new.kind,
                content: new.content,
                is_active: new.is_active,
                is_daily: new.is_daily,
                likes: new.likes,
                contributions: 0,
                created_at: Utc::now(),
            };
            inner.prompts.insert(prompt.id, prompt.clone());
            Ok(prompt)
        })
    }

    fn get_prompt(&self, id: Uuid) -> StoreResult<Prompt> {
        self.with_inner(|inner| inner.prompts.get(&id).cloned().ok_or(StoreError::NotFound))
    }

    fn list_prompts_for_role(&self, viewer: Role) -> StoreResult<Vec<Prompt>> {
        self.with_inner(|inner| {
            let mut prompts: Vec<Prompt> = inner
                .prompts
                .values()
                .filter(|p| p.creator_role == viewer.opposite())
                .cloned()
                .collect();
            // Daily prompts first, then newest first.
            prompts.sort_by(|a, b| {
                b.is_daily
                    .cmp(&a.is_daily)
                    .then(b.created_at.cmp(&a.created_at))
            });
            Ok(prompts)
        })
    }

    fn list_popular_prompts(&self, limit: u32) -> StoreResult<Vec<Prompt>> {
        self.with_inner(|inner| {
            let mut prompts: Vec<Prompt> = inner.prompts.values().cloned().collect();
            prompts.sort_by(|a, b| b.likes.cmp(&a.likes));
            prompts.truncate(limit as usize);
            Ok(prompts)
        })
    }

    fn list_daily_prompts(&self) -> StoreResult<Vec<Prompt>> {
        self.with_inner(|inner| {
            let mut prompts: Vec<Prompt> = inner
                .prompts
                .values()
                .filter(|p| p.is_daily)
                .cloned()
                .collect();
            prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(prompts)
        })
    }

    fn list_text_prompts(&self, limit: u32) -> StoreResult<Vec<Prompt>> {
        self.with_inner(|inner| {
            let mut prompts: Vec<Prompt> = inner
                .prompts
                .values()
                .filter(|p| p.kind == ContentKind::Text)
                .cloned()
                .collect();
            prompts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            prompts.truncate(limit as usize);
            Ok(prompts)
        })
    }

    // -- Submissions --

    fn create_submission(&self, new: NewSubmission) -> StoreResult<Submission> {
        self.with_inner(|inner| {
            if let Some(user_id) = new.user_id {
                if !inner.users.contains_key(&user_id) {
                    return Err(StoreError::NotFound);
                }
            }
            let prompt = inner
                .prompts
                .get_mut(&new.prompt_id)
                .ok_or(StoreError::NotFound)?;
            prompt.contributions += 1;

            let submission = Submission {
                id: Uuid::new_v4(),
                prompt_id: new.prompt_id,
                user_id: new.user_id,
                kind: new.kind,
                content: new.content,
                likes: 0,
                comments: 0,
                created_at: Utc::now(),
            };
            inner.submissions.insert(submission.id, submission.clone());
            Ok(submission)
        })
    }

    fn get_submission(&self, id: Uuid) -> StoreResult<Submission> {
        self.with_inner(|inner| {
            inner
                .submissions
                .get(&id)
                .cloned()
                .ok_or(StoreError::NotFound)
        })
    }

    fn list_submissions_for_prompt(&self, prompt_id: Uuid) -> StoreResult<Vec<Submission>> {
        self.with_inner(|inner| {
            let mut subs: Vec<Submission> = inner
                .submissions
                .values()
                .filter(|s| s.prompt_id == prompt_id)
                .cloned()
                .collect();
            subs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(subs)
        })
    }

    fn newest_image_submission(&self, prompt_id: Uuid) -> StoreResult<Option<Submission>> {
        self.with_inner(|inner| {
            Ok(inner
                .submissions
                .values()
                .filter(|s| s.prompt_id == prompt_id && s.kind == ContentKind::Image)
                .max_by_key(|s| s.created_at)
                .cloned())
        })
    }

    // -- Likes --

    fn has_like(&self, user_id: Uuid, submission_id: Uuid) -> StoreResult<bool> {
        self.with_inner(|inner| Ok(inner.likes.contains_key(&(user_id, submission_id))))
    }

    fn create_like(&self, user_id: Uuid, submission_id: Uuid) -> StoreResult<()> {
        self.with_inner(|inner| {
            // A like must name a real user, same as the foreign key in the
            // SQLite schema.
            if !inner.users.contains_key(&user_id) {
                return Err(StoreError::NotFound);
            }
            if inner.likes.contains_key(&(user_id, submission_id)) {
                // Duplicate like is a no-op; the counter stays put.
                return Ok(());
            }
            let submission = inner
                .submissions
                .get_mut(&submission_id)
                .ok_or(StoreError::NotFound)?;
            submission.likes += 1;
            inner
                .likes
                .insert((user_id, submission_id), Uuid::new_v4());
            Ok(())
        })
    }

    fn delete_like(&self, user_id: Uuid, submission_id: Uuid) -> StoreResult<()> {
        self.with_inner(|inner| {
            if inner.likes.remove(&(user_id, submission_id)).is_none() {
                return Ok(());
            }
            if let Some(submission) = inner.submissions.get_mut(&submission_id) {
                submission.likes = (submission.likes - 1).max(0);
            }
            Ok(())
        })
    }

    // -- Comments --

    fn create_comment(&self, new: NewComment) -> StoreResult<Comment> {
        self.with_inner(|inner| {
            if let Some(user_id) = new.user_id {
                if !inner.users.contains_key(&user_id) {
                    return Err(StoreError::NotFound);
                }
            }
            let submission = inner
                .submissions
                .get_mut(&new.submission_id)
                .ok_or(StoreError::NotFound)?;
            submission.comments += 1;

            let comment = Comment {
                id: Uuid::new_v4(),
                submission_id: new.submission_id,
                user_id: new.user_id,
                content: new.content,
                created_at: Utc::now(),
            };
            inner.comments.insert(comment.id, comment.clone());
            Ok(comment)
        })
    }

    fn list_comments_for_submission(&self, submission_id: Uuid) -> StoreResult<Vec<Comment>> {
        self.with_inner(|inner| {
            let mut comments: Vec<Comment> = inner
                .comments
                .values()
                .filter(|c| c.submission_id == submission_id)
                .cloned()
                .collect();
            comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            Ok(comments)
        })
    }
}
