use std::path::Path;
use std::sync::Mutex;

use anyhow::anyhow;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Row, params};
use tracing::info;
use uuid::Uuid;

use sketchwrite_types::models::{
    Comment, ContentKind, NewComment, NewPrompt, NewSubmission, NewUser, Prompt, Role, Submission,
    User,
};

use crate::{Store, StoreError, StoreResult, migrations};

const PROMPT_COLS: &str =
    "id, creator_id, creator_role, kind, content, is_active, is_daily, likes, contributions, created_at";
const SUBMISSION_COLS: &str =
    "id, prompt_id, user_id, kind, content, likes, comments, created_at";

/// SQLite-backed store. One connection behind a mutex; callers on the
/// async runtime go through `spawn_blocking`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(StoreError::from)?;
        Self::init(conn).inspect(|_| info!("Database opened at {}", path.display()))
    }

    /// Private in-memory database, used by tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(StoreError::from)?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(StoreError::from)?;

        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Storage(anyhow!("store lock poisoned: {e}")))?;
        f(&mut conn)
    }
}

impl Store for SqliteStore {
    // -- Users --

    fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password, name, avatar, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.to_string(),
                    new.username,
                    new.password,
                    new.name,
                    new.avatar,
                    ts(now)
                ],
            )?;
            Ok(User {
                id,
                username: new.username,
                name: new.name,
                avatar: new.avatar,
                created_at: now,
            })
        })
    }

    fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, name, avatar, created_at FROM users WHERE id = ?1",
            )?;
            let row = stmt
                .query_row([id.to_string()], user_from_row)
                .optional()?;
            Ok(row)
        })
    }

    fn count_users(&self) -> StoreResult<u64> {
        self.with_conn(|conn| {
            let n: u64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(n)
        })
    }

    // -- Prompts --

    fn create_prompt(&self, new: NewPrompt) -> StoreResult<Prompt> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO prompts
                   (id, creator_id, creator_role, kind, content, is_active, is_daily, likes, contributions, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9)",
                params![
                    id.to_string(),
                    new.creator_id.to_string(),
                    new.creator_role.as_str(),
                    new.kind.as_str(),
                    new.content,
                    new.is_active,
                    new.is_daily,
                    new.likes,
                    ts(now)
                ],
            )?;
            Ok(Prompt {
                id,
                creator_id: new.creator_id,
                creator_role: new.creator_role,
                kind: new.kind,
                content: new.content,
                is_active: new.is_active,
                is_daily: new.is_daily,
                likes: new.likes,
                contributions: 0,
                created_at: now,
            })
        })
    }

    fn get_prompt(&self, id: Uuid) -> StoreResult<Prompt> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {PROMPT_COLS} FROM prompts WHERE id = ?1"))?;
            let prompt = stmt.query_row([id.to_string()], prompt_from_row)?;
            Ok(prompt)
        })
    }

    fn list_prompts_for_role(&self, viewer: Role) -> StoreResult<Vec<Prompt>> {
        self.with_conn(|conn| {
            query_prompts(
                conn,
                &format!(
                    "SELECT {PROMPT_COLS} FROM prompts
                     WHERE creator_role = ?1
                     ORDER BY is_daily DESC, created_at DESC"
                ),
                params![viewer.opposite().as_str()],
            )
        })
    }

    fn list_popular_prompts(&self, limit: u32) -> StoreResult<Vec<Prompt>> {
        self.with_conn(|conn| {
            query_prompts(
                conn,
                &format!(
                    "SELECT {PROMPT_COLS} FROM prompts ORDER BY likes DESC LIMIT ?1"
                ),
                params![limit],
            )
        })
    }

    fn list_daily_prompts(&self) -> StoreResult<Vec<Prompt>> {
        self.with_conn(|conn| {
            query_prompts(
                conn,
                &format!(
                    "SELECT {PROMPT_COLS} FROM prompts
                     WHERE is_daily = 1
                     ORDER BY created_at DESC"
                ),
                params![],
            )
        })
    }

    fn list_text_prompts(&self, limit: u32) -> StoreResult<Vec<Prompt>> {
        self.with_conn(|conn| {
            query_prompts(
                conn,
                &format!(
                    "SELECT {PROMPT_COLS} FROM prompts
                     WHERE kind = 'text'
                     ORDER BY created_at ASC
                     LIMIT ?1"
                ),
                params![limit],
            )
        })
    }

    // -- Submissions --

    fn create_submission(&self, new: NewSubmission) -> StoreResult<Submission> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            if let Some(user_id) = new.user_id {
                ensure_user_exists(&tx, user_id)?;
            }

            // Bumping the parent counter first doubles as the existence
            // check: zero rows updated means no such prompt.
            let bumped = tx.execute(
                "UPDATE prompts SET contributions = contributions + 1 WHERE id = ?1",
                [new.prompt_id.to_string()],
            )?;
            if bumped == 0 {
                return Err(StoreError::NotFound);
            }

            tx.execute(
                "INSERT INTO submissions
                   (id, prompt_id, user_id, kind, content, likes, comments, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6)",
                params![
                    id.to_string(),
                    new.prompt_id.to_string(),
                    new.user_id.map(|u| u.to_string()),
                    new.kind.as_str(),
                    new.content,
                    ts(now)
                ],
            )?;
            tx.commit()?;

            Ok(Submission {
                id,
                prompt_id: new.prompt_id,
                user_id: new.user_id,
                kind: new.kind,
                content: new.content,
                likes: 0,
                comments: 0,
                created_at: now,
            })
        })
    }

    fn get_submission(&self, id: Uuid) -> StoreResult<Submission> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBMISSION_COLS} FROM submissions WHERE id = ?1"
            ))?;
            let submission = stmt.query_row([id.to_string()], submission_from_row)?;
            Ok(submission)
        })
    }

    fn list_submissions_for_prompt(&self, prompt_id: Uuid) -> StoreResult<Vec<Submission>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBMISSION_COLS} FROM submissions
                 WHERE prompt_id = ?1
                 ORDER BY created_at DESC"
            ))?;
            let rows = stmt
                .query_map([prompt_id.to_string()], submission_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn newest_image_submission(&self, prompt_id: Uuid) -> StoreResult<Option<Submission>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBMISSION_COLS} FROM submissions
                 WHERE prompt_id = ?1 AND kind = 'image'
                 ORDER BY created_at DESC
                 LIMIT 1"
            ))?;
            let row = stmt
                .query_row([prompt_id.to_string()], submission_from_row)
                .optional()?;
            Ok(row)
        })
    }

    // -- Likes --

    fn has_like(&self, user_id: Uuid, submission_id: Uuid) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let found: Option<String> = conn
                .query_row(
                    "SELECT id FROM likes WHERE user_id = ?1 AND submission_id = ?2",
                    params![user_id.to_string(), submission_id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    fn create_like(&self, user_id: Uuid, submission_id: Uuid) -> StoreResult<()> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            ensure_user_exists(&tx, user_id)?;

            // The unique index is what enforces one like per pair. A
            // racing duplicate inserts zero rows and the counter is left
            // alone, so a retried request can never double-count.
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO likes (id, user_id, submission_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    id.to_string(),
                    user_id.to_string(),
                    submission_id.to_string(),
                    ts(now)
                ],
            )?;
            if inserted == 1 {
                tx.execute(
                    "UPDATE submissions SET likes = likes + 1 WHERE id = ?1",
                    [submission_id.to_string()],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    fn delete_like(&self, user_id: Uuid, submission_id: Uuid) -> StoreResult<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            let deleted = tx.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND submission_id = ?2",
                params![user_id.to_string(), submission_id.to_string()],
            )?;
            if deleted == 1 {
                tx.execute(
                    "UPDATE submissions SET likes = MAX(likes - 1, 0) WHERE id = ?1",
                    [submission_id.to_string()],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    // -- Comments --

    fn create_comment(&self, new: NewComment) -> StoreResult<Comment> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            if let Some(user_id) = new.user_id {
                ensure_user_exists(&tx, user_id)?;
            }

            let bumped = tx.execute(
                "UPDATE submissions SET comments = comments + 1 WHERE id = ?1",
                [new.submission_id.to_string()],
            )?;
            if bumped == 0 {
                return Err(StoreError::NotFound);
            }

            tx.execute(
                "INSERT INTO comments (id, submission_id, user_id, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.to_string(),
                    new.submission_id.to_string(),
                    new.user_id.map(|u| u.to_string()),
                    new.content,
                    ts(now)
                ],
            )?;
            tx.commit()?;

            Ok(Comment {
                id,
                submission_id: new.submission_id,
                user_id: new.user_id,
                content: new.content,
                created_at: now,
            })
        })
    }

    fn list_comments_for_submission(&self, submission_id: Uuid) -> StoreResult<Vec<Comment>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, submission_id, user_id, content, created_at
                 FROM comments
                 WHERE submission_id = ?1
                 ORDER BY created_at ASC",
            )?;
            let rows = stmt
                .query_map([submission_id.to_string()], comment_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

/// Mutations that reference an actor check the row up front, so a
/// made-up user id reads as `NotFound` instead of surfacing as a foreign
/// key violation.
fn ensure_user_exists(conn: &Connection, user_id: Uuid) -> StoreResult<()> {
    let found: Option<String> = conn
        .query_row(
            "SELECT id FROM users WHERE id = ?1",
            [user_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    if found.is_none() {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

// -- Row mapping --

fn query_prompts(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> StoreResult<Vec<Prompt>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, prompt_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_col(row, 0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        avatar: row.get(3)?,
        created_at: ts_col(row, 4)?,
    })
}

fn prompt_from_row(row: &Row<'_>) -> rusqlite::Result<Prompt> {
    Ok(Prompt {
        id: uuid_col(row, 0)?,
        creator_id: uuid_col(row, 1)?,
        creator_role: role_col(row, 2)?,
        kind: kind_col(row, 3)?,
        content: row.get(4)?,
        is_active: row.get(5)?,
        is_daily: row.get(6)?,
        likes: row.get(7)?,
        contributions: row.get(8)?,
        created_at: ts_col(row, 9)?,
    })
}

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: uuid_col(row, 0)?,
        prompt_id: uuid_col(row, 1)?,
        user_id: opt_uuid_col(row, 2)?,
        kind: kind_col(row, 3)?,
        content: row.get(4)?,
        likes: row.get(5)?,
        comments: row.get(6)?,
        created_at: ts_col(row, 7)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: uuid_col(row, 0)?,
        submission_id: uuid_col(row, 1)?,
        user_id: opt_uuid_col(row, 2)?,
        content: row.get(3)?,
        created_at: ts_col(row, 4)?,
    })
}

/// RFC 3339 with fixed microsecond precision, so lexical order in SQLite
/// matches chronological order.
fn ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    s.parse()
        .map_err(|e: uuid::Error| invalid_text(idx, e.to_string()))
}

fn opt_uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| {
        s.parse()
            .map_err(|e: uuid::Error| invalid_text(idx, e.to_string()))
    })
    .transpose()
}

fn ts_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| invalid_text(idx, e.to_string()))
}

fn role_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Role> {
    let s: String = row.get(idx)?;
    s.parse()
        .map_err(|()| invalid_text(idx, format!("unrecognized role '{s}'")))
}

fn kind_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<ContentKind> {
    let s: String = row.get(idx)?;
    s.parse()
        .map_err(|()| invalid_text(idx, format!("unrecognized content kind '{s}'")))
}

fn invalid_text(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
}

/// Extension trait for optional query results.
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
