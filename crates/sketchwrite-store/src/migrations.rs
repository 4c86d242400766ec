use rusqlite::Connection;
use tracing::info;

use crate::StoreResult;

pub fn run(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            name        TEXT NOT NULL,
            avatar      TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS prompts (
            id            TEXT PRIMARY KEY,
            creator_id    TEXT NOT NULL REFERENCES users(id),
            creator_role  TEXT NOT NULL CHECK (creator_role IN ('writer', 'sketcher')),
            kind          TEXT NOT NULL CHECK (kind IN ('text', 'image')),
            content       TEXT NOT NULL,
            is_active     INTEGER NOT NULL DEFAULT 0,
            is_daily      INTEGER NOT NULL DEFAULT 0,
            likes         INTEGER NOT NULL DEFAULT 0,
            contributions INTEGER NOT NULL DEFAULT 0,
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_prompts_role
            ON prompts(creator_role, is_daily, created_at);

        CREATE TABLE IF NOT EXISTS submissions (
            id          TEXT PRIMARY KEY,
            prompt_id   TEXT NOT NULL REFERENCES prompts(id),
            user_id     TEXT REFERENCES users(id),
            kind        TEXT NOT NULL CHECK (kind IN ('text', 'image')),
            content     TEXT NOT NULL,
            likes       INTEGER NOT NULL DEFAULT 0,
            comments    INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_submissions_prompt
            ON submissions(prompt_id, created_at);

        CREATE TABLE IF NOT EXISTS likes (
            id            TEXT PRIMARY KEY,
            user_id       TEXT NOT NULL REFERENCES users(id),
            submission_id TEXT NOT NULL REFERENCES submissions(id),
            created_at    TEXT NOT NULL,
            UNIQUE(user_id, submission_id)
        );

        CREATE TABLE IF NOT EXISTS comments (
            id            TEXT PRIMARY KEY,
            submission_id TEXT NOT NULL REFERENCES submissions(id),
            user_id       TEXT REFERENCES users(id),
            content       TEXT NOT NULL,
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_comments_submission
            ON comments(submission_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
