//! SQL schema for the board SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,     -- argon2 PHC string
    display_name  TEXT NOT NULL,
    phone         TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

-- Keyed by the SHA-256 hex digest of the bearer token.
CREATE TABLE IF NOT EXISTS sessions (
    token_digest TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES users(user_id),
    created_at   TEXT NOT NULL,
    expires_at   TEXT NOT NULL
);

-- liked_by / disliked_by are JSON arrays of user ids. Only the toggle
-- engine updates them; no other column is ever updated.
CREATE TABLE IF NOT EXISTS subjects (
    subject_id  TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    creator_id  TEXT NOT NULL REFERENCES users(user_id),
    created_at  TEXT NOT NULL,
    liked_by    TEXT NOT NULL DEFAULT '[]',
    disliked_by TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id  TEXT PRIMARY KEY,
    subject_id  TEXT NOT NULL REFERENCES subjects(subject_id),
    author_id   TEXT NOT NULL REFERENCES users(user_id),
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    liked_by    TEXT NOT NULL DEFAULT '[]',
    disliked_by TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS comments_subject_idx  ON comments(subject_id);
CREATE INDEX IF NOT EXISTS subjects_created_idx  ON subjects(created_at);
CREATE INDEX IF NOT EXISTS sessions_expires_idx  ON sessions(expires_at);

PRAGMA user_version = 1;
";
