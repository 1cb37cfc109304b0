//! SQL schema for the Folio SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id      TEXT PRIMARY KEY,
    email        TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS documents (
    document_id   TEXT PRIMARY KEY,
    owner_id      TEXT NOT NULL REFERENCES users(user_id),
    title         TEXT NOT NULL,
    content       TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    last_modified TEXT NOT NULL,
    metadata      TEXT NOT NULL DEFAULT '{}'
);

-- One row per (document, user): a user holds at most one access level
-- on a document, and the owner never appears here. granted_at orders
-- member listings; a re-grant refreshes it, moving the user to the end.
CREATE TABLE IF NOT EXISTS document_access (
    document_id TEXT NOT NULL REFERENCES documents(document_id),
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    level       TEXT NOT NULL,   -- 'editor' | 'reviewer' | 'reader'
    granted_at  TEXT NOT NULL,
    PRIMARY KEY (document_id, user_id)
);

-- Denormalized per-user index, maintained in the same transaction as
-- the document mutation that changes it. Not independently
-- authoritative; see folio_core::index.
CREATE TABLE IF NOT EXISTS user_index (
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    document_id TEXT NOT NULL,
    entry       TEXT NOT NULL,   -- 'created' | 'shared'
    PRIMARY KEY (user_id, document_id, entry)
);

CREATE INDEX IF NOT EXISTS document_access_doc_idx  ON document_access(document_id, granted_at);
CREATE INDEX IF NOT EXISTS document_access_user_idx ON document_access(user_id);
CREATE INDEX IF NOT EXISTS user_index_doc_idx       ON user_index(document_id);

PRAGMA user_version = 1;
";
