//! SQL DDL for the registry database and the per-vault databases.
//!
//! Both batches are idempotent and run on every open. Future migrations
//! will be gated on `PRAGMA user_version`.

/// Registry DDL: the vault catalog.
pub const REGISTRY_SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS vaults (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

PRAGMA user_version = 1;
";

/// Per-vault DDL: schema history, documents, and the full-text index.
///
/// `document_fts` is an external-content FTS5 table over `documents`; the
/// writer keeps it in lockstep explicitly (insert on create, delete plus
/// reinsert on update) inside the same transaction as the row change.
pub const VAULT_SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS schemas (
    id          INTEGER PRIMARY KEY,
    vault_id    INTEGER NOT NULL,   -- echo of the registry id
    version     INTEGER NOT NULL,
    title       TEXT NOT NULL,
    fields_json TEXT NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS schemas_version_idx ON schemas(version);

CREATE TABLE IF NOT EXISTS documents (
    id          INTEGER PRIMARY KEY,
    vault_id    INTEGER NOT NULL,   -- echo of the registry id
    schema_id   INTEGER NOT NULL REFERENCES schemas(id),
    title       TEXT NOT NULL,
    data_json   TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS documents_updated_idx ON documents(updated_at);

CREATE VIRTUAL TABLE IF NOT EXISTS document_fts
    USING fts5(title, body, content='documents', content_rowid='id');

PRAGMA user_version = 1;
";
