//! SQL schema for the trail SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS host (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    context  TEXT NOT NULL,
    hostname TEXT NOT NULL,
    UNIQUE (context, hostname)
);

CREATE TABLE IF NOT EXISTS data_source (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    context TEXT NOT NULL,
    host_id INTEGER NOT NULL REFERENCES host(id),
    actor   TEXT NOT NULL DEFAULT '',
    phase   TEXT NOT NULL DEFAULT '',
    UNIQUE (context, host_id, actor, phase)
);

-- Payloads are content-addressed and shared between contexts.
CREATE TABLE IF NOT EXISTS message_data (
    hash TEXT PRIMARY KEY,    -- lowercase hex SHA-256 of data
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS message (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    context           TEXT NOT NULL,
    data_source_id    INTEGER NOT NULL REFERENCES data_source(id),
    stamp             TEXT NOT NULL,   -- RFC 3339 UTC
    topic             TEXT NOT NULL,
    type              TEXT NOT NULL,
    message_data_hash TEXT NOT NULL REFERENCES message_data(hash)
);

CREATE TABLE IF NOT EXISTS audit (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    context        TEXT NOT NULL,
    event          TEXT NOT NULL,
    stamp          TEXT NOT NULL,      -- RFC 3339 UTC
    data_source_id INTEGER NOT NULL REFERENCES data_source(id),
    message_id     INTEGER REFERENCES message(id),
    data           TEXT
);

CREATE INDEX IF NOT EXISTS host_context_idx        ON host(context);
CREATE INDEX IF NOT EXISTS data_source_context_idx ON data_source(context);
CREATE INDEX IF NOT EXISTS message_context_idx     ON message(context);
CREATE INDEX IF NOT EXISTS audit_context_idx       ON audit(context);

PRAGMA user_version = 1;
";
