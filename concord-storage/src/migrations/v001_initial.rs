//! V001: Initial snapshot schema.
//! Entity pools, assignments, ratings, masks, session_info.

pub const MIGRATION_SQL: &str = r#"
-- Entity pools. position is the dense tensor index; row order in a
-- saved snapshot is pool order.
CREATE TABLE IF NOT EXISTS algorithms (
    position INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
) STRICT;

CREATE TABLE IF NOT EXISTS files (
    position INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
) STRICT;

CREATE TABLE IF NOT EXISTS workers (
    position INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
) STRICT;

CREATE TABLE IF NOT EXISTS rating_names (
    position INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
) STRICT;

-- Submitted assignments with their ingestion metadata. An assignment
-- may own no rating rows when a later resubmission took all its votes.
CREATE TABLE IF NOT EXISTS assignments (
    position INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    worker INTEGER NOT NULL REFERENCES workers(position),
    device TEXT NOT NULL,
    state TEXT NOT NULL,
    submitted_at INTEGER NOT NULL,
    work_duration_secs INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_assignments_worker
    ON assignments(worker);

-- Live ratings after duplicate resolution. position keeps store order;
-- the voting worker is implied by the owning assignment.
CREATE TABLE IF NOT EXISTS ratings (
    position INTEGER PRIMARY KEY,
    assignment INTEGER NOT NULL REFERENCES assignments(position),
    algorithm INTEGER NOT NULL REFERENCES algorithms(position),
    file INTEGER NOT NULL REFERENCES files(position),
    rating_name INTEGER NOT NULL REFERENCES rating_names(position),
    vote REAL NOT NULL,
    UNIQUE(assignment, algorithm, file, rating_name)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_ratings_assignment
    ON ratings(assignment);

-- Registered masks in registration order. flags holds one 0/1 byte per
-- flag in row-major tensor order, so reload is bit-exact.
CREATE TABLE IF NOT EXISTS masks (
    position INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL,
    flags BLOB NOT NULL
) STRICT;

-- Single-row table: evaluation config and save time.
CREATE TABLE IF NOT EXISTS session_info (
    id INTEGER PRIMARY KEY CHECK (id = 0),
    config_json TEXT NOT NULL,
    saved_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;
"#;
