//! SQLite schema for the contact and campaign hierarchies.
//!
//! - `contacts` and `campaigns` share one shape: an integer id, a display
//!   name, a nullable self-referencing `parent_id` and a creation stamp
//! - `store_meta` records the applied schema version

/// Migration v1: node tables plus store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    parent_id INTEGER REFERENCES contacts(id) ON DELETE SET NULL,
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS campaigns (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    parent_id INTEGER REFERENCES campaigns(id) ON DELETE SET NULL,
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 1);
";

/// Migration v2: children lookups are by `parent_id`.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_contacts_parent
    ON contacts(parent_id);

CREATE INDEX IF NOT EXISTS idx_campaigns_parent
    ON campaigns(parent_id);
";

/// Indexes expected after all migrations.
pub const REQUIRED_INDEXES: &[&str] = &["idx_contacts_parent", "idx_campaigns_parent"];
