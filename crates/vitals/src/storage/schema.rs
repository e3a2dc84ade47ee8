//! `SQLite` schema definitions for vitals.
//!
//! This module contains the SQL statements for creating the database schema.
//! Every statement is idempotent, so the whole set runs on each start.

/// SQL statement to create the vitals table.
pub const CREATE_VITALS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS vitals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    temperature_c REAL,
    systolic REAL,
    diastolic REAL,
    heart_rate REAL,
    notes TEXT,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `created_at` for newest-first listing.
pub const CREATE_CREATED_AT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_vitals_created_at ON vitals(created_at DESC)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_VITALS_TABLE, CREATE_CREATED_AT_INDEX];

/// Column list shared by every record query, in `row_to_record` order.
pub const RECORD_COLUMNS: &str =
    "id, temperature_c, systolic, diastolic, heart_rate, notes, created_at";
