// Database schema — table creation and migrations.
//
// We use a simple version-based approach: a `schema_version` table tracks
// which migrations have run. Uniqueness constraints do double duty as the
// concurrency control: the suspicious-login identity and the report
// reporter set are both enforced by the database, not by in-process locks.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent — safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Known login contexts, one row per accepted fingerprint
        CREATE TABLE IF NOT EXISTS user_contexts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            email TEXT NOT NULL,
            ip TEXT NOT NULL,
            country TEXT NOT NULL,
            city TEXT NOT NULL,
            browser TEXT NOT NULL,
            platform TEXT NOT NULL,
            os TEXT NOT NULL,
            device TEXT NOT NULL,
            device_type TEXT NOT NULL,
            is_trusted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Escalation tracking for fingerprints that matched no context.
        -- One row per (user, distinguishing-fingerprint) combination;
        -- the unique index makes repeated sightings hit the same row.
        CREATE TABLE IF NOT EXISTS suspicious_logins (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            email TEXT NOT NULL,
            ip TEXT NOT NULL,
            country TEXT NOT NULL,
            city TEXT NOT NULL,
            browser TEXT NOT NULL,
            platform TEXT NOT NULL,
            os TEXT NOT NULL,
            device TEXT NOT NULL,
            device_type TEXT NOT NULL,
            unverified_attempts INTEGER NOT NULL DEFAULT 0,
            is_blocked INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_suspicious_identity
            ON suspicious_logins(user_id, browser, platform, os, device, device_type);

        -- Moderation preferences (singleton row, last write wins)
        CREATE TABLE IF NOT EXISTS moderation_config (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            use_perspective_api INTEGER NOT NULL DEFAULT 0,
            category_provider TEXT NOT NULL DEFAULT 'TextRazor',
            request_timeout_ms INTEGER NOT NULL DEFAULT 5000,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One report per post; reporters live in report_users
        CREATE TABLE IF NOT EXISTS reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id TEXT NOT NULL UNIQUE,
            community_id TEXT NOT NULL,
            report_reason TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Reporter set: the unique constraint is the idempotency guard
        CREATE TABLE IF NOT EXISTS report_users (
            report_id INTEGER NOT NULL REFERENCES reports(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL,
            reported_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(report_id, user_id)
        );

        -- Index for listing a user's contexts on every signin
        CREATE INDEX IF NOT EXISTS idx_contexts_user
            ON user_contexts(user_id);

        CREATE INDEX IF NOT EXISTS idx_suspicious_user
            ON suspicious_logins(user_id);

        CREATE INDEX IF NOT EXISTS idx_reports_community
            ON reports(community_id);
        ",
    )
    .context("Failed to create database tables")?;

    // Record the current schema version if this is a fresh database
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (1)",
        [],
    )?;

    Ok(())
}

/// Count the number of user-created tables (used by `status` and `init`).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
