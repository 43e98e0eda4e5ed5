// Database queries — CRUD operations for all tables.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the engines clean Rust interfaces.
// The two updates that race under concurrent identical requests — the
// unverified-attempt counter and the reporter-set append — are single
// atomic statements, not read-modify-write sequences.

use rusqlite::{params, Connection};

use super::models::{Fingerprint, ModerationConfig, Report, SuspiciousLogin, UserContext};
use crate::error::StoreError;

type Result<T> = std::result::Result<T, StoreError>;

// --- Login contexts ---

/// Record a login context for a user. Returns the new row id.
pub fn insert_context(
    conn: &Connection,
    user_id: &str,
    email: &str,
    fp: &Fingerprint,
    is_trusted: bool,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO user_contexts
            (user_id, email, ip, country, city, browser, platform, os, device, device_type, is_trusted)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            user_id,
            email,
            fp.ip,
            fp.country,
            fp.city,
            fp.browser,
            fp.platform,
            fp.os,
            fp.device,
            fp.device_type,
            is_trusted,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All contexts recorded for a user, oldest first.
pub fn contexts_for_user(conn: &Connection, user_id: &str) -> Result<Vec<UserContext>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, email, ip, country, city, browser, platform, os,
                device, device_type, is_trusted, created_at
         FROM user_contexts WHERE user_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![user_id], row_to_context)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// The user's first recorded context — the "primary" device.
pub fn primary_context(conn: &Connection, user_id: &str) -> Result<Option<UserContext>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, email, ip, country, city, browser, platform, os,
                device, device_type, is_trusted, created_at
         FROM user_contexts WHERE user_id = ?1 ORDER BY id ASC LIMIT 1",
    )?;
    let result = stmt.query_row(params![user_id], row_to_context).optional()?;
    Ok(result)
}

/// All of the user's trusted contexts, the primary included.
pub fn trusted_contexts(conn: &Connection, user_id: &str) -> Result<Vec<UserContext>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, email, ip, country, city, browser, platform, os,
                device, device_type, is_trusted, created_at
         FROM user_contexts WHERE user_id = ?1 AND is_trusted = 1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![user_id], row_to_context)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Delete a context-data record. Returns false if the id was unknown.
pub fn delete_context(conn: &Connection, id: i64) -> Result<bool> {
    let n = conn.execute("DELETE FROM user_contexts WHERE id = ?1", params![id])?;
    Ok(n > 0)
}

// --- Suspicious logins ---

/// Find the escalation record for this (user, fingerprint) identity.
pub fn find_suspicious(
    conn: &Connection,
    user_id: &str,
    fp: &Fingerprint,
) -> Result<Option<SuspiciousLogin>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, email, ip, country, city, browser, platform, os,
                device, device_type, unverified_attempts, is_blocked, created_at
         FROM suspicious_logins
         WHERE user_id = ?1 AND browser = ?2 AND platform = ?3 AND os = ?4
           AND device = ?5 AND device_type = ?6",
    )?;
    let result = stmt
        .query_row(
            params![user_id, fp.browser, fp.platform, fp.os, fp.device, fp.device_type],
            row_to_suspicious,
        )
        .optional()?;
    Ok(result)
}

/// Fetch one suspicious login by id.
pub fn get_suspicious(conn: &Connection, id: i64) -> Result<Option<SuspiciousLogin>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, email, ip, country, city, browser, platform, os,
                device, device_type, unverified_attempts, is_blocked, created_at
         FROM suspicious_logins WHERE id = ?1",
    )?;
    let result = stmt.query_row(params![id], row_to_suspicious).optional()?;
    Ok(result)
}

/// Create the escalation record on first unverified sighting.
pub fn insert_suspicious(
    conn: &Connection,
    user_id: &str,
    email: &str,
    fp: &Fingerprint,
    attempts: u32,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO suspicious_logins
            (user_id, email, ip, country, city, browser, platform, os, device,
             device_type, unverified_attempts)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            user_id,
            email,
            fp.ip,
            fp.country,
            fp.city,
            fp.browser,
            fp.platform,
            fp.os,
            fp.device,
            fp.device_type,
            attempts,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Atomically bump the unverified-attempt counter and return the new
/// count. Single statement so concurrent identical signins can't lose
/// an increment.
pub fn record_unverified_attempt(conn: &Connection, id: i64) -> Result<u32> {
    let count = conn.query_row(
        "UPDATE suspicious_logins
         SET unverified_attempts = unverified_attempts + 1
         WHERE id = ?1
         RETURNING unverified_attempts",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Set or clear the blocked flag. Idempotent; returns false only when
/// the record doesn't exist.
pub fn set_blocked(conn: &Connection, id: i64, blocked: bool) -> Result<bool> {
    let n = conn.execute(
        "UPDATE suspicious_logins SET is_blocked = ?2 WHERE id = ?1",
        params![id, blocked],
    )?;
    Ok(n > 0)
}

/// Suspicious logins currently blocked for a user.
pub fn blocked_logins(conn: &Connection, user_id: &str) -> Result<Vec<SuspiciousLogin>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, email, ip, country, city, browser, platform, os,
                device, device_type, unverified_attempts, is_blocked, created_at
         FROM suspicious_logins WHERE user_id = ?1 AND is_blocked = 1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![user_id], row_to_suspicious)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Delete a suspicious-login record. Returns false if the id was unknown.
pub fn delete_suspicious(conn: &Connection, id: i64) -> Result<bool> {
    let n = conn.execute("DELETE FROM suspicious_logins WHERE id = ?1", params![id])?;
    Ok(n > 0)
}

/// Promote a suspicious login into a trusted context: insert the context
/// and delete the escalation record in one transaction. Returns the new
/// context id, or None if the suspicious login doesn't exist.
pub fn promote_suspicious(conn: &mut Connection, id: i64) -> Result<Option<i64>> {
    let tx = conn.transaction()?;

    let record = {
        let mut stmt = tx.prepare(
            "SELECT id, user_id, email, ip, country, city, browser, platform, os,
                    device, device_type, unverified_attempts, is_blocked, created_at
             FROM suspicious_logins WHERE id = ?1",
        )?;
        stmt.query_row(params![id], row_to_suspicious).optional()?
    };

    let Some(record) = record else {
        return Ok(None);
    };

    tx.execute(
        "INSERT INTO user_contexts
            (user_id, email, ip, country, city, browser, platform, os, device, device_type, is_trusted)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1)",
        params![
            record.user_id,
            record.email,
            record.fingerprint.ip,
            record.fingerprint.country,
            record.fingerprint.city,
            record.fingerprint.browser,
            record.fingerprint.platform,
            record.fingerprint.os,
            record.fingerprint.device,
            record.fingerprint.device_type,
        ],
    )?;
    let context_id = tx.last_insert_rowid();

    tx.execute("DELETE FROM suspicious_logins WHERE id = ?1", params![id])?;
    tx.commit()?;

    Ok(Some(context_id))
}

// --- Moderation preferences ---

/// Read the current preferences. A missing row means the defaults have
/// never been changed.
pub fn get_moderation_config(conn: &Connection) -> Result<ModerationConfig> {
    let mut stmt = conn.prepare(
        "SELECT use_perspective_api, category_provider, request_timeout_ms, updated_at
         FROM moderation_config WHERE id = 1",
    )?;
    let result = stmt
        .query_row([], |row| {
            Ok(ModerationConfig {
                use_perspective_api: row.get(0)?,
                category_provider: row.get(1)?,
                // SQLite integers are i64; the timeout is always small
                request_timeout_ms: row.get::<_, i64>(2)? as u64,
                updated_at: row.get(3)?,
            })
        })
        .optional()?;
    Ok(result.unwrap_or_default())
}

/// Replace the preferences (singleton — always id=1, last write wins).
pub fn save_moderation_config(conn: &Connection, config: &ModerationConfig) -> Result<()> {
    conn.execute(
        "INSERT INTO moderation_config
            (id, use_perspective_api, category_provider, request_timeout_ms, updated_at)
         VALUES (1, ?1, ?2, ?3, datetime('now'))
         ON CONFLICT(id) DO UPDATE SET
            use_perspective_api = ?1,
            category_provider = ?2,
            request_timeout_ms = ?3,
            updated_at = datetime('now')",
        params![
            config.use_perspective_api,
            config.category_provider,
            config.request_timeout_ms as i64,
        ],
    )?;
    Ok(())
}

// --- Reports ---

/// Ensure a report row exists for this post and return its id.
/// `ON CONFLICT DO NOTHING` keeps concurrent first reports from
/// creating duplicates.
pub fn ensure_report(
    conn: &Connection,
    post_id: &str,
    community_id: &str,
    reason: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO reports (post_id, community_id, report_reason)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(post_id) DO NOTHING",
        params![post_id, community_id, reason],
    )?;
    let id = conn.query_row(
        "SELECT id FROM reports WHERE post_id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Add a user to a report's reporter set. Returns false if the user was
/// already in the set (the unique constraint absorbs the duplicate).
pub fn add_reporter(conn: &Connection, report_id: i64, user_id: &str) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO report_users (report_id, user_id) VALUES (?1, ?2)",
        params![report_id, user_id],
    )?;
    Ok(n > 0)
}

/// Fetch the report for a post, with its reporter set.
pub fn report_for_post(conn: &Connection, post_id: &str) -> Result<Option<Report>> {
    let mut stmt = conn.prepare(
        "SELECT id, post_id, community_id, report_reason, created_at
         FROM reports WHERE post_id = ?1",
    )?;
    let row = stmt
        .query_row(params![post_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })
        .optional()?;

    match row {
        Some((id, post_id, community_id, report_reason, created_at)) => {
            let reported_by = reporters(conn, id)?;
            Ok(Some(Report {
                id,
                post_id,
                community_id,
                report_reason,
                reported_by,
                created_at,
            }))
        }
        None => Ok(None),
    }
}

/// All reports against posts in a community, newest first.
pub fn reports_for_community(conn: &Connection, community_id: &str) -> Result<Vec<Report>> {
    let mut stmt = conn.prepare(
        "SELECT id, post_id, community_id, report_reason, created_at
         FROM reports WHERE community_id = ?1 ORDER BY id DESC",
    )?;
    let rows = stmt.query_map(params![community_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut reports = Vec::new();
    for row in rows {
        let (id, post_id, community_id, report_reason, created_at) = row?;
        let reported_by = reporters(conn, id)?;
        reports.push(Report {
            id,
            post_id,
            community_id,
            report_reason,
            reported_by,
            created_at,
        });
    }
    Ok(reports)
}

/// The reporter set for one report.
pub fn reporters(conn: &Connection, report_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT user_id FROM report_users WHERE report_id = ?1 ORDER BY reported_at ASC",
    )?;
    let rows = stmt.query_map(params![report_id], |row| row.get(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Drop every report referencing a post (the post itself lives in another
/// system — this runs when a moderator removes it). Returns the number of
/// reports deleted.
pub fn delete_reports_for_post(conn: &Connection, post_id: &str) -> Result<usize> {
    conn.execute(
        "DELETE FROM report_users WHERE report_id IN
            (SELECT id FROM reports WHERE post_id = ?1)",
        params![post_id],
    )?;
    let n = conn.execute("DELETE FROM reports WHERE post_id = ?1", params![post_id])?;
    Ok(n)
}

/// Dismiss one report by id. Returns false if the id was unknown.
pub fn delete_report(conn: &Connection, report_id: i64) -> Result<bool> {
    conn.execute(
        "DELETE FROM report_users WHERE report_id = ?1",
        params![report_id],
    )?;
    let n = conn.execute("DELETE FROM reports WHERE id = ?1", params![report_id])?;
    Ok(n > 0)
}

// --- Status counts ---

pub fn context_count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM user_contexts", [], |r| r.get(0))?)
}

pub fn suspicious_count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM suspicious_logins", [], |r| r.get(0))?)
}

pub fn blocked_count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM suspicious_logins WHERE is_blocked = 1",
        [],
        |r| r.get(0),
    )?)
}

pub fn report_count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM reports", [], |r| r.get(0))?)
}

// --- Row mappers ---

fn row_to_context(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserContext> {
    Ok(UserContext {
        id: row.get(0)?,
        user_id: row.get(1)?,
        email: row.get(2)?,
        fingerprint: Fingerprint {
            ip: row.get(3)?,
            country: row.get(4)?,
            city: row.get(5)?,
            browser: row.get(6)?,
            platform: row.get(7)?,
            os: row.get(8)?,
            device: row.get(9)?,
            device_type: row.get(10)?,
        },
        is_trusted: row.get(11)?,
        created_at: row.get(12)?,
    })
}

fn row_to_suspicious(row: &rusqlite::Row<'_>) -> rusqlite::Result<SuspiciousLogin> {
    Ok(SuspiciousLogin {
        id: row.get(0)?,
        user_id: row.get(1)?,
        email: row.get(2)?,
        fingerprint: Fingerprint {
            ip: row.get(3)?,
            country: row.get(4)?,
            city: row.get(5)?,
            browser: row.get(6)?,
            platform: row.get(7)?,
            os: row.get(8)?,
            device: row.get(9)?,
            device_type: row.get(10)?,
        },
        unverified_attempts: row.get(11)?,
        is_blocked: row.get(12)?,
        created_at: row.get(13)?,
    })
}

// rusqlite's optional() helper — converts "no rows" into None
use rusqlite::OptionalExtension;
