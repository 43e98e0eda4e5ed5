// System status display — DB stats and current moderation preferences.

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::db::queries;

/// Display system status to the terminal.
pub fn show(conn: &Connection, db_display_path: &str) -> Result<()> {
    if !Path::new(db_display_path).exists() {
        println!("Database: not initialized");
        println!("\nRun `palisade init` to set up the database.");
        return Ok(());
    }

    // Database file size
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let contexts = queries::context_count(conn)?;
    let suspicious = queries::suspicious_count(conn)?;
    let blocked = queries::blocked_count(conn)?;
    let reports = queries::report_count(conn)?;

    println!("Login contexts: {contexts}");
    println!("Suspicious logins: {suspicious} tracked, {blocked} blocked");
    println!("Open reports: {reports}");

    let config = queries::get_moderation_config(conn)?;
    println!(
        "Toxicity screening: {}",
        if config.use_perspective_api { "on" } else { "off" }
    );
    println!(
        "Category provider: {} (timeout {} ms)",
        config.category_provider, config.request_timeout_ms
    );
    if config.updated_at.is_empty() {
        println!("Preferences: defaults (never updated)");
    } else if let Ok(updated) =
        chrono::NaiveDateTime::parse_from_str(&config.updated_at, "%Y-%m-%d %H:%M:%S")
    {
        let age = chrono::Utc::now().naive_utc() - updated;
        println!(
            "Preferences last updated: {} ({} hours ago)",
            config.updated_at,
            age.num_hours()
        );
    } else {
        println!("Preferences last updated: {}", config.updated_at);
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
