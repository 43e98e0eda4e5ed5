// Data models — Rust structs that map to database rows.
//
// These are the types that flow through the application. They're separate
// from the database queries so the engines can use them without depending
// on rusqlite directly.

use serde::{Deserialize, Serialize};

/// The device/network identity of one authentication occurrence.
///
/// Equality for trust decisions is over the stable fields only
/// (browser, platform, os, device, device_type). Network address and
/// geolocation are recorded but never required to match — dynamic IPs
/// would otherwise invalidate every context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub ip: String,
    pub country: String,
    pub city: String,
    pub browser: String,
    pub platform: String,
    pub os: String,
    pub device: String,
    pub device_type: String,
}

impl Fingerprint {
    /// Field-by-field equality over the distinguishing fields.
    /// IP and geolocation are informative only.
    pub fn same_device(&self, other: &Fingerprint) -> bool {
        self.browser == other.browser
            && self.platform == other.platform
            && self.os == other.os
            && self.device == other.device
            && self.device_type == other.device_type
    }
}

/// A known login context — a fingerprint previously accepted as the user's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub id: i64,
    pub user_id: String,
    pub email: String,
    pub fingerprint: Fingerprint,
    pub is_trusted: bool,
    pub created_at: String,
}

/// A fingerprint under escalation tracking. One row per
/// (user, distinguishing-fingerprint) combination; the attempt counter
/// never decreases and the blocked flag is only cleared by an explicit
/// administrative unblock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousLogin {
    pub id: i64,
    pub user_id: String,
    pub email: String,
    pub fingerprint: Fingerprint,
    pub unverified_attempts: u32,
    pub is_blocked: bool,
    pub created_at: String,
}

/// Moderation preferences — a single mutable row, read on every content
/// submission and updated only by administrative action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Master toggle for toxicity screening. Off means `screen` accepts
    /// everything without touching the classifier.
    pub use_perspective_api: bool,
    /// Which category-filter provider `categorize` dispatches to.
    pub category_provider: String,
    /// Upper bound on any single provider request.
    pub request_timeout_ms: u64,
    pub updated_at: String,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            use_perspective_api: false,
            category_provider: "TextRazor".to_string(),
            request_timeout_ms: 5000,
            updated_at: String::new(),
        }
    }
}

/// Aggregated flags against one post. Each user appears at most once in
/// the reporter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub post_id: String,
    pub community_id: String,
    pub report_reason: String,
    pub reported_by: Vec<String>,
    pub created_at: String,
}
