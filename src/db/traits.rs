// Store trait — backend-agnostic async interface for all DB operations.
//
// Implementor: SqliteStore (wraps rusqlite). All methods are async so a
// sync backend behind a Mutex and a future native async backend fit the
// same interface. The engines hold `Arc<dyn Store>` and never see SQL.

use async_trait::async_trait;

use super::models::{Fingerprint, ModerationConfig, Report, SuspiciousLogin, UserContext};
use crate::error::StoreError;

#[async_trait]
pub trait Store: Send + Sync {
    // --- Login contexts ---

    /// Record a login context. Returns the new row id.
    async fn insert_context(
        &self,
        user_id: &str,
        email: &str,
        fp: &Fingerprint,
        is_trusted: bool,
    ) -> Result<i64, StoreError>;

    /// All contexts recorded for a user, oldest first.
    async fn contexts_for_user(&self, user_id: &str) -> Result<Vec<UserContext>, StoreError>;

    /// The user's first recorded context.
    async fn primary_context(&self, user_id: &str) -> Result<Option<UserContext>, StoreError>;

    /// All of the user's trusted contexts, the primary included.
    async fn trusted_contexts(&self, user_id: &str) -> Result<Vec<UserContext>, StoreError>;

    /// Delete a context-data record. Returns false if the id was unknown.
    async fn delete_context(&self, id: i64) -> Result<bool, StoreError>;

    // --- Suspicious logins ---

    /// Find the escalation record for this (user, fingerprint) identity.
    async fn find_suspicious(
        &self,
        user_id: &str,
        fp: &Fingerprint,
    ) -> Result<Option<SuspiciousLogin>, StoreError>;

    /// Fetch one suspicious login by id.
    async fn get_suspicious(&self, id: i64) -> Result<Option<SuspiciousLogin>, StoreError>;

    /// Create the escalation record on first unverified sighting.
    async fn insert_suspicious(
        &self,
        user_id: &str,
        email: &str,
        fp: &Fingerprint,
        attempts: u32,
    ) -> Result<i64, StoreError>;

    /// Atomically bump the attempt counter, returning the new count.
    async fn record_unverified_attempt(&self, id: i64) -> Result<u32, StoreError>;

    /// Set or clear the blocked flag (idempotent).
    async fn set_blocked(&self, id: i64, blocked: bool) -> Result<bool, StoreError>;

    /// Suspicious logins currently blocked for a user.
    async fn blocked_logins(&self, user_id: &str) -> Result<Vec<SuspiciousLogin>, StoreError>;

    /// Delete a suspicious-login record.
    async fn delete_suspicious(&self, id: i64) -> Result<bool, StoreError>;

    /// Promote a suspicious login into a trusted context (transactional).
    async fn promote_suspicious(&self, id: i64) -> Result<Option<i64>, StoreError>;

    // --- Moderation preferences ---

    /// Read the current preferences (defaults if never written).
    async fn get_moderation_config(&self) -> Result<ModerationConfig, StoreError>;

    /// Replace the preferences (last write wins).
    async fn save_moderation_config(&self, config: &ModerationConfig) -> Result<(), StoreError>;

    // --- Reports ---

    /// Ensure a report row exists for this post, returning its id.
    async fn ensure_report(
        &self,
        post_id: &str,
        community_id: &str,
        reason: &str,
    ) -> Result<i64, StoreError>;

    /// Add a user to the reporter set. False means already present.
    async fn add_reporter(&self, report_id: i64, user_id: &str) -> Result<bool, StoreError>;

    /// Fetch the report for a post with its reporter set.
    async fn report_for_post(&self, post_id: &str) -> Result<Option<Report>, StoreError>;

    /// All reports against posts in a community, newest first.
    async fn reports_for_community(&self, community_id: &str) -> Result<Vec<Report>, StoreError>;

    /// Drop every report referencing a post. Returns how many were deleted.
    async fn delete_reports_for_post(&self, post_id: &str) -> Result<usize, StoreError>;

    /// Dismiss one report by id.
    async fn delete_report(&self, report_id: i64) -> Result<bool, StoreError>;
}
