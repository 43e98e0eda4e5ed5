// SqliteStore — rusqlite backend implementing the Store trait.
//
// The Connection sits behind a tokio Mutex so the store can be shared
// across tasks. Trait methods lock the mutex, do synchronous rusqlite
// work, and return; the lock is never held across an .await.
//
// The free functions in queries.rs remain directly testable against a
// Connection; this wrapper only adds the locking.

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{Fingerprint, ModerationConfig, Report, SuspiciousLogin, UserContext};
use super::traits::Store;
use crate::error::StoreError;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_context(
        &self,
        user_id: &str,
        email: &str,
        fp: &Fingerprint,
        is_trusted: bool,
    ) -> Result<i64, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::insert_context(&conn, user_id, email, fp, is_trusted)
    }

    async fn contexts_for_user(&self, user_id: &str) -> Result<Vec<UserContext>, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::contexts_for_user(&conn, user_id)
    }

    async fn primary_context(&self, user_id: &str) -> Result<Option<UserContext>, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::primary_context(&conn, user_id)
    }

    async fn trusted_contexts(&self, user_id: &str) -> Result<Vec<UserContext>, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::trusted_contexts(&conn, user_id)
    }

    async fn delete_context(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::delete_context(&conn, id)
    }

    async fn find_suspicious(
        &self,
        user_id: &str,
        fp: &Fingerprint,
    ) -> Result<Option<SuspiciousLogin>, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::find_suspicious(&conn, user_id, fp)
    }

    async fn get_suspicious(&self, id: i64) -> Result<Option<SuspiciousLogin>, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::get_suspicious(&conn, id)
    }

    async fn insert_suspicious(
        &self,
        user_id: &str,
        email: &str,
        fp: &Fingerprint,
        attempts: u32,
    ) -> Result<i64, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::insert_suspicious(&conn, user_id, email, fp, attempts)
    }

    async fn record_unverified_attempt(&self, id: i64) -> Result<u32, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::record_unverified_attempt(&conn, id)
    }

    async fn set_blocked(&self, id: i64, blocked: bool) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::set_blocked(&conn, id, blocked)
    }

    async fn blocked_logins(&self, user_id: &str) -> Result<Vec<SuspiciousLogin>, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::blocked_logins(&conn, user_id)
    }

    async fn delete_suspicious(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::delete_suspicious(&conn, id)
    }

    async fn promote_suspicious(&self, id: i64) -> Result<Option<i64>, StoreError> {
        let mut conn = self.conn.lock().await;
        super::queries::promote_suspicious(&mut conn, id)
    }

    async fn get_moderation_config(&self) -> Result<ModerationConfig, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::get_moderation_config(&conn)
    }

    async fn save_moderation_config(&self, config: &ModerationConfig) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        super::queries::save_moderation_config(&conn, config)
    }

    async fn ensure_report(
        &self,
        post_id: &str,
        community_id: &str,
        reason: &str,
    ) -> Result<i64, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::ensure_report(&conn, post_id, community_id, reason)
    }

    async fn add_reporter(&self, report_id: i64, user_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::add_reporter(&conn, report_id, user_id)
    }

    async fn report_for_post(&self, post_id: &str) -> Result<Option<Report>, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::report_for_post(&conn, post_id)
    }

    async fn reports_for_community(&self, community_id: &str) -> Result<Vec<Report>, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::reports_for_community(&conn, community_id)
    }

    async fn delete_reports_for_post(&self, post_id: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::delete_reports_for_post(&conn, post_id)
    }

    async fn delete_report(&self, report_id: i64) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        super::queries::delete_report(&conn, report_id)
    }
}
