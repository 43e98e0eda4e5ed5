// Report aggregation — manual moderation of flagged posts.
//
// One report per post; reporters accumulate as a set. The duplicate
// check rides on the store's set-add semantics, so two identical
// requests racing each other still leave exactly one entry.

use std::sync::Arc;

use tracing::info;

use crate::db::models::Report;
use crate::db::Store;
use crate::error::Error;

pub struct ReportDesk {
    store: Arc<dyn Store>,
}

impl ReportDesk {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Flag a post. Creates the report on first flag; later flags from
    /// new users join the reporter set. The same user flagging twice
    /// gets `Error::AlreadyReported` and the set is unchanged.
    pub async fn report_post(
        &self,
        post_id: &str,
        community_id: &str,
        user_id: &str,
        reason: &str,
    ) -> Result<Report, Error> {
        if post_id.is_empty() || community_id.is_empty() || user_id.is_empty() {
            return Err(Error::Validation(
                "post, community and user ids are required".to_string(),
            ));
        }

        let report_id = self
            .store
            .ensure_report(post_id, community_id, reason)
            .await?;

        if !self.store.add_reporter(report_id, user_id).await? {
            return Err(Error::AlreadyReported);
        }

        info!(post_id, user_id, "post reported");
        self.store
            .report_for_post(post_id)
            .await?
            .ok_or(Error::NotFound {
                kind: "report",
                id: post_id.to_string(),
            })
    }

    /// Reports against posts in a community, newest first.
    pub async fn reported_posts(&self, community_id: &str) -> Result<Vec<Report>, Error> {
        Ok(self.store.reports_for_community(community_id).await?)
    }

    /// A moderator removed the post: drop every report referencing it.
    /// Returns how many reports were deleted.
    pub async fn remove_post(&self, post_id: &str) -> Result<usize, Error> {
        let removed = self.store.delete_reports_for_post(post_id).await?;
        info!(post_id, removed, "reported post removed");
        Ok(removed)
    }

    /// Dismiss a single report without touching the post.
    pub async fn dismiss(&self, report_id: i64) -> Result<(), Error> {
        if self.store.delete_report(report_id).await? {
            Ok(())
        } else {
            Err(Error::NotFound {
                kind: "report",
                id: report_id.to_string(),
            })
        }
    }
}
