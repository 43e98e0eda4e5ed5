// Unit tests for report aggregation through the ReportDesk.

use std::sync::Arc;

use rusqlite::Connection;

use palisade::db::schema::create_tables;
use palisade::db::{SqliteStore, Store};
use palisade::error::Error;
use palisade::moderation::ReportDesk;

fn test_store() -> Arc<dyn Store> {
    let conn = Connection::open_in_memory().unwrap();
    create_tables(&conn).unwrap();
    Arc::new(SqliteStore::new(conn))
}

#[tokio::test]
async fn first_report_creates_the_record() {
    let desk = ReportDesk::new(test_store());

    let report = desk
        .report_post("post1", "c1", "u1", "Spam")
        .await
        .unwrap();
    assert_eq!(report.post_id, "post1");
    assert_eq!(report.report_reason, "Spam");
    assert_eq!(report.reported_by, vec!["u1"]);
}

#[tokio::test]
async fn duplicate_report_by_same_user_is_rejected() {
    let store = test_store();
    let desk = ReportDesk::new(store.clone());

    desk.report_post("post1", "c1", "u1", "Offensive").await.unwrap();

    let err = desk
        .report_post("post1", "c1", "u1", "Offensive")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyReported));
    assert_eq!(err.kind(), "alreadyReported");
    assert_eq!(err.to_string(), "You have already reported this post.");

    // The reporter set is unchanged
    let report = store.report_for_post("post1").await.unwrap().unwrap();
    assert_eq!(report.reported_by.len(), 1);
}

#[tokio::test]
async fn second_user_joins_the_reporter_set() {
    let store = test_store();
    let desk = ReportDesk::new(store.clone());

    desk.report_post("post1", "c1", "u1", "Spam").await.unwrap();
    let report = desk.report_post("post1", "c1", "u2", "Spam").await.unwrap();

    assert_eq!(report.reported_by.len(), 2);
    assert!(report.reported_by.contains(&"u2".to_string()));
}

#[tokio::test]
async fn reported_posts_lists_only_the_community() {
    let desk = ReportDesk::new(test_store());

    desk.report_post("post1", "mod-community", "u1", "Toxic").await.unwrap();
    desk.report_post("post2", "other", "u1", "Spam").await.unwrap();

    let reports = desk.reported_posts("mod-community").await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].post_id, "post1");
}

#[tokio::test]
async fn removing_the_post_drops_every_report() {
    let store = test_store();
    let desk = ReportDesk::new(store.clone());

    desk.report_post("post1", "c1", "u1", "Spam").await.unwrap();
    desk.report_post("post1", "c1", "u2", "Spam").await.unwrap();

    assert_eq!(desk.remove_post("post1").await.unwrap(), 1);
    assert!(store.report_for_post("post1").await.unwrap().is_none());

    // Removing again is a no-op
    assert_eq!(desk.remove_post("post1").await.unwrap(), 0);
}

#[tokio::test]
async fn dismiss_deletes_one_report() {
    let store = test_store();
    let desk = ReportDesk::new(store.clone());

    let report = desk.report_post("post1", "c1", "u1", "Spam").await.unwrap();
    desk.dismiss(report.id).await.unwrap();
    assert!(store.report_for_post("post1").await.unwrap().is_none());

    let err = desk.dismiss(report.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn empty_ids_are_a_validation_error() {
    let desk = ReportDesk::new(test_store());

    let err = desk.report_post("", "c1", "u1", "Spam").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
