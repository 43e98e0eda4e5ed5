// Composition tests — full scenarios across both engines against one
// shared in-memory store, with live preference reads through
// StoreSettings. No network calls; the classifier is mocked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::Connection;

use palisade::db::models::{Fingerprint, ModerationConfig};
use palisade::db::schema::create_tables;
use palisade::db::{SqliteStore, Store};
use palisade::error::ProviderError;
use palisade::moderation::categories::{CategoryProvider, ProviderRegistry};
use palisade::moderation::gate::{GateOptions, ModerationGate, RejectReason, Screening};
use palisade::moderation::settings::StoreSettings;
use palisade::moderation::traits::{AttributeScores, ToxicityClassifier};
use palisade::moderation::ReportDesk;
use palisade::trust::{Classification, TrustEngine};

fn test_store() -> Arc<dyn Store> {
    let conn = Connection::open_in_memory().unwrap();
    create_tables(&conn).unwrap();
    Arc::new(SqliteStore::new(conn))
}

fn fp(browser: &str, os: &str) -> Fingerprint {
    Fingerprint {
        ip: "127.0.0.1".to_string(),
        country: "US".to_string(),
        city: "TestCity".to_string(),
        browser: browser.to_string(),
        platform: "testPlatform".to_string(),
        os: os.to_string(),
        device: "testDevice".to_string(),
        device_type: "Desktop".to_string(),
    }
}

struct ScriptedClassifier {
    score: f64,
    calls: AtomicUsize,
}

#[async_trait]
impl ToxicityClassifier for ScriptedClassifier {
    async fn analyze(
        &self,
        _text: &str,
        _timeout_ms: u64,
    ) -> Result<AttributeScores, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AttributeScores {
            toxicity: self.score,
            ..Default::default()
        })
    }
}

struct SpamProvider;

#[async_trait]
impl CategoryProvider for SpamProvider {
    async fn get_categories(
        &self,
        _text: &str,
        _timeout_ms: u64,
    ) -> Result<HashMap<String, f64>, ProviderError> {
        Ok(HashMap::from([("Spam".to_string(), 0.9)]))
    }

    fn name(&self) -> &'static str {
        "TextRazor"
    }
}

fn store_backed_gate(store: Arc<dyn Store>, score: f64) -> (ModerationGate, Arc<ScriptedClassifier>) {
    let classifier = Arc::new(ScriptedClassifier {
        score,
        calls: AtomicUsize::new(0),
    });
    let registry = ProviderRegistry::with_providers(
        Arc::new(SpamProvider),
        Arc::new(SpamProvider),
        Arc::new(SpamProvider),
    );
    let gate = ModerationGate::new(
        Arc::new(StoreSettings::new(store)),
        classifier.clone(),
        registry,
        GateOptions::default(),
    );
    (gate, classifier)
}

// ============================================================
// Signin lifecycle
// ============================================================

#[tokio::test]
async fn signin_lifecycle_from_new_device_to_block() {
    let store = test_store();
    let engine = TrustEngine::new(store);

    // First-ever signin from F1 bootstraps the trusted context
    let f1 = fp("Chrome 100", "Windows NT");
    assert_eq!(
        engine.classify("u1", "u1@test.com", &f1).await.unwrap(),
        Classification::NoContextData
    );

    // Second signin from F1 matches
    assert_eq!(
        engine.classify("u1", "u1@test.com", &f1).await.unwrap(),
        Classification::Match
    );

    // Three signins from the novel F2 escalate to a block
    let f2 = fp("Firefox 90", "Ubuntu");
    assert_eq!(
        engine.classify("u1", "u1@test.com", &f2).await.unwrap(),
        Classification::Unverified { attempts: 1 }
    );
    assert_eq!(
        engine.classify("u1", "u1@test.com", &f2).await.unwrap(),
        Classification::Unverified { attempts: 2 }
    );
    assert_eq!(
        engine.classify("u1", "u1@test.com", &f2).await.unwrap(),
        Classification::Blocked
    );

    // F1 is unaffected throughout
    assert_eq!(
        engine.classify("u1", "u1@test.com", &f1).await.unwrap(),
        Classification::Match
    );
}

// ============================================================
// Screening driven by stored preferences
// ============================================================

#[tokio::test]
async fn toxic_content_rejected_when_screening_enabled() {
    let store = test_store();
    store
        .save_moderation_config(&ModerationConfig {
            use_perspective_api: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let (gate, _) = store_backed_gate(store, 0.8);
    let result = gate.screen("This is toxic content").await.unwrap();
    assert_eq!(
        result,
        Screening::Reject {
            reason: RejectReason::InappropriateContent
        }
    );
}

#[tokio::test]
async fn safe_content_accepted_when_screening_enabled() {
    let store = test_store();
    store
        .save_moderation_config(&ModerationConfig {
            use_perspective_api: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let (gate, _) = store_backed_gate(store, 0.1);
    assert_eq!(
        gate.screen("This is safe content").await.unwrap(),
        Screening::Accept
    );
}

#[tokio::test]
async fn preference_updates_take_effect_on_the_next_submission() {
    let store = test_store();
    let (gate, classifier) = store_backed_gate(store.clone(), 0.8);

    // Default preferences: screening off, toxic content sails through
    assert_eq!(
        gate.screen("This is toxic content").await.unwrap(),
        Screening::Accept
    );
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);

    // Admin flips the toggle; the same gate now rejects
    store
        .save_moderation_config(&ModerationConfig {
            use_perspective_api: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(matches!(
        gate.screen("This is toxic content").await.unwrap(),
        Screening::Reject { .. }
    ));
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn categorize_uses_the_stored_provider_choice() {
    let store = test_store();
    store
        .save_moderation_config(&ModerationConfig {
            category_provider: "ClassifierAPI".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let (gate, _) = store_backed_gate(store, 0.0);
    let categories = gate.categorize("This is spam content").await.unwrap();
    assert_eq!(categories.get("Spam"), Some(&0.9));
}

// ============================================================
// Report round trip
// ============================================================

#[tokio::test]
async fn report_then_remove_post_leaves_no_reports() {
    let store = test_store();
    let desk = ReportDesk::new(store.clone());

    desk.report_post("post1", "c1", "u1", "Spam").await.unwrap();
    desk.report_post("post1", "c1", "u2", "Spam").await.unwrap();
    assert_eq!(desk.reported_posts("c1").await.unwrap().len(), 1);

    desk.remove_post("post1").await.unwrap();

    assert!(desk.reported_posts("c1").await.unwrap().is_empty());
    assert!(store.report_for_post("post1").await.unwrap().is_none());
}
