// Unit tests for the moderation gate.
//
// The classifier and category providers are mocked with canned scores
// and invocation counters, which lets these tests pin down the bypass
// toggle (classifier must never be called), the threshold policy, and
// the fail-open/fail-closed behavior on provider outage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use palisade::db::models::ModerationConfig;
use palisade::error::{Error, ProviderError};
use palisade::moderation::categories::{CategoryProvider, ProviderRegistry};
use palisade::moderation::gate::{
    FailPolicy, GateOptions, ModerationGate, RejectReason, Screening,
};
use palisade::moderation::settings::StaticSettings;
use palisade::moderation::traits::{AttributeScores, ToxicityClassifier};

// --- Mocks ---

struct MockClassifier {
    toxicity: f64,
    fail: bool,
    calls: AtomicUsize,
}

impl MockClassifier {
    fn scoring(toxicity: f64) -> Arc<Self> {
        Arc::new(Self {
            toxicity,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            toxicity: 0.0,
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToxicityClassifier for MockClassifier {
    async fn analyze(
        &self,
        _text: &str,
        timeout_ms: u64,
    ) -> Result<AttributeScores, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Timeout(timeout_ms));
        }
        Ok(AttributeScores {
            toxicity: self.toxicity,
            ..Default::default()
        })
    }
}

struct MockProvider {
    name: &'static str,
    spam_score: f64,
    seen_timeout: AtomicUsize,
}

impl MockProvider {
    fn new(name: &'static str, spam_score: f64) -> Arc<Self> {
        Arc::new(Self {
            name,
            spam_score,
            seen_timeout: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CategoryProvider for MockProvider {
    async fn get_categories(
        &self,
        _text: &str,
        timeout_ms: u64,
    ) -> Result<HashMap<String, f64>, ProviderError> {
        self.seen_timeout.store(timeout_ms as usize, Ordering::SeqCst);
        Ok(HashMap::from([("Spam".to_string(), self.spam_score)]))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

fn config(enabled: bool, provider: &str, timeout_ms: u64) -> ModerationConfig {
    ModerationConfig {
        use_perspective_api: enabled,
        category_provider: provider.to_string(),
        request_timeout_ms: timeout_ms,
        updated_at: String::new(),
    }
}

fn mock_registry() -> (ProviderRegistry, Arc<MockProvider>, Arc<MockProvider>, Arc<MockProvider>) {
    let textrazor = MockProvider::new("TextRazor", 0.9);
    let interface = MockProvider::new("InterfaceAPI", 0.7);
    let classifier = MockProvider::new("ClassifierAPI", 0.8);
    let registry = ProviderRegistry::with_providers(
        textrazor.clone(),
        interface.clone(),
        classifier.clone(),
    );
    (registry, textrazor, interface, classifier)
}

fn gate(
    cfg: ModerationConfig,
    classifier: Arc<MockClassifier>,
    options: GateOptions,
) -> ModerationGate {
    let (registry, _, _, _) = mock_registry();
    ModerationGate::new(Arc::new(StaticSettings(cfg)), classifier, registry, options)
}

// ============================================================
// screen — bypass toggle
// ============================================================

#[tokio::test]
async fn toggle_off_accepts_without_invoking_classifier() {
    let classifier = MockClassifier::scoring(0.99);
    let gate = gate(
        config(false, "TextRazor", 5000),
        classifier.clone(),
        GateOptions::default(),
    );

    let result = gate.screen("This is toxic content").await.unwrap();
    assert_eq!(result, Screening::Accept);
    assert_eq!(classifier.call_count(), 0);
}

// ============================================================
// screen — threshold policy
// ============================================================

#[tokio::test]
async fn high_toxicity_is_rejected_as_inappropriate_content() {
    let classifier = MockClassifier::scoring(0.8);
    let gate = gate(
        config(true, "TextRazor", 5000),
        classifier.clone(),
        GateOptions::default(),
    );

    let result = gate.screen("This is toxic content").await.unwrap();
    assert_eq!(
        result,
        Screening::Reject {
            reason: RejectReason::InappropriateContent
        }
    );
    assert_eq!(classifier.call_count(), 1);
}

#[tokio::test]
async fn low_toxicity_is_accepted() {
    let classifier = MockClassifier::scoring(0.1);
    let gate = gate(
        config(true, "TextRazor", 5000),
        classifier,
        GateOptions::default(),
    );

    let result = gate.screen("This is safe content").await.unwrap();
    assert_eq!(result, Screening::Accept);
}

#[tokio::test]
async fn any_monitored_attribute_over_threshold_rejects() {
    struct InsultOnly;

    #[async_trait]
    impl ToxicityClassifier for InsultOnly {
        async fn analyze(
            &self,
            _text: &str,
            _timeout_ms: u64,
        ) -> Result<AttributeScores, ProviderError> {
            Ok(AttributeScores {
                toxicity: 0.05,
                insult: Some(0.95),
                ..Default::default()
            })
        }
    }

    let (registry, _, _, _) = mock_registry();
    let gate = ModerationGate::new(
        Arc::new(StaticSettings(config(true, "TextRazor", 5000))),
        Arc::new(InsultOnly),
        registry,
        GateOptions::default(),
    );

    let result = gate.screen("mild but insulting").await.unwrap();
    assert_eq!(
        result,
        Screening::Reject {
            reason: RejectReason::InappropriateContent
        }
    );
}

#[tokio::test]
async fn custom_threshold_changes_the_verdict() {
    let classifier = MockClassifier::scoring(0.4);

    let strict = gate(
        config(true, "TextRazor", 5000),
        classifier.clone(),
        GateOptions {
            toxicity_threshold: 0.3,
            fail_policy: FailPolicy::Open,
        },
    );
    assert!(matches!(
        strict.screen("text").await.unwrap(),
        Screening::Reject { .. }
    ));

    let lenient = gate(
        config(true, "TextRazor", 5000),
        MockClassifier::scoring(0.4),
        GateOptions {
            toxicity_threshold: 0.6,
            fail_policy: FailPolicy::Open,
        },
    );
    assert_eq!(lenient.screen("text").await.unwrap(), Screening::Accept);
}

// ============================================================
// screen — provider outage
// ============================================================

#[tokio::test]
async fn classifier_outage_fails_open_by_default() {
    let classifier = MockClassifier::failing();
    let gate = gate(
        config(true, "TextRazor", 5000),
        classifier.clone(),
        GateOptions::default(),
    );

    let result = gate.screen("anything").await.unwrap();
    assert_eq!(result, Screening::Accept);
    assert_eq!(classifier.call_count(), 1);
}

#[tokio::test]
async fn classifier_outage_fails_closed_when_configured() {
    let classifier = MockClassifier::failing();
    let gate = gate(
        config(true, "TextRazor", 5000),
        classifier,
        GateOptions {
            toxicity_threshold: 0.5,
            fail_policy: FailPolicy::Closed,
        },
    );

    let result = gate.screen("anything").await.unwrap();
    assert_eq!(
        result,
        Screening::Reject {
            reason: RejectReason::InappropriateContent
        }
    );
}

#[tokio::test]
async fn empty_content_is_a_validation_error() {
    let gate = gate(
        config(true, "TextRazor", 5000),
        MockClassifier::scoring(0.0),
        GateOptions::default(),
    );

    let err = gate.screen("   ").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

// ============================================================
// categorize — provider dispatch
// ============================================================

#[tokio::test]
async fn categorize_dispatches_to_configured_provider() {
    let classifier = MockClassifier::scoring(0.0);
    let (registry, _, _, _) = mock_registry();
    let gate = ModerationGate::new(
        Arc::new(StaticSettings(config(true, "InterfaceAPI", 5000))),
        classifier,
        registry,
        GateOptions::default(),
    );

    let categories = gate.categorize("This is spam content").await.unwrap();
    assert_eq!(categories.get("Spam"), Some(&0.7));
}

#[tokio::test]
async fn categorize_each_named_provider() {
    for (provider, expected) in [("TextRazor", 0.9), ("InterfaceAPI", 0.7), ("ClassifierAPI", 0.8)]
    {
        let (registry, _, _, _) = mock_registry();
        let gate = ModerationGate::new(
            Arc::new(StaticSettings(config(true, provider, 5000))),
            MockClassifier::scoring(0.0),
            registry,
            GateOptions::default(),
        );
        let categories = gate.categorize("This is spam content").await.unwrap();
        assert_eq!(categories.get("Spam"), Some(&expected), "provider {provider}");
    }
}

#[tokio::test]
async fn unknown_provider_id_falls_back_to_textrazor() {
    let (registry, _, _, _) = mock_registry();
    let gate = ModerationGate::new(
        Arc::new(StaticSettings(config(true, "NoSuchService", 5000))),
        MockClassifier::scoring(0.0),
        registry,
        GateOptions::default(),
    );

    let categories = gate.categorize("text").await.unwrap();
    assert_eq!(categories.get("Spam"), Some(&0.9));
}

#[tokio::test]
async fn configured_timeout_reaches_the_provider() {
    let (registry, textrazor, _, _) = mock_registry();
    let gate = ModerationGate::new(
        Arc::new(StaticSettings(config(true, "TextRazor", 3000))),
        MockClassifier::scoring(0.0),
        registry,
        GateOptions::default(),
    );

    gate.categorize("text").await.unwrap();
    assert_eq!(textrazor.seen_timeout.load(Ordering::SeqCst), 3000);
}

#[tokio::test]
async fn categorize_propagates_provider_errors() {
    struct BrokenProvider;

    #[async_trait]
    impl CategoryProvider for BrokenProvider {
        async fn get_categories(
            &self,
            _text: &str,
            timeout_ms: u64,
        ) -> Result<HashMap<String, f64>, ProviderError> {
            Err(ProviderError::Timeout(timeout_ms))
        }

        fn name(&self) -> &'static str {
            "TextRazor"
        }
    }

    let registry = ProviderRegistry::with_providers(
        Arc::new(BrokenProvider),
        MockProvider::new("InterfaceAPI", 0.7),
        MockProvider::new("ClassifierAPI", 0.8),
    );
    let gate = ModerationGate::new(
        Arc::new(StaticSettings(config(true, "TextRazor", 5000))),
        MockClassifier::scoring(0.0),
        registry,
        GateOptions::default(),
    );

    let err = gate.categorize("text").await.unwrap_err();
    assert!(matches!(err, Error::Provider(ProviderError::Timeout(5000))));
}
