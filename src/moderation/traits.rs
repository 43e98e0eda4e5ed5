// Toxicity classifier trait — the swap-ready abstraction.
//
// PerspectiveClassifier is the production implementation. Tests use a
// mock with canned scores, which also lets them count invocations to
// prove the gate's bypass toggle never touches the classifier.

use async_trait::async_trait;

use crate::error::ProviderError;

/// Per-attribute scores for one piece of text, all in [0.0, 1.0].
/// Not every provider populates every attribute.
#[derive(Debug, Clone, Default)]
pub struct AttributeScores {
    pub toxicity: f64,
    pub severe_toxicity: Option<f64>,
    pub identity_attack: Option<f64>,
    pub insult: Option<f64>,
    pub profanity: Option<f64>,
    pub threat: Option<f64>,
}

impl AttributeScores {
    /// The monitored attributes as (name, score) pairs, skipping the
    /// ones the provider didn't return.
    pub fn monitored(&self) -> Vec<(&'static str, f64)> {
        let mut scores = vec![("toxicity", self.toxicity)];
        for (name, value) in [
            ("severe_toxicity", self.severe_toxicity),
            ("identity_attack", self.identity_attack),
            ("insult", self.insult),
            ("profanity", self.profanity),
            ("threat", self.threat),
        ] {
            if let Some(value) = value {
                scores.push((name, value));
            }
        }
        scores
    }

    /// The highest-scoring attribute over the threshold, if any.
    pub fn worst_over(&self, threshold: f64) -> Option<(&'static str, f64)> {
        self.monitored()
            .into_iter()
            .filter(|(_, score)| *score > threshold)
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Trait for scoring text against moderation attributes. Implementations
/// are async because providers are HTTP APIs; `timeout_ms` bounds the
/// whole request, and expiry surfaces as ProviderError::Timeout rather
/// than a panic or hang.
#[async_trait]
pub trait ToxicityClassifier: Send + Sync {
    async fn analyze(&self, text: &str, timeout_ms: u64) -> Result<AttributeScores, ProviderError>;
}
