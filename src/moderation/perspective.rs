// Google Perspective API implementation.
//
// Perspective analyzes text for toxicity, identity attacks, insults, etc.
// It's free to use but rate-limited to ~1 QPS, so requests go through a
// pacer. The request timeout comes from the live moderation preferences
// and expiry is reported as ProviderError::Timeout — the gate's fail
// policy decides what happens next, never this module.
//
// API docs: https://developers.perspectiveapi.com/s/about-the-api-methods

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::rate_limit::RequestPacer;
use super::traits::{AttributeScores, ToxicityClassifier};
use crate::error::ProviderError;

/// Perspective API toxicity classifier.
pub struct PerspectiveClassifier {
    client: Client,
    api_key: String,
    pacer: RequestPacer,
}

impl PerspectiveClassifier {
    /// Create a new Perspective classifier with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            // Perspective free tier: 1 query per second
            pacer: RequestPacer::new(Duration::from_secs(1)),
        }
    }
}

#[async_trait]
impl ToxicityClassifier for PerspectiveClassifier {
    async fn analyze(&self, text: &str, timeout_ms: u64) -> Result<AttributeScores, ProviderError> {
        // Respect rate limits before making the call
        self.pacer.pace().await;

        let url = format!(
            "https://commentanalyzer.googleapis.com/v1alpha1/comments:analyze?key={}",
            self.api_key
        );

        let request = PerspectiveRequest {
            comment: Comment {
                text: text.to_string(),
            },
            requested_attributes: RequestedAttributes {
                toxicity: AttributeConfig {},
                severe_toxicity: AttributeConfig {},
                identity_attack: AttributeConfig {},
                insult: AttributeConfig {},
                profanity: AttributeConfig {},
                threat: AttributeConfig {},
            },
            languages: vec!["en".to_string()],
        };

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_millis(timeout_ms))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(timeout_ms)
                } else {
                    ProviderError::Request(format!("Perspective API call failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Request(format!(
                "Perspective API returned {status}: {body}"
            )));
        }

        let result: PerspectiveResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let scores = AttributeScores {
            toxicity: extract_score(&result, "TOXICITY").unwrap_or(0.0),
            severe_toxicity: extract_score(&result, "SEVERE_TOXICITY"),
            identity_attack: extract_score(&result, "IDENTITY_ATTACK"),
            insult: extract_score(&result, "INSULT"),
            profanity: extract_score(&result, "PROFANITY"),
            threat: extract_score(&result, "THREAT"),
        };

        debug!(
            toxicity = scores.toxicity,
            severe_toxicity = ?scores.severe_toxicity,
            identity_attack = ?scores.identity_attack,
            text_preview = preview(text),
            "Analyzed text"
        );

        Ok(scores)
    }
}

/// At most 50 bytes of the text for log output, cut on a char boundary
/// so multibyte content can't panic the slice.
fn preview(text: &str) -> &str {
    let mut end = text.len().min(50);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Extract a specific attribute's summary score from the API response.
fn extract_score(response: &PerspectiveResponse, attribute: &str) -> Option<f64> {
    response
        .attribute_scores
        .get(attribute)
        .map(|score| score.summary_score.value)
}

// --- Perspective API request/response types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PerspectiveRequest {
    comment: Comment,
    requested_attributes: RequestedAttributes,
    languages: Vec<String>,
}

#[derive(Serialize)]
struct Comment {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RequestedAttributes {
    toxicity: AttributeConfig,
    severe_toxicity: AttributeConfig,
    identity_attack: AttributeConfig,
    insult: AttributeConfig,
    profanity: AttributeConfig,
    threat: AttributeConfig,
}

#[derive(Serialize)]
struct AttributeConfig {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PerspectiveResponse {
    attribute_scores: std::collections::HashMap<String, AttributeScore>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeScore {
    summary_score: SummaryScore,
}

#[derive(Deserialize)]
struct SummaryScore {
    value: f64,
}
