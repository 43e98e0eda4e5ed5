// TextRazor category provider — the default backend.
//
// TextRazor's /analyze endpoint takes form-encoded text and returns
// coarse topic classifications with confidence scores.
//
// API docs: https://www.textrazor.com/docs/rest

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::CategoryProvider;
use crate::error::ProviderError;

const TEXTRAZOR_URL: &str = "https://api.textrazor.com";

pub struct TextRazorProvider {
    client: Client,
    api_key: String,
}

impl TextRazorProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl CategoryProvider for TextRazorProvider {
    async fn get_categories(
        &self,
        text: &str,
        timeout_ms: u64,
    ) -> Result<HashMap<String, f64>, ProviderError> {
        let response = self
            .client
            .post(TEXTRAZOR_URL)
            .header("x-textrazor-key", &self.api_key)
            .timeout(Duration::from_millis(timeout_ms))
            .form(&[("text", text), ("classifiers", "textrazor_newscodes")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(timeout_ms)
                } else {
                    ProviderError::Request(format!("TextRazor call failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Request(format!(
                "TextRazor returned {status}: {body}"
            )));
        }

        let result: TextRazorResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let categories: HashMap<String, f64> = result
            .response
            .coarse_topics
            .unwrap_or_default()
            .into_iter()
            .map(|topic| (topic.label, topic.score))
            .collect();

        debug!(count = categories.len(), "TextRazor categories");
        Ok(categories)
    }

    fn name(&self) -> &'static str {
        "TextRazor"
    }
}

#[derive(Deserialize)]
struct TextRazorResponse {
    response: TextRazorBody,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextRazorBody {
    coarse_topics: Option<Vec<Topic>>,
}

#[derive(Deserialize)]
struct Topic {
    label: String,
    score: f64,
}
