// ClassifierAPI category provider.
//
// Another in-house backend with a label-list response shape:
// POST /classify with the content, get back a list of labels with
// confidences. Flattened here into the common category→score map.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::CategoryProvider;
use crate::error::ProviderError;

pub struct ClassifierApiProvider {
    client: Client,
    base_url: String,
}

impl ClassifierApiProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl CategoryProvider for ClassifierApiProvider {
    async fn get_categories(
        &self,
        text: &str,
        timeout_ms: u64,
    ) -> Result<HashMap<String, f64>, ProviderError> {
        let url = format!("{}/classify", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_millis(timeout_ms))
            .json(&ClassifyRequest { content: text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(timeout_ms)
                } else {
                    ProviderError::Request(format!("ClassifierAPI call failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Request(format!(
                "ClassifierAPI returned {status}: {body}"
            )));
        }

        let result: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(result
            .labels
            .into_iter()
            .map(|l| (l.label, l.confidence))
            .collect())
    }

    fn name(&self) -> &'static str {
        "ClassifierAPI"
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    labels: Vec<Label>,
}

#[derive(Deserialize)]
struct Label {
    label: String,
    confidence: f64,
}
