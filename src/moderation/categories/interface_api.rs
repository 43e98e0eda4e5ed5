// InterfaceAPI category provider — in-house tagging service.
//
// Speaks a plain JSON contract: POST /categories with the text, get
// back a flat category→score map. The base URL comes from
// INTERFACE_API_URL.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::CategoryProvider;
use crate::error::ProviderError;

pub struct InterfaceApiProvider {
    client: Client,
    base_url: String,
}

impl InterfaceApiProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl CategoryProvider for InterfaceApiProvider {
    async fn get_categories(
        &self,
        text: &str,
        timeout_ms: u64,
    ) -> Result<HashMap<String, f64>, ProviderError> {
        let url = format!("{}/categories", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_millis(timeout_ms))
            .json(&CategoriesRequest { text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(timeout_ms)
                } else {
                    ProviderError::Request(format!("InterfaceAPI call failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Request(format!(
                "InterfaceAPI returned {status}: {body}"
            )));
        }

        let result: CategoriesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(result.categories)
    }

    fn name(&self) -> &'static str {
        "InterfaceAPI"
    }
}

#[derive(Serialize)]
struct CategoriesRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct CategoriesResponse {
    categories: HashMap<String, f64>,
}
