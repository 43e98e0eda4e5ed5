// Category-filter providers — pluggable spam/category tagging backends.
//
// Each provider implements the same contract: text in, category→score
// map out, bounded by a timeout. Provider selection is a strategy lookup
// on the identifier stored in the moderation preferences; unrecognized
// identifiers fall back to TextRazor.

pub mod classifier_api;
pub mod interface_api;
pub mod textrazor;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::config::Config;
use crate::error::ProviderError;

pub use classifier_api::ClassifierApiProvider;
pub use interface_api::InterfaceApiProvider;
pub use textrazor::TextRazorProvider;

/// Contract shared by every category-filter backend.
#[async_trait]
pub trait CategoryProvider: Send + Sync {
    /// Tag `text` with category scores in [0.0, 1.0], within `timeout_ms`.
    async fn get_categories(
        &self,
        text: &str,
        timeout_ms: u64,
    ) -> Result<HashMap<String, f64>, ProviderError>;

    fn name(&self) -> &'static str;
}

/// The closed set of known providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    TextRazor,
    InterfaceApi,
    ClassifierApi,
}

impl ProviderKind {
    /// Resolve a configured identifier. Unknown identifiers fall back to
    /// TextRazor so a typo in the preferences degrades gracefully instead
    /// of disabling category filtering.
    pub fn from_id(id: &str) -> Self {
        match id {
            "TextRazor" => ProviderKind::TextRazor,
            "InterfaceAPI" => ProviderKind::InterfaceApi,
            "ClassifierAPI" => ProviderKind::ClassifierApi,
            other => {
                warn!(provider = other, "unknown category provider, falling back to TextRazor");
                ProviderKind::TextRazor
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::TextRazor => "TextRazor",
            ProviderKind::InterfaceApi => "InterfaceAPI",
            ProviderKind::ClassifierApi => "ClassifierAPI",
        }
    }
}

/// Strategy table mapping ProviderKind to a live provider instance.
pub struct ProviderRegistry {
    textrazor: Arc<dyn CategoryProvider>,
    interface_api: Arc<dyn CategoryProvider>,
    classifier_api: Arc<dyn CategoryProvider>,
}

impl ProviderRegistry {
    /// Build the production providers from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            textrazor: Arc::new(TextRazorProvider::new(config.textrazor_api_key.clone())),
            interface_api: Arc::new(InterfaceApiProvider::new(config.interface_api_url.clone())),
            classifier_api: Arc::new(ClassifierApiProvider::new(
                config.classifier_api_url.clone(),
            )),
        }
    }

    /// Assemble a registry from explicit instances (tests inject mocks here).
    pub fn with_providers(
        textrazor: Arc<dyn CategoryProvider>,
        interface_api: Arc<dyn CategoryProvider>,
        classifier_api: Arc<dyn CategoryProvider>,
    ) -> Self {
        Self {
            textrazor,
            interface_api,
            classifier_api,
        }
    }

    /// Look up the provider for a configured identifier.
    pub fn select(&self, id: &str) -> Arc<dyn CategoryProvider> {
        match ProviderKind::from_id(id) {
            ProviderKind::TextRazor => self.textrazor.clone(),
            ProviderKind::InterfaceApi => self.interface_api.clone(),
            ProviderKind::ClassifierApi => self.classifier_api.clone(),
        }
    }
}
