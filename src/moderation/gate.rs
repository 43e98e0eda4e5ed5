// The moderation gate — decides whether submitted content may proceed.
//
// `screen` reads the live preferences first: with the toxicity toggle
// off it accepts immediately and the classifier is never invoked (the
// bypass switch exists for cost and availability control). With the
// toggle on, the classifier's attribute scores are compared against the
// threshold. Classifier timeouts and failures resolve through the fail
// policy — they are a first-class outcome here, never an error the
// submitting user sees.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::categories::ProviderRegistry;
use super::settings::SettingsProvider;
use super::traits::ToxicityClassifier;
use crate::config::DEFAULT_TOXICITY_THRESHOLD;
use crate::error::Error;

/// What `screen` does when the classifier is unavailable.
///
/// Open accepts (availability over the odd missed toxic item), Closed
/// rejects. The default is open; deployments pick via configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPolicy {
    Open,
    Closed,
}

/// Gate tuning — threshold calibration and outage policy.
pub struct GateOptions {
    /// A monitored attribute score above this rejects the content.
    pub toxicity_threshold: f64,
    pub fail_policy: FailPolicy,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            toxicity_threshold: DEFAULT_TOXICITY_THRESHOLD,
            fail_policy: FailPolicy::Open,
        }
    }
}

/// Machine-readable rejection reason, serialized for the caller's
/// response body (`{"type": "inappropriateContent"}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    InappropriateContent,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::InappropriateContent => "inappropriateContent",
        }
    }
}

/// Outcome of screening one piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screening {
    Accept,
    Reject { reason: RejectReason },
}

/// The content-acceptance decision point. Stateless: preferences come
/// from the injected SettingsProvider on every call.
pub struct ModerationGate {
    settings: Arc<dyn SettingsProvider>,
    classifier: Arc<dyn ToxicityClassifier>,
    providers: ProviderRegistry,
    options: GateOptions,
}

impl ModerationGate {
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        classifier: Arc<dyn ToxicityClassifier>,
        providers: ProviderRegistry,
        options: GateOptions,
    ) -> Self {
        Self {
            settings,
            classifier,
            providers,
            options,
        }
    }

    /// Decide whether `content` may proceed to persistence.
    pub async fn screen(&self, content: &str) -> Result<Screening, Error> {
        if content.trim().is_empty() {
            return Err(Error::Validation("content must not be empty".to_string()));
        }

        let config = self.settings.current().await?;
        if !config.use_perspective_api {
            debug!("toxicity screening disabled, accepting without analysis");
            return Ok(Screening::Accept);
        }

        match self
            .classifier
            .analyze(content, config.request_timeout_ms)
            .await
        {
            Ok(scores) => {
                if let Some((attribute, score)) = scores.worst_over(self.options.toxicity_threshold)
                {
                    warn!(attribute, score, "content rejected by toxicity screening");
                    Ok(Screening::Reject {
                        reason: RejectReason::InappropriateContent,
                    })
                } else {
                    debug!(toxicity = scores.toxicity, "content accepted");
                    Ok(Screening::Accept)
                }
            }
            Err(e) => match self.options.fail_policy {
                FailPolicy::Open => {
                    warn!(error = %e, "classifier unavailable, failing open");
                    Ok(Screening::Accept)
                }
                FailPolicy::Closed => {
                    warn!(error = %e, "classifier unavailable, failing closed");
                    Ok(Screening::Reject {
                        reason: RejectReason::InappropriateContent,
                    })
                }
            },
        }
    }

    /// Tag content with category scores via the configured provider.
    ///
    /// Unlike `screen`, the provider result is the whole point here, so
    /// provider failures propagate to the caller.
    pub async fn categorize(&self, content: &str) -> Result<HashMap<String, f64>, Error> {
        if content.trim().is_empty() {
            return Err(Error::Validation("content must not be empty".to_string()));
        }

        let config = self.settings.current().await?;
        let provider = self.providers.select(&config.category_provider);
        debug!(provider = provider.name(), "categorizing content");

        let categories = provider
            .get_categories(content, config.request_timeout_ms)
            .await?;
        Ok(categories)
    }
}
