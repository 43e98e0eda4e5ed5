use std::env;

use anyhow::Result;

use crate::moderation::gate::FailPolicy;

/// Default toxicity rejection threshold. Any monitored attribute score
/// above this value rejects the content. Calibration is
/// deployment-specific, so the gate takes it as an option; this is the
/// starting point.
pub const DEFAULT_TOXICITY_THRESHOLD: f64 = 0.5;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    pub db_path: String,
    /// Google Perspective API key — required when toxicity screening
    /// is switched on in the moderation preferences.
    pub perspective_api_key: String,
    /// TextRazor API key (default category-filter provider).
    pub textrazor_api_key: String,
    /// Base URLs for the in-house category-filter services.
    pub interface_api_url: String,
    pub classifier_api_url: String,
    /// What `screen` does when the classifier is unavailable.
    pub fail_policy: FailPolicy,
    /// Rejection threshold for monitored attribute scores.
    pub toxicity_threshold: f64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the provider credentials, which
    /// are validated lazily by the `require_*` helpers.
    pub fn load() -> Result<Self> {
        let fail_policy = match env::var("PALISADE_FAIL_POLICY").as_deref() {
            Ok("closed") => FailPolicy::Closed,
            // "open" or unset both default to fail open
            _ => FailPolicy::Open,
        };

        let toxicity_threshold = match env::var("PALISADE_TOXICITY_THRESHOLD") {
            Ok(v) => v.parse().map_err(|_| {
                anyhow::anyhow!("PALISADE_TOXICITY_THRESHOLD must be a number in [0.0, 1.0]")
            })?,
            Err(_) => DEFAULT_TOXICITY_THRESHOLD,
        };

        Ok(Self {
            db_path: env::var("PALISADE_DB_PATH").unwrap_or_else(|_| "./palisade.db".to_string()),
            perspective_api_key: env::var("PERSPECTIVE_API_KEY").unwrap_or_default(),
            textrazor_api_key: env::var("TEXTRAZOR_API_KEY").unwrap_or_default(),
            interface_api_url: env::var("INTERFACE_API_URL").unwrap_or_default(),
            classifier_api_url: env::var("CLASSIFIER_API_URL").unwrap_or_default(),
            fail_policy,
            toxicity_threshold,
        })
    }

    /// Check that the Perspective API key is configured.
    /// Call this before enabling toxicity screening.
    pub fn require_perspective(&self) -> Result<()> {
        if self.perspective_api_key.is_empty() {
            anyhow::bail!(
                "PERSPECTIVE_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }

    /// Check that the named category-filter provider has its credentials.
    pub fn require_category_provider(&self, provider: &str) -> Result<()> {
        match provider {
            "InterfaceAPI" if self.interface_api_url.is_empty() => {
                anyhow::bail!("INTERFACE_API_URL not set. Add it to your .env file.")
            }
            "ClassifierAPI" if self.classifier_api_url.is_empty() => {
                anyhow::bail!("CLASSIFIER_API_URL not set. Add it to your .env file.")
            }
            // TextRazor (and the fallback) need the TextRazor key
            "InterfaceAPI" | "ClassifierAPI" => Ok(()),
            _ if self.textrazor_api_key.is_empty() => {
                anyhow::bail!("TEXTRAZOR_API_KEY not set. Add it to your .env file.")
            }
            _ => Ok(()),
        }
    }
}
