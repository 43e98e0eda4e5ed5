// Live moderation preferences, as an injected dependency.
//
// The gate never reaches for ambient global state: it asks a
// SettingsProvider for the current preferences on every submission.
// StoreSettings is the production provider — a read-through view of the
// singleton row, so an administrative update takes effect on the very
// next submission (last write wins, no caching window). A caching
// provider can be slotted in later without touching the gate.

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::models::ModerationConfig;
use crate::db::Store;
use crate::error::Error;

#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// The preferences in effect right now.
    async fn current(&self) -> Result<ModerationConfig, Error>;
}

/// Read-through provider backed by the store's singleton config row.
pub struct StoreSettings {
    store: Arc<dyn Store>,
}

impl StoreSettings {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsProvider for StoreSettings {
    async fn current(&self) -> Result<ModerationConfig, Error> {
        Ok(self.store.get_moderation_config().await?)
    }
}

/// Fixed preferences — for tests and one-shot CLI invocations.
pub struct StaticSettings(pub ModerationConfig);

#[async_trait]
impl SettingsProvider for StaticSettings {
    async fn current(&self) -> Result<ModerationConfig, Error> {
        Ok(self.0.clone())
    }
}
