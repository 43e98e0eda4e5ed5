// Error taxonomy for the trust and moderation engines.
//
// Policy rejections (content refused, duplicate report) are represented
// explicitly so callers can branch on a machine-readable reason instead
// of parsing error strings. Persistence failures are fatal to the request
// that hit them — nothing here retries.

use thiserror::Error;

/// Errors from external classification providers (Perspective API,
/// category-filter services). These never reach the end user directly:
/// the moderation gate resolves them through its configured fail policy,
/// and `categorize` callers surface them as a provider outage.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider request timed out after {0} ms")]
    Timeout(u64),

    #[error("provider request failed: {0}")]
    Request(String),

    #[error("provider returned an unusable response: {0}")]
    Malformed(String),
}

/// Errors from the persistence layer. Wraps rusqlite so the rest of the
/// crate never depends on the backend directly.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level error type for engine operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input rejected before it reaches an engine.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A referenced record (user, post, suspicious login, report) is absent.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// External provider unavailable. Only surfaced by operations where
    /// the provider result is the whole point (`categorize`).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Datastore unavailable — fatal, maps to a 500-equivalent upstream.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// The reporting user is already in the post's reporter set.
    /// A policy rejection, not a fault: maps to HTTP 400 with the
    /// message "You have already reported this post."
    #[error("You have already reported this post.")]
    AlreadyReported,
}

impl Error {
    /// Machine-readable reason tag so callers can branch UI behavior
    /// without inspecting the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validationError",
            Error::NotFound { .. } => "notFound",
            Error::Provider(_) => "providerError",
            Error::Persistence(_) => "persistenceError",
            Error::AlreadyReported => "alreadyReported",
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Persistence(StoreError::Sqlite(e))
    }
}
