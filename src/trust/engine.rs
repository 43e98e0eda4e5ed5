// The trust engine — fingerprint classification and escalation policy.
//
// Per (user, fingerprint) state machine:
//
//   new -> unverified(1) -> unverified(2) -> blocked
//
// Blocking is terminal until an administrator unblocks. Unblocking does
// not reset the attempt counter, so a blocked device that gets unblocked
// and tries again without being promoted is blocked on sight.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::db::models::Fingerprint;
use crate::db::Store;
use crate::error::Error;

/// How many unverified sightings of the same fingerprint a user gets
/// before it is blocked outright.
pub const MAX_UNVERIFIED_ATTEMPTS: u32 = 3;

/// Outcome of classifying one signin attempt.
///
/// `NoContextData` and `Match` let the signin proceed normally.
/// `Unverified` lets it proceed but signals that a suspicious-login
/// record now exists (the caller typically notifies the user).
/// `Blocked` refuses the signin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// First-ever login; the fingerprint was stored as the user's
    /// first trusted context.
    NoContextData,
    /// The fingerprint matches a known context of this user.
    Match,
    /// Novel fingerprint under escalation, with the current attempt count.
    Unverified { attempts: u32 },
    /// The fingerprint's escalation record is blocked.
    Blocked,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::NoContextData => "no_context_data",
            Classification::Match => "match",
            Classification::Unverified { .. } => "unverified",
            Classification::Blocked => "blocked",
        }
    }
}

/// Stateless classification over the stored context history. Holds only
/// the store handle; clone-cheap via the Arc.
pub struct TrustEngine {
    store: Arc<dyn Store>,
}

impl TrustEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Classify a signin attempt and apply its side effects.
    ///
    /// Side effects: a first-ever login persists the fingerprint as the
    /// user's first trusted context; a novel fingerprint creates or bumps
    /// its suspicious-login record; crossing the attempt limit sets the
    /// blocked flag.
    pub async fn classify(
        &self,
        user_id: &str,
        email: &str,
        fp: &Fingerprint,
    ) -> Result<Classification, Error> {
        if user_id.is_empty() || email.is_empty() {
            return Err(Error::Validation(
                "user id and email are required".to_string(),
            ));
        }

        let contexts = self.store.contexts_for_user(user_id).await?;

        if contexts.is_empty() {
            // First-ever login: this fingerprint becomes the baseline.
            self.store.insert_context(user_id, email, fp, true).await?;
            info!(user_id, "first login, storing initial trusted context");
            return Ok(Classification::NoContextData);
        }

        if contexts.iter().any(|c| c.fingerprint.same_device(fp)) {
            debug!(user_id, "fingerprint matches a known context");
            return Ok(Classification::Match);
        }

        // Novel fingerprint: look up or create its escalation record.
        match self.store.find_suspicious(user_id, fp).await? {
            Some(record) if record.is_blocked => {
                debug!(user_id, record_id = record.id, "fingerprint is blocked");
                Ok(Classification::Blocked)
            }
            Some(record) if record.unverified_attempts >= MAX_UNVERIFIED_ATTEMPTS => {
                // Already over the limit (e.g. unblocked by an admin but
                // never promoted) — re-block without counting again.
                self.store.set_blocked(record.id, true).await?;
                warn!(user_id, record_id = record.id, "re-blocking over-limit fingerprint");
                Ok(Classification::Blocked)
            }
            Some(record) => {
                let attempts = self.store.record_unverified_attempt(record.id).await?;
                if attempts >= MAX_UNVERIFIED_ATTEMPTS {
                    self.store.set_blocked(record.id, true).await?;
                    warn!(
                        user_id,
                        record_id = record.id,
                        attempts,
                        "blocking fingerprint after repeated unverified attempts"
                    );
                    Ok(Classification::Blocked)
                } else {
                    debug!(user_id, record_id = record.id, attempts, "unverified attempt");
                    Ok(Classification::Unverified { attempts })
                }
            }
            None => {
                self.store.insert_suspicious(user_id, email, fp, 1).await?;
                info!(user_id, "new unverified fingerprint recorded");
                Ok(Classification::Unverified { attempts: 1 })
            }
        }
    }

    /// Administratively block a suspicious login. Idempotent.
    pub async fn block(&self, id: i64) -> Result<(), Error> {
        if self.store.set_blocked(id, true).await? {
            Ok(())
        } else {
            Err(Error::NotFound {
                kind: "suspicious login",
                id: id.to_string(),
            })
        }
    }

    /// Administratively unblock a suspicious login. Idempotent; does not
    /// reset the attempt counter.
    pub async fn unblock(&self, id: i64) -> Result<(), Error> {
        if self.store.set_blocked(id, false).await? {
            Ok(())
        } else {
            Err(Error::NotFound {
                kind: "suspicious login",
                id: id.to_string(),
            })
        }
    }

    /// Promote an unverified fingerprint into a trusted context. The
    /// suspicious-login record is consumed. Returns the new context id.
    pub async fn promote(&self, id: i64) -> Result<i64, Error> {
        match self.store.promote_suspicious(id).await? {
            Some(context_id) => {
                info!(record_id = id, context_id, "promoted suspicious login to trusted context");
                Ok(context_id)
            }
            None => Err(Error::NotFound {
                kind: "suspicious login",
                id: id.to_string(),
            }),
        }
    }
}
