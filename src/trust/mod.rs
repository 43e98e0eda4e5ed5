// Context trust — anomalous-login detection.
//
// The engine classifies each signin's device fingerprint against the
// user's known contexts and escalates repeated unverified fingerprints
// until they're blocked. All state lives in the store; the engine itself
// is stateless and safe to share across concurrent signins.

pub mod engine;

pub use engine::{Classification, TrustEngine, MAX_UNVERIFIED_ATTEMPTS};
