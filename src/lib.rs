// Palisade: contextual login trust and content moderation engine.
//
// This is the library root. Each module corresponds to a major subsystem:
// the context trust engine (anomalous-login detection), the moderation
// gate (toxicity screening and category filtering), and the SQLite-backed
// store they share.

pub mod config;
pub mod db;
pub mod error;
pub mod moderation;
pub mod status;
pub mod trust;
