// Content moderation — toxicity screening and category filtering.
//
// The ToxicityClassifier trait defines the classifier interface;
// PerspectiveClassifier implements it against Google's Perspective API.
// The gate reads live preferences through a SettingsProvider and resolves
// classifier outages through a configurable fail policy instead of
// propagating them. Category filtering dispatches to one of several
// pluggable providers selected by the preferences.

pub mod categories;
pub mod gate;
pub mod perspective;
pub mod rate_limit;
pub mod reports;
pub mod settings;
pub mod traits;

pub use gate::{FailPolicy, GateOptions, ModerationGate, RejectReason, Screening};
pub use reports::ReportDesk;
pub use settings::{SettingsProvider, StoreSettings};
pub use traits::{AttributeScores, ToxicityClassifier};
