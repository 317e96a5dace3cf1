//! Shared domain types for earnings-call analysis.
//!
//! Everything the server, the provider clients, and the store agree on lives
//! here: the sentiment and provider enums, the normalized per-model analysis,
//! prompt construction, and the tolerant parsing of raw model output.

pub mod compare;
pub mod models;
pub mod normalize;
pub mod prompt;

pub use compare::derive_comparison_notes;
pub use models::{ModelAnalysis, Provider, Sentiment};
pub use normalize::normalize_response;
pub use prompt::build_analysis_prompt;
