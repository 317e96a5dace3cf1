//! HTTP clients for the two hosted model providers.
//!
//! Each client implements [`AnalysisProvider`], which takes a fully built
//! prompt and returns the model's raw text. Normalizing that text into a
//! structured analysis is `analysis-core`'s job; this crate only does
//! transport and response unwrapping.

pub mod error;
pub mod gemini;
pub mod openai;

pub use error::{LlmError, LlmResult};
pub use gemini::GeminiClient;
pub use openai::ChatGptClient;

use analysis_core::Provider;
use async_trait::async_trait;

/// A model provider that can analyze a transcript prompt.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    fn provider(&self) -> Provider;

    fn model_name(&self) -> &str;

    /// Send the prompt and return the model's raw text response.
    async fn generate(&self, prompt: &str) -> LlmResult<String>;
}
