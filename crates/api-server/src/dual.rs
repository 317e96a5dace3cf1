//! Dual-model analysis orchestration.
//!
//! One prompt, two independent provider calls issued concurrently. A failed
//! or unparseable side degrades to an error string plus empty fields; the
//! other side is unaffected and the report is still produced. No retries.

use std::sync::Arc;

use serde_json::Value;

use analysis_core::{
    build_analysis_prompt, derive_comparison_notes, normalize_response, ModelAnalysis, Provider,
};
use llm_client::AnalysisProvider;

/// What one provider contributed to a report.
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    pub provider: Provider,
    pub analysis: ModelAnalysis,
    pub model: Option<String>,
    pub error: Option<String>,
    /// Raw provider response; a non-JSON response is kept as a JSON string.
    pub raw_response: Option<Value>,
}

/// Merged result of one dual-analysis run.
#[derive(Debug, Clone)]
pub struct DualAnalysis {
    pub gemini: ProviderOutcome,
    pub chatgpt: ProviderOutcome,
    pub comparison_notes: Option<String>,
}

pub struct DualAnalyzer {
    gemini: Arc<dyn AnalysisProvider>,
    chatgpt: Arc<dyn AnalysisProvider>,
}

impl DualAnalyzer {
    pub fn new(gemini: Arc<dyn AnalysisProvider>, chatgpt: Arc<dyn AnalysisProvider>) -> Self {
        Self { gemini, chatgpt }
    }

    /// Run both providers against the transcript and merge the outcomes.
    pub async fn analyze(
        &self,
        transcript_text: &str,
        custom_instruction: Option<&str>,
    ) -> DualAnalysis {
        let prompt = build_analysis_prompt(transcript_text, custom_instruction);

        let (gemini, chatgpt) = tokio::join!(
            run_provider(self.gemini.as_ref(), &prompt),
            run_provider(self.chatgpt.as_ref(), &prompt),
        );

        let comparison_notes = derive_comparison_notes(&gemini.analysis, &chatgpt.analysis);

        DualAnalysis {
            gemini,
            chatgpt,
            comparison_notes,
        }
    }
}

async fn run_provider(provider: &dyn AnalysisProvider, prompt: &str) -> ProviderOutcome {
    let kind = provider.provider();
    let model = provider.model_name().to_string();

    match provider.generate(prompt).await {
        Ok(text) => {
            let (analysis, raw) = normalize_response(&text);
            let error = if analysis.is_empty() {
                tracing::warn!(provider = %kind, "model response contained no parseable analysis");
                Some("Response contained no parseable analysis.".to_string())
            } else {
                None
            };
            ProviderOutcome {
                provider: kind,
                analysis,
                model: Some(model),
                error,
                raw_response: Some(raw.unwrap_or(Value::String(text))),
            }
        }
        Err(e) => {
            tracing::warn!(provider = %kind, error = %e, "provider call failed");
            ProviderOutcome {
                provider: kind,
                analysis: ModelAnalysis::default(),
                model: Some(model),
                error: Some(e.to_string()),
                raw_response: None,
            }
        }
    }
}
