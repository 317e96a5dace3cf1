//! Prompt construction for transcript analysis.
//!
//! Both providers receive the same combined prompt so their structured
//! outputs stay comparable.

/// System-level framing sent ahead of the transcript.
pub const SYSTEM_PREAMBLE: &str = "You are a financial analyst AI specializing in dissecting \
earnings call transcripts. Your goal is to provide concise, factual, and insightful analysis, \
identifying sentiment, key topics, and any signs of management spin or evasiveness. Focus on \
the financial implications. Always return your analysis as a JSON object.";

/// Default instruction describing the required structured output.
pub const DEFAULT_INSTRUCTION: &str = "analyze the transcript and respond with a JSON object \
containing the following keys:
- \"summary\": a concise summary of the call (string)
- \"overall_sentiment\": \"Positive\", \"Neutral\", or \"Negative\" (string)
- \"management_confidence_score\": a score from 0 to 100 for management's confidence (integer)
- \"evasiveness_score\": a score from 0 to 100 for evasiveness in Q&A (integer)
- \"key_topics\": a list of 3-5 main topics discussed (array of strings)
- \"red_flags\": a list of specific red flags or evasive phrases identified (array of strings)
Ensure the output is valid JSON.";

/// Combine the transcript with the analysis instruction.
///
/// A caller-supplied instruction replaces the default one; the transcript
/// framing stays the same either way so both providers see identical input.
pub fn build_analysis_prompt(transcript_text: &str, custom_instruction: Option<&str>) -> String {
    let instruction = match custom_instruction {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => DEFAULT_INSTRUCTION,
    };

    format!(
        "Here is an earnings call transcript:\n\n---\n{}\n---\n\nBased on the transcript, {}",
        transcript_text, instruction
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompt_includes_schema_keys() {
        let prompt = build_analysis_prompt("CEO: great quarter.", None);
        assert!(prompt.contains("CEO: great quarter."));
        assert!(prompt.contains("\"overall_sentiment\""));
        assert!(prompt.contains("\"red_flags\""));
    }

    #[test]
    fn test_custom_instruction_replaces_default() {
        let prompt = build_analysis_prompt("text", Some("focus only on guidance"));
        assert!(prompt.contains("focus only on guidance"));
        assert!(!prompt.contains("\"key_topics\""));
    }

    #[test]
    fn test_blank_custom_instruction_falls_back() {
        let prompt = build_analysis_prompt("text", Some("   "));
        assert!(prompt.contains("\"summary\""));
    }
}
