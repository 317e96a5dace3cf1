//! Tolerant normalization of raw model output into a [`ModelAnalysis`].
//!
//! Providers are asked for a JSON object but do not reliably produce one:
//! Gemini wraps JSON in markdown fences, both models occasionally rename
//! keys or return scores as floats or strings. Extraction is per-field:
//! whatever parses is kept, whatever doesn't is left absent. A completely
//! unparseable response yields an empty analysis, never an error.

use serde_json::Value;

use crate::models::{ModelAnalysis, Sentiment};

/// Parse raw provider text into a normalized analysis plus the JSON object
/// it was extracted from (absent when no JSON could be recovered).
pub fn normalize_response(raw_text: &str) -> (ModelAnalysis, Option<Value>) {
    let candidate = strip_code_fences(raw_text);

    let value: Value = match serde_json::from_str(candidate) {
        Ok(v) => v,
        Err(_) => match extract_json_object(candidate) {
            Some(v) => v,
            None => {
                tracing::debug!(len = raw_text.len(), "model response contained no JSON object");
                return (ModelAnalysis::default(), None);
            }
        },
    };

    if !value.is_object() {
        return (ModelAnalysis::default(), None);
    }

    let analysis = ModelAnalysis {
        summary: string_field(&value, &["summary"]),
        overall_sentiment: string_field(&value, &["overall_sentiment", "sentiment"])
            .map(|s| s.parse::<Sentiment>().unwrap_or(Sentiment::Unknown)),
        management_confidence_score: score_field(
            &value,
            &["management_confidence_score", "confidence_score"],
        ),
        evasiveness_score: score_field(&value, &["evasiveness_score", "evasiveness_score_q_a"]),
        key_topics: list_field(&value, &["key_topics", "key_topics_discussed"]),
        red_flags: list_field(&value, &["red_flags", "red_flags_identified"]),
    };

    (analysis, Some(value))
}

/// Strip a surrounding markdown code fence (``` or ```json) if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the fence line
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Last-resort recovery: find the outermost `{...}` span and try to parse it.
/// Handles models that wrap the JSON in prose.
fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(k))
        .find_map(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accept integer, float, or numeric-string scores; clamp to 0..=100.
fn score_field(value: &Value, keys: &[&str]) -> Option<i64> {
    let v = keys.iter().find_map(|k| value.get(k))?;
    let score = if let Some(n) = v.as_i64() {
        n
    } else if let Some(f) = v.as_f64() {
        f.round() as i64
    } else if let Some(s) = v.as_str() {
        s.trim().parse::<f64>().ok()?.round() as i64
    } else {
        return None;
    };
    Some(score.clamp(0, 100))
}

/// Accept an array of strings; non-string entries are skipped.
fn list_field(value: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|k| value.get(k))
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_well_formed_response() {
        let raw = r#"{
            "summary": "Strong quarter with cautious guidance.",
            "overall_sentiment": "Positive",
            "management_confidence_score": 78,
            "evasiveness_score": 35,
            "key_topics": ["revenue growth", "cost structure", "guidance"],
            "red_flags": ["declined to give revenue guidance"]
        }"#;

        let (analysis, value) = normalize_response(raw);
        assert!(value.is_some());
        assert_eq!(
            analysis.summary.as_deref(),
            Some("Strong quarter with cautious guidance.")
        );
        assert_eq!(analysis.overall_sentiment, Some(Sentiment::Positive));
        assert_eq!(analysis.management_confidence_score, Some(78));
        assert_eq!(analysis.evasiveness_score, Some(35));
        assert_eq!(analysis.key_topics.len(), 3);
        assert_eq!(analysis.red_flags.len(), 1);
    }

    #[test]
    fn test_normalize_strips_markdown_fences() {
        let raw = "```json\n{\"summary\": \"ok\", \"overall_sentiment\": \"Neutral\"}\n```";
        let (analysis, value) = normalize_response(raw);
        assert!(value.is_some());
        assert_eq!(analysis.summary.as_deref(), Some("ok"));
        assert_eq!(analysis.overall_sentiment, Some(Sentiment::Neutral));
    }

    #[test]
    fn test_normalize_json_embedded_in_prose() {
        let raw = "Here is the analysis you asked for:\n{\"summary\": \"fine\"}\nHope it helps!";
        let (analysis, _) = normalize_response(raw);
        assert_eq!(analysis.summary.as_deref(), Some("fine"));
    }

    #[test]
    fn test_normalize_tolerates_partial_fields() {
        // Missing summary, float score, garbage sentiment, mixed-type list
        let raw = r#"{
            "overall_sentiment": "somewhat upbeat",
            "management_confidence_score": 81.6,
            "key_topics": ["margins", 42, "churn"]
        }"#;

        let (analysis, _) = normalize_response(raw);
        assert_eq!(analysis.summary, None);
        assert_eq!(analysis.overall_sentiment, Some(Sentiment::Unknown));
        assert_eq!(analysis.management_confidence_score, Some(82));
        assert_eq!(analysis.evasiveness_score, None);
        assert_eq!(analysis.key_topics, vec!["margins", "churn"]);
        assert!(analysis.red_flags.is_empty());
    }

    #[test]
    fn test_normalize_clamps_scores() {
        let raw = r#"{"management_confidence_score": 250, "evasiveness_score": -10}"#;
        let (analysis, _) = normalize_response(raw);
        assert_eq!(analysis.management_confidence_score, Some(100));
        assert_eq!(analysis.evasiveness_score, Some(0));
    }

    #[test]
    fn test_normalize_legacy_key_names() {
        let raw = r#"{
            "evasiveness_score_q_a": 55,
            "key_topics_discussed": ["AI capex"],
            "red_flags_identified": ["vague on timelines"]
        }"#;
        let (analysis, _) = normalize_response(raw);
        assert_eq!(analysis.evasiveness_score, Some(55));
        assert_eq!(analysis.key_topics, vec!["AI capex"]);
        assert_eq!(analysis.red_flags, vec!["vague on timelines"]);
    }

    #[test]
    fn test_normalize_non_json_yields_empty() {
        let (analysis, value) = normalize_response("I cannot analyze this transcript.");
        assert!(value.is_none());
        assert!(analysis.is_empty());
    }

    #[test]
    fn test_normalize_top_level_array_yields_empty() {
        let (analysis, value) = normalize_response("[1, 2, 3]");
        assert!(value.is_none());
        assert!(analysis.is_empty());
    }

    #[test]
    fn test_strip_code_fences_without_language_tag() {
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }
}
