//! Derivation of comparison notes from the two normalized analyses.
//!
//! Notes are computed locally from whatever both sides produced, without a
//! third model call. When neither side returned anything usable there is nothing
//! to compare and the notes are absent.

use crate::models::{ModelAnalysis, Provider, Sentiment};

/// Score deltas below this are reported as broad agreement.
const SCORE_AGREEMENT_MARGIN: i64 = 10;

/// Build free-text comparison notes from the two sides of a report.
pub fn derive_comparison_notes(
    gemini: &ModelAnalysis,
    chatgpt: &ModelAnalysis,
) -> Option<String> {
    match (gemini.is_empty(), chatgpt.is_empty()) {
        (true, true) => return None,
        (false, true) => {
            return Some(only_side_note(Provider::Gemini));
        }
        (true, false) => {
            return Some(only_side_note(Provider::ChatGpt));
        }
        (false, false) => {}
    }

    let mut notes = Vec::new();

    match (gemini.overall_sentiment, chatgpt.overall_sentiment) {
        (Some(g), Some(c)) if g == c && g != Sentiment::Unknown => {
            notes.push(format!("Both models read the call as {}.", g));
        }
        (Some(g), Some(c)) if g != c => {
            notes.push(format!(
                "Sentiment diverges: Gemini sees {}, ChatGPT sees {}.",
                g, c
            ));
        }
        _ => {}
    }

    if let Some(note) = score_note(
        "Management confidence",
        gemini.management_confidence_score,
        chatgpt.management_confidence_score,
    ) {
        notes.push(note);
    }
    if let Some(note) = score_note(
        "Evasiveness",
        gemini.evasiveness_score,
        chatgpt.evasiveness_score,
    ) {
        notes.push(note);
    }

    let shared = shared_topics(&gemini.key_topics, &chatgpt.key_topics);
    if !shared.is_empty() {
        notes.push(format!("Topics flagged by both models: {}.", shared.join(", ")));
    }

    match (gemini.red_flags.len(), chatgpt.red_flags.len()) {
        (0, 0) => {}
        (g, c) => notes.push(format!(
            "Red flags identified: {} by Gemini, {} by ChatGPT.",
            g, c
        )),
    }

    if notes.is_empty() {
        None
    } else {
        Some(notes.join(" "))
    }
}

fn only_side_note(provider: Provider) -> String {
    format!(
        "Only {} returned a usable analysis; no cross-model comparison available.",
        provider.label()
    )
}

fn score_note(label: &str, gemini: Option<i64>, chatgpt: Option<i64>) -> Option<String> {
    let (g, c) = (gemini?, chatgpt?);
    let delta = (g - c).abs();
    if delta <= SCORE_AGREEMENT_MARGIN {
        Some(format!(
            "{} scores broadly agree (Gemini {}, ChatGPT {}).",
            label, g, c
        ))
    } else {
        Some(format!(
            "{} scores differ by {} points (Gemini {}, ChatGPT {}).",
            label, delta, g, c
        ))
    }
}

/// Case-insensitive topic intersection, preserving Gemini's ordering.
fn shared_topics(gemini: &[String], chatgpt: &[String]) -> Vec<String> {
    gemini
        .iter()
        .filter(|t| chatgpt.iter().any(|o| o.eq_ignore_ascii_case(t)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(sentiment: Sentiment, confidence: i64, topics: &[&str]) -> ModelAnalysis {
        ModelAnalysis {
            summary: Some("summary".into()),
            overall_sentiment: Some(sentiment),
            management_confidence_score: Some(confidence),
            evasiveness_score: Some(30),
            key_topics: topics.iter().map(|s| s.to_string()).collect(),
            red_flags: vec![],
        }
    }

    #[test]
    fn test_both_empty_yields_no_notes() {
        let notes = derive_comparison_notes(&ModelAnalysis::default(), &ModelAnalysis::default());
        assert_eq!(notes, None);
    }

    #[test]
    fn test_single_side_noted() {
        let notes = derive_comparison_notes(
            &analysis(Sentiment::Positive, 70, &[]),
            &ModelAnalysis::default(),
        )
        .unwrap();
        assert!(notes.contains("Only Gemini"));

        let notes = derive_comparison_notes(
            &ModelAnalysis::default(),
            &analysis(Sentiment::Neutral, 50, &[]),
        )
        .unwrap();
        assert!(notes.contains("Only ChatGPT"));
    }

    #[test]
    fn test_sentiment_agreement_and_divergence() {
        let agree = derive_comparison_notes(
            &analysis(Sentiment::Positive, 70, &[]),
            &analysis(Sentiment::Positive, 72, &[]),
        )
        .unwrap();
        assert!(agree.contains("Both models read the call as Positive."));

        let diverge = derive_comparison_notes(
            &analysis(Sentiment::Positive, 70, &[]),
            &analysis(Sentiment::Negative, 72, &[]),
        )
        .unwrap();
        assert!(diverge.contains("Sentiment diverges"));
    }

    #[test]
    fn test_score_delta_reported() {
        let notes = derive_comparison_notes(
            &analysis(Sentiment::Neutral, 90, &[]),
            &analysis(Sentiment::Neutral, 55, &[]),
        )
        .unwrap();
        assert!(notes.contains("Management confidence scores differ by 35 points"));
    }

    #[test]
    fn test_shared_topics_case_insensitive() {
        let notes = derive_comparison_notes(
            &analysis(Sentiment::Neutral, 60, &["Guidance", "margins"]),
            &analysis(Sentiment::Neutral, 62, &["guidance", "capex"]),
        )
        .unwrap();
        assert!(notes.contains("Topics flagged by both models: Guidance."));
    }
}
