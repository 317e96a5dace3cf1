use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Overall sentiment read from an earnings call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    /// Model response missing or unparseable.
    Unknown,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Unknown => "Unknown",
        }
    }
}

impl FromStr for Sentiment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "positive" | "bullish" => Self::Positive,
            "negative" | "bearish" => Self::Negative,
            "neutral" | "mixed" => Self::Neutral,
            _ => Self::Unknown,
        })
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// External model provider invoked for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    ChatGpt,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::ChatGpt => "chatgpt",
        }
    }

    /// Human-facing label used in comparison notes.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::ChatGpt => "ChatGPT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Some(Self::Gemini),
            "chatgpt" | "openai" | "gpt" => Some(Self::ChatGpt),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One model's normalized analysis of a transcript.
///
/// Every field is optional: a malformed provider response degrades to the
/// fields that could be extracted, never to a failed report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelAnalysis {
    pub summary: Option<String>,
    pub overall_sentiment: Option<Sentiment>,
    /// 0-100, management confidence read from prepared remarks.
    pub management_confidence_score: Option<i64>,
    /// 0-100, evasiveness in the Q&A section.
    pub evasiveness_score: Option<i64>,
    pub key_topics: Vec<String>,
    pub red_flags: Vec<String>,
}

impl ModelAnalysis {
    /// True when nothing usable was extracted from the provider response.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.overall_sentiment.is_none()
            && self.management_confidence_score.is_none()
            && self.evasiveness_score.is_none()
            && self.key_topics.is_empty()
            && self.red_flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_from_str() {
        assert_eq!("Positive".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!("  negative ".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert_eq!("NEUTRAL".parse::<Sentiment>().unwrap(), Sentiment::Neutral);
        assert_eq!("upbeat".parse::<Sentiment>().unwrap(), Sentiment::Unknown);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!(Provider::from_str("gemini"), Some(Provider::Gemini));
        assert_eq!(Provider::from_str("ChatGPT"), Some(Provider::ChatGpt));
        assert_eq!(Provider::from_str("openai"), Some(Provider::ChatGpt));
        assert_eq!(Provider::from_str("claude"), None);
    }

    #[test]
    fn test_model_analysis_is_empty() {
        assert!(ModelAnalysis::default().is_empty());

        let partial = ModelAnalysis {
            evasiveness_score: Some(40),
            ..Default::default()
        };
        assert!(!partial.is_empty());
    }
}
