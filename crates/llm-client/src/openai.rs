//! OpenAI chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use analysis_core::{prompt::SYSTEM_PREAMBLE, Provider};

use crate::error::{LlmError, LlmResult};
use crate::AnalysisProvider;

const OPENAI_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 2500;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Clone)]
pub struct ChatGptClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ChatGptClient {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self::with_base_url(api_key, model, OPENAI_BASE.to_string())
    }

    pub fn with_base_url(api_key: String, model: Option<String>, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url,
        }
    }
}

#[async_trait]
impl AnalysisProvider for ChatGptClient {
    fn provider(&self) -> Provider {
        Provider::ChatGpt
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> LlmResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PREAMBLE.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: 0.3,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "calling OpenAI API");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "OpenAI API request failed");
            return Err(LlmError::ServiceUnavailable(format!(
                "Status: {} {}",
                status, body
            )));
        }

        let parsed = response.json::<ChatResponse>().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response_unwrap() {
        let raw = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "{\"summary\": \"ok\"}"}}
            ]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let text = parsed.choices.into_iter().next().map(|c| c.message.content);
        assert_eq!(text.as_deref(), Some("{\"summary\": \"ok\"}"));
    }

    #[test]
    fn test_chat_request_serializes_response_format() {
        let request = ChatRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![],
            max_tokens: 10,
            temperature: 0.3,
            response_format: ResponseFormat {
                format_type: "json_object".into(),
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
    }
}
