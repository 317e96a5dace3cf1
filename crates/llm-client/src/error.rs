use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Model provider unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type LlmResult<T> = Result<T, LlmError>;
