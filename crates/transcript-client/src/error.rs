use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Transcript provider unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type TranscriptResult<T> = Result<T, TranscriptError>;
