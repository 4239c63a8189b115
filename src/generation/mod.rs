//! Text-generation capability
//!
//! One prompt in, one completion out. No streaming, no conversation state.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Generation response could not be decoded: {0}")]
    Decode(String),

    #[error("Invalid generation endpoint: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("Generation returned no text")]
    EmptyCompletion,
}

/// A single completion request
#[derive(Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub api_key: &'a str,
    pub model: &'a str,
    pub prompt: &'a str,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a single completion; the returned text is passed through verbatim.
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, GenerationError>;
}
