//! Fallback answer generation through a chat completion API.

mod openai;

pub use self::openai::OpenAiCompleter;

use async_trait::async_trait;

/// Why a completion call produced no answer
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// No API key configured
    #[error("No API key configured for the completion service")]
    MissingCredential,

    /// Network or connection error
    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// Non-success HTTP status from the API
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// The API answered without a choice or without message content
    #[error("Completion returned no content")]
    EmptyResponse,
}

/// Something that turns a question into generated text
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
