use docqa_rag::RagError;
use thiserror::Error;

/// Errors from text generation and the composers built on it.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The generation backend failed or returned an unusable response.
    #[error("Generation error ({provider}): {message}")]
    Generation { provider: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Rag(#[from] RagError),
}

pub type Result<T> = std::result::Result<T, ComposeError>;
