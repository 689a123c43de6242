//! Configuration for composers and the Ollama generator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ComposeError, Result};

/// The default Ollama generation model.
pub const DEFAULT_GENERATION_MODEL: &str = "llama3";

/// The default Ollama server address.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Limits applied when building prompts from document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Chunks per section summary.
    pub summary_batch_size: usize,
    /// Only this many leading chunks are summarized.
    pub max_summary_chunks: usize,
    /// Document text inserted into a single prompt is cut to this many characters.
    pub max_prompt_chars: usize,
    /// Upper bound on generated FAQ entries.
    pub max_faq_questions: usize,
    /// Leading chunks used for FAQs when no summary is available.
    pub faq_context_chunks: usize,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            summary_batch_size: 5,
            max_summary_chunks: 20,
            max_prompt_chars: 2000,
            max_faq_questions: 5,
            faq_context_chunks: 3,
        }
    }
}

impl ComposeConfig {
    /// Check that every limit is non-zero.
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("summary_batch_size", self.summary_batch_size),
            ("max_summary_chunks", self.max_summary_chunks),
            ("max_prompt_chars", self.max_prompt_chars),
            ("max_faq_questions", self.max_faq_questions),
            ("faq_context_chunks", self.faq_context_chunks),
        ];
        match limits.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => {
                Err(ComposeError::InvalidConfig(format!("{name} must be greater than zero")))
            }
            None => Ok(()),
        }
    }
}

/// Connection settings for an Ollama server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_GENERATION_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl OllamaConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
