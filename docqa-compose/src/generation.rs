//! Text generation backends.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{ComposeError, Result};

/// Produces a completion for a prompt.
///
/// Implementations must be `Send + Sync` so one generator can serve
/// concurrent requests.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// A short name for logs and error messages.
    fn name(&self) -> &str;
}

/// A scripted generator for tests and dry runs.
///
/// Returns queued responses in order, then the fallback response. Every
/// prompt it receives is recorded.
#[derive(Debug, Default)]
pub struct MockGenerator {
    fallback: String,
    queued: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
    failure: Option<String>,
}

impl MockGenerator {
    /// A generator that always answers `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self { fallback: response.into(), ..Default::default() }
    }

    /// A generator whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { failure: Some(message.into()), ..Default::default() }
    }

    /// Answer with `responses` in order before falling back.
    pub fn with_responses<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut queued: Vec<String> = responses.into_iter().map(Into::into).collect();
        queued.reverse();
        Self { queued: Mutex::new(queued), ..self }
    }

    /// Every prompt received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl GenerationProvider for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).push(prompt.to_string());

        if let Some(message) = &self.failure {
            return Err(ComposeError::Generation {
                provider: "Mock".to_string(),
                message: message.clone(),
            });
        }

        let next = self.queued.lock().unwrap_or_else(PoisonError::into_inner).pop();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
