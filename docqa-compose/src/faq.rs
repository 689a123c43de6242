//! FAQ generation.

use std::sync::Arc;

use tracing::info;

use crate::config::ComposeConfig;
use crate::error::Result;
use crate::generation::GenerationProvider;
use crate::prompt::{self, truncate_chars};

/// Generates question and answer pairs about a document.
pub struct FaqGenerator {
    generator: Arc<dyn GenerationProvider>,
    config: ComposeConfig,
}

impl FaqGenerator {
    pub fn new(generator: Arc<dyn GenerationProvider>, config: ComposeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { generator, config })
    }

    /// Generate up to `num_questions` FAQ entries as `Q1:`/`A1:` text.
    ///
    /// `num_questions` is clamped to `1..=max_faq_questions`. The prompt is
    /// built from `summary` when given, otherwise from the first
    /// `faq_context_chunks` chunks, and cut to `max_prompt_chars`.
    ///
    /// # Errors
    ///
    /// Propagates generation failures.
    pub async fn generate(
        &self,
        chunks: &[String],
        summary: Option<&str>,
        num_questions: usize,
    ) -> Result<String> {
        let num_questions = num_questions.clamp(1, self.config.max_faq_questions);

        let joined;
        let content = match summary.filter(|s| !s.trim().is_empty()) {
            Some(summary) => summary,
            None => {
                let take = chunks.len().min(self.config.faq_context_chunks);
                joined = chunks[..take].join("\n\n");
                joined.as_str()
            }
        };
        let content = truncate_chars(content, self.config.max_prompt_chars);

        let faq = self.generator.generate(&prompt::faq(content, num_questions)).await?;
        info!(num_questions, from_summary = summary.is_some(), "generated FAQ");
        Ok(faq)
    }
}
