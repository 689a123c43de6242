//! Hierarchical document summaries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ComposeConfig;
use crate::error::Result;
use crate::generation::GenerationProvider;
use crate::prompt::{self, truncate_chars};

/// A document summary and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
    /// Number of section summaries that were combined.
    pub sections_processed: usize,
    pub word_count: usize,
}

/// Summarizes a document in two levels: sections of consecutive chunks
/// first, then one pass combining the section summaries.
///
/// Only the first `max_summary_chunks` chunks are read, in groups of
/// `summary_batch_size`. Each group is joined by blank lines and cut to
/// `max_prompt_chars` before it is sent.
pub struct HierarchicalSummarizer {
    generator: Arc<dyn GenerationProvider>,
    config: ComposeConfig,
}

impl HierarchicalSummarizer {
    pub fn new(generator: Arc<dyn GenerationProvider>, config: ComposeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { generator, config })
    }

    /// Summarize `chunks`.
    ///
    /// An empty chunk list yields an empty summary without calling the generator.
    ///
    /// # Errors
    ///
    /// Propagates the first generation failure.
    pub async fn summarize(&self, chunks: &[String]) -> Result<Summary> {
        if chunks.is_empty() {
            return Ok(Summary { text: String::new(), sections_processed: 0, word_count: 0 });
        }

        let considered = &chunks[..chunks.len().min(self.config.max_summary_chunks)];
        let mut section_summaries = Vec::new();
        for (batch, group) in considered.chunks(self.config.summary_batch_size).enumerate() {
            let section = group.join("\n\n");
            let section = truncate_chars(&section, self.config.max_prompt_chars);
            let summary = self.generator.generate(&prompt::section_summary(section)).await?;
            debug!(batch = batch + 1, generator = self.generator.name(), "summarized section");
            section_summaries.push(summary);
        }

        let combined = section_summaries.join("\n\n");
        let text = self.generator.generate(&prompt::combined_summary(&combined)).await?;
        let word_count = text.split_whitespace().count();

        info!(sections = section_summaries.len(), word_count, "summary complete");
        Ok(Summary { text, sections_processed: section_summaries.len(), word_count })
    }
}
