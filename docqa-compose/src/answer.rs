//! Question answering over a document's retriever.

use std::sync::Arc;

use docqa_rag::Retriever;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ComposeConfig;
use crate::error::Result;
use crate::generation::GenerationProvider;
use crate::prompt;
use crate::summarize::{HierarchicalSummarizer, Summary};

/// Returned when neither retrieval nor the document itself offers anything to work with.
pub const NO_RELEVANT_INFORMATION: &str =
    "I couldn't find relevant information in the document to answer your question.";

/// The result of answering a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    /// Generated from retrieved context.
    Grounded { text: String },
    /// No chunk fit the context budget; the document summary is returned instead.
    Summary(Summary),
    /// The document has no chunks.
    NoRelevantInformation,
}

impl Answer {
    pub fn text(&self) -> &str {
        match self {
            Self::Grounded { text } => text,
            Self::Summary(summary) => &summary.text,
            Self::NoRelevantInformation => NO_RELEVANT_INFORMATION,
        }
    }
}

/// Answers questions from the context a [`Retriever`] assembles.
///
/// # Example
///
/// ```rust,ignore
/// let composer = AnswerComposer::new(generator, ComposeConfig::default())?;
/// let answer = composer.answer(&retriever, &chunks, "What is the main finding?").await?;
/// println!("{}", answer.text());
/// ```
pub struct AnswerComposer {
    generator: Arc<dyn GenerationProvider>,
    summarizer: HierarchicalSummarizer,
}

impl AnswerComposer {
    pub fn new(generator: Arc<dyn GenerationProvider>, config: ComposeConfig) -> Result<Self> {
        let summarizer = HierarchicalSummarizer::new(Arc::clone(&generator), config)?;
        Ok(Self { generator, summarizer })
    }

    /// Answer `question` about the document indexed by `retriever`.
    ///
    /// Context is limited to the retriever's `max_context_chars`. When no
    /// context is available the answer falls back to a summary of `chunks`,
    /// or to [`Answer::NoRelevantInformation`] when `chunks` is empty.
    ///
    /// # Errors
    ///
    /// Propagates embedding failures for the question and generation failures.
    pub async fn answer(
        &self,
        retriever: &Retriever,
        chunks: &[String],
        question: &str,
    ) -> Result<Answer> {
        let max_context_chars = retriever.config().max_context_chars;
        match retriever.answer_context(question, max_context_chars).await? {
            Some(context) => {
                debug!(context_chars = context.chars().count(), "assembled answer context");
                let text = self.generator.generate(&prompt::answer(&context, question)).await?;
                info!(generator = self.generator.name(), "answered from retrieved context");
                Ok(Answer::Grounded { text })
            }
            None if chunks.is_empty() => Ok(Answer::NoRelevantInformation),
            None => {
                info!(chunk_count = chunks.len(), "no retrievable context, summarizing instead");
                Ok(Answer::Summary(self.summarizer.summarize(chunks).await?))
            }
        }
    }
}
