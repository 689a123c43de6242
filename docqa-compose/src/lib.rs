//! # docqa-compose
//!
//! Generation on top of `docqa-rag` retrieval.
//!
//! - [`AnswerComposer`] answers questions from retrieved context.
//! - [`HierarchicalSummarizer`] summarizes a document section by section.
//! - [`FaqGenerator`] writes question and answer pairs about a document.
//!
//! All three talk to a [`GenerationProvider`]. [`OllamaGenerator`] calls an
//! Ollama server (feature `ollama`, on by default) and [`MockGenerator`]
//! returns scripted responses.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_compose::{AnswerComposer, ComposeConfig, OllamaConfig, OllamaGenerator};
//!
//! let generator = Arc::new(OllamaGenerator::new(OllamaConfig::default())?);
//! let composer = AnswerComposer::new(generator, ComposeConfig::default())?;
//! let answer = composer.answer(&retriever, &chunks, "Who wrote this?").await?;
//! ```

pub mod answer;
pub mod config;
pub mod error;
pub mod faq;
pub mod generation;
pub mod prompt;
pub mod summarize;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use answer::{Answer, AnswerComposer, NO_RELEVANT_INFORMATION};
pub use config::{ComposeConfig, DEFAULT_GENERATION_MODEL, DEFAULT_OLLAMA_URL, OllamaConfig};
pub use error::{ComposeError, Result};
pub use faq::FaqGenerator;
pub use generation::{GenerationProvider, MockGenerator};
pub use summarize::{HierarchicalSummarizer, Summary};

#[cfg(feature = "ollama")]
pub use ollama::OllamaGenerator;
