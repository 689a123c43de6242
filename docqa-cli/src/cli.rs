//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use docqa_compose::{DEFAULT_GENERATION_MODEL, DEFAULT_OLLAMA_URL};
use docqa_rag::{DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL};

#[derive(Debug, Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about PDF and text documents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Maximum characters per chunk
    #[arg(long, global = true, default_value_t = 1200)]
    pub chunk_size: usize,

    /// Characters shared between neighboring chunks
    #[arg(long, global = true, default_value_t = 200)]
    pub overlap: usize,

    /// Chunks retrieved per question
    #[arg(long, global = true, default_value_t = 5)]
    pub top_k: usize,

    /// Ollama server address
    #[arg(long, global = true, env = "DOCQA_OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,

    /// Ollama model used for answers, summaries, and FAQs
    #[arg(long, global = true, env = "DOCQA_MODEL", default_value = DEFAULT_GENERATION_MODEL)]
    pub model: String,

    /// Ollama embedding model
    #[arg(long, global = true, env = "DOCQA_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,

    /// Output size of the embedding model
    #[arg(long, global = true, default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
    pub embedding_dimensions: usize,

    /// Embed with the built-in hashing embedder instead of Ollama
    #[arg(long, global = true)]
    pub offline: bool,

    /// Log filter, e.g. `debug` or `docqa_rag=trace` (defaults to RUST_LOG, then `info`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the chunks a document splits into
    Chunk {
        /// PDF or text file
        file: PathBuf,

        /// Use fixed-size windows instead of structure-aware chunking
        #[arg(long)]
        fixed: bool,
    },

    /// Answer a question about a document
    Ask {
        /// PDF or text file
        file: PathBuf,

        /// The question to answer
        question: String,
    },

    /// Summarize a document
    Summarize {
        /// PDF or text file
        file: PathBuf,
    },

    /// Generate frequently asked questions about a document
    Faq {
        /// PDF or text file
        file: PathBuf,

        /// Number of questions (at most 5)
        #[arg(short = 'n', long, default_value_t = 5)]
        num_questions: usize,

        /// Build the FAQ from a summary instead of the opening chunks
        #[arg(long)]
        from_summary: bool,
    },

    /// Print document statistics as JSON
    Stats {
        /// PDF or text file
        file: PathBuf,
    },

    /// Check that the generation model answers, and print the result as JSON
    Health,
}
