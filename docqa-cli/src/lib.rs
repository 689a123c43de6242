//! # docqa-cli
//!
//! The `docqa` command: chunk, question, summarize, and inspect PDF or text
//! documents from the terminal.
//!
//! ```text
//! docqa ask report.pdf "What were the main findings?"
//! docqa --offline stats notes.txt
//! docqa chunk --fixed --chunk-size 500 report.pdf
//! docqa health
//! ```

pub mod app;
pub mod cli;
pub mod telemetry;

pub use app::{execute, extractor_for, run};
pub use cli::{Cli, Commands, GlobalArgs};
pub use telemetry::init_tracing;
