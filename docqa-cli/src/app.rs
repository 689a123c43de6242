//! Subcommand execution.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use docqa_compose::{
    AnswerComposer, ComposeConfig, FaqGenerator, GenerationProvider, HierarchicalSummarizer,
    OllamaConfig, OllamaGenerator,
};
use docqa_rag::{
    ChunkingStrategy, EmbeddingProvider, HashingEmbeddingProvider, OllamaEmbeddingProvider,
    PdfTextExtractor, PlainTextExtractor, RagConfig, TextExtractor,
};
use docqa_session::{DocumentIngestor, InMemorySessionStore, Session, SessionStore};
use serde_json::json;
use tracing::{info, warn};

use crate::cli::{Cli, Commands, GlobalArgs};

/// Characters of the first chunk shown by `stats`.
const PREVIEW_CHARS: usize = 200;

/// Prompt sent by `health` to confirm the model answers.
const HEALTH_PROMPT: &str = "Hello";

/// Run `cli` against the Ollama server it names and return the text to print.
pub async fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = OllamaConfig::new(&cli.global.ollama_url).with_model(&cli.global.model);
    let generator = OllamaGenerator::new(config).context("failed to create Ollama generator")?;
    execute(cli, Arc::new(generator)).await
}

/// Run `cli` with an explicit generator and return the text to print.
pub async fn execute(cli: &Cli, generator: Arc<dyn GenerationProvider>) -> anyhow::Result<String> {
    let global = &cli.global;
    let compose_config = ComposeConfig::default();

    match &cli.command {
        Commands::Chunk { file, fixed } => {
            let strategy = if *fixed { ChunkingStrategy::Fixed } else { ChunkingStrategy::Structured };
            let chunker = rag_config(global, strategy)?.chunker()?;

            let text = extract(file).await?;
            let chunks = chunker.chunk(&text);
            info!(chunk_count = chunks.len(), "chunked document");

            let mut out = String::new();
            for (i, chunk) in chunks.iter().enumerate() {
                writeln!(out, "--- chunk {} ({} chars) ---", i + 1, chunk.chars().count())?;
                writeln!(out, "{chunk}")?;
                writeln!(out)?;
            }
            Ok(out)
        }

        Commands::Ask { file, question } => {
            let session = ingest(global, file).await?;
            let retriever =
                session.retriever.as_deref().context("session has no retriever after ingestion")?;
            let composer = AnswerComposer::new(generator, compose_config)?;
            let answer = composer.answer(retriever, &session.chunks, question).await?;
            Ok(format!("{}\n", answer.text()))
        }

        Commands::Summarize { file } => {
            let session = ingest(global, file).await?;
            let summarizer = HierarchicalSummarizer::new(generator, compose_config)?;
            let summary = summarizer.summarize(&session.chunks).await?;
            Ok(format!(
                "{}\n\n({} sections, {} words)\n",
                summary.text, summary.sections_processed, summary.word_count
            ))
        }

        Commands::Faq { file, num_questions, from_summary } => {
            let session = ingest(global, file).await?;
            let summary = if *from_summary {
                let summarizer =
                    HierarchicalSummarizer::new(Arc::clone(&generator), compose_config.clone())?;
                Some(summarizer.summarize(&session.chunks).await?.text)
            } else {
                None
            };
            let faq = FaqGenerator::new(generator, compose_config)?;
            let text = faq.generate(&session.chunks, summary.as_deref(), *num_questions).await?;
            Ok(format!("{text}\n"))
        }

        Commands::Stats { file } => {
            let session = ingest(global, file).await?;
            let report = json!({
                "filename": &session.filename,
                "status": session.status,
                "stats": &session.stats,
                "preview": session.first_chunk_preview(PREVIEW_CHARS),
            });
            Ok(format!("{}\n", serde_json::to_string_pretty(&report)?))
        }

        Commands::Health => {
            let (generator_status, error) = match generator.generate(HEALTH_PROMPT).await {
                Ok(_) => ("healthy", None),
                Err(e) => {
                    warn!(generator = generator.name(), error = %e, "generator health check failed");
                    ("unhealthy", Some(e.to_string()))
                }
            };
            let report = json!({
                "status": "healthy",
                "generator": generator.name(),
                "model": &global.model,
                "generator_status": generator_status,
                "error": error,
            });
            Ok(format!("{}\n", serde_json::to_string_pretty(&report)?))
        }
    }
}

fn rag_config(global: &GlobalArgs, strategy: ChunkingStrategy) -> anyhow::Result<RagConfig> {
    RagConfig::builder()
        .chunk_size(global.chunk_size)
        .chunk_overlap(global.overlap)
        .top_k(global.top_k)
        .strategy(strategy)
        .build()
        .context("invalid chunking options")
}

fn embedding_provider(global: &GlobalArgs) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    if global.offline {
        return Ok(Arc::new(HashingEmbeddingProvider::new(global.embedding_dimensions)?));
    }
    let provider = OllamaEmbeddingProvider::new(&global.ollama_url)?
        .with_model(&global.embedding_model, global.embedding_dimensions);
    Ok(Arc::new(provider))
}

/// PDFs by extension, everything else as UTF-8 text.
pub fn extractor_for(path: &Path) -> Arc<dyn TextExtractor> {
    let is_pdf =
        path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf { Arc::new(PdfTextExtractor) } else { Arc::new(PlainTextExtractor) }
}

async fn extract(path: &Path) -> anyhow::Result<String> {
    let extractor = extractor_for(path);
    let owned = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || extractor.extract_text(&owned))
        .await
        .context("extraction task failed")?
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(text)
}

async fn ingest(global: &GlobalArgs, path: &Path) -> anyhow::Result<Session> {
    let store = Arc::new(InMemorySessionStore::new());
    let ingestor = DocumentIngestor::new(
        store.clone(),
        extractor_for(path),
        embedding_provider(global)?,
        rag_config(global, ChunkingStrategy::Structured)?,
    );

    let filename = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
    let session = store.create(&filename).await?;
    ingestor
        .ingest(&session.id, path)
        .await
        .with_context(|| format!("failed to process {}", path.display()))
}
