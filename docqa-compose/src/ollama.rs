//! Ollama generation provider using the Ollama `/api/generate` endpoint.
//!
//! This module is only available when the `ollama` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::OllamaConfig;
use crate::error::{ComposeError, Result};
use crate::generation::GenerationProvider;

/// A [`GenerationProvider`] backed by a local or remote Ollama server.
///
/// Sends non-streaming requests to `POST {base_url}/api/generate` and returns
/// the trimmed `response` field.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_compose::{OllamaConfig, OllamaGenerator};
///
/// let generator = OllamaGenerator::new(OllamaConfig::default())?;
/// let text = generator.generate("Say hello").await?;
/// ```
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(ComposeError::InvalidConfig("Ollama base URL must not be empty".into()));
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build().map_err(|e| {
            ComposeError::Generation {
                provider: "Ollama".into(),
                message: format!("failed to create HTTP client: {e}"),
            }
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

// ── GenerationProvider implementation ──────────────────────────────

#[async_trait]
impl GenerationProvider for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(provider = "Ollama", model = %self.model, prompt_len = prompt.len(), "generating");

        let request_body = GenerateRequest { model: &self.model, prompt, stream: false };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Ollama", error = %e, "request failed");
                ComposeError::Generation {
                    provider: "Ollama".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);

            error!(provider = "Ollama", %status, "API error");
            return Err(ComposeError::Generation {
                provider: "Ollama".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            error!(provider = "Ollama", error = %e, "failed to parse response");
            ComposeError::Generation {
                provider: "Ollama".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(generated.response.trim().to_string())
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}
