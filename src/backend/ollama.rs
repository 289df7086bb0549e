//! Ollama text-generation backend.
//!
//! Talks to Ollama's `/api/generate` endpoint with a bounded timeout.
//! Timeout, connection, and HTTP-status failures map to distinct
//! [`BackendError`] variants so callers can log them usefully.

use super::{BackendError, TextGenerationBackend};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for the Ollama backend.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Ollama API base URL.
    pub url: String,
    /// Model name, e.g. `mistral:latest`.
    pub model: String,
    /// Generation temperature.
    pub temperature: f32,
    /// Per-call timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "mistral:latest".to_string(),
            temperature: 0.1,
            timeout_seconds: 300,
        }
    }
}

/// Ollama generate API request.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Ollama generate API response.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[allow(dead_code)] // Response field, used for future stream handling
    done: bool,
}

/// Backend talking to a local or remote Ollama instance.
pub struct OllamaBackend {
    config: OllamaConfig,
    http_client: reqwest::Client,
}

impl OllamaBackend {
    /// Creates a backend with a client-level timeout.
    pub fn new(config: OllamaConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }
}

#[async_trait]
impl TextGenerationBackend for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let url = format!("{}/api/generate", self.config.url);

        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
            },
        };

        debug!("Sending generate request ({} prompt chars)", prompt.len());

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    BackendError::Connect(self.config.url.clone())
                } else {
                    BackendError::InvalidResponse(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api { status, body });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(generated.response.trim().to_string())
    }
}
