//! Text-generation backend contract and implementations.
//!
//! The aggregator consumes generation through the narrow
//! [`TextGenerationBackend`] trait: one prompt in, one generated string out.
//! Implementations are swappable without touching segmentation or
//! aggregation logic.

pub mod ollama;

#[cfg(test)]
pub mod mock;

pub use ollama::{OllamaBackend, OllamaConfig};

use async_trait::async_trait;
use thiserror::Error;

/// Errors a backend call can fail with.
///
/// A failure is signaled distinctly from a successful-but-empty response;
/// callers substitute a fallback sentinel and continue.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The call did not complete within the configured timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The backend endpoint could not be reached.
    #[error("cannot connect to backend at {0}")]
    Connect(String),

    /// The backend answered with a non-success status.
    #[error("backend API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The response could not be sent or decoded.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

/// Narrow prompt-in/text-out capability the aggregator consumes.
#[async_trait]
pub trait TextGenerationBackend: Send + Sync {
    /// Turns one prompt into generated text.
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}
