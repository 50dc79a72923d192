//! Language model backends.
//!
//! The pipeline depends only on [`LanguageModel`]: one `generate` call
//! taking a system and a user prompt, plus a model identifier for result
//! metadata. Two HTTP backends are provided:
//! - **Ollama** (default): the native `/api/chat` endpoint.
//! - **OpenAI-compatible**: vLLM, llama.cpp server, LM Studio, etc.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaBackend;
pub use openai::OpenAiCompatibleBackend;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{LlmConfig, LlmProvider};
use crate::error::Result;

/// Health report for a language model backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelHealth {
    /// Whether the server answered.
    pub healthy: bool,
    /// Human-readable detail.
    pub message: String,
    /// Configured model name.
    pub model: String,
}

/// A text-generation backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short backend name (e.g. `"ollama"`).
    fn name(&self) -> &str;

    /// Model name recorded on each research result.
    fn model_identifier(&self) -> &str;

    /// Generate a completion for `user` under the `system` instructions.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Llm`](crate::ScoutError::Llm) if the backend
    /// cannot be reached or answers with an error.
    async fn generate(&self, system: &str, user: &str) -> Result<String>;

    /// Check whether the backend is reachable.
    ///
    /// Unreachable servers are reported as unhealthy, not as errors.
    async fn health_check(&self) -> Result<ModelHealth>;
}

/// Construct the backend selected by `config.provider`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_backend(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>> {
    tracing::info!(
        provider = config.provider.as_str(),
        model = %config.model,
        "configuring language model"
    );
    Ok(match config.provider {
        LlmProvider::Ollama => Arc::new(OllamaBackend::new(config)?),
        LlmProvider::Vllm => Arc::new(OpenAiCompatibleBackend::new(config)?),
    })
}

/// Tidy raw model output: drop `<think>` reasoning and trim.
///
/// An unterminated `<think>` hides everything after it.
pub(crate) fn clean_output(raw: &str) -> String {
    const OPEN: &str = "<think>";
    const CLOSE: &str = "</think>";

    let mut visible = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find(OPEN) {
        visible.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        match after_open.find(CLOSE) {
            Some(end) => rest = &after_open[end + CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    visible.push_str(rest);
    visible.trim().to_owned()
}
