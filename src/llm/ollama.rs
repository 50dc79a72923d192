//! Ollama backend using the native chat API.
//!
//! Default endpoint: `http://localhost:11434`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{clean_output, LanguageModel, ModelHealth};
use crate::config::LlmConfig;
use crate::error::{Result, ScoutError};

/// Talks to an Ollama server.
pub struct OllamaBackend {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OllamaBackend {
    /// Create a backend from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ScoutError::Llm(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.ollama_base_url.trim_end_matches('/').to_owned(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    #[serde(default)]
    name: String,
}

#[async_trait]
impl LanguageModel for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model_identifier(&self) -> &str {
        &self.model
    }

    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.endpoint);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoutError::Llm(format!("ollama request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(ScoutError::Llm(format!("ollama returned {status}: {body_text}")));
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ScoutError::Llm(format!("invalid ollama response: {e}")))?;
        let content = chat
            .message
            .map(|m| m.content)
            .ok_or_else(|| ScoutError::Llm("ollama response had no message".into()))?;

        Ok(clean_output(&content))
    }

    async fn health_check(&self) -> Result<ModelHealth> {
        let url = format!("{}/api/tags", self.endpoint);
        let health = match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let tags: TagsResponse = resp
                    .json()
                    .await
                    .unwrap_or(TagsResponse { models: vec![] });
                let has_model = tags.models.iter().any(|m| m.name.starts_with(&self.model));
                ModelHealth {
                    healthy: true,
                    message: if has_model {
                        format!("model '{}' available", self.model)
                    } else {
                        format!(
                            "ollama running but model '{}' not found (available: {})",
                            self.model,
                            tags.models
                                .iter()
                                .map(|m| m.name.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        )
                    },
                    model: self.model.clone(),
                }
            }
            Ok(resp) => ModelHealth {
                healthy: false,
                message: format!("ollama returned status {}", resp.status()),
                model: self.model.clone(),
            },
            Err(e) => ModelHealth {
                healthy: false,
                message: format!("cannot reach ollama at {}: {e}", self.endpoint),
                model: self.model.clone(),
            },
        };
        Ok(health)
    }
}
