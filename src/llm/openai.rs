//! OpenAI-compatible chat completions backend.
//!
//! Works with any server implementing `/v1/chat/completions`:
//! vLLM (`http://localhost:8080/v1`), llama.cpp server, LM Studio, etc.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{clean_output, LanguageModel, ModelHealth};
use crate::config::{LlmConfig, PLACEHOLDER_API_KEY};
use crate::error::{Result, ScoutError};

/// Talks to an OpenAI-compatible server.
pub struct OpenAiCompatibleBackend {
    client: Client,
    /// Server root without a trailing `/v1`.
    root: String,
    api_key: Option<String>,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiCompatibleBackend {
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

        let key = config.vllm_api_key.trim();
        let api_key = (!key.is_empty() && key != PLACEHOLDER_API_KEY).then(|| key.to_owned());

        Ok(Self {
            client,
            root: api_root(&config.vllm_base_url),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

/// Normalise a base URL so `/v1/...` paths can be appended.
fn api_root(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    trimmed.strip_suffix("/v1").unwrap_or(trimmed).to_owned()
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    #[serde(default)]
    id: String,
}

#[async_trait]
impl LanguageModel for OpenAiCompatibleBackend {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn model_identifier(&self) -> &str {
        &self.model
    }

    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.root);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        let resp = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoutError::Llm(format!("chat completion request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(ScoutError::Llm(format!(
                "chat completion returned {status}: {body_text}"
            )));
        }

        let completion: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| ScoutError::Llm(format!("invalid chat completion response: {e}")))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ScoutError::Llm("chat completion had no content".into()))?;

        Ok(clean_output(&content))
    }

    async fn health_check(&self) -> Result<ModelHealth> {
        let url = format!("{}/v1/models", self.root);
        let health = match self.authorize(self.client.get(&url)).send().await {
            Ok(resp) if resp.status().is_success() => {
                let models: ModelsResponse = resp
                    .json()
                    .await
                    .unwrap_or(ModelsResponse { data: vec![] });
                let served = models.data.iter().any(|m| m.id == self.model);
                ModelHealth {
                    healthy: true,
                    message: if served {
                        format!("model '{}' served", self.model)
                    } else {
                        format!("server running but model '{}' not listed", self.model)
                    },
                    model: self.model.clone(),
                }
            }
            Ok(resp) => ModelHealth {
                healthy: false,
                message: format!("server returned status {}", resp.status()),
                model: self.model.clone(),
            },
            Err(e) => ModelHealth {
                healthy: false,
                message: format!("cannot reach server at {}: {e}", self.root),
                model: self.model.clone(),
            },
        };
        Ok(health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_root_strips_v1() {
        assert_eq!(api_root("http://localhost:8080/v1"), "http://localhost:8080");
        assert_eq!(api_root("http://localhost:8080/v1/"), "http://localhost:8080");
        assert_eq!(api_root("http://localhost:8080"), "http://localhost:8080");
    }

    #[test]
    fn placeholder_key_sends_no_auth() {
        let backend = OpenAiCompatibleBackend::new(&LlmConfig::default()).expect("backend");
        assert!(backend.api_key.is_none());

        let config = LlmConfig {
            vllm_api_key: "sk-real".into(),
            ..Default::default()
        };
        let backend = OpenAiCompatibleBackend::new(&config).expect("backend");
        assert_eq!(backend.api_key.as_deref(), Some("sk-real"));
    }
}
