//! Configuration types for the research pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use scout_search::{ExtractConfig, SearchConfig};

use crate::error::{Result, ScoutError};

/// Placeholder API key that OpenAI-compatible local servers accept.
pub const PLACEHOLDER_API_KEY: &str = "EMPTY";

/// Shown in place of secrets when printing configuration.
const REDACTED: &str = "<redacted>";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Language model backend settings.
    pub llm: LlmConfig,
    /// Search provider settings.
    pub search: SearchSettings,
    /// Pipeline limits and thresholds.
    pub research: ResearchConfig,
    /// Result cache settings.
    pub cache: CacheConfig,
}

/// Which language model server to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Ollama's native chat API.
    #[default]
    Ollama,
    /// vLLM or any other OpenAI-compatible server.
    Vllm,
}

impl LlmProvider {
    /// Lowercase name as written in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Vllm => "vllm",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "vllm" | "openai" => Ok(Self::Vllm),
            other => Err(ScoutError::Config(format!("unknown LLM provider: {other}"))),
        }
    }
}

/// Language model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend selection.
    pub provider: LlmProvider,
    /// Ollama server URL.
    pub ollama_base_url: String,
    /// OpenAI-compatible server URL, with or without a trailing `/v1`.
    pub vllm_base_url: String,
    /// Bearer token for the OpenAI-compatible server.
    pub vllm_api_key: String,
    /// Model name passed to the backend.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens to generate per call.
    pub max_tokens: u32,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            ollama_base_url: "http://localhost:11434".to_owned(),
            vllm_base_url: "http://localhost:8080/v1".to_owned(),
            vllm_api_key: PLACEHOLDER_API_KEY.to_owned(),
            model: "llama3:8b".to_owned(),
            temperature: 0.1,
            max_tokens: 4096,
            timeout_seconds: 120,
        }
    }
}

/// Search provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Google Custom Search API key. Empty disables web search.
    pub google_api_key: String,
    /// Google programmable search engine id.
    pub google_cse_id: String,
    /// Upper bound on results requested from any one provider.
    pub max_search_results: usize,
    /// Web search timeout in seconds.
    pub timeout_seconds: u64,
    /// Academic index timeout in seconds.
    pub academic_timeout_seconds: u64,
    /// Custom User-Agent for page fetches.
    pub user_agent: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            google_api_key: String::new(),
            google_cse_id: String::new(),
            max_search_results: 10,
            timeout_seconds: 20,
            academic_timeout_seconds: 15,
            user_agent: None,
        }
    }
}

/// Pipeline limits and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Sources processed at `standard` depth.
    pub max_sources: usize,
    /// Minimum credibility for a source to be kept.
    pub min_credibility: f64,
    /// Threshold retried once when nothing clears `min_credibility`.
    pub fallback_credibility: f64,
    /// Simultaneous page fetches during extraction.
    pub max_concurrent_extractions: usize,
    /// Per-page fetch timeout in seconds.
    pub extraction_timeout_seconds: u64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_sources: 5,
            min_credibility: 0.4,
            fallback_credibility: 0.2,
            max_concurrent_extractions: 5,
            extraction_timeout_seconds: 15,
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached results.
    pub max_entries: u64,
    /// Entry lifetime in hours.
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl_hours: 24,
        }
    }
}

impl ScoutConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ScoutError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize to pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ScoutError::Config(e.to_string()))
    }

    /// Returns the default config file path: `~/.config/scout/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("scout").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("scout")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/scout-config/config.toml")
        }
    }

    /// Resolve the effective configuration.
    ///
    /// Reads `path` if given, else the default path if that file exists,
    /// else starts from defaults. Environment overrides are applied last
    /// and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit or existing file cannot be loaded,
    /// or the final configuration is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if `SCOUT_LLM_PROVIDER` is unrecognised.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if the provider value is unrecognised.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get("SCOUT_LLM_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }
        if let Some(model) = get("SCOUT_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = get("OLLAMA_BASE_URL") {
            self.llm.ollama_base_url = url;
        }
        if let Some(url) = get("VLLM_BASE_URL") {
            self.llm.vllm_base_url = url;
        }
        if let Some(key) = get("VLLM_API_KEY") {
            self.llm.vllm_api_key = key;
        }
        if let Some(key) = get("GOOGLE_API_KEY") {
            self.search.google_api_key = key;
        }
        if let Some(id) = get("GOOGLE_CSE_ID") {
            self.search.google_cse_id = id;
        }
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| -> Result<()> { Err(ScoutError::Config(msg.to_owned())) };

        if self.llm.model.trim().is_empty() {
            return fail("llm.model must not be empty");
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return fail("llm.temperature must be between 0 and 2");
        }
        if self.llm.max_tokens == 0 || self.llm.timeout_seconds == 0 {
            return fail("llm.max_tokens and llm.timeout_seconds must be greater than 0");
        }
        if self.research.max_sources == 0 {
            return fail("research.max_sources must be greater than 0");
        }
        for (name, value) in [
            ("research.min_credibility", self.research.min_credibility),
            ("research.fallback_credibility", self.research.fallback_credibility),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScoutError::Config(format!("{name} must be between 0 and 1")));
            }
        }
        if self.research.max_concurrent_extractions == 0 {
            return fail("research.max_concurrent_extractions must be greater than 0");
        }
        if self.cache.max_entries == 0 || self.cache.ttl_hours == 0 {
            return fail("cache.max_entries and cache.ttl_hours must be greater than 0");
        }

        self.search_config().validate()?;
        self.extract_config().validate()?;
        Ok(())
    }

    /// Settings for the search providers.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            max_results: self.search.max_search_results,
            timeout_seconds: self.search.timeout_seconds,
            academic_timeout_seconds: self.search.academic_timeout_seconds,
            google_api_key: self.search.google_api_key.clone(),
            google_cse_id: self.search.google_cse_id.clone(),
            ..SearchConfig::default()
        }
    }

    /// Settings for page fetching.
    pub fn extract_config(&self) -> ExtractConfig {
        ExtractConfig {
            timeout_seconds: self.research.extraction_timeout_seconds,
            max_concurrent: self.research.max_concurrent_extractions,
            user_agent: self.search.user_agent.clone(),
            ..ExtractConfig::default()
        }
    }

    /// Copy with API keys masked, for display.
    pub fn redacted(&self) -> Self {
        let mask = |value: &str| {
            if value.is_empty() || value == PLACEHOLDER_API_KEY {
                value.to_owned()
            } else {
                REDACTED.to_owned()
            }
        };
        let mut copy = self.clone();
        copy.llm.vllm_api_key = mask(&self.llm.vllm_api_key);
        copy.search.google_api_key = mask(&self.search.google_api_key);
        copy
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_documented_values() {
        let config = ScoutConfig::default();
        assert_eq!(config.llm.provider, LlmProvider::Ollama);
        assert_eq!(config.llm.ollama_base_url, "http://localhost:11434");
        assert_eq!(config.llm.vllm_base_url, "http://localhost:8080/v1");
        assert_eq!(config.llm.vllm_api_key, "EMPTY");
        assert_eq!(config.llm.model, "llama3:8b");
        assert!((config.llm.temperature - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.search.max_search_results, 10);
        assert_eq!(config.research.max_sources, 5);
        assert!((config.research.min_credibility - 0.4).abs() < f64::EPSILON);
        assert!((config.research.fallback_credibility - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.cache.ttl_hours, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ScoutConfig::default();
        config.llm.provider = LlmProvider::Vllm;
        config.llm.model = "qwen2.5:14b".into();
        config.research.max_sources = 7;

        config.save_to_file(&path).unwrap();
        let loaded = ScoutConfig::from_file(&path).unwrap();
        assert_eq!(loaded.llm.provider, LlmProvider::Vllm);
        assert_eq!(loaded.llm.model, "qwen2.5:14b");
        assert_eq!(loaded.research.max_sources, 7);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm]\nprovider = \"vllm\"\n").unwrap();

        let loaded = ScoutConfig::from_file(&path).unwrap();
        assert_eq!(loaded.llm.provider, LlmProvider::Vllm);
        assert_eq!(loaded.llm.model, "llama3:8b");
        assert_eq!(loaded.cache.ttl_hours, 24);
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();
        assert!(matches!(
            ScoutConfig::from_file(&path),
            Err(ScoutError::Config(_))
        ));
    }

    #[test]
    fn from_file_nonexistent_returns_io_error() {
        let result = ScoutConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ScoutError::Io(_))));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = ScoutConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("scout"));
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("SCOUT_LLM_PROVIDER", "vllm"),
            ("SCOUT_LLM_MODEL", "mistral"),
            ("VLLM_BASE_URL", "http://gpu:8000"),
            ("GOOGLE_API_KEY", "key"),
            ("GOOGLE_CSE_ID", "cx"),
            ("OLLAMA_BASE_URL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = ScoutConfig::default();
        config
            .apply_overrides_from(|k| vars.get(k).map(|v| (*v).to_owned()))
            .unwrap();

        assert_eq!(config.llm.provider, LlmProvider::Vllm);
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.llm.vllm_base_url, "http://gpu:8000");
        assert_eq!(config.llm.ollama_base_url, "http://localhost:11434");
        assert!(config.search_config().has_google_credentials());
    }

    #[test]
    fn unknown_provider_rejected() {
        let mut config = ScoutConfig::default();
        let err = config
            .apply_overrides_from(|k| (k == "SCOUT_LLM_PROVIDER").then(|| "gpt-cloud".to_owned()))
            .unwrap_err();
        assert!(err.to_string().contains("gpt-cloud"));
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let mut config = ScoutConfig::default();
        config.research.min_credibility = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_credibility"));
    }

    #[test]
    fn validate_rejects_zero_sources() {
        let mut config = ScoutConfig::default();
        config.research.max_sources = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn redaction_masks_real_keys_only() {
        let mut config = ScoutConfig::default();
        config.search.google_api_key = "secret".into();
        let shown = config.redacted();
        assert_eq!(shown.search.google_api_key, "<redacted>");
        assert_eq!(shown.llm.vllm_api_key, "EMPTY");
        assert!(!shown.to_toml().unwrap().contains("secret"));
    }

    #[test]
    fn derived_search_and_extract_configs() {
        let mut config = ScoutConfig::default();
        config.research.max_concurrent_extractions = 3;
        config.search.user_agent = Some("TestAgent/1.0".into());
        assert_eq!(config.extract_config().max_concurrent, 3);
        assert_eq!(config.extract_config().user_agent.as_deref(), Some("TestAgent/1.0"));
        assert_eq!(config.search_config().max_results, 10);
    }
}
