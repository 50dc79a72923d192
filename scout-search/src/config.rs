//! Provider and extractor configuration with sensible defaults.
//!
//! [`SearchConfig`] controls endpoints, credentials, result counts and
//! timeouts for the search providers. [`ExtractConfig`] controls page
//! fetching. Endpoints are configurable so tests can point providers at
//! a local mock server.

use crate::error::SearchError;

/// Google Custom Search JSON API endpoint.
pub const GOOGLE_CSE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
/// arXiv Atom query endpoint.
pub const ARXIV_ENDPOINT: &str = "https://export.arxiv.org/api/query";
/// Semantic Scholar Graph API paper search endpoint.
pub const SEMANTIC_SCHOLAR_ENDPOINT: &str =
    "https://api.semanticscholar.org/graph/v1/paper/search";

/// Configuration for the search providers.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of results a provider returns.
    pub max_results: usize,
    /// Web search HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Academic index HTTP timeout in seconds.
    pub academic_timeout_seconds: u64,
    /// Maximum snippet length in characters.
    pub snippet_max_chars: usize,
    /// Google API key. Empty means unconfigured.
    pub google_api_key: String,
    /// Google programmable search engine id. Empty means unconfigured.
    pub google_cse_id: String,
    /// Google Custom Search endpoint.
    pub google_endpoint: String,
    /// arXiv query endpoint.
    pub arxiv_endpoint: String,
    /// Semantic Scholar paper search endpoint.
    pub semantic_scholar_endpoint: String,
    /// Custom User-Agent string. If `None`, a browser User-Agent is rotated.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            timeout_seconds: 20,
            academic_timeout_seconds: 15,
            snippet_max_chars: 500,
            google_api_key: String::new(),
            google_cse_id: String::new(),
            google_endpoint: GOOGLE_CSE_ENDPOINT.to_owned(),
            arxiv_endpoint: ARXIV_ENDPOINT.to_owned(),
            semantic_scholar_endpoint: SEMANTIC_SCHOLAR_ENDPOINT.to_owned(),
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration.
    ///
    /// Checks:
    /// - `max_results` must be greater than 0
    /// - both timeouts must be greater than 0
    /// - `snippet_max_chars` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 || self.academic_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.snippet_max_chars == 0 {
            return Err(SearchError::Config(
                "snippet_max_chars must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Returns `true` when both Google credentials are present.
    pub fn has_google_credentials(&self) -> bool {
        !self.google_api_key.trim().is_empty() && !self.google_cse_id.trim().is_empty()
    }
}

/// Configuration for page fetching and text extraction.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Per-page HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum characters of extracted text.
    pub max_content_chars: usize,
    /// Maximum simultaneous fetches in a batch.
    pub max_concurrent: usize,
    /// Custom User-Agent string. If `None`, a browser User-Agent is rotated.
    pub user_agent: Option<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 15,
            max_content_chars: 15_000,
            max_concurrent: 5,
            user_agent: None,
        }
    }
}

impl ExtractConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_concurrent == 0 {
            return Err(SearchError::Config(
                "max_concurrent must be greater than 0".into(),
            ));
        }
        if self.max_content_chars == 0 {
            return Err(SearchError::Config(
                "max_content_chars must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
