//! General web search through the Google Custom Search JSON API.
//!
//! Needs an API key and a programmable search engine id. Without them
//! the provider reports missing credentials and makes no request.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::SearchProvider;
use crate::types::{truncate_chars, SearchOutcome, Source};

/// Google caps a single Custom Search request at 10 results.
const GOOGLE_MAX_PER_REQUEST: usize = 10;

/// Google Custom Search provider.
pub struct GoogleSearchProvider {
    client: reqwest::Client,
    config: SearchConfig,
}

impl GoogleSearchProvider {
    /// Create a provider from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let ua = config.user_agent.as_deref().unwrap_or(http::API_USER_AGENT);
        let client = http::build_client(config.timeout_seconds, Some(ua))?;
        Ok(Self { client, config })
    }

    async fn query(&self, query: &str) -> Result<Vec<Source>, SearchError> {
        if !self.config.has_google_credentials() {
            return Err(SearchError::MissingCredentials(
                "GOOGLE_API_KEY and GOOGLE_CSE_ID must both be set".into(),
            ));
        }

        tracing::trace!(query, "Google search");

        let num = self.config.max_results.min(GOOGLE_MAX_PER_REQUEST).to_string();
        let response = self
            .client
            .get(&self.config.google_endpoint)
            .query(&[
                ("key", self.config.google_api_key.as_str()),
                ("cx", self.config.google_cse_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("Google request failed", &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("Google response read failed", &e))?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited(google_error_message(&body)));
        }
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                message: google_error_message(&body),
            });
        }

        tracing::trace!(bytes = body.len(), "Google response received");
        parse_google_response(&body, self.config.snippet_max_chars)
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn search_outcome(&self, query: &str) -> SearchOutcome {
        self.query(query).await.into()
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    message: String,
}

/// Parse a Custom Search JSON body into sources.
///
/// Items missing a link or a title are skipped.
pub(crate) fn parse_google_response(
    body: &str,
    snippet_max_chars: usize,
) -> Result<Vec<Source>, SearchError> {
    let parsed: GoogleResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid Google response: {e}")))?;

    Ok(parsed
        .items
        .into_iter()
        .filter(|item| !item.link.is_empty() && !item.title.is_empty())
        .map(|item| {
            let snippet = truncate_chars(&item.snippet, snippet_max_chars, "");
            Source::new(item.link, item.title, snippet)
        })
        .collect())
}

/// Pull the human-readable message out of a Google error body.
fn google_error_message(body: &str) -> String {
    serde_json::from_str::<GoogleErrorBody>(body)
        .map(|b| b.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Unknown error".to_owned())
}
