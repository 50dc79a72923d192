//! Semantic Scholar Graph API paper search.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::SearchProvider;
use crate::types::{truncate_chars, AcademicIndex, SearchOutcome, Source};

/// Fields requested for each paper.
const FIELDS: &str = "title,abstract,url,authors,year";
/// Paper page used when the API omits a URL.
const PAPER_URL_BASE: &str = "https://www.semanticscholar.org/paper/";
/// Snippet for papers with no abstract.
const NO_ABSTRACT: &str = "No abstract available.";

/// Semantic Scholar citation-graph provider.
pub struct SemanticScholarProvider {
    client: reqwest::Client,
    endpoint: String,
    max_results: usize,
    snippet_max_chars: usize,
}

impl SemanticScholarProvider {
    /// Create a provider returning at most `max_results` papers.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig, max_results: usize) -> Result<Self, SearchError> {
        let client =
            http::build_client(config.academic_timeout_seconds, Some(http::API_USER_AGENT))?;
        Ok(Self {
            client,
            endpoint: config.semantic_scholar_endpoint.clone(),
            max_results,
            snippet_max_chars: config.snippet_max_chars,
        })
    }

    async fn query(&self, query: &str) -> Result<Vec<Source>, SearchError> {
        if self.max_results == 0 {
            return Ok(Vec::new());
        }

        tracing::trace!(query, "Semantic Scholar search");
        let limit = self.max_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query), ("limit", limit.as_str()), ("fields", FIELDS)])
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("Semantic Scholar request failed", &e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited("Semantic Scholar".into()));
        }
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                message: "Semantic Scholar query rejected".into(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("Semantic Scholar response read failed", &e))?;
        parse_papers(&body, self.snippet_max_chars)
    }
}

#[async_trait]
impl SearchProvider for SemanticScholarProvider {
    fn name(&self) -> &str {
        "semantic_scholar"
    }

    async fn search_outcome(&self, query: &str) -> SearchOutcome {
        self.query(query).await.into()
    }
}

#[derive(Debug, Deserialize)]
struct PaperSearchResponse {
    #[serde(default)]
    data: Vec<Paper>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paper {
    #[serde(default)]
    paper_id: String,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    url: Option<String>,
}

pub(crate) fn parse_papers(
    body: &str,
    snippet_max_chars: usize,
) -> Result<Vec<Source>, SearchError> {
    let parsed: PaperSearchResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid Semantic Scholar response: {e}")))?;

    Ok(parsed
        .data
        .into_iter()
        .filter_map(|paper| {
            let url = match paper.url.filter(|u| !u.is_empty()) {
                Some(url) => url,
                None if !paper.paper_id.is_empty() => format!("{PAPER_URL_BASE}{}", paper.paper_id),
                None => return None,
            };
            let title = paper
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_owned());
            let snippet = match paper.abstract_text.filter(|a| !a.is_empty()) {
                Some(text) => truncate_chars(&text, snippet_max_chars, "..."),
                None => NO_ABSTRACT.to_owned(),
            };
            Some(
                Source::new(url, title, snippet)
                    .with_credibility(AcademicIndex::SemanticScholar.prior_credibility()),
            )
        })
        .collect())
}
