//! arXiv preprint search through the public Atom API.
//!
//! The feed is scanned with plain string matching; only `id`, `title`
//! and `summary` are needed from each entry.

use async_trait::async_trait;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::SearchProvider;
use crate::types::{truncate_chars, AcademicIndex, SearchOutcome, Source};

/// arXiv preprint provider.
pub struct ArxivProvider {
    client: reqwest::Client,
    endpoint: String,
    max_results: usize,
    snippet_max_chars: usize,
}

impl ArxivProvider {
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
            endpoint: config.arxiv_endpoint.clone(),
            max_results,
            snippet_max_chars: config.snippet_max_chars,
        })
    }

    async fn query(&self, query: &str) -> Result<Vec<Source>, SearchError> {
        if self.max_results == 0 {
            return Ok(Vec::new());
        }

        let url = build_search_url(&self.endpoint, query, self.max_results);
        tracing::trace!(%url, "arXiv search");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("arXiv request failed", &e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited("arXiv".into()));
        }
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                message: "arXiv query rejected".into(),
            });
        }

        let xml = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("arXiv response read failed", &e))?;

        Ok(parse_atom_feed(&xml, self.snippet_max_chars))
    }
}

#[async_trait]
impl SearchProvider for ArxivProvider {
    fn name(&self) -> &str {
        "arxiv"
    }

    async fn search_outcome(&self, query: &str) -> SearchOutcome {
        self.query(query).await.into()
    }
}

/// Build a relevance-sorted query URL.
pub(crate) fn build_search_url(endpoint: &str, query: &str, max_results: usize) -> String {
    format!(
        "{endpoint}?search_query={}&start=0&max_results={max_results}&sortBy=relevance&sortOrder=descending",
        urlencoding::encode(&format!("all:{query}")),
    )
}

/// Parse an Atom feed into pre-scored sources.
///
/// Entries without an id or title are skipped.
pub(crate) fn parse_atom_feed(xml: &str, snippet_max_chars: usize) -> Vec<Source> {
    extract_entries(xml)
        .into_iter()
        .filter_map(|entry| {
            let url = extract_tag_text(entry, "id").filter(|id| !id.is_empty())?;
            let title = normalize_whitespace(&extract_tag_text(entry, "title")?);
            if title.is_empty() {
                return None;
            }
            let summary =
                normalize_whitespace(&extract_tag_text(entry, "summary").unwrap_or_default());
            let snippet = truncate_chars(&summary, snippet_max_chars, "...");
            Some(
                Source::new(url, title, snippet)
                    .with_credibility(AcademicIndex::Arxiv.prior_credibility()),
            )
        })
        .collect()
}

/// All `<entry>...</entry>` blocks in document order.
fn extract_entries(xml: &str) -> Vec<&str> {
    const START: &str = "<entry>";
    const END: &str = "</entry>";

    let mut entries = Vec::new();
    let mut search_from = 0;
    while let Some(pos) = xml[search_from..].find(START) {
        let start = search_from + pos;
        let Some(len) = xml[start..].find(END) else {
            break;
        };
        let end = start + len + END.len();
        entries.push(&xml[start..end]);
        search_from = end;
    }
    entries
}

/// Text of the first `<tag ...>text</tag>`, trimmed and entity-decoded.
fn extract_tag_text(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let start_pos = xml.find(&open)?;
    let content_start = xml[start_pos..].find('>')? + start_pos + 1;
    let content_end = xml[content_start..].find(&close)? + content_start;

    Some(decode_entities(xml[content_start..content_end].trim()))
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
