//! Page fetching and HTML text extraction.
//!
//! [`ContentExtractor`] downloads a page, strips boilerplate (scripts,
//! styles, navigation, headers and footers), finds the main content
//! area, and returns length-capped readable text. It never fails: fetch
//! and parse problems come back as an in-band `[Error ...]` string that
//! later stages recognise with [`is_extraction_error`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use scraper::{Html, Selector};
use tokio::sync::Semaphore;

use crate::config::ExtractConfig;
use crate::error::{Result, SearchError};
use crate::http;
use crate::types::truncate_chars;

/// Appended when extracted text exceeds the character limit.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";

/// Prefix shared by every extraction failure string.
const ERROR_PREFIX: &str = "[Error";

/// Hosts whose pages are never fetched; the search abstract is used instead.
const ACADEMIC_HOSTS: &[&str] = &["arxiv.org", "semanticscholar.org"];

/// Elements removed, with their content, before text extraction.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe",
];

/// Retrieves raw HTML for a URL.
///
/// The default implementation is [`HttpFetcher`]; tests substitute their
/// own to control latency and failures.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the body of `url`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP with a browser User-Agent.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        let client = http::build_client(config.timeout_seconds, config.user_agent.as_deref())?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::trace!(url, "fetching page");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("page fetch failed", &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                message: url.to_owned(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("page body read failed", &e))
    }
}

/// Turns URLs into readable text.
#[derive(Clone)]
pub struct ContentExtractor {
    fetcher: Arc<dyn PageFetcher>,
    config: ExtractConfig,
}

impl ContentExtractor {
    /// Create an extractor that fetches over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for invalid settings, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ExtractConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(Arc::new(fetcher), config))
    }

    /// Create an extractor over a custom fetcher.
    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>, config: ExtractConfig) -> Self {
        Self { fetcher, config }
    }

    /// Configured batch concurrency.
    pub fn max_concurrent(&self) -> usize {
        self.config.max_concurrent
    }

    /// Fetch `url` and return its readable text.
    ///
    /// Failures are returned as an `[Error ...]` string rather than raised.
    pub async fn extract(&self, url: &str) -> String {
        match self.fetcher.fetch(url).await {
            Ok(html) => extract_text(&html, self.config.max_content_chars),
            Err(err) => {
                tracing::debug!(url, error = %err, "content extraction failed");
                error_text(url, &err)
            }
        }
    }

    /// Extract every URL in `urls`, at most `max_concurrent` at a time.
    ///
    /// All URLs are scheduled up front and the call returns once each has
    /// resolved. The returned map has an entry for every distinct input URL.
    pub async fn extract_batch(
        &self,
        urls: &[String],
        max_concurrent: usize,
    ) -> HashMap<String, String> {
        let semaphore = Semaphore::new(max_concurrent.max(1));

        let tasks = urls.iter().map(|url| {
            let semaphore = &semaphore;
            async move {
                let content = match semaphore.acquire().await {
                    Ok(_permit) => self.extract(url).await,
                    Err(e) => format!("[Error extracting content: {e}]"),
                };
                (url.clone(), content)
            }
        });

        let results: HashMap<String, String> = join_all(tasks).await.into_iter().collect();
        tracing::debug!(
            requested = urls.len(),
            failed = results.values().filter(|c| is_extraction_error(c)).count(),
            "batch extraction finished"
        );
        results
    }
}

/// Render a fetch failure as the in-band sentinel text.
fn error_text(url: &str, err: &SearchError) -> String {
    match err {
        SearchError::Timeout(_) => format!("[Error: Request timed out for {url}]"),
        SearchError::Status { status, .. } => format!("[Error: HTTP {status} for {url}]"),
        other => format!("[Error extracting content: {other}]"),
    }
}

/// Returns `true` if `text` is an extraction failure sentinel.
pub fn is_extraction_error(text: &str) -> bool {
    text.starts_with(ERROR_PREFIX)
}

/// Returns `true` for paper-index URLs whose abstract is already known.
pub fn is_academic_url(url: &str) -> bool {
    ACADEMIC_HOSTS.iter().any(|host| url.contains(host))
}

/// Reduce raw HTML to readable text of at most `max_chars` characters.
///
/// Returns an empty string when the page has no text content.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let cleaned_html = strip_boilerplate_tags(html);
    let document = Html::parse_document(&cleaned_html);
    let text = normalise_whitespace(&extract_main_text(&document));
    truncate_chars(&text, max_chars, TRUNCATION_MARKER)
}

/// Extract text from the main content area of the document.
///
/// Tries content-specific selectors in priority order, falling back to `<body>`.
fn extract_main_text(document: &Html) -> String {
    let content_selectors = ["article", "main", "[role=\"main\"]", "body"];

    for selector_str in &content_selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect::<Vec<_>>().join(" ");
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_owned();
            }
        }
    }

    String::new()
}

fn strip_boilerplate_tags(html: &str) -> String {
    BOILERPLATE_TAGS
        .iter()
        .fold(html.to_owned(), |acc, tag| strip_tag(&acc, tag))
}

/// Remove all instances of a specific HTML tag and its content.
fn strip_tag(html: &str, tag: &str) -> String {
    let mut result = String::with_capacity(html.len());
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let open_tag = format!("<{tag}");
    let close_tag = format!("</{tag}>");

    let mut pos = 0;
    loop {
        let start = match lower[pos..].find(&open_tag) {
            Some(offset) => pos + offset,
            None => {
                result.push_str(&html[pos..]);
                break;
            }
        };

        // Skip lookalikes such as <navigate> when stripping <nav>.
        let after_tag = start + open_tag.len();
        if after_tag < lower.len() {
            let next_byte = lower.as_bytes()[after_tag];
            if !matches!(next_byte, b' ' | b'>' | b'/' | b'\n' | b'\r' | b'\t') {
                result.push_str(&html[pos..after_tag]);
                pos = after_tag;
                continue;
            }
        }

        result.push_str(&html[pos..start]);

        let end = match lower[start..].find(&close_tag) {
            Some(offset) => start + offset + close_tag.len(),
            None => match lower[start..].find('>') {
                Some(offset) => start + offset + 1,
                None => html.len(),
            },
        };

        pos = end;
    }

    result
}

/// Collapse excess whitespace: multiple spaces become one, 3+ newlines become 2.
fn normalise_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_space = false;
    let mut newline_count: u32 = 0;

    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            newline_count += 1;
            prev_was_space = false;
            if newline_count <= 2 {
                result.push('\n');
            }
        } else if ch.is_whitespace() {
            newline_count = 0;
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            newline_count = 0;
            prev_was_space = false;
            result.push(ch);
        }
    }

    result
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}
