//! Core types for discovered sources and provider outcomes.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Credibility assigned to a source nobody has scored yet.
pub const DEFAULT_CREDIBILITY: f64 = 0.5;

/// A single candidate document discovered by search and carried through
/// the research pipeline.
///
/// Stages never mutate a shared `Source`; each produces a new version via
/// the `with_*` builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Canonical URL of the document.
    pub url: String,
    /// Title as reported by the search provider.
    pub title: String,
    /// Short excerpt or abstract from the search provider.
    pub snippet: String,
    /// Extracted page text, once the extraction stage has run.
    #[serde(default)]
    pub content: Option<String>,
    /// Heuristic trustworthiness in `[0, 1]`.
    #[serde(default = "default_credibility")]
    pub credibility_score: f64,
    /// Model-written summary, once the summarization stage has run.
    #[serde(default)]
    pub summary: Option<String>,
}

fn default_credibility() -> f64 {
    DEFAULT_CREDIBILITY
}

impl Source {
    /// Create an unscored source with no content or summary.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
            content: None,
            credibility_score: DEFAULT_CREDIBILITY,
            summary: None,
        }
    }

    /// Return a copy carrying `score`, clamped to `[0, 1]`.
    pub fn with_credibility(mut self, score: f64) -> Self {
        self.credibility_score = clamp_unit(score);
        self
    }

    /// Return a copy carrying extracted page text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Return a copy carrying a summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// The best text available for summarization: extracted content,
    /// falling back to the snippet.
    pub fn best_text(&self) -> &str {
        match self.content.as_deref() {
            Some(content) if !content.is_empty() => content,
            _ => &self.snippet,
        }
    }
}

/// Clamp a score into `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// What a single provider call produced.
///
/// Providers report failures here instead of raising them; callers that
/// only want sources use [`SearchOutcome::into_sources`].
#[derive(Debug)]
pub enum SearchOutcome {
    /// At least one source was found.
    Found(Vec<Source>),
    /// The provider answered but had nothing.
    Empty,
    /// The provider failed; the error is kept for logging.
    Failed(SearchError),
}

impl SearchOutcome {
    /// Build `Found` or `Empty` depending on whether `sources` is empty.
    pub fn from_sources(sources: Vec<Source>) -> Self {
        if sources.is_empty() {
            Self::Empty
        } else {
            Self::Found(sources)
        }
    }

    /// Number of sources carried.
    pub fn len(&self) -> usize {
        match self {
            Self::Found(sources) => sources.len(),
            Self::Empty | Self::Failed(_) => 0,
        }
    }

    /// Returns `true` when no sources are carried.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the captured error, if the provider failed.
    pub fn error(&self) -> Option<&SearchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Collapse into a plain list; failures become empty.
    pub fn into_sources(self) -> Vec<Source> {
        match self {
            Self::Found(sources) => sources,
            Self::Empty | Self::Failed(_) => Vec::new(),
        }
    }
}

impl From<crate::error::Result<Vec<Source>>> for SearchOutcome {
    fn from(result: crate::error::Result<Vec<Source>>) -> Self {
        match result {
            Ok(sources) => Self::from_sources(sources),
            Err(err) => Self::Failed(err),
        }
    }
}

/// Curated academic indexes queried by the academic provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcademicIndex {
    /// arXiv preprint server.
    Arxiv,
    /// Semantic Scholar citation graph.
    SemanticScholar,
}

impl AcademicIndex {
    /// Credibility assigned up front to every hit from this index.
    pub fn prior_credibility(&self) -> f64 {
        match self {
            Self::Arxiv => 0.92,
            Self::SemanticScholar => 0.88,
        }
    }
}

/// Truncate `text` to at most `max_chars` characters, appending `marker`
/// when anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut truncated = text[..byte_idx].to_owned();
            truncated.push_str(marker);
            truncated
        }
        None => text.to_owned(),
    }
}
