//! Research pipeline orchestration.
//!
//! A run moves through fixed stages, announcing each with a progress
//! event before doing the work:
//!
//! ```text
//! search web ─► [search academic] ─► filter ─► extract ─► summarize ─► synthesize
//!    0.1              0.15            0.2       0.3         0.5          0.8      1.0
//! ```
//!
//! The only hard failure is an empty web search. Every later shortfall
//! degrades: the credibility threshold is lowered once, failed pages fall
//! back to their snippet, and a failed summarization batch passes the
//! sources through unsummarized.

use std::collections::HashMap;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::Stream;
use scout_search::{
    filter_sources, is_academic_url, AcademicSearchProvider, ContentExtractor, GoogleSearchProvider,
    SearchProvider, Source,
};

use crate::config::{ResearchConfig, ScoutConfig};
use crate::error::{Result, ScoutError};
use crate::llm::LanguageModel;
use crate::progress::{ResearchEvent, ResearchProgress, ResearchResult, ResearchStatus};
use crate::summarizer::Summarizer;
use crate::synthesizer::Synthesizer;

/// Lazily produced events of one run.
pub type EventStream = Pin<Box<dyn Stream<Item = ResearchEvent> + Send>>;

/// How many sources to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Depth {
    /// Three sources.
    Quick,
    /// The configured default.
    #[default]
    Standard,
    /// Three more than the default.
    Deep,
}

impl Depth {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Standard => "standard",
            Self::Deep => "deep",
        }
    }

    /// Source budget for this depth given the configured default.
    pub fn max_sources(&self, default: usize) -> usize {
        match self {
            Self::Quick => 3,
            Self::Standard => default,
            Self::Deep => default + 3,
        }
    }
}

impl FromStr for Depth {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "standard" => Ok(Self::Standard),
            "deep" => Ok(Self::Deep),
            other => Err(ScoutError::Config(format!(
                "unknown depth '{other}' (expected quick, standard or deep)"
            ))),
        }
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sequences search, filtering, extraction, summarization and synthesis.
#[derive(Clone)]
pub struct ResearchPipeline {
    web: Arc<dyn SearchProvider>,
    academic: Arc<dyn SearchProvider>,
    extractor: ContentExtractor,
    summarizer: Summarizer,
    synthesizer: Synthesizer,
    model: Arc<dyn LanguageModel>,
    settings: ResearchConfig,
}

impl ResearchPipeline {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        web: Arc<dyn SearchProvider>,
        academic: Arc<dyn SearchProvider>,
        extractor: ContentExtractor,
        model: Arc<dyn LanguageModel>,
        settings: ResearchConfig,
    ) -> Self {
        Self {
            web,
            academic,
            extractor,
            summarizer: Summarizer::new(Arc::clone(&model)),
            synthesizer: Synthesizer::new(Arc::clone(&model)),
            model,
            settings,
        }
    }

    /// Build the production pipeline: Google for the web, arXiv plus
    /// Semantic Scholar for papers, HTTP page fetching.
    ///
    /// # Errors
    ///
    /// Returns an error if any HTTP client cannot be built or the
    /// extraction settings are invalid.
    pub fn from_config(config: &ScoutConfig, model: Arc<dyn LanguageModel>) -> Result<Self> {
        let search = config.search_config();
        let web = GoogleSearchProvider::new(search.clone())?;
        let academic = AcademicSearchProvider::new(&search, config.research.max_sources)?;
        let extractor = ContentExtractor::new(config.extract_config())?;
        Ok(Self::new(
            Arc::new(web),
            Arc::new(academic),
            extractor,
            model,
            config.research.clone(),
        ))
    }

    /// Model writing summaries and briefings.
    pub fn model(&self) -> &Arc<dyn LanguageModel> {
        &self.model
    }

    /// Start a run. Nothing happens until the stream is polled; dropping
    /// it abandons the run after the current stage settles.
    pub fn run(&self, topic: &str, depth: Depth, include_academic: bool) -> EventStream {
        let this = self.clone();
        let topic = topic.to_owned();

        Box::pin(async_stream::stream! {
            let started = Instant::now();
            let max_sources = depth.max_sources(this.settings.max_sources);
            tracing::info!(
                %topic,
                depth = depth.as_str(),
                include_academic,
                max_sources,
                "research started"
            );

            let mut message = format!("Searching for sources on: {topic}");
            if include_academic {
                message.push_str(" (including academic papers)");
            }
            yield step(ResearchStatus::Searching, message, 0.1, 0, 0);

            let mut sources = this.web.search(&topic).await;
            sources.truncate(this.settings.max_sources * 2);
            if sources.is_empty() {
                tracing::warn!(%topic, "web search returned no sources");
                let message = format!(
                    "Search failed: No sources found for '{topic}'. Please try a different query."
                );
                yield step(ResearchStatus::Error, message, 0.1, 0, 0);
                return;
            }
            tracing::debug!(count = sources.len(), "web search finished");

            if include_academic {
                let message = "Searching academic databases (arXiv, Semantic Scholar)...";
                yield step(ResearchStatus::Searching, message, 0.15, sources.len(), 0);

                let mut papers = this.academic.search(&topic).await;
                papers.truncate(this.settings.max_sources);
                tracing::debug!(count = papers.len(), "academic search finished");
                sources.extend(papers);
            }

            let found = sources.len();
            let message = format!("Found {found} potential sources");
            yield step(ResearchStatus::Searching, message, 0.2, found, 0);

            let mut selected = filter_sources(&sources, this.settings.min_credibility);
            if selected.is_empty() {
                tracing::warn!(
                    found,
                    min_credibility = this.settings.min_credibility,
                    fallback = this.settings.fallback_credibility,
                    "every source filtered out, lowering threshold"
                );
                selected = filter_sources(&sources, this.settings.fallback_credibility);
            }
            selected.truncate(max_sources);

            let message = format!("Processing {} credible sources", selected.len());
            yield step(ResearchStatus::Extracting, message, 0.3, found, 0);

            let processed = this.attach_content(selected).await;
            let message = "Summarizing sources...";
            yield step(ResearchStatus::Summarizing, message, 0.5, found, processed.len());

            let mut summarized = this.summarizer.summarize_batch(&topic, &processed).await;
            if summarized.is_empty() && !processed.is_empty() {
                tracing::warn!("summarization produced nothing, using unsummarized sources");
                summarized = processed;
            }
            let count = summarized.len();
            let message = "Synthesizing research briefing...";
            yield step(ResearchStatus::Synthesizing, message, 0.8, found, count);

            let briefing = this.synthesizer.synthesize(&topic, &summarized).await;
            let elapsed = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;
            tracing::info!(%topic, sources = count, elapsed, "research complete");

            yield step(ResearchStatus::Completed, "Research complete!", 1.0, found, count);
            yield ResearchEvent::Result(ResearchResult {
                topic,
                briefing,
                sources: summarized,
                total_time_seconds: elapsed,
                model_used: this.model.model_identifier().to_owned(),
            });
        })
    }

    /// Fetch page text for non-academic sources. Academic sources, and any
    /// source missing from the fetch results, keep their snippet as content.
    async fn attach_content(&self, selected: Vec<Source>) -> Vec<Source> {
        let urls: Vec<String> = selected
            .iter()
            .filter(|s| !is_academic_url(&s.url))
            .map(|s| s.url.clone())
            .collect();

        let pages = if urls.is_empty() {
            HashMap::new()
        } else {
            self.extractor
                .extract_batch(&urls, self.extractor.max_concurrent())
                .await
        };

        selected
            .into_iter()
            .map(|source| match pages.get(&source.url) {
                Some(text) => source.with_content(text.as_str()),
                None if source.content.is_none() => {
                    let snippet = source.snippet.clone();
                    source.with_content(snippet)
                }
                None => source,
            })
            .collect()
    }
}

fn step(
    status: ResearchStatus,
    message: impl Into<String>,
    progress: f64,
    found: usize,
    processed: usize,
) -> ResearchEvent {
    let event = ResearchProgress::new(status, message, progress).with_counts(found, processed);
    ResearchEvent::Progress(event)
}
