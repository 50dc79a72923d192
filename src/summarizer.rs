//! Per-source summarization.
//!
//! Every source is summarized by an independent model call; a batch
//! issues all calls at once and waits for every one to settle.

use std::sync::Arc;

use futures_util::future::join_all;
use scout_search::types::truncate_chars;
use scout_search::{is_extraction_error, Source};

use crate::error::Result;
use crate::llm::LanguageModel;

/// Summary used when a source has no usable content.
pub const EXTRACTION_FAILED_MARKER: &str = "[Unable to summarize: content extraction failed]";
/// Summary used when the model call for a source fails.
pub const GENERATION_FAILED_MARKER: &str = "[Unable to summarize: generation failed]";

/// Content budget per source, in characters.
const MAX_CONTENT_CHARS: usize = 12_000;
const TRUNCATION_MARKER: &str = "\n\n[Content truncated for summarization]";

const SYSTEM_PROMPT: &str = "You are a research assistant that creates concise, accurate summaries.

Your task is to summarize the following article content. Focus on:
- Key facts and findings
- Main arguments or conclusions
- Relevant data or statistics
- Notable quotes or expert opinions

Keep the summary factual and objective. Do not add interpretation or speculation.
Aim for 3-5 paragraphs maximum.";

/// Summarizes source content with a language model.
#[derive(Clone)]
pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
}

impl Summarizer {
    /// Create a summarizer over `model`.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Summarize one source.
    ///
    /// Empty content and extraction-error text short-circuit to
    /// [`EXTRACTION_FAILED_MARKER`] without calling the model.
    ///
    /// # Errors
    ///
    /// Propagates the model's error if generation fails.
    pub async fn summarize(
        &self,
        topic: &str,
        title: &str,
        url: &str,
        content: &str,
    ) -> Result<String> {
        if content.is_empty() || is_extraction_error(content) {
            return Ok(EXTRACTION_FAILED_MARKER.to_owned());
        }

        let content = truncate_chars(content, MAX_CONTENT_CHARS, TRUNCATION_MARKER);
        let user = format!(
            "Topic: {topic}

Source: {title}
URL: {url}

Content:
{content}

Provide a focused summary of this source as it relates to the research topic."
        );

        let summary = self.model.generate(SYSTEM_PROMPT, &user).await?;
        Ok(summary.trim().to_owned())
    }

    /// Summarize every source concurrently.
    ///
    /// Returns the sources, in input order, each carrying a summary. A
    /// failed call yields [`GENERATION_FAILED_MARKER`] for that source. If
    /// every model call fails the result is empty, so the caller can fall
    /// back to the unsummarized sources.
    pub async fn summarize_batch(&self, topic: &str, sources: &[Source]) -> Vec<Source> {
        let tasks = sources.iter().map(|source| async move {
            let outcome = self
                .summarize(topic, &source.title, &source.url, source.best_text())
                .await;
            (source, outcome)
        });
        let outcomes = join_all(tasks).await;

        let mut failures = 0;
        let mut attempted = 0;
        let summarized: Vec<Source> = outcomes
            .into_iter()
            .map(|(source, outcome)| {
                let text = source.best_text();
                let calls_model = !text.is_empty() && !is_extraction_error(text);
                if calls_model {
                    attempted += 1;
                }
                let summary = match outcome {
                    Ok(summary) => summary,
                    Err(err) => {
                        failures += 1;
                        tracing::warn!(url = %source.url, error = %err, "summarization failed");
                        GENERATION_FAILED_MARKER.to_owned()
                    }
                };
                source.clone().with_summary(summary)
            })
            .collect();

        if attempted > 0 && failures == attempted {
            tracing::warn!(attempted, "every summarization call failed");
            return Vec::new();
        }
        tracing::debug!(count = summarized.len(), failures, "summarization finished");
        summarized
    }
}
