//! Cache-aware entry point for research runs.
//!
//! [`ResearchService`] owns one pipeline and one result cache, created
//! once at startup and shared by every run. A cached result is replayed
//! as a single completed event followed by the result; a miss runs the
//! pipeline and stores whatever result it produces.

use std::sync::Arc;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};

use crate::cache::ResultCache;
use crate::config::ScoutConfig;
use crate::error::{Result, ScoutError};
use crate::llm::{build_backend, ModelHealth};
use crate::pipeline::{Depth, EventStream, ResearchPipeline};
use crate::progress::{ResearchEvent, ResearchProgress, ResearchStatus};

const MIN_TOPIC_CHARS: usize = 3;
const MAX_TOPIC_CHARS: usize = 500;

/// A request to research a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRequest {
    /// Free-text topic, 3 to 500 characters after trimming.
    pub topic: String,
    /// `quick`, `standard` or `deep`.
    #[serde(default = "default_depth")]
    pub depth: String,
    /// Also search arXiv and Semantic Scholar.
    #[serde(default)]
    pub include_academic: bool,
}

fn default_depth() -> String {
    Depth::Standard.as_str().to_owned()
}

impl ResearchRequest {
    /// Request at standard depth without academic sources.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            depth: default_depth(),
            include_academic: false,
        }
    }

    /// Check the topic length and depth name, returning the parsed depth.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<Depth> {
        let chars = self.topic.trim().chars().count();
        if !(MIN_TOPIC_CHARS..=MAX_TOPIC_CHARS).contains(&chars) {
            return Err(ScoutError::Config(format!(
                "topic must be {MIN_TOPIC_CHARS} to {MAX_TOPIC_CHARS} characters, got {chars}"
            )));
        }
        self.depth.parse()
    }
}

/// Runs research through the result cache.
pub struct ResearchService {
    pipeline: ResearchPipeline,
    cache: Arc<ResultCache>,
}

impl ResearchService {
    /// Wrap `pipeline` with a shared result cache.
    pub fn new(pipeline: ResearchPipeline, cache: Arc<ResultCache>) -> Self {
        Self { pipeline, cache }
    }

    /// Build the production service: the configured model backend, the
    /// HTTP providers and a fresh cache.
    ///
    /// # Errors
    ///
    /// Returns an error if a backend or provider cannot be constructed.
    pub fn from_config(config: &ScoutConfig) -> Result<Self> {
        let model = build_backend(&config.llm)?;
        let pipeline = ResearchPipeline::from_config(config, model)?;
        let cache = Arc::new(ResultCache::new(&config.cache));
        Ok(Self::new(pipeline, cache))
    }

    /// Start a run for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if the request is invalid. Failures
    /// during the run arrive in-band as an error event.
    pub fn research(&self, request: &ResearchRequest) -> Result<EventStream> {
        let depth = request.validate()?;
        let topic = request.topic.trim().to_owned();
        let academic = request.include_academic;
        let cache = Arc::clone(&self.cache);
        let pipeline = self.pipeline.clone();

        Ok(Box::pin(async_stream::stream! {
            if let Some(entry) = cache.get(&topic, depth, academic).await {
                let count = entry.result.sources.len();
                yield ResearchEvent::Progress(
                    ResearchProgress::new(ResearchStatus::Completed, "Retrieved from cache", 1.0)
                        .with_counts(count, count),
                );
                yield ResearchEvent::Result(entry.result);
                return;
            }

            let mut events = pipeline.run(&topic, depth, academic);
            while let Some(event) = events.next().await {
                if let ResearchEvent::Result(result) = &event {
                    cache.set(&topic, depth, academic, result.clone()).await;
                }
                yield event;
            }
        }))
    }

    /// The shared result cache.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Health of the language model backend.
    ///
    /// # Errors
    ///
    /// Propagates backend errors; an unreachable server is reported as
    /// unhealthy instead.
    pub async fn model_health(&self) -> Result<ModelHealth> {
        self.pipeline.model().health_check().await
    }
}
