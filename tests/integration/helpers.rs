//! Shared helpers for integration tests.
//!
//! In-memory stand-ins for the search providers, page fetcher and
//! language model, so a full pipeline run needs no network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use scout::config::ResearchConfig;
use scout::{
    EventStream, LanguageModel, ModelHealth, ResearchEvent, ResearchPipeline, ResearchProgress,
    ResearchResult, ScoutError,
};
use scout_search::{
    ContentExtractor, ExtractConfig, PageFetcher, SearchError, SearchOutcome, SearchProvider,
    Source,
};

/// Provider returning a fixed list and counting calls.
pub(crate) struct StaticProvider {
    sources: Vec<Source>,
    calls: AtomicUsize,
}

impl StaticProvider {
    pub(crate) fn new(sources: Vec<Source>) -> Arc<Self> {
        Arc::new(Self {
            sources,
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn search_outcome(&self, _query: &str) -> SearchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        SearchOutcome::from_sources(self.sources.clone())
    }
}

/// Fetcher that serves a tiny article per URL and records what was fetched.
#[derive(Default)]
pub(crate) struct RecordingFetcher {
    pub(crate) fetched: Mutex<Vec<String>>,
}

#[async_trait]
impl PageFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str) -> scout_search::Result<String> {
        self.fetched.lock().unwrap().push(url.to_owned());
        if url.contains("broken") {
            return Err(SearchError::Status {
                status: 503,
                message: url.to_owned(),
            });
        }
        Ok(format!(
            "<html><body><nav>menu</nav><article><p>Full text of {url}</p></article></body></html>"
        ))
    }
}

/// Model that answers summaries and briefings with canned text.
#[derive(Default)]
pub(crate) struct ScriptedModel {
    pub(crate) fail_everything: bool,
    pub(crate) prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model_identifier(&self) -> &str {
        "scripted-7b"
    }

    async fn generate(&self, system: &str, user: &str) -> scout::Result<String> {
        self.prompts.lock().unwrap().push(user.to_owned());
        if self.fail_everything {
            return Err(ScoutError::Llm("backend offline".into()));
        }
        if system.contains("senior research analyst") {
            Ok("## Executive Summary\nFindings agree [1].\n\n## Key Findings\n- One [1]".into())
        } else {
            Ok("Summary of the source.".into())
        }
    }

    async fn health_check(&self) -> scout::Result<ModelHealth> {
        Ok(ModelHealth {
            healthy: true,
            message: "scripted".into(),
            model: "scripted-7b".into(),
        })
    }
}

pub(crate) fn source(url: &str, title: &str) -> Source {
    Source::new(url, title, format!("Snippet for {title}"))
}

/// Six web hits of mixed credibility, highest first after scoring:
/// nature (0.98), reuters (0.88), github (0.73), example/medium (0.53),
/// blogspot (0.3).
pub(crate) fn mixed_web_sources() -> Vec<Source> {
    vec![
        source("https://example.com/quantum-intro", "Intro"),
        source("https://github.com/org/qsim", "Simulator"),
        source("http://blogspot.com/quantum-hype", "Hype"),
        source("https://www.nature.com/articles/q1", "Nature Paper"),
        source("https://medium.com/@writer/qubits", "Medium Post"),
        source("https://www.reuters.com/tech/quantum", "Reuters Story"),
    ]
}

pub(crate) struct Harness {
    pub(crate) web: Arc<StaticProvider>,
    pub(crate) academic: Arc<StaticProvider>,
    pub(crate) fetcher: Arc<RecordingFetcher>,
    pub(crate) model: Arc<ScriptedModel>,
    pub(crate) pipeline: ResearchPipeline,
}

pub(crate) fn harness(web: Vec<Source>, academic: Vec<Source>, model: ScriptedModel) -> Harness {
    let web = StaticProvider::new(web);
    let academic = StaticProvider::new(academic);
    let fetcher = Arc::new(RecordingFetcher::default());
    let model = Arc::new(model);
    let extractor = ContentExtractor::with_fetcher(fetcher.clone(), ExtractConfig::default());
    let pipeline = ResearchPipeline::new(
        web.clone(),
        academic.clone(),
        extractor,
        model.clone(),
        ResearchConfig::default(),
    );
    Harness {
        web,
        academic,
        fetcher,
        model,
        pipeline,
    }
}

/// Drain a stream, returning progress events and the result if any.
pub(crate) async fn collect(
    mut events: EventStream,
) -> (Vec<ResearchProgress>, Option<ResearchResult>) {
    let mut progress = Vec::new();
    let mut result = None;
    while let Some(event) = events.next().await {
        assert!(result.is_none(), "no event may follow the result");
        match event {
            ResearchEvent::Progress(p) => progress.push(p),
            ResearchEvent::Result(r) => result = Some(r),
        }
    }
    (progress, result)
}
