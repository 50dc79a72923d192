//! End-to-end pipeline runs against in-memory collaborators.

use std::sync::Arc;

use scout::config::ResearchConfig;
use scout::summarizer::EXTRACTION_FAILED_MARKER;
use scout::synthesizer::NO_SOURCES_BRIEFING;
use scout::{Depth, ResearchPipeline, ResearchProgress, ResearchStatus};
use scout_search::{AcademicSearchProvider, ContentExtractor, ExtractConfig, Source};

use crate::helpers::{
    collect, harness, mixed_web_sources, source, RecordingFetcher, ScriptedModel, StaticProvider,
};

fn assert_non_decreasing(progress: &[ResearchProgress]) {
    for pair in progress.windows(2) {
        assert!(
            pair[1].progress >= pair[0].progress,
            "progress went backwards: {} -> {}",
            pair[0].progress,
            pair[1].progress
        );
    }
}

fn checkpoints(progress: &[ResearchProgress]) -> Vec<f64> {
    progress.iter().map(|p| p.progress).collect()
}

#[tokio::test]
async fn quick_run_follows_fixed_checkpoints() {
    let h = harness(mixed_web_sources(), vec![], ScriptedModel::default());
    let events = h.pipeline.run("quantum computing", Depth::Quick, false);
    let (progress, result) = collect(events).await;

    assert_eq!(checkpoints(&progress), vec![0.1, 0.2, 0.3, 0.5, 0.8, 1.0]);
    let statuses: Vec<ResearchStatus> = progress.iter().map(|p| p.status).collect();
    assert_eq!(
        statuses,
        vec![
            ResearchStatus::Searching,
            ResearchStatus::Searching,
            ResearchStatus::Extracting,
            ResearchStatus::Summarizing,
            ResearchStatus::Synthesizing,
            ResearchStatus::Completed,
        ]
    );
    assert_eq!(progress[0].message, "Searching for sources on: quantum computing");
    assert_eq!(progress[1].message, "Found 6 potential sources");
    assert_eq!(progress[1].sources_found, 6);
    assert_eq!(progress[2].message, "Processing 3 credible sources");
    assert_eq!(progress[3].sources_processed, 3);
    assert_eq!(h.academic.calls(), 0);

    let result = result.expect("result");
    assert_eq!(result.topic, "quantum computing");
    assert_eq!(result.model_used, "scripted-7b");
    let urls: Vec<&str> = result.sources.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://www.nature.com/articles/q1",
            "https://www.reuters.com/tech/quantum",
            "https://github.com/org/qsim",
        ]
    );
    for source in &result.sources {
        assert_eq!(source.summary.as_deref(), Some("Summary of the source."));
        let content = source.content.as_deref().expect("content");
        assert!(content.contains("Full text of"), "got: {content}");
        assert!(!content.contains("menu"));
    }
    assert!(result.briefing.contains("## References"));
    assert!(result
        .briefing
        .contains("[1] [Nature Paper](https://www.nature.com/articles/q1)"));
    assert!(result.total_time_seconds >= 0.0);
}

#[tokio::test]
async fn empty_web_search_ends_with_single_error() {
    let papers = vec![source("https://arxiv.org/abs/1", "Paper")];
    let h = harness(vec![], papers, ScriptedModel::default());
    let (progress, result) = collect(h.pipeline.run("nothing here", Depth::Standard, true)).await;

    assert!(result.is_none());
    assert_eq!(progress.len(), 2);
    let errors: Vec<_> = progress
        .iter()
        .filter(|p| p.status == ResearchStatus::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        progress[1].message,
        "Search failed: No sources found for 'nothing here'. Please try a different query."
    );
    assert_eq!(progress[1].sources_found, 0);
    assert_eq!(h.academic.calls(), 0);
    assert!(h.model.prompts.lock().unwrap().is_empty());
    assert_non_decreasing(&progress);
}

#[tokio::test]
async fn low_credibility_sources_use_fallback_threshold() {
    let web = vec![
        source("http://spam-news.blogspot.com/a", "Spammy"),
        source("http://fake-spam.blogspot.com/b", "Worse"),
    ];
    let h = harness(web, vec![], ScriptedModel::default());
    let (progress, result) = collect(h.pipeline.run("gossip", Depth::Standard, false)).await;

    assert_eq!(progress.last().map(|p| p.status), Some(ResearchStatus::Completed));
    let result = result.expect("result");
    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].url, "http://spam-news.blogspot.com/a");
    assert!((result.sources[0].credibility_score - 0.21).abs() < 1e-9);
    assert_non_decreasing(&progress);
}

#[tokio::test]
async fn sources_below_fallback_threshold_still_complete() {
    let web = vec![source("http://spam-fake-promo.blogspot.com/12345678", "Junk")];
    let h = harness(web, vec![], ScriptedModel::default());
    let (progress, result) = collect(h.pipeline.run("gossip", Depth::Standard, false)).await;

    assert_eq!(checkpoints(&progress), vec![0.1, 0.2, 0.3, 0.5, 0.8, 1.0]);
    assert_eq!(progress.last().map(|p| p.status), Some(ResearchStatus::Completed));
    assert_eq!(progress[2].message, "Processing 0 credible sources");

    let result = result.expect("result");
    assert!(result.sources.is_empty());
    assert_eq!(result.briefing, NO_SOURCES_BRIEFING);
    assert!(h.fetcher.fetched.lock().unwrap().is_empty());
    assert!(h.model.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn both_academic_indexes_reach_the_result() {
    let settings = ResearchConfig::default();
    let preprints = StaticProvider::new(
        (0..5)
            .map(|i| source(&format!("https://arxiv.org/abs/2401.0000{i}"), "Preprint"))
            .collect(),
    );
    let citations = StaticProvider::new(
        (0..5)
            .map(|i| source(&format!("https://www.semanticscholar.org/paper/p{i}"), "Paper"))
            .collect(),
    );
    let academic =
        AcademicSearchProvider::with_providers(preprints, citations, settings.max_sources);
    let extractor = ContentExtractor::with_fetcher(
        Arc::new(RecordingFetcher::default()),
        ExtractConfig::default(),
    );
    let pipeline = ResearchPipeline::new(
        StaticProvider::new(vec![source("https://example.com/x", "Overview")]),
        Arc::new(academic),
        extractor,
        Arc::new(ScriptedModel::default()),
        settings,
    );

    let (_, result) = collect(pipeline.run("transformers", Depth::Deep, true)).await;
    let result = result.expect("result");
    let count_host = |host: &str| {
        result
            .sources
            .iter()
            .filter(|s| s.url.contains(host))
            .count()
    };
    assert_eq!(count_host("arxiv.org"), 2);
    assert_eq!(count_host("semanticscholar.org"), 2);
    assert_eq!(count_host("example.com"), 1);
}

#[tokio::test]
async fn academic_sources_are_not_fetched() {
    let paper = Source::new("https://arxiv.org/abs/2401.00001", "Qubit Paper", "Abstract on qubits")
        .with_credibility(0.92);
    let h = harness(
        vec![source("https://example.com/quantum-intro", "Intro")],
        vec![paper],
        ScriptedModel::default(),
    );
    let (progress, result) = collect(h.pipeline.run("qubits", Depth::Standard, true)).await;

    assert_eq!(checkpoints(&progress), vec![0.1, 0.15, 0.2, 0.3, 0.5, 0.8, 1.0]);
    assert_eq!(
        progress[0].message,
        "Searching for sources on: qubits (including academic papers)"
    );
    assert_eq!(progress[1].sources_found, 1);
    assert_eq!(progress[2].sources_found, 2);

    let fetched = h.fetcher.fetched.lock().unwrap().clone();
    assert_eq!(fetched, vec!["https://example.com/quantum-intro".to_owned()]);

    let result = result.expect("result");
    assert_eq!(result.sources[0].url, "https://arxiv.org/abs/2401.00001");
    assert!((result.sources[0].credibility_score - 0.92).abs() < 1e-9);
    assert_eq!(result.sources[0].content.as_deref(), Some("Abstract on qubits"));
    assert_eq!(h.web.calls(), 1);
    assert_eq!(h.academic.calls(), 1);
}

#[tokio::test]
async fn failed_page_flows_through_as_marker() {
    let h = harness(
        vec![source("https://www.nature.com/broken", "Broken Page")],
        vec![],
        ScriptedModel::default(),
    );
    let (_, result) = collect(h.pipeline.run("anything", Depth::Quick, false)).await;

    let result = result.expect("result");
    let only = &result.sources[0];
    assert!(only.content.as_deref().unwrap_or_default().starts_with("[Error: HTTP 503"));
    assert_eq!(only.summary.as_deref(), Some(EXTRACTION_FAILED_MARKER));

    // Only the synthesizer reached the model.
    assert_eq!(h.model.prompts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn total_model_failure_still_completes() {
    let model = ScriptedModel {
        fail_everything: true,
        ..Default::default()
    };
    let h = harness(mixed_web_sources(), vec![], model);
    let events = h.pipeline.run("quantum computing", Depth::Standard, false);
    let (progress, result) = collect(events).await;

    assert_eq!(progress.last().map(|p| p.status), Some(ResearchStatus::Completed));
    let result = result.expect("result");
    assert_eq!(result.sources.len(), 5);
    assert!(result.sources.iter().all(|s| s.summary.is_none()));
    assert!(result.briefing.contains("## Key Findings"));
    assert!(result.briefing.contains("No summary available."));
    assert!(result.briefing.contains("## References"));
}

#[tokio::test]
async fn dropping_the_stream_early_stops_the_run() {
    use futures_util::StreamExt;

    let h = harness(mixed_web_sources(), vec![], ScriptedModel::default());
    let mut events = h.pipeline.run("quantum computing", Depth::Quick, false);
    let first = events.next().await.expect("first event");
    assert!(!first.is_terminal());
    drop(events);

    assert_eq!(h.web.calls(), 0);
    assert!(h.model.prompts.lock().unwrap().is_empty());
}
