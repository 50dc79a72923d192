//! Research service: caching around the pipeline.

use std::sync::Arc;
use std::time::Duration;

use scout::{Depth, ResearchRequest, ResearchService, ResearchStatus, ResultCache};

use crate::helpers::{collect, harness, mixed_web_sources, Harness, ScriptedModel};

fn service_for(h: &Harness) -> ResearchService {
    let cache = ResultCache::with_ttl(10, Duration::from_secs(60));
    ResearchService::new(h.pipeline.clone(), Arc::new(cache))
}

fn request(topic: &str, depth: &str) -> ResearchRequest {
    ResearchRequest {
        topic: topic.into(),
        depth: depth.into(),
        include_academic: false,
    }
}

#[tokio::test]
async fn second_identical_request_is_served_from_cache() {
    let h = harness(mixed_web_sources(), vec![], ScriptedModel::default());
    let service = service_for(&h);

    let events = service.research(&request("Quantum Computing", "quick")).expect("valid");
    let (first_progress, first) = collect(events).await;
    assert_eq!(first_progress.len(), 6);
    let first = first.expect("first result");

    let events = service.research(&request("  quantum computing ", "quick")).expect("valid");
    let (progress, cached) = collect(events).await;
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].status, ResearchStatus::Completed);
    assert_eq!(progress[0].message, "Retrieved from cache");
    assert_eq!(progress[0].sources_found, first.sources.len());
    assert_eq!(progress[0].sources_processed, first.sources.len());
    assert_eq!(cached.expect("cached result"), first);
    assert_eq!(h.web.calls(), 1);

    let stats = service.cache().stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.size, 1);
}

#[tokio::test]
async fn different_depth_misses_cache() {
    let h = harness(mixed_web_sources(), vec![], ScriptedModel::default());
    let service = service_for(&h);

    collect(service.research(&request("quantum computing", "quick")).expect("valid")).await;
    collect(service.research(&request("quantum computing", "deep")).expect("valid")).await;
    assert_eq!(h.web.calls(), 2);

    assert!(service.cache().invalidate("quantum computing", Depth::Quick, false).await);
    assert_eq!(service.cache().clear().await, 1);
}

#[tokio::test]
async fn failed_runs_are_not_cached() {
    let h = harness(vec![], vec![], ScriptedModel::default());
    let service = service_for(&h);

    for _ in 0..2 {
        let events = service.research(&request("obscure topic", "standard")).expect("valid");
        let (progress, result) = collect(events).await;
        assert!(result.is_none());
        assert_eq!(progress.last().map(|p| p.status), Some(ResearchStatus::Error));
    }
    assert_eq!(h.web.calls(), 2);
    assert_eq!(service.cache().stats().await.size, 0);
}

#[tokio::test]
async fn invalid_requests_are_rejected_up_front() {
    let h = harness(mixed_web_sources(), vec![], ScriptedModel::default());
    let service = service_for(&h);

    assert!(service.research(&request("ab", "quick")).is_err());
    assert!(service.research(&request("quantum computing", "exhaustive")).is_err());
    assert_eq!(h.web.calls(), 0);
}

#[tokio::test]
async fn model_health_comes_from_backend() {
    let h = harness(vec![], vec![], ScriptedModel::default());
    let service = service_for(&h);
    let health = service.model_health().await.expect("health");
    assert!(health.healthy);
    assert_eq!(health.model, "scripted-7b");
}
