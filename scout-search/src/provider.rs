//! Trait definition for pluggable search providers.
//!
//! The general web provider, each academic index, and the academic
//! composite all implement [`SearchProvider`], so the research pipeline
//! can hold any of them behind an `Arc<dyn SearchProvider>` without
//! knowing which service answers.

use async_trait::async_trait;

use crate::types::{SearchOutcome, Source};

/// A pluggable search backend.
///
/// Implementors handle their own URL construction, HTTP request, response
/// parsing and error classification. They never raise: every failure is
/// reported as [`SearchOutcome::Failed`].
///
/// All implementations must be `Send + Sync` for concurrent queries.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short provider name used in logs (e.g. `"google"`, `"arxiv"`).
    fn name(&self) -> &str;

    /// Run `query` and report exactly what happened.
    async fn search_outcome(&self, query: &str) -> SearchOutcome;

    /// Run `query` and return whatever sources were found.
    ///
    /// Failures are logged at warn level and collapse to an empty list.
    async fn search(&self, query: &str) -> Vec<Source> {
        let outcome = self.search_outcome(query).await;
        match outcome.error() {
            Some(err) => {
                tracing::warn!(provider = self.name(), error = %err, "provider query failed");
            }
            None if outcome.is_empty() => {
                tracing::debug!(provider = self.name(), "provider returned no results");
            }
            None => {
                tracing::debug!(
                    provider = self.name(),
                    count = outcome.len(),
                    "provider returned results"
                );
            }
        }
        outcome.into_sources()
    }
}
