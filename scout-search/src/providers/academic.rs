//! Composite academic search across a preprint index and a citation graph.
//!
//! Both indexes are queried concurrently. A failure in one is logged and
//! counts as zero results while the other's hits are still returned.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ArxivProvider, SemanticScholarProvider};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::provider::SearchProvider;
use crate::types::{SearchOutcome, Source};

/// Queries arXiv and Semantic Scholar together.
///
/// Each index contributes at most half of `max_results`, so one index
/// returning a full page cannot crowd out the other.
pub struct AcademicSearchProvider {
    preprints: Arc<dyn SearchProvider>,
    citations: Arc<dyn SearchProvider>,
    max_results: usize,
}

impl AcademicSearchProvider {
    /// Create the composite with `max_results` split evenly between indexes.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if an HTTP client cannot be built.
    pub fn new(config: &SearchConfig, max_results: usize) -> Result<Self, SearchError> {
        let per_index = per_index(max_results);
        Ok(Self::with_providers(
            Arc::new(ArxivProvider::new(config, per_index)?),
            Arc::new(SemanticScholarProvider::new(config, per_index)?),
            max_results,
        ))
    }

    /// Compose arbitrary preprint and citation providers.
    pub fn with_providers(
        preprints: Arc<dyn SearchProvider>,
        citations: Arc<dyn SearchProvider>,
        max_results: usize,
    ) -> Self {
        Self {
            preprints,
            citations,
            max_results,
        }
    }
}

#[async_trait]
impl SearchProvider for AcademicSearchProvider {
    fn name(&self) -> &str {
        "academic"
    }

    async fn search_outcome(&self, query: &str) -> SearchOutcome {
        let (preprints, citations) = tokio::join!(
            self.preprints.search_outcome(query),
            self.citations.search_outcome(query),
        );

        let per_index = per_index(self.max_results);
        let mut failures = Vec::new();
        let mut sources: Vec<Source> = Vec::new();
        for (provider, outcome) in [(&self.preprints, preprints), (&self.citations, citations)] {
            match outcome {
                SearchOutcome::Failed(err) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %err,
                        "academic index failed"
                    );
                    failures.push(format!("{}: {err}", provider.name()));
                }
                other => sources.extend(other.into_sources().into_iter().take(per_index)),
            }
        }

        if sources.is_empty() && failures.len() == 2 {
            return SearchOutcome::Failed(SearchError::Http(failures.join("; ")));
        }

        sources.truncate(self.max_results);
        SearchOutcome::from_sources(sources)
    }
}

fn per_index(max_results: usize) -> usize {
    (max_results / 2).max(1)
}
