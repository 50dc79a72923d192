//! # scout-search
//!
//! Source discovery for Scout research briefings.
//!
//! This crate finds, scores and reads the documents a briefing is built
//! from. It has no knowledge of language models or of the research
//! pipeline that sequences it.
//!
//! ## Design
//!
//! - [`SearchProvider`] is the one seam every backend implements: Google
//!   Custom Search for the web, arXiv and Semantic Scholar for papers, and
//!   [`AcademicSearchProvider`] which queries both indexes concurrently
//! - Providers never raise. Each call yields a [`SearchOutcome`] that keeps
//!   the failure for logging, and [`SearchProvider::search`] collapses it
//!   to a plain list
//! - [`credibility`] scores URLs from a static domain table and URL shape
//! - [`ContentExtractor`] fetches pages with bounded concurrency and
//!   reports per-page failures in-band as `[Error ...]` text
//!
//! ## Security
//!
//! - API keys are never logged or included in error messages
//! - Search queries and URLs are logged only at trace level

pub mod config;
pub mod content;
pub mod credibility;
pub mod error;
pub mod http;
pub mod provider;
pub mod providers;
pub mod types;

pub use config::{ExtractConfig, SearchConfig};
pub use content::{is_academic_url, is_extraction_error, ContentExtractor, HttpFetcher, PageFetcher};
pub use credibility::filter_sources;
pub use error::{Result, SearchError};
pub use provider::SearchProvider;
pub use providers::{
    AcademicSearchProvider, ArxivProvider, GoogleSearchProvider, SemanticScholarProvider,
};
pub use types::{AcademicIndex, SearchOutcome, Source};
