//! Scout: cited research briefings from a single topic.
//!
//! A run searches the web (and optionally academic indexes), keeps the
//! credible sources, reads them, summarizes each one with a language
//! model and synthesizes a markdown briefing with numbered citations.
//!
//! # Architecture
//!
//! - **Search, credibility, extraction**: the [`scout_search`] crate
//! - **LLM**: [`llm::LanguageModel`] with Ollama and OpenAI-compatible
//!   backends
//! - **Summarizer / Synthesizer**: prompt construction and fallbacks
//!   around the model
//! - **Pipeline**: [`pipeline::ResearchPipeline`] sequences the stages and
//!   yields [`ResearchEvent`]s as a lazy stream
//! - **Service**: [`service::ResearchService`] puts the
//!   [`cache::ResultCache`] in front of the pipeline

pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod progress;
pub mod service;
pub mod summarizer;
pub mod synthesizer;

pub use cache::{CacheEntry, CacheStats, ResultCache};
pub use config::ScoutConfig;
pub use error::{Result, ScoutError};
pub use llm::{LanguageModel, ModelHealth};
pub use pipeline::{Depth, EventStream, ResearchPipeline};
pub use progress::{ResearchEvent, ResearchProgress, ResearchResult, ResearchStatus};
pub use service::{ResearchRequest, ResearchService};
