//! Progress and result values emitted by a research run.
//!
//! A run yields zero or more [`ResearchProgress`] values followed by
//! exactly one terminal item: a [`ResearchResult`], or a progress value
//! with status [`ResearchStatus::Error`]. Consumers (the CLI, or any
//! transport layer) receive them as [`ResearchEvent`]s.

use serde::{Deserialize, Serialize};

use scout_search::Source;

/// Stage of a research run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchStatus {
    /// Accepted but not started.
    Pending,
    /// Querying search providers.
    Searching,
    /// Fetching page content.
    Extracting,
    /// Summarizing individual sources.
    Summarizing,
    /// Writing the briefing.
    Synthesizing,
    /// Finished; a result follows.
    Completed,
    /// Failed; nothing follows.
    Error,
}

impl ResearchStatus {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Searching => "searching",
            Self::Extracting => "extracting",
            Self::Summarizing => "summarizing",
            Self::Synthesizing => "synthesizing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Returns `true` for statuses that end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl std::fmt::Display for ResearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchProgress {
    /// Current stage.
    pub status: ResearchStatus,
    /// Human-readable description.
    pub message: String,
    /// Fraction complete in `[0, 1]`.
    pub progress: f64,
    /// Candidate sources discovered so far.
    #[serde(default)]
    pub sources_found: usize,
    /// Sources selected for processing.
    #[serde(default)]
    pub sources_processed: usize,
}

impl ResearchProgress {
    /// Create an update with zero counts.
    pub fn new(status: ResearchStatus, message: impl Into<String>, progress: f64) -> Self {
        Self {
            status,
            message: message.into(),
            progress: progress.clamp(0.0, 1.0),
            sources_found: 0,
            sources_processed: 0,
        }
    }

    /// Set both source counts.
    pub fn with_counts(mut self, found: usize, processed: usize) -> Self {
        self.sources_found = found;
        self.sources_processed = processed;
        self
    }
}

/// Terminal output of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    /// Topic as requested.
    pub topic: String,
    /// Markdown briefing with `[N]` citations and a References section.
    pub briefing: String,
    /// Processed sources in citation order.
    pub sources: Vec<Source>,
    /// Wall-clock duration, rounded to hundredths of a second.
    pub total_time_seconds: f64,
    /// Identifier of the model that wrote the briefing.
    pub model_used: String,
}

/// Item of the event stream produced by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum ResearchEvent {
    /// A progress update, including the terminal error.
    Progress(ResearchProgress),
    /// The final result.
    Result(ResearchResult),
}

impl ResearchEvent {
    /// Returns `true` if this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Progress(p) => p.status == ResearchStatus::Error,
            Self::Result(_) => true,
        }
    }
}

impl From<ResearchProgress> for ResearchEvent {
    fn from(progress: ResearchProgress) -> Self {
        Self::Progress(progress)
    }
}

impl From<ResearchResult> for ResearchEvent {
    fn from(result: ResearchResult) -> Self {
        Self::Result(result)
    }
}
