//! Briefing synthesis with numbered citations.
//!
//! Sources are numbered from 1 in input order. The model is asked for a
//! four-section markdown briefing citing those numbers; whatever it
//! returns, the briefing always ends up with a references list.

use std::fmt::Write as _;
use std::sync::Arc;

use scout_search::Source;

use crate::llm::LanguageModel;

/// Briefing returned when there is nothing to synthesize.
pub const NO_SOURCES_BRIEFING: &str = "No sources available to synthesize.";

const SYSTEM_PROMPT: &str = "You are a senior research analyst creating executive briefing documents.

Your task is to synthesize multiple source summaries into a coherent research briefing with proper citations.

Structure your briefing as follows:

## Executive Summary
A 2-3 sentence overview of the key findings. Include citation numbers in brackets (e.g., [1], [2]) when referencing specific sources.

## Key Findings
Bullet points of the most important discoveries. Each finding MUST include a citation number [N] linking to the source.

## Analysis
A detailed analysis synthesizing information across sources. Include inline citations [N] for all claims. Identify:
- Points of consensus across sources (cite relevant sources)
- Conflicting information or perspectives (cite opposing sources)
- Knowledge gaps

## References
List all sources as clickable markdown links in this exact format:
[1] [Source Title](URL)
[2] [Source Title](URL)
...

CITATION RULES:
1. Use numbered citations in square brackets: [1], [2], [3], etc.
2. Citations must match the source numbers provided in the input
3. Every factual claim must have at least one citation
4. The References section must list ALL sources with clickable markdown links
5. Format links as: [N] [Title](URL)

Guidelines:
- Be objective and factual
- ALWAYS cite sources with [N] when making claims
- Highlight uncertainty where it exists
- Use clear, professional language
- Format using Markdown";

/// Writes the final briefing.
#[derive(Clone)]
pub struct Synthesizer {
    model: Arc<dyn LanguageModel>,
}

impl Synthesizer {
    /// Create a synthesizer over `model`.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Synthesize a briefing on `topic` from `sources`.
    ///
    /// Never fails. If generation fails a plain briefing is assembled from
    /// the summaries instead.
    pub async fn synthesize(&self, topic: &str, sources: &[Source]) -> String {
        if sources.is_empty() {
            return NO_SOURCES_BRIEFING.to_owned();
        }

        let user = format!(
            "Research Topic: {topic}

Sources (use these numbers for citations):
{}

Create a comprehensive research briefing with inline citations [1], [2], etc. and a References section with clickable links.",
            format_sources(sources)
        );

        match self.model.generate(SYSTEM_PROMPT, &user).await {
            Ok(text) => ensure_references(text.trim(), sources),
            Err(err) => {
                tracing::warn!(error = %err, "synthesis failed, assembling fallback briefing");
                fallback_briefing(topic, sources)
            }
        }
    }
}

fn summary_of(source: &Source) -> &str {
    source
        .summary
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("No summary available.")
}

/// Numbered source blocks for the prompt.
fn format_sources(sources: &[Source]) -> String {
    let mut text = String::new();
    for (i, source) in sources.iter().enumerate() {
        let n = i + 1;
        let _ = write!(
            text,
            "
### [Source {n}] {title}
- URL: {url}
- Credibility Score: {score}
- Citation format: [{n}] [{title}]({url})

Summary:
{summary}

---
",
            title = source.title,
            url = source.url,
            score = source.credibility_score,
            summary = summary_of(source),
        );
    }
    text.trim().to_owned()
}

/// `[i] [title](url)` per source, one per line.
fn references(sources: &[Source]) -> String {
    sources
        .iter()
        .enumerate()
        .fold(String::new(), |mut acc, (i, source)| {
            let _ = writeln!(acc, "[{}] [{}]({})", i + 1, source.title, source.url);
            acc
        })
}

/// Append a References section unless the briefing already has one.
fn ensure_references(briefing: &str, sources: &[Source]) -> String {
    if briefing.contains("## References") || briefing.contains("## Sources") {
        return briefing.to_owned();
    }
    format!("{briefing}\n\n## References\n{}", references(sources))
}

fn fallback_briefing(topic: &str, sources: &[Source]) -> String {
    let mut text = format!(
        "## Executive Summary\nAutomated synthesis was unavailable. Below are the individual findings gathered for \"{topic}\" from {} sources.\n\n## Key Findings\n",
        sources.len()
    );
    for (i, source) in sources.iter().enumerate() {
        let first_line = summary_of(source).lines().next().unwrap_or_default();
        let _ = writeln!(text, "- **{}**: {} [{}]", source.title, first_line, i + 1);
    }
    text.push_str("\n## Analysis\n");
    for (i, source) in sources.iter().enumerate() {
        let _ = write!(text, "### [{}] {}\n{}\n\n", i + 1, source.title, summary_of(source));
    }
    text.push_str("## References\n");
    text.push_str(&references(sources));
    text
}
