//! Heuristic credibility scoring from domain reputation and URL shape.
//!
//! Scoring is pure and deterministic. A host is matched against an ordered
//! table of known domains; suffix entries (those starting with `.`) only
//! apply when no named domain matched, and only ever raise the score.
//! Red-flag patterns in the full URL then stack multiplicative penalties,
//! HTTPS earns a small bonus, and very long URLs are penalised.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::types::{clamp_unit, Source};

/// Score before any domain knowledge is applied.
const BASE_SCORE: f64 = 0.5;
/// Score for URLs that cannot be parsed.
const UNPARSEABLE_SCORE: f64 = 0.3;
/// Multiplier applied once per matching red flag.
const RED_FLAG_PENALTY: f64 = 0.7;
/// Additive bonus for `https` URLs.
const HTTPS_BONUS: f64 = 0.03;
/// URLs longer than this many characters are penalised.
const LONG_URL_THRESHOLD: usize = 200;
/// Multiplier applied to long URLs.
const LONG_URL_PENALTY: f64 = 0.9;
/// Existing scores above this came from a curated index and are kept.
pub const TRUSTED_PRESCORE: f64 = 0.8;

/// Known domains and suffixes, checked in order.
const DOMAIN_SCORES: &[(&str, f64)] = &[
    // Academic and government suffixes
    (".edu", 0.9),
    (".ac.uk", 0.9),
    (".ac.jp", 0.9),
    (".gov", 0.85),
    (".mil", 0.85),
    // Academic databases and preprint servers
    ("arxiv.org", 0.92),
    ("semanticscholar.org", 0.88),
    ("scholar.google.com", 0.85),
    ("pubmed.ncbi.nlm.nih.gov", 0.92),
    ("ncbi.nlm.nih.gov", 0.9),
    ("doi.org", 0.88),
    ("researchgate.net", 0.8),
    ("academia.edu", 0.75),
    // Journals
    ("nature.com", 0.95),
    ("science.org", 0.95),
    ("sciencedirect.com", 0.9),
    ("springer.com", 0.88),
    ("wiley.com", 0.88),
    ("cell.com", 0.92),
    ("pnas.org", 0.9),
    ("plos.org", 0.85),
    // Engineering
    ("ieee.org", 0.9),
    ("acm.org", 0.9),
    ("openai.com", 0.85),
    ("deepmind.com", 0.85),
    // News
    ("reuters.com", 0.85),
    ("apnews.com", 0.85),
    ("bbc.com", 0.8),
    ("bbc.co.uk", 0.8),
    ("nytimes.com", 0.8),
    ("washingtonpost.com", 0.8),
    ("theguardian.com", 0.75),
    ("npr.org", 0.8),
    ("economist.com", 0.8),
    (".org", 0.7),
    // Developer resources
    ("github.com", 0.7),
    ("stackoverflow.com", 0.7),
    ("huggingface.co", 0.75),
    ("wikipedia.org", 0.65),
    // Lower-signal hosts
    ("blogspot.com", 0.3),
    ("medium.com", 0.5),
    ("reddit.com", 0.4),
    ("quora.com", 0.4),
    ("twitter.com", 0.35),
    ("x.com", 0.35),
];

/// URL patterns that suggest low-quality content.
const RED_FLAG_PATTERNS: &[&str] = &[
    r"spam",
    r"fake",
    r"clickbait",
    r"[0-9]{8,}",
    r"ad[s]?\b",
    r"promo",
];

fn red_flags() -> &'static [Regex] {
    static RED_FLAGS: OnceLock<Vec<Regex>> = OnceLock::new();
    RED_FLAGS.get_or_init(|| {
        RED_FLAG_PATTERNS
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::error!(pattern, error = %e, "invalid red-flag pattern");
                    None
                }
            })
            .collect()
    })
}

/// Score `url` in `[0, 1]`.
///
/// Never fails: an unparseable URL scores 0.3.
pub fn score(url: &str) -> f64 {
    let Ok(parsed) = Url::parse(url) else {
        return UNPARSEABLE_SCORE;
    };
    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    let full_url = url.to_lowercase();

    let mut score = domain_score(&host);

    for flag in red_flags() {
        if flag.is_match(&full_url) {
            score *= RED_FLAG_PENALTY;
        }
    }

    if parsed.scheme() == "https" {
        score = (score + HTTPS_BONUS).min(1.0);
    }

    if url.chars().count() > LONG_URL_THRESHOLD {
        score *= LONG_URL_PENALTY;
    }

    round2(clamp_unit(score))
}

/// Reputation of `host` before URL-shape adjustments.
fn domain_score(host: &str) -> f64 {
    let named = DOMAIN_SCORES
        .iter()
        .find(|(domain, _)| !domain.starts_with('.') && host.contains(domain));
    if let Some((_, value)) = named {
        return *value;
    }

    DOMAIN_SCORES
        .iter()
        .find(|(suffix, _)| suffix.starts_with('.') && host.ends_with(suffix))
        .map_or(BASE_SCORE, |(_, value)| BASE_SCORE.max(*value))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score, filter and rank `sources`.
///
/// Sources already scored above 0.8 keep their score; all others are
/// rescored from their URL. Survivors with a score of at least
/// `min_score` are returned highest first. Equal scores keep their input
/// order.
pub fn filter_sources(sources: &[Source], min_score: f64) -> Vec<Source> {
    let mut kept: Vec<Source> = sources
        .iter()
        .map(|source| {
            let value = if source.credibility_score > TRUSTED_PRESCORE {
                source.credibility_score
            } else {
                score(&source.url)
            };
            source.clone().with_credibility(value)
        })
        .filter(|source| source.credibility_score >= min_score)
        .collect();

    kept.sort_by(|a, b| b.credibility_score.total_cmp(&a.credibility_score));

    tracing::debug!(
        input = sources.len(),
        kept = kept.len(),
        min_score,
        "credibility filter applied"
    );
    kept
}
