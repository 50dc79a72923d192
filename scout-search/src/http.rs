//! Shared HTTP client with User-Agent rotation.
//!
//! Provides a configured [`reqwest::Client`] with browser-like headers
//! and rotating User-Agent strings. Page fetches look like an ordinary
//! browser visit; API calls can pass their own agent string.

use crate::error::SearchError;
use rand::seq::SliceRandom;
use std::time::Duration;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Identity sent to academic APIs, which ask clients to identify themselves.
pub const API_USER_AGENT: &str = concat!("scout/", env!("CARGO_PKG_VERSION"));

/// Maximum redirects followed by any client.
const MAX_REDIRECTS: usize = 10;

/// Build a [`reqwest::Client`] with the given timeout and User-Agent.
///
/// When `user_agent` is `None` a random browser User-Agent is used.
/// Redirects are followed up to a fixed limit; gzip and brotli bodies
/// are decoded transparently.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(
    timeout_seconds: u64,
    user_agent: Option<&str>,
) -> Result<reqwest::Client, SearchError> {
    let ua = match user_agent {
        Some(custom) => custom.to_owned(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn build_client_with_rotating_ua() {
        assert!(build_client(15, None).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        assert!(build_client(15, Some("CustomBot/1.0")).is_ok());
    }

    #[test]
    fn api_user_agent_names_the_crate_version() {
        assert!(API_USER_AGENT.starts_with("scout/"));
    }
}
