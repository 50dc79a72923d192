//! Error types for the scout-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. No API keys or sensitive data appear in
//! error messages.

/// Errors that can occur while discovering or fetching sources.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A request did not complete within its timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The remote service answered with a non-success status.
    #[error("HTTP status {status}: {message}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Short description from the service, if any.
        message: String,
    },

    /// The remote service is rate-limiting us.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The provider needs credentials that were not configured.
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// Failed to parse a response body.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Classify a [`reqwest::Error`] into a timeout or a generic HTTP failure.
    pub fn from_reqwest(context: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{context}: {err}"))
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                message: context.to_owned(),
            }
        } else {
            Self::Http(format!("{context}: {err}"))
        }
    }
}

/// Convenience type alias for scout-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_timeout() {
        let err = SearchError::Timeout("exceeded 15s limit".into());
        assert_eq!(err.to_string(), "request timed out: exceeded 15s limit");
    }

    #[test]
    fn display_http() {
        let err = SearchError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_status() {
        let err = SearchError::Status {
            status: 403,
            message: "daily limit exceeded".into(),
        };
        assert_eq!(err.to_string(), "HTTP status 403: daily limit exceeded");
    }

    #[test]
    fn display_missing_credentials() {
        let err = SearchError::MissingCredentials("GOOGLE_API_KEY not set".into());
        assert_eq!(
            err.to_string(),
            "missing credentials: GOOGLE_API_KEY not set"
        );
    }

    #[test]
    fn display_parse() {
        let err = SearchError::Parse("unexpected JSON shape".into());
        assert_eq!(err.to_string(), "parse error: unexpected JSON shape");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
