//! Error types for the shabing-search crate.
//!
//! Messages are stable strings suitable for display and programmatic
//! matching. Search queries never appear in error messages.

/// Errors that can occur while driving or parsing a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The caller asked for something that can never produce results
    /// (empty query, result count out of range).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A page navigation or reload did not settle within the configured budget.
    #[error("navigation timed out: {0}")]
    NavigationTimeout(String),

    /// A page navigation failed for a reason other than a timeout.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The browser or one of its pages is unusable.
    #[error("browser error: {0}")]
    Browser(String),

    /// A result-page selector could not be compiled.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The caller cancelled the search; partial results were discarded.
    #[error("search cancelled")]
    Cancelled,
}

impl SearchError {
    /// Whether this error is a navigation timeout, which the page loader
    /// recovers from by reading whatever content is already rendered.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NavigationTimeout(_))
    }
}

/// Convenience type alias for shabing-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
