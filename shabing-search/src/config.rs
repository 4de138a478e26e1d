//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] is fixed when a [`crate::ShaBingSearch`] is constructed
//! and controls the engine host, page-load budget, snippet length and
//! browser behaviour.

use std::time::Duration;

use url::Url;

use crate::error::SearchError;

/// Default engine origin.
pub const DEFAULT_HOST: &str = "https://cn.bing.com";

/// Configuration for a search instance.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Engine origin, e.g. `https://cn.bing.com`. No trailing path.
    pub host: String,
    /// Page-load budget in milliseconds for each navigation or reload.
    pub timeout_ms: u64,
    /// Snippets longer than this many characters are cut off.
    pub snippet_max_length: usize,
    /// Run the browser with a visible window.
    pub debug: bool,
    /// Markup shorter than this many characters triggers a single reload.
    pub min_content_length: usize,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            timeout_ms: 2500,
            snippet_max_length: 300,
            debug: false,
            min_content_length: 100,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `host` must be an absolute `http` or `https` URL
    /// - `timeout_ms` must be greater than 0
    /// - `snippet_max_length` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        let host = Url::parse(&self.host)
            .map_err(|e| SearchError::Config(format!("host is not a valid URL: {e}")))?;
        if !matches!(host.scheme(), "http" | "https") {
            return Err(SearchError::Config(
                "host must use http or https".into(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(SearchError::Config(
                "timeout_ms must be greater than 0".into(),
            ));
        }
        if self.snippet_max_length == 0 {
            return Err(SearchError::Config(
                "snippet_max_length must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// The page-load budget as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The host with any trailing slash removed, ready for path concatenation.
    pub fn origin(&self) -> &str {
        self.host.trim_end_matches('/')
    }
}
