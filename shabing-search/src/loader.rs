//! Page loader: navigate, sanity-check the markup, hand back HTML.
//!
//! A slow page is still read rather than abandoned, and a suspiciously
//! short first paint gets exactly one reload.

use std::time::Duration;

use crate::browser::BrowserPage;
use crate::config::SearchConfig;
use crate::error::SearchError;

/// Loads result pages into markup strings.
#[derive(Debug, Clone)]
pub struct PageLoader {
    timeout: Duration,
    min_content_length: usize,
}

impl PageLoader {
    pub fn new(timeout: Duration, min_content_length: usize) -> Self {
        Self {
            timeout,
            min_content_length,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.timeout(), config.min_content_length)
    }

    /// Navigate `page` to `url` and return its rendered markup.
    ///
    /// Returns `Ok(None)` when the page's content cannot be read at all,
    /// which callers treat as the end of pagination.
    ///
    /// # Errors
    ///
    /// Navigation failures other than a timeout are returned as-is. Timeouts
    /// are absorbed: whatever is already rendered is used instead.
    pub async fn load<P: BrowserPage>(&self, page: &P, url: &str) -> Result<Option<String>, SearchError> {
        match page.goto(url, self.timeout).await {
            Ok(()) => {}
            Err(err) if err.is_timeout() => {
                tracing::debug!(error = %err, "navigation timed out, reading current content");
                return Ok(read_content(page).await);
            }
            Err(err) => return Err(err),
        }

        let Some(html) = read_content(page).await else {
            return Ok(None);
        };
        if html.chars().count() >= self.min_content_length {
            return Ok(Some(html));
        }

        tracing::debug!(bytes = html.len(), "implausibly short page, reloading once");
        match page.reload(self.timeout).await {
            Ok(()) => {}
            Err(err) if err.is_timeout() => {
                tracing::debug!(error = %err, "reload timed out, reading current content");
            }
            Err(err) => return Err(err),
        }
        Ok(read_content(page).await)
    }
}

async fn read_content<P: BrowserPage>(page: &P) -> Option<String> {
    match page.content().await {
        Ok(html) => Some(html),
        Err(err) => {
            tracing::warn!(error = %err, "page content unavailable");
            None
        }
    }
}
