//! Trait definitions for the browser-automation driver.
//!
//! The search core only needs a handful of page operations: navigate,
//! read the rendered markup, reload and close. [`PageSource`] hands out
//! isolated pages; [`BrowserPage`] drives one of them. The Chromium
//! implementation lives in [`crate::chromium`]; tests plug in fakes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SearchError;

/// One browser tab checked out for a single search call.
///
/// All implementations must be `Send + Sync` so a search future can move
/// between runtime threads.
pub trait BrowserPage: Send + Sync + 'static {
    /// Navigate to `url` and wait for network idle, whichever of that or
    /// `timeout` comes first. `timeout` covers the whole call.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::NavigationTimeout`] if the page did not settle
    /// within `timeout`, or another [`SearchError`] if navigation failed.
    fn goto(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), SearchError>> + Send;

    /// Read the page's current serialized markup.
    fn content(&self) -> impl Future<Output = Result<String, SearchError>> + Send;

    /// Reload the current page and wait for it to settle.
    ///
    /// # Errors
    ///
    /// Same as [`BrowserPage::goto`].
    fn reload(&self, timeout: Duration) -> impl Future<Output = Result<(), SearchError>> + Send;

    /// Close the page, releasing its browser resources. The page must not
    /// be driven afterwards.
    fn close(&self) -> impl Future<Output = Result<(), SearchError>> + Send;
}

/// Something that can open fresh, isolated pages (typically a browser).
pub trait PageSource: Send + Sync {
    /// The page type handed out by this source.
    type Page: BrowserPage;

    /// Open a new blank page.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Browser`] if no page can be created.
    fn open_page(&self) -> impl Future<Output = Result<Self::Page, SearchError>> + Send;
}

/// Scoped ownership of a checked-out page.
///
/// Call [`PageGuard::release`] on every normal exit path. If the guard is
/// dropped without being released (the owning future was dropped mid-call)
/// the close is handed to the current tokio runtime instead.
#[derive(Debug)]
pub struct PageGuard<P: BrowserPage> {
    page: Arc<P>,
    released: bool,
}

impl<P: BrowserPage> PageGuard<P> {
    pub fn new(page: P) -> Self {
        Self {
            page: Arc::new(page),
            released: false,
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Close the page now, logging (not returning) any close failure.
    pub async fn release(mut self) {
        self.released = true;
        if let Err(err) = self.page.close().await {
            tracing::warn!(error = %err, "failed to close search page");
        }
    }
}

impl<P: BrowserPage> Drop for PageGuard<P> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let page = Arc::clone(&self.page);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = page.close().await {
                        tracing::warn!(error = %err, "failed to close abandoned search page");
                    }
                });
            }
            Err(_) => tracing::warn!("search page dropped outside a runtime; not closed"),
        }
    }
}
