//! # shabing-search
//!
//! Browser-driven scraping of Bing result pages into a typed result set.
//!
//! Result pages are rendered in a real browser, then parsed with CSS
//! selector heuristics into ranked [`WebResult`]s with title, URL,
//! snippet, site metadata, an optional featured top answer and an
//! estimated total-match count. A caller's `(count, offset)` window is
//! reconciled against the engine's fixed ten-result pages.
//!
//! ## Design
//!
//! - [`browser`] defines the page driver traits; [`chromium`] implements
//!   them over a launched Chromium
//! - [`loader`] navigates and sanity-checks each page
//! - [`extract`] applies first-match-wins selector chains per field
//! - [`pagination`] is the pure offset/count state machine
//! - [`search`] runs the sequential fetch loop and assembles the response
//! - Graceful degradation: missing markup leaves fields absent, failed
//!   pages end pagination with the results gathered so far
//!
//! ## Security
//!
//! - No API keys or secrets
//! - No network listeners; this is a library, not a server
//! - Search queries are logged only at trace level

pub mod browser;
pub mod chromium;
pub mod config;
pub mod error;
pub mod extract;
pub mod loader;
pub mod normalize;
pub mod pagination;
pub mod search;
pub mod types;

pub use browser::{BrowserPage, PageGuard, PageSource};
pub use chromium::{ChromiumBrowser, ChromiumPage};
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use search::ShaBingSearch;
pub use types::{SearchResponse, SearchWindow, TextSearchResult, WebResult};

/// Launch Chromium and build a search instance over it.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid configuration, or
/// [`SearchError::Browser`] if Chromium cannot be started.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> shabing_search::Result<()> {
/// let search = shabing_search::launch(shabing_search::SearchConfig::default()).await?;
/// let window = shabing_search::SearchWindow::new("rust programming", 10, 0)?;
/// let response = search.search(&window).await?;
/// for result in response.results() {
///     println!("{}: {:?}", result.id, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn launch(config: SearchConfig) -> Result<ShaBingSearch<ChromiumBrowser>> {
    config.validate()?;
    let browser = ChromiumBrowser::launch(&config).await?;
    ShaBingSearch::new(browser, config)
}
