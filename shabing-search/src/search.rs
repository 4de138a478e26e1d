//! Search driver: the sequential fetch loop over result pages.
//!
//! One call checks out one browser page, loads engine pages one after the
//! other, feeds each into the [`PaginationState`] and assembles the final
//! [`SearchResponse`]. Failures inside the loop end pagination but still
//! produce a response; only cancellation surfaces as an error.

use chrono::Local;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::browser::{BrowserPage, PageGuard, PageSource};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::extract::Extractor;
use crate::loader::PageLoader;
use crate::normalize::encode_query;
use crate::pagination::{PaginationState, Step, StopReason};
use crate::types::{QueryContext, SearchResponse, SearchWindow, WebPages, SEARCH_RESPONSE_TYPE};

/// Query parameter carrying the per-request nonce.
const NONCE_PARAM: &str = "FPIG";
/// Form marker appended to every request.
const FORM_MARKER: (&str, &str) = ("FORM", "PERE1");

/// A configured search instance over a [`PageSource`].
pub struct ShaBingSearch<S: PageSource> {
    source: S,
    config: SearchConfig,
    loader: PageLoader,
    extractor: Extractor,
}

impl<S: PageSource> ShaBingSearch<S> {
    /// Create a search instance that opens pages from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Parse`] if a result selector fails to compile.
    pub fn new(source: S, config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            loader: PageLoader::from_config(&config),
            extractor: Extractor::new(&config)?,
            source,
            config,
        })
    }

    /// The page source this instance opens pages from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Search with a validated window and no cancellation.
    ///
    /// # Errors
    ///
    /// Same as [`ShaBingSearch::execute_search`].
    pub async fn search(&self, window: &SearchWindow) -> Result<SearchResponse, SearchError> {
        let cancel = CancellationToken::new();
        let response = self
            .execute_search(window.query(), window.count(), window.offset(), &cancel)
            .await?;
        // A validated window always has a query and a positive count.
        response.ok_or_else(|| SearchError::InvalidRequest("empty search window".into()))
    }

    /// Fetch up to `top` results after skipping the first `skip`.
    ///
    /// Returns `Ok(None)` without touching the browser when `query` is
    /// empty or `top` is zero.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cancelled`] if `cancel` fires during the call
    /// (buffered results are discarded), or [`SearchError::Browser`] if no
    /// page can be opened. Every other failure ends pagination early and
    /// the results collected so far are returned.
    pub async fn execute_search(
        &self,
        query: &str,
        top: usize,
        skip: usize,
        cancel: &CancellationToken,
    ) -> Result<Option<SearchResponse>, SearchError> {
        if query.is_empty() || top == 0 {
            return Ok(None);
        }
        tracing::trace!(query, top, skip, "search requested");

        let guard = PageGuard::new(self.source.open_page().await?);
        let mut state = PaginationState::new(top, skip);
        let outcome = self.run_pages(guard.page(), query, &mut state, cancel).await;
        guard.release().await;

        match outcome {
            Ok(reason) => tracing::debug!(?reason, pages = state.page_index, "pagination stopped"),
            Err(SearchError::Cancelled) => {
                tracing::debug!("search cancelled, discarding buffered results");
                return Err(SearchError::Cancelled);
            }
            Err(err) => tracing::warn!(error = %err, "search stopped early"),
        }

        let response = self.assemble(query, state);
        tracing::debug!(count = response.results().len(), "search complete");
        Ok(Some(response))
    }

    async fn run_pages<P: BrowserPage>(
        &self,
        page: &P,
        query: &str,
        state: &mut PaginationState,
        cancel: &CancellationToken,
    ) -> Result<StopReason, SearchError> {
        loop {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }

            let url = self.request_url(query, state.result_offset());
            let Some(html) = self.loader.load(page, &url).await? else {
                return Ok(StopReason::PageUnavailable);
            };

            let today = Local::now().date_naive();
            let result_page = self
                .extractor
                .extract_page(&html, state.page_index == 0, today, cancel)?;
            match state.absorb(result_page, cancel)? {
                Step::Continue => {}
                Step::Stop(reason) => return Ok(reason),
            }
        }
    }

    /// Engine URL for the page starting at result `offset`.
    pub fn request_url(&self, query: &str, offset: usize) -> String {
        let nonce = Uuid::new_v4().simple().to_string();
        let offset = offset.to_string();
        let params: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", query)
            .append_pair(NONCE_PARAM, &nonce)
            .append_pair("first", &offset)
            .append_pair(FORM_MARKER.0, FORM_MARKER.1)
            .finish();
        format!("{}/search?{params}", self.config.origin())
    }

    /// Human-facing search URL reported in the response.
    pub fn web_search_url(&self, query: &str) -> String {
        format!("{}/search?q={}", self.config.origin(), encode_query(query))
    }

    fn assemble(&self, query: &str, state: PaginationState) -> SearchResponse {
        let total_estimated_matches = state.total_estimated_matches.unwrap_or(0);
        SearchResponse {
            kind: SEARCH_RESPONSE_TYPE.to_owned(),
            query_context: QueryContext {
                original_query: query.to_owned(),
                altered_query: None,
            },
            web_pages: WebPages {
                id: Uuid::new_v4().to_string(),
                total_estimated_matches,
                web_search_url: self.web_search_url(query),
                value: state.into_results(),
            },
        }
    }
}
