//! Pagination state machine.
//!
//! The engine pages in fixed blocks of [`PAGE_SIZE`] ordinary results,
//! while callers ask for an arbitrary `(count, offset)` window.
//! [`PaginationState`] reconciles the two: one [`PaginationState::absorb`]
//! call per loaded page decides which results enter the buffer, which page
//! to fetch next, and whether to stop. It performs no I/O.

use tokio_util::sync::CancellationToken;

use crate::error::SearchError;
use crate::extract::ResultPage;
use crate::types::WebResult;

/// Ordinary results per engine page.
pub const PAGE_SIZE: usize = 10;

/// Why the fetch loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The buffer holds the requested number of results.
    Filled,
    /// The page had no results container (empty, blocked or interstitial).
    NoResultsContainer,
    /// The page had a container but no ordinary results.
    Exhausted,
    /// The browser page could not produce any content.
    PageUnavailable,
}

/// Outcome of absorbing one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Fetch the page at [`PaginationState::page_index`] next.
    Continue,
    Stop(StopReason),
}

/// Counters and output buffer carried across loop iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// Zero-based engine page to fetch next.
    pub page_index: usize,
    /// Result slots still to be skipped before buffering starts.
    pub skip_remaining: usize,
    /// Requested result count.
    pub top: usize,
    /// Collected results, in output order.
    pub results: Vec<WebResult>,
    /// Total-match estimate from the first page, if it parsed.
    pub total_estimated_matches: Option<u64>,
}

impl PaginationState {
    pub fn new(top: usize, skip: usize) -> Self {
        Self {
            page_index: 0,
            skip_remaining: skip,
            top,
            results: Vec::with_capacity(top.min(PAGE_SIZE * 5)),
            total_estimated_matches: None,
        }
    }

    /// Engine result offset (`first=` parameter) of the next page to fetch.
    pub fn result_offset(&self) -> usize {
        self.page_index * PAGE_SIZE
    }

    pub fn is_filled(&self) -> bool {
        self.results.len() >= self.top
    }

    /// Fold one loaded page into the state.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cancelled`] if `cancel` fires before an
    /// ordinary result is consumed.
    pub fn absorb(&mut self, page: ResultPage, cancel: &CancellationToken) -> Result<Step, SearchError> {
        if !page.results_container_present {
            tracing::info!(page = self.page_index, "no results container");
            return Ok(Step::Stop(StopReason::NoResultsContainer));
        }

        if self.page_index == 0 {
            self.total_estimated_matches = page.total_estimated_matches;
            if let Some(answer) = page.top_answer {
                if self.skip_remaining >= 1 {
                    self.skip_remaining -= 1;
                } else {
                    self.push(answer);
                    if self.is_filled() {
                        return Ok(Step::Stop(StopReason::Filled));
                    }
                }
            }
        }

        if page.ordinary_results.is_empty() {
            tracing::info!(page = self.page_index, "no result items on page");
            return Ok(Step::Stop(StopReason::Exhausted));
        }

        if self.skip_remaining < PAGE_SIZE {
            for result in page.ordinary_results {
                if cancel.is_cancelled() {
                    return Err(SearchError::Cancelled);
                }
                if self.skip_remaining > 0 {
                    self.skip_remaining -= 1;
                    continue;
                }
                self.push(result);
                if self.is_filled() {
                    return Ok(Step::Stop(StopReason::Filled));
                }
            }
            self.page_index += 1;
        } else {
            // Whole pages inside the skip region are never consumed.
            self.page_index += self.skip_remaining / PAGE_SIZE;
            self.skip_remaining %= PAGE_SIZE;
        }

        if self.is_filled() {
            Ok(Step::Stop(StopReason::Filled))
        } else {
            Ok(Step::Continue)
        }
    }

    /// Take the buffered results, renumbering ids `1..=N` by output position.
    pub fn into_results(self) -> Vec<WebResult> {
        self.results
            .into_iter()
            .enumerate()
            .map(|(index, mut result)| {
                result.id = (index + 1).to_string();
                result
            })
            .collect()
    }

    fn push(&mut self, mut result: WebResult) {
        result.id = (self.results.len() + 1).to_string();
        self.results.push(result);
    }
}
