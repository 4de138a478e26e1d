//! Result-page extraction heuristics.
//!
//! Turns one rendered result page into a [`ResultPage`]: whether the
//! results container exists, the optional top-answer card and total-match
//! count (first page only), and the ordinary results in display order.
//! Each field is read through its own ordered fallback chain.

mod chain;
mod organic;
mod selectors;
mod top_answer;

use chrono::NaiveDate;
use scraper::Html;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::normalize::parse_total_count;
use crate::types::WebResult;

use chain::text_of;
use selectors::Selectors;

/// Everything extracted from one result page.
///
/// Results carry an empty `id`; ids are assigned when results enter the
/// output buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    /// `false` when the engine rendered no results container (empty,
    /// blocked or interstitial page).
    pub results_container_present: bool,
    /// Parsed "about N results" summary, `None` when unknown.
    pub total_estimated_matches: Option<u64>,
    /// Featured card, only looked for on the first page.
    pub top_answer: Option<WebResult>,
    /// Ordinary results in display order.
    pub ordinary_results: Vec<WebResult>,
}

/// Applies the selector heuristics to rendered markup.
#[derive(Debug)]
pub struct Extractor {
    selectors: Selectors,
    host: Url,
    snippet_max_length: usize,
}

impl Extractor {
    /// Build an extractor for the configured host and snippet length.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the host is not a URL, or
    /// [`SearchError::Parse`] if a selector fails to compile.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let host = Url::parse(config.origin())
            .map_err(|e| SearchError::Config(format!("host is not a valid URL: {e}")))?;
        Ok(Self {
            selectors: Selectors::new()?,
            host,
            snippet_max_length: config.snippet_max_length,
        })
    }

    /// Extract a [`ResultPage`] from `html`.
    ///
    /// The total count and top answer are only read when `first_page` is
    /// set. `today` anchors relative date phrases.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cancelled`] if `cancel` fires before an
    /// ordinary result node is processed.
    pub fn extract_page(
        &self,
        html: &str,
        first_page: bool,
        today: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<ResultPage, SearchError> {
        let s = &self.selectors;
        let document = Html::parse_document(html);
        let Some(container) = document.select(&s.container).next() else {
            return Ok(ResultPage::default());
        };

        let (total_estimated_matches, top_answer) = if first_page {
            let summary = text_of(document.root_element(), &s.total_count);
            (
                parse_total_count(summary.as_deref()),
                top_answer::extract(container, s, self.snippet_max_length),
            )
        } else {
            (None, None)
        };

        let ordinary_results = container
            .select(&s.organic)
            .map(|item| {
                if cancel.is_cancelled() {
                    return Err(SearchError::Cancelled);
                }
                Ok(organic::extract(item, s, &self.host, self.snippet_max_length, today))
            })
            .collect::<Result<Vec<WebResult>, SearchError>>()?;

        tracing::debug!(
            first_page,
            top_answer = top_answer.is_some(),
            count = ordinary_results.len(),
            "result page parsed"
        );

        Ok(ResultPage {
            results_container_present: true,
            total_estimated_matches,
            top_answer,
            ordinary_results,
        })
    }
}
