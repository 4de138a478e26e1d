//! Core types for search requests and the typed result set.
//!
//! The serialized field names follow the familiar web-search response
//! shape (`_type`, `queryContext`, `webPages.value[]`).

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Exclusive upper bound on the number of results one window may request.
pub const MAX_WINDOW_COUNT: usize = 50;

/// The `(query, count, offset)` window a caller wants from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchWindow {
    query: String,
    count: usize,
    offset: usize,
}

impl SearchWindow {
    /// Build a validated window.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidRequest`] if `query` is blank or
    /// `count` is outside `1..MAX_WINDOW_COUNT`.
    pub fn new(query: impl Into<String>, count: usize, offset: usize) -> Result<Self, SearchError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(SearchError::InvalidRequest(
                "query must not be empty".into(),
            ));
        }
        if count == 0 || count >= MAX_WINDOW_COUNT {
            return Err(SearchError::InvalidRequest(format!(
                "count must be greater than 0 and less than {MAX_WINDOW_COUNT}, got {count}"
            )));
        }
        Ok(Self {
            query,
            count,
            offset,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// One extracted web result.
///
/// Every field except `id` is optional; `None` means the markup did not
/// carry that element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebResult {
    /// 1-based output position.
    pub id: String,
    pub name: Option<String>,
    pub display_url: Option<String>,
    pub url: Option<String>,
    /// Body text, already cut to the configured maximum length.
    pub snippet: Option<String>,
    pub site_name: Option<String>,
    pub site_icon: Option<String>,
    #[serde(rename = "siteImage", default)]
    pub site_images: Vec<String>,
    /// `yyyy-MM-dd`, derived from the date phrase in front of the snippet.
    pub date_last_crawled: Option<String>,
}

/// The query as the engine saw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryContext {
    pub original_query: String,
    /// Never populated by this engine.
    pub altered_query: Option<String>,
}

/// The page list of a [`SearchResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebPages {
    /// Freshly generated for every call.
    pub id: String,
    /// Best effort; `0` when the count text was missing or unparseable.
    pub total_estimated_matches: u64,
    /// Constructed from the query, not the URL the engine ended up on.
    pub web_search_url: String,
    pub value: Vec<WebResult>,
}

/// Aggregate result of one search call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(rename = "_type")]
    pub kind: String,
    pub query_context: QueryContext,
    pub web_pages: WebPages,
}

/// Type hint carried in the `_type` field.
pub const SEARCH_RESPONSE_TYPE: &str = "SearchResponse";

impl SearchResponse {
    /// The extracted results in output order.
    pub fn results(&self) -> &[WebResult] {
        &self.web_pages.value
    }

    /// Snippets in output order, with missing snippets as empty strings.
    pub fn snippets(&self) -> Vec<String> {
        self.results()
            .iter()
            .map(|r| r.snippet.clone().unwrap_or_default())
            .collect()
    }

    /// Results reduced to the generic `(name, link, value)` text-search shape.
    pub fn text_results(&self) -> Vec<TextSearchResult> {
        self.results().iter().map(TextSearchResult::from).collect()
    }
}

/// A result in the generic text-search shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSearchResult {
    pub name: Option<String>,
    pub link: Option<String>,
    pub value: String,
}

impl From<&WebResult> for TextSearchResult {
    fn from(result: &WebResult) -> Self {
        Self {
            name: result.name.clone(),
            link: result.url.clone(),
            value: result.snippet.clone().unwrap_or_default(),
        }
    }
}
