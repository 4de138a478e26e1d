//! Integration tests for the search driver.
//!
//! A scripted in-memory browser serves fixture result pages keyed by the
//! `first=` offset, so the full load → extract → paginate → assemble
//! pipeline runs without a real browser or network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shabing_search::{BrowserPage, PageSource, SearchConfig, SearchError, SearchWindow, ShaBingSearch};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Shared counters and fixtures for one fake browser.
#[derive(Default)]
struct Engine {
    pages: HashMap<usize, String>,
    loads: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
    requested: Mutex<Vec<String>>,
    /// Cancel this token once this many pages have been loaded.
    cancel_after: Option<(usize, CancellationToken)>,
    /// Fail navigation for this offset.
    broken_offset: Option<usize>,
}

impl Engine {
    fn with_pages(pages: Vec<(usize, String)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            ..Default::default()
        }
    }

    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn offsets(&self) -> Vec<usize> {
        self.requested
            .lock()
            .expect("lock")
            .iter()
            .filter_map(|u| Url::parse(u).ok())
            .filter_map(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == "first")
                    .and_then(|(_, v)| v.parse().ok())
            })
            .collect()
    }
}

struct FakeBrowser(Arc<Engine>);

struct FakePage {
    engine: Arc<Engine>,
    current: Mutex<Option<usize>>,
}

impl PageSource for FakeBrowser {
    type Page = FakePage;

    async fn open_page(&self) -> Result<FakePage, SearchError> {
        self.0.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakePage {
            engine: Arc::clone(&self.0),
            current: Mutex::new(None),
        })
    }
}

impl BrowserPage for FakePage {
    async fn goto(&self, url: &str, _timeout: Duration) -> Result<(), SearchError> {
        let engine = &self.engine;
        engine.requested.lock().expect("lock").push(url.to_owned());
        let offset = Url::parse(url)
            .ok()
            .and_then(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == "first")
                    .and_then(|(_, v)| v.parse().ok())
            })
            .unwrap_or(0);
        let loads = engine.loads.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, token)) = &engine.cancel_after {
            if loads >= *after {
                token.cancel();
            }
        }
        if engine.broken_offset == Some(offset) {
            return Err(SearchError::Navigation("connection reset".into()));
        }
        *self.current.lock().expect("lock") = Some(offset);
        Ok(())
    }

    async fn content(&self) -> Result<String, SearchError> {
        let offset = *self.current.lock().expect("lock");
        Ok(offset
            .and_then(|o| self.engine.pages.get(&o).cloned())
            .unwrap_or_else(|| serp(&[], false, None)))
    }

    async fn reload(&self, _timeout: Duration) -> Result<(), SearchError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), SearchError> {
        self.engine.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn organic(label: &str) -> String {
    format!(
        r#"<li class="b_algo">
  <div class="b_tpcn"><a href="https://{label}.example/" aria-label="{label} site"></a></div>
  <h2><a href="https://{label}.example/">Result {label}</a></h2>
  <div class="b_caption"><p class="b_lineclamp2">3天前 · Snippet for {label} with some padding text.</p></div>
</li>"#
    )
}

/// A result page with the given ordinary labels, optional top answer and count text.
fn serp(labels: &[String], top_answer: bool, count: Option<&str>) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><title>serp</title></head><body>");
    if let Some(count) = count {
        html.push_str(&format!(
            r#"<div id="b_tween_searchResults"><span>{count}</span></div>"#
        ));
    }
    html.push_str(r#"<ol id="b_results">"#);
    if top_answer {
        html.push_str(
            r#"<li class="b_ans b_top"><h2><a href="https://answer.example/">Top answer</a></h2><div class="qna_body">The answer.</div></li>"#,
        );
    }
    for label in labels {
        html.push_str(&organic(label));
    }
    html.push_str("</ol></body></html>");
    html
}

fn labels(page: usize, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("p{page}r{i}")).collect()
}

/// Three full pages; the first carries a top answer and count.
fn three_pages(top_answer: bool) -> Engine {
    Engine::with_pages(vec![
        (0, serp(&labels(0, 10), top_answer, Some("约 1,234,567 个结果"))),
        (10, serp(&labels(1, 10), false, None)),
        (20, serp(&labels(2, 10), false, None)),
    ])
}

fn searcher(engine: &Arc<Engine>) -> ShaBingSearch<FakeBrowser> {
    let config = SearchConfig {
        snippet_max_length: 24,
        ..Default::default()
    };
    ShaBingSearch::new(FakeBrowser(Arc::clone(engine)), config).expect("valid config")
}

fn names(response: &shabing_search::SearchResponse) -> Vec<String> {
    response
        .results()
        .iter()
        .map(|r| r.name.clone().unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn empty_query_or_zero_top_performs_no_loads() {
    let engine = Arc::new(three_pages(true));
    let search = searcher(&engine);
    let cancel = CancellationToken::new();

    assert!(search.execute_search("", 5, 0, &cancel).await.expect("ok").is_none());
    assert!(search.execute_search("rust", 0, 0, &cancel).await.expect("ok").is_none());
    let FakeBrowser(counters) = search.source();
    assert_eq!(counters.loads(), 0);
    assert_eq!(counters.opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn top_answer_first_and_ids_sequential() {
    let engine = Arc::new(three_pages(true));
    let response = searcher(&engine)
        .execute_search("rust", 4, 0, &CancellationToken::new())
        .await
        .expect("ok")
        .expect("response");

    assert_eq!(
        names(&response),
        vec!["Top answer", "Result p0r0", "Result p0r1", "Result p0r2"]
    );
    let ids: Vec<&str> = response.results().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);
    assert_eq!(response.web_pages.total_estimated_matches, 1_234_567);
    assert_eq!(response.kind, "SearchResponse");
    assert_eq!(response.query_context.original_query, "rust");
    assert!(response.query_context.altered_query.is_none());
    assert_eq!(response.web_pages.web_search_url, "https://cn.bing.com/search?q=rust");
    assert_eq!(engine.loads(), 1);
}

#[tokio::test]
async fn top_answer_consumes_one_skip() {
    let engine = Arc::new(three_pages(true));
    let response = searcher(&engine)
        .execute_search("rust", 2, 1, &CancellationToken::new())
        .await
        .expect("ok")
        .expect("response");
    assert_eq!(names(&response), vec!["Result p0r0", "Result p0r1"]);
}

#[tokio::test]
async fn window_spans_page_boundary() {
    let engine = Arc::new(three_pages(false));
    let response = searcher(&engine)
        .execute_search("rust", 6, 7, &CancellationToken::new())
        .await
        .expect("ok")
        .expect("response");
    assert_eq!(
        names(&response),
        vec![
            "Result p0r7",
            "Result p0r8",
            "Result p0r9",
            "Result p1r0",
            "Result p1r1",
            "Result p1r2"
        ]
    );
    assert_eq!(engine.offsets(), vec![0, 10]);
}

#[tokio::test]
async fn skip_of_23_lands_on_third_page_with_residual_3() {
    let engine = Arc::new(three_pages(false));
    let response = searcher(&engine)
        .execute_search("rust", 3, 23, &CancellationToken::new())
        .await
        .expect("ok")
        .expect("response");
    assert_eq!(
        names(&response),
        vec!["Result p2r3", "Result p2r4", "Result p2r5"]
    );
    // Page 0 is read once; page 1 lies wholly inside the skip region.
    assert_eq!(engine.offsets(), vec![0, 20]);
}

#[tokio::test]
async fn results_never_exceed_top_and_stop_when_exhausted() {
    for top in [1usize, 5, 10, 15, 29, 40] {
        for skip in [0usize, 3, 10, 19] {
            let engine = Arc::new(three_pages(true));
            let response = searcher(&engine)
                .execute_search("rust", top, skip, &CancellationToken::new())
                .await
                .expect("ok")
                .expect("response");
            let n = response.results().len();
            assert!(n <= top, "top={top} skip={skip} returned {n}");
            for (i, r) in response.results().iter().enumerate() {
                assert_eq!(r.id, (i + 1).to_string());
            }
        }
    }
}

#[tokio::test]
async fn exhausted_engine_returns_partial_results() {
    let engine = Arc::new(three_pages(false));
    let response = searcher(&engine)
        .execute_search("rust", 40, 0, &CancellationToken::new())
        .await
        .expect("ok")
        .expect("response");
    assert_eq!(response.results().len(), 30);
    // Offset 30 served an empty container, which ends pagination.
    assert_eq!(engine.offsets(), vec![0, 10, 20, 30]);
}

#[tokio::test]
async fn missing_container_returns_empty_response_with_zero_total() {
    let engine = Arc::new(Engine::with_pages(vec![(
        0,
        "<html><body><p>Please verify you are a human before continuing.</p></body></html>".into(),
    )]));
    let response = searcher(&engine)
        .execute_search("rust", 5, 0, &CancellationToken::new())
        .await
        .expect("ok")
        .expect("response");
    assert!(response.results().is_empty());
    assert_eq!(response.web_pages.total_estimated_matches, 0);
    assert_eq!(engine.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn navigation_failure_keeps_earlier_pages() {
    let mut engine = three_pages(false);
    engine.broken_offset = Some(10);
    let engine = Arc::new(engine);
    let response = searcher(&engine)
        .execute_search("rust", 15, 0, &CancellationToken::new())
        .await
        .expect("ok")
        .expect("response");
    assert_eq!(response.results().len(), 10);
    assert_eq!(response.web_pages.total_estimated_matches, 1_234_567);
    assert_eq!(engine.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancellation_discards_partial_results() {
    let token = CancellationToken::new();
    let mut engine = three_pages(false);
    engine.cancel_after = Some((2, token.clone()));
    let engine = Arc::new(engine);

    let err = searcher(&engine)
        .execute_search("rust", 25, 0, &token)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Cancelled));
    assert_eq!(engine.loads(), 2);
    assert_eq!(engine.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn pre_cancelled_search_loads_nothing() {
    let token = CancellationToken::new();
    token.cancel();
    let engine = Arc::new(three_pages(false));
    let err = searcher(&engine)
        .execute_search("rust", 5, 0, &token)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Cancelled));
    assert_eq!(engine.loads(), 0);
    assert_eq!(engine.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn snippets_are_dated_and_truncated() {
    let engine = Arc::new(three_pages(false));
    let response = searcher(&engine)
        .execute_search("rust", 1, 0, &CancellationToken::new())
        .await
        .expect("ok")
        .expect("response");
    let first = &response.results()[0];
    let expected_date = (chrono::Local::now().date_naive() - chrono::Days::new(3))
        .format("%Y-%m-%d")
        .to_string();
    assert_eq!(first.date_last_crawled.as_deref(), Some(expected_date.as_str()));
    assert_eq!(first.snippet.as_deref(), Some("Snippet for p0r0 with so"));
    assert_eq!(first.site_name.as_deref(), Some("p0r0 site"));
}

#[tokio::test]
async fn window_search_serializes_to_wire_shape() {
    let engine = Arc::new(three_pages(true));
    let window = SearchWindow::new("rust", 2, 0).expect("window");
    let response = searcher(&engine).search(&window).await.expect("response");
    let json = serde_json::to_value(&response).expect("serialize");
    assert_eq!(json["webPages"]["value"][0]["name"], "Top answer");
    assert_eq!(json["webPages"]["value"][1]["displayUrl"], "https://p0r0.example/");
    assert_eq!(response.snippets().len(), 2);
    assert_eq!(response.text_results()[0].link.as_deref(), Some("https://answer.example/"));
}
