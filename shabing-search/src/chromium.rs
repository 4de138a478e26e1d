//! Chromium-backed browser driver.
//!
//! Launches a Chromium instance through the DevTools protocol and hands
//! out stealth-mode pages with a rotating User-Agent. Navigation and the
//! follow-up network-idle wait share one deadline. The CDP event
//! handler must be polled for the browser to make progress, so it runs on
//! its own task for the lifetime of [`ChromiumBrowser`].

use std::future::Future;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::browser::{BrowserPage, PageSource};
use crate::config::SearchConfig;
use crate::error::SearchError;

/// Realistic browser User-Agent strings, rotated per page.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is a non-empty const array; choose only returns None on empty slices.
        .unwrap_or(USER_AGENTS[0])
}

/// A launched Chromium process.
pub struct ChromiumBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
    user_agent: Option<String>,
}

impl ChromiumBrowser {
    /// Launch Chromium, headless unless `config.debug` is set.
    ///
    /// Requires Chromium or Google Chrome to be installed.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Browser`] if the browser cannot be configured
    /// or started.
    pub async fn launch(config: &SearchConfig) -> Result<Self, SearchError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .window_size(1920, 1080);
        if config.debug {
            builder = builder.with_head();
        }
        let browser_config = builder
            .build()
            .map_err(|e| SearchError::Browser(format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SearchError::Browser(format!("browser launch failed: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    // Chromium emits CDP messages the client does not model; keep polling.
                    tracing::trace!(error = %err, "CDP handler event error");
                }
            }
        });

        tracing::debug!(headless = !config.debug, "Chromium launched");

        Ok(Self {
            browser,
            handler,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Close the browser process and stop its event handler.
    pub async fn shutdown(mut self) {
        if let Err(err) = self.browser.close().await {
            tracing::warn!(error = %err, "failed to close Chromium");
        }
        self.handler.abort();
    }
}

impl PageSource for ChromiumBrowser {
    type Page = ChromiumPage;

    async fn open_page(&self) -> Result<ChromiumPage, SearchError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SearchError::Browser(format!("new page failed: {e}")))?;

        let agent = self
            .user_agent
            .clone()
            .unwrap_or_else(|| random_user_agent().to_owned());
        if let Err(err) = page.enable_stealth_mode_with_agent(&agent).await {
            tracing::debug!(error = %err, "stealth mode unavailable");
        }

        Ok(ChromiumPage { page })
    }
}

/// One Chromium tab.
#[derive(Clone)]
pub struct ChromiumPage {
    page: Page,
}

/// In-page network-idle check: `readyState` is `complete` and the resource
/// entry count has not moved for `idleMs`.
const NETWORK_IDLE_JS: &str = r#"(async (timeoutMs) => {
    const idleMs = 500;
    const interval = 100;
    const start = Date.now();
    const resources = () => {
        try { return performance.getEntriesByType('resource').length; } catch (_) { return 0; }
    };
    let lastCount = resources();
    let stableMs = 0;
    while (Date.now() - start < timeoutMs) {
        await new Promise(r => setTimeout(r, interval));
        const count = resources();
        if (document.readyState === 'complete' && count === lastCount) {
            stableMs += interval;
            if (stableMs >= idleMs) {
                return { ok: true, resourceCount: count };
            }
        } else {
            stableMs = 0;
        }
        lastCount = count;
    }
    return { ok: false, resourceCount: lastCount };
})"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdleReport {
    ok: bool,
    resource_count: u64,
}

impl ChromiumPage {
    /// Wait for the network to go quiet, giving up after `budget`.
    async fn network_idle(&self, budget: Duration) -> Result<(), SearchError> {
        let script = format!("{NETWORK_IDLE_JS}({})", budget.as_millis());
        let report = match self.page.evaluate(script).await {
            Ok(result) => result.into_value::<IdleReport>(),
            Err(err) => {
                // Loaded but not scriptable (e.g. an interstitial); treat as settled.
                tracing::debug!(error = %err, "network-idle check unavailable");
                return Ok(());
            }
        };
        match report {
            Ok(IdleReport { ok: true, resource_count }) => {
                tracing::trace!(resource_count, "network idle");
                Ok(())
            }
            Ok(IdleReport { ok: false, .. }) => Err(SearchError::NavigationTimeout(format!(
                "network still busy after {}ms",
                budget.as_millis()
            ))),
            Err(err) => {
                tracing::debug!(error = %err, "unexpected network-idle report");
                Ok(())
            }
        }
    }
}

/// Run `navigate` then the network-idle wait under a single deadline.
///
/// `idle` is handed whatever is left of `timeout` once navigation is done.
/// Running out of time in either step is a [`SearchError::NavigationTimeout`].
async fn settle_within<N, I, F>(
    timeout: Duration,
    what: &str,
    navigate: N,
    idle: F,
) -> Result<(), SearchError>
where
    N: Future<Output = Result<(), SearchError>>,
    F: FnOnce(Duration) -> I,
    I: Future<Output = Result<(), SearchError>>,
{
    let deadline = Instant::now() + timeout;
    let exceeded = || {
        SearchError::NavigationTimeout(format!("{what} exceeded {}ms", timeout.as_millis()))
    };

    tokio::time::timeout_at(deadline, navigate)
        .await
        .map_err(|_| exceeded())??;
    let remaining = deadline.saturating_duration_since(Instant::now());
    tokio::time::timeout_at(deadline, idle(remaining))
        .await
        .map_err(|_| exceeded())?
}

impl BrowserPage for ChromiumPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), SearchError> {
        let navigate = async {
            self.page
                .goto(url)
                .await
                .map(|_| ())
                .map_err(|e| SearchError::Navigation(format!("goto failed: {e}")))
        };
        settle_within(timeout, "goto", navigate, |budget| self.network_idle(budget)).await
    }

    async fn content(&self) -> Result<String, SearchError> {
        self.page
            .content()
            .await
            .map_err(|e| SearchError::Browser(format!("reading page content failed: {e}")))
    }

    async fn reload(&self, timeout: Duration) -> Result<(), SearchError> {
        let navigate = async {
            self.page
                .reload()
                .await
                .map(|_| ())
                .map_err(|e| SearchError::Navigation(format!("reload failed: {e}")))
        };
        settle_within(timeout, "reload", navigate, |budget| self.network_idle(budget)).await
    }

    async fn close(&self) -> Result<(), SearchError> {
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| SearchError::Browser(format!("closing page failed: {e}")))
    }
}
