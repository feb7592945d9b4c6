use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;

use super::duckduckgo::decode_redirect;
use super::{push_result, SearchSource};
use crate::browser::BrowserSession;
use crate::error::ScraperError;

const DEFAULT_HOME_URL: &str = "https://duckduckgo.com/?ia=web&kl=br-pt";

/// Cookie and consent banners seen on the engine's landing page.
const CONSENT_SELECTORS: [&str; 4] = [
    "button#onetrust-accept-btn-handler",
    "button[data-testid='privacy-consent-accept']",
    "button.js-cookie-consent-accept",
    "form[action*='consent'] button[type='submit']",
];

const SEARCH_INPUT_SELECTOR: &str = "input[name=q]";
const MORE_RESULTS_SELECTOR: &str = "#more-results, button#more-results";

const COLLECT_HREFS_JS: &str = r"(() => Array.from(document.querySelectorAll('a[href]'))
    .map(a => a.getAttribute('href') || a.href || '')
    .filter(Boolean))()";

/// Pause for client-side rendering after a results page loads.
const RENDER_SETTLE: Duration = Duration::from_millis(800);

/// Searches through a real browser tab: loads the engine, clears any
/// consent overlay, types the query, and pages through results.
pub struct InteractiveSearch {
    session: Arc<BrowserSession>,
    home_url: String,
    max_pages: usize,
}

impl InteractiveSearch {
    #[must_use]
    pub fn new(session: Arc<BrowserSession>, max_pages: usize) -> Self {
        Self {
            session,
            home_url: DEFAULT_HOME_URL.to_string(),
            max_pages: max_pages.max(1),
        }
    }

    async fn collect(
        &self,
        page: &Page,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<String>, ScraperError> {
        page.goto(self.home_url.as_str()).await?;
        dismiss_consent(page).await;

        let input = page.find_element(SEARCH_INPUT_SELECTOR).await?;
        input.click().await?;
        input.type_str(query).await?;
        input.press_key("Enter").await?;
        page.wait_for_navigation().await?;

        let base = page.url().await?.unwrap_or_else(|| self.home_url.clone());

        let mut out = Vec::new();
        for page_index in 0..self.max_pages {
            tokio::time::sleep(RENDER_SETTLE).await;

            let hrefs: Vec<String> = page
                .evaluate(COLLECT_HREFS_JS)
                .await?
                .into_value()
                .map_err(|e| ScraperError::Deserialize {
                    context: "result links".to_string(),
                    source: e,
                })?;

            let mut full = false;
            for href in hrefs {
                let Some(real) = decode_redirect(&href, &base) else {
                    continue;
                };
                if push_result(&mut out, real, max_results) {
                    full = true;
                    break;
                }
            }
            if full || page_index + 1 == self.max_pages {
                break;
            }

            match page.find_element(MORE_RESULTS_SELECTOR).await {
                Ok(more) => {
                    more.click().await?;
                }
                Err(_) => break,
            }
        }
        Ok(out)
    }
}

async fn dismiss_consent(page: &Page) {
    for selector in CONSENT_SELECTORS {
        if let Ok(button) = page.find_element(selector).await {
            if button.click().await.is_ok() {
                tracing::debug!(selector, "dismissed consent banner");
                return;
            }
        }
    }
}

#[async_trait]
impl SearchSource for InteractiveSearch {
    fn name(&self) -> &'static str {
        "duckduckgo_browser"
    }

    async fn search(&self, query: &str, max_results: usize) -> Vec<String> {
        if max_results == 0 {
            return Vec::new();
        }
        let page = match self.session.new_page().await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    engine = self.name(),
                    query,
                    error = %e,
                    "could not open search tab"
                );
                return Vec::new();
            }
        };

        // One page timeout per result page, plus one for the typed query.
        let pages = u32::try_from(self.max_pages + 1).unwrap_or(u32::MAX);
        let budget = self.session.page_timeout() * pages;
        let collect = self.collect(&page, query, max_results);
        let outcome = tokio::time::timeout(budget, collect).await;

        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "failed to close search tab");
        }

        match outcome {
            Ok(Ok(links)) => {
                tracing::debug!(
                    engine = self.name(),
                    query,
                    count = links.len(),
                    "collected results"
                );
                links
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    engine = self.name(),
                    query,
                    error = %e,
                    "interactive search failed"
                );
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    engine = self.name(),
                    query,
                    secs = budget.as_secs(),
                    "interactive search timed out"
                );
                Vec::new()
            }
        }
    }
}
