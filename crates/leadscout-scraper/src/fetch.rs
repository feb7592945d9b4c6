//! Page fetchers: plain HTTP or a rendered browser tab.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::browser::BrowserSession;
use crate::error::ScraperError;
use crate::extract::{clean_title, page_title};

/// A fetched page ready for phone extraction.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub html: String,
    pub title: Option<String>,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Load `url` and return its markup.
    ///
    /// # Errors
    ///
    /// Any failure loading the page. Callers treat errors as "skip this URL".
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ScraperError>;
}

/// GET `url` and return the body, treating non-2xx statuses as errors.
pub(crate) async fn get_html(client: &Client, url: &str) -> Result<String, ScraperError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}

/// Fetches server-rendered markup with a plain HTTP request.
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        let html = get_html(&self.client, url).await?;
        let title = page_title(&html);
        Ok(FetchedPage {
            url: url.to_string(),
            html,
            title,
        })
    }
}

/// Loads each page in a fresh tab of the run's browser so client-rendered
/// content is present in the markup.
pub struct BrowserPageFetcher {
    session: Arc<BrowserSession>,
}

impl BrowserPageFetcher {
    #[must_use]
    pub fn new(session: Arc<BrowserSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl PageFetcher for BrowserPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        let page = self.session.new_page().await?;
        let timeout = self.session.page_timeout();

        let loaded = tokio::time::timeout(timeout, async {
            page.goto(url).await?;
            let html = page.content().await?;
            let title = page.get_title().await?;
            Ok::<_, ScraperError>((html, title))
        })
        .await;

        if let Err(e) = page.close().await {
            tracing::debug!(url, error = %e, "failed to close tab");
        }

        let (html, title) = loaded.map_err(|_| ScraperError::Timeout {
            url: url.to_string(),
            secs: timeout.as_secs(),
        })??;

        let title = title
            .as_deref()
            .and_then(clean_title)
            .or_else(|| page_title(&html));
        Ok(FetchedPage {
            url: url.to_string(),
            html,
            title,
        })
    }
}
