//! Headless Chromium session owned by a single discovery run.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use leadscout_core::AppConfig;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::ScraperError;

/// Flags that let Chromium start inside unprivileged containers.
const CONTAINER_ARGS: [&str; 4] = [
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
];

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    pub user_agent: String,
    pub page_timeout: Duration,
}

impl BrowserOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            headless: config.browser_headless,
            chrome_executable: config.chrome_executable.clone(),
            user_agent: config.user_agent.clone(),
            page_timeout: Duration::from_secs(config.page_timeout_secs),
        }
    }

    fn launch_args(&self) -> Vec<String> {
        let mut args: Vec<String> = CONTAINER_ARGS.iter().map(|a| (*a).to_string()).collect();
        args.push("--lang=pt-BR".to_string());
        args.push(format!("--user-agent={}", self.user_agent));
        args
    }
}

/// A running browser plus the task that pumps its CDP connection.
///
/// Call [`BrowserSession::close`] when the run ends; dropping the session
/// only stops the event loop.
pub struct BrowserSession {
    browser: Mutex<Option<Browser>>,
    handler: JoinHandle<()>,
    page_timeout: Duration,
}

impl BrowserSession {
    /// Launch Chromium with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::BrowserLaunch`] if the configuration is
    /// rejected or the process cannot be started.
    pub async fn launch(options: &BrowserOptions) -> Result<Self, ScraperError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(options.page_timeout)
            .args(options.launch_args());
        if let Some(ref bin) = options.chrome_executable {
            builder = builder.chrome_executable(bin);
        }
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ScraperError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            tracing::debug!("browser event loop exited");
        });

        tracing::info!(headless = options.headless, "browser session started");
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler,
            page_timeout: options.page_timeout,
        })
    }

    #[must_use]
    pub fn page_timeout(&self) -> Duration {
        self.page_timeout
    }

    /// Open a blank tab.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] if the tab cannot be created, or
    /// [`ScraperError::BrowserLaunch`] if the session was already closed.
    pub async fn new_page(&self) -> Result<Page, ScraperError> {
        let guard = self.browser.lock().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserLaunch("browser session is closed".to_string()))?;
        Ok(browser.new_page("about:blank").await?)
    }

    /// Shut the browser down. Safe to call more than once.
    pub async fn close(&self) {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return;
        };
        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "browser close failed");
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!(error = %e, "waiting for browser exit failed");
        }
        self.handler.abort();
        tracing::info!("browser session closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_args_carry_container_flags_locale_and_agent() {
        let options = BrowserOptions {
            headless: true,
            chrome_executable: None,
            user_agent: "TestAgent/1.0".to_string(),
            page_timeout: Duration::from_secs(5),
        };
        let args = options.launch_args();
        assert!(args.iter().any(|a| a == "--no-sandbox"));
        assert!(args.iter().any(|a| a == "--disable-dev-shm-usage"));
        assert!(args.iter().any(|a| a == "--lang=pt-BR"));
        assert!(args.iter().any(|a| a == "--user-agent=TestAgent/1.0"));
    }
}
