//! Builds a [`Pipeline`] from configuration for a single run and tears its
//! resources down afterwards.
//!
//! Each run owns its browser session. The session is closed on every exit
//! path once the run future completes.

use std::future::Future;
use std::sync::Arc;

use leadscout_core::{AppConfig, Pacing, RunResult, ValidationOutcome};
use leadscout_reachability::build_validator;
use leadscout_scraper::{
    build_http_client, BingHtml, BrowserOptions, BrowserPageFetcher, BrowserSession,
    DiscoveryCascade, DuckDuckGoHtml, ExtractionOrchestrator, HttpPageFetcher, InteractiveSearch,
    PageFetcher, PlacesClient, SearchSource,
};
use reqwest::Client;

use crate::error::PipelineError;
use crate::pipeline::{clean_numbers, validate_raw_numbers, Pipeline};
use crate::request::{PipelineSettings, RunRequest};

/// Run one discovery request with components built from `config`.
///
/// The request is validated before any browser or client is created.
///
/// # Errors
///
/// - [`PipelineError::InvalidInput`] for a rejected request.
/// - [`PipelineError::Scraper`] if the HTTP client cannot be built.
/// - [`PipelineError::Reachability`] from inline validation.
pub async fn run_discovery(
    config: &AppConfig,
    request: RunRequest,
) -> Result<RunResult, PipelineError> {
    let settings = PipelineSettings::from_config(config);
    request.resolve(&settings)?;

    let client = build_http_client(config.request_timeout_secs, &config.user_agent)?;
    let pacing = Pacing::from_config(config);
    let session = launch_browser(config).await;

    let run = async {
        let pipeline = assemble(config, client, &pacing, session.as_ref(), settings)?;
        pipeline.run(request).await
    };
    let close = async {
        if let Some(session) = &session {
            session.close().await;
        }
    };
    close_after(run, close).await
}

/// Await `run`, then `close`, and hand back what `run` produced.
pub(crate) async fn close_after<T>(
    run: impl Future<Output = T>,
    close: impl Future<Output = ()>,
) -> T {
    let output = run.await;
    close.await;
    output
}

/// Validate caller-supplied numbers with the configured provider.
///
/// # Errors
///
/// - [`PipelineError::InvalidInput`] if every entry is blank.
/// - [`PipelineError::Scraper`] if the HTTP client cannot be built.
/// - [`PipelineError::Reachability`] if the provider fails as a whole.
pub async fn validate_numbers(
    config: &AppConfig,
    raw: &[String],
) -> Result<Vec<ValidationOutcome>, PipelineError> {
    clean_numbers(raw)?;
    let client = build_http_client(config.request_timeout_secs, &config.user_agent)?;
    let pacing = Pacing::from_config(config);
    let validator = build_validator(config, client, &pacing);
    validate_raw_numbers(validator.as_ref(), raw, config.default_region).await
}

/// Source names in the order a run consults them.
#[must_use]
pub fn search_mode(config: &AppConfig) -> Vec<&'static str> {
    let mut mode = Vec::new();
    if config.places_api_key.is_some() {
        mode.push("google_places");
    }
    if config.browser_enabled {
        mode.push("duckduckgo_browser");
    }
    mode.extend(["duckduckgo_html", "bing_html"]);
    mode
}

/// Start Chromium if enabled. A failed launch degrades the run to the static
/// engines and plain HTTP fetching.
async fn launch_browser(config: &AppConfig) -> Option<Arc<BrowserSession>> {
    if !config.browser_enabled {
        return None;
    }
    match BrowserSession::launch(&BrowserOptions::from_config(config)).await {
        Ok(session) => Some(Arc::new(session)),
        Err(e) => {
            tracing::warn!(error = %e, "browser launch failed, falling back to static search");
            None
        }
    }
}

fn assemble(
    config: &AppConfig,
    client: Client,
    pacing: &Pacing,
    session: Option<&Arc<BrowserSession>>,
    settings: PipelineSettings,
) -> Result<Pipeline, PipelineError> {
    let mut sources: Vec<Box<dyn SearchSource>> = Vec::new();
    if let Some(session) = session {
        sources.push(Box::new(InteractiveSearch::new(
            Arc::clone(session),
            config.browser_max_pages,
        )));
    }
    sources.push(Box::new(DuckDuckGoHtml::new(client.clone())));
    sources.push(Box::new(BingHtml::new(client.clone())));
    let cascade = DiscoveryCascade::new(
        sources,
        config.min_discovery_results,
        config.discovery_ceiling,
    );

    let fetcher: Arc<dyn PageFetcher> = match session {
        Some(session) => Arc::new(BrowserPageFetcher::new(Arc::clone(session))),
        None => Arc::new(HttpPageFetcher::new(client.clone())),
    };
    let extractor = ExtractionOrchestrator::new(
        fetcher,
        pacing.clone(),
        config.max_page_visits,
        config.default_region,
    );

    let validator = build_validator(config, client.clone(), pacing);
    let pipeline = Pipeline::new(cascade, extractor, validator, settings);

    match config.places_api_key.as_deref() {
        Some(key) => Ok(pipeline.with_places(PlacesClient::new(client, key)?)),
        None => Ok(pipeline),
    }
}
