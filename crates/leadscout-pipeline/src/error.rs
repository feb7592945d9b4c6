use leadscout_reachability::ReachabilityError;
use leadscout_scraper::ScraperError;
use thiserror::Error;

/// Run-level failures. Anything confined to one URL, page or number is
/// absorbed inside the stages and never reaches this type.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request was rejected before any work started.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Reachability(#[from] ReachabilityError),

    /// Building the shared HTTP client failed.
    #[error(transparent)]
    Scraper(#[from] ScraperError),
}
