//! Web-facing half of the lead pipeline: search-engine discovery, page
//! fetching, phone extraction, and the optional places lookup.

pub mod browser;
pub mod client;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod extraction;
pub mod fetch;
pub mod places;
pub mod search;
mod urls;

pub use browser::{BrowserOptions, BrowserSession};
pub use client::build_http_client;
pub use discovery::DiscoveryCascade;
pub use error::ScraperError;
pub use extract::{extract_candidates, page_title};
pub use extraction::{assemble_leads, ExtractionOrchestrator, PageHit};
pub use fetch::{BrowserPageFetcher, FetchedPage, HttpPageFetcher, PageFetcher};
pub use places::PlacesClient;
pub use search::{BingHtml, DuckDuckGoHtml, InteractiveSearch, SearchSource};
pub use urls::normalize_url;
