//! Shared domain types and pure building blocks for the lead discovery
//! pipeline: phone canonicalization, deduplication, CSV rendering, request
//! pacing, and application configuration.

pub mod app_config;
pub mod config;
pub mod csv;
pub mod pacing;
pub mod phone;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, ValidationProvider};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use csv::{csv_escape, render_csv, CSV_HEADER};
pub use pacing::{Pacing, RateLimiter};
pub use phone::{canonicalize, dedupe, CanonicalNumber, Region};
pub use types::{
    LeadRecord, RawCandidate, ReachabilityStatus, RunResult, SearchQuery, ValidationOutcome,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
