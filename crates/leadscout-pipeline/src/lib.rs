//! Pipeline orchestration: validates a discovery request, runs search,
//! extraction and (optionally) reachability validation in sequence, and
//! renders the result table.

pub mod error;
pub mod pipeline;
pub mod request;
pub mod runner;

pub use error::PipelineError;
pub use pipeline::{validate_raw_numbers, Pipeline};
pub use request::{PipelineSettings, ResolvedRequest, RunRequest};
pub use runner::{run_discovery, search_mode, validate_numbers};
