//! Reachability validation: classifies canonical numbers as `valid`,
//! `invalid` or `unknown` on the messaging platform.
//!
//! Three providers share the [`ReachabilityValidator`] contract: the public
//! click-to-chat probe, a paid batch verification API, and a no-op provider
//! for runs that skip validation.

pub mod batch;
pub mod click_to_chat;
pub mod error;
mod noop;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use leadscout_core::{AppConfig, CanonicalNumber, Pacing, ReachabilityStatus, ValidationProvider};
use reqwest::Client;

pub use batch::WhapiValidator;
pub use click_to_chat::{classify_body, ClickToChatValidator};
pub use error::ReachabilityError;
pub use noop::NoopValidator;

/// Status per canonical number. Every input number has an entry.
pub type ReachabilityMap = HashMap<CanonicalNumber, ReachabilityStatus>;

#[async_trait]
pub trait ReachabilityValidator: Send + Sync {
    /// Short provider identifier, as reported by the status endpoint.
    fn name(&self) -> &'static str;

    /// Classify each number. Repeated numbers are checked once.
    ///
    /// # Errors
    ///
    /// Only run-level failures: a missing credential or an upstream batch
    /// API error. Failures confined to one number map to `unknown`.
    async fn validate(
        &self,
        numbers: &[CanonicalNumber],
    ) -> Result<ReachabilityMap, ReachabilityError>;
}

/// The validator selected by `config.validation_provider`.
///
/// Credentials are not checked here; a batch provider without a token fails
/// when it is first asked to validate.
#[must_use]
pub fn build_validator(
    config: &AppConfig,
    client: Client,
    pacing: &Pacing,
) -> Arc<dyn ReachabilityValidator> {
    match config.validation_provider {
        ValidationProvider::ClickToChat => {
            Arc::new(ClickToChatValidator::new(client, Arc::clone(&pacing.probe)))
        }
        ValidationProvider::Whapi => Arc::new(WhapiValidator::new(
            client,
            &config.whapi_base_url,
            config.whapi_token.clone(),
        )),
        ValidationProvider::None => Arc::new(NoopValidator),
    }
}
