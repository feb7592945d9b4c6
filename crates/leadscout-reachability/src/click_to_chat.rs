//! Heuristic probe against the public click-to-chat page.
//!
//! The page renders different copy for numbers the platform rejects and for
//! numbers it will open a chat with. Anything else is inconclusive.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use leadscout_core::{CanonicalNumber, RateLimiter, ReachabilityStatus};
use regex::Regex;
use reqwest::header::USER_AGENT;
use reqwest::Client;

use crate::{ReachabilityError, ReachabilityMap, ReachabilityValidator};

const DEFAULT_BASE_URL: &str = "https://api.whatsapp.com";
const PROBE_USER_AGENT: &str = "Mozilla/5.0";

static INVALID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)invalid phone number|número de telefone .* inválido").expect("valid regex")
});

static VALID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)continue to chat|continuar para").expect("valid regex"));

/// Classify a click-to-chat page body. The rejection phrase wins when both
/// appear.
#[must_use]
pub fn classify_body(body: &str) -> ReachabilityStatus {
    if INVALID_RE.is_match(body) {
        ReachabilityStatus::Invalid
    } else if VALID_RE.is_match(body) {
        ReachabilityStatus::Valid
    } else {
        ReachabilityStatus::Unknown
    }
}

pub struct ClickToChatValidator {
    client: Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
}

impl ClickToChatValidator {
    /// `limiter` is the run's probe limiter; every probe waits on it.
    #[must_use]
    pub fn new(client: Client, limiter: Arc<RateLimiter>) -> Self {
        Self::with_base_url(client, limiter, DEFAULT_BASE_URL)
    }

    /// Points the probe at another origin (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(client: Client, limiter: Arc<RateLimiter>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter,
        }
    }

    /// One probe, no retries. Transport failures and error statuses are
    /// `unknown`.
    async fn probe(&self, number: &CanonicalNumber) -> ReachabilityStatus {
        let url = format!("{}/send?phone={}", self.base_url, number.normalized_id());
        let response = match self
            .client
            .get(&url)
            .header(USER_AGENT, PROBE_USER_AGENT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(number = %number, error = %e, "click-to-chat probe failed");
                return ReachabilityStatus::Unknown;
            }
        };

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            tracing::warn!(
                number = %number,
                status = status.as_u16(),
                "click-to-chat probe rejected"
            );
            return ReachabilityStatus::Unknown;
        }

        match response.text().await {
            Ok(body) => classify_body(&body),
            Err(e) => {
                tracing::warn!(number = %number, error = %e, "click-to-chat body unreadable");
                ReachabilityStatus::Unknown
            }
        }
    }
}

#[async_trait]
impl ReachabilityValidator for ClickToChatValidator {
    fn name(&self) -> &'static str {
        "click2chat"
    }

    async fn validate(
        &self,
        numbers: &[CanonicalNumber],
    ) -> Result<ReachabilityMap, ReachabilityError> {
        let mut results = ReachabilityMap::with_capacity(numbers.len());
        for number in numbers {
            if results.contains_key(number) {
                continue;
            }
            self.limiter.acquire().await;
            let status = self.probe(number).await;
            tracing::debug!(number = %number, status = %status, "probed");
            results.insert(number.clone(), status);
        }
        Ok(results)
    }
}
