use async_trait::async_trait;
use leadscout_core::{CanonicalNumber, ReachabilityStatus};

use crate::{ReachabilityError, ReachabilityMap, ReachabilityValidator};

/// Reports every number as `unknown` without any network traffic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopValidator;

#[async_trait]
impl ReachabilityValidator for NoopValidator {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn validate(
        &self,
        numbers: &[CanonicalNumber],
    ) -> Result<ReachabilityMap, ReachabilityError> {
        Ok(numbers
            .iter()
            .map(|n| (n.clone(), ReachabilityStatus::Unknown))
            .collect())
    }
}
