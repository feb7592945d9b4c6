//! Sequences discovery, extraction and validation for one run.

use std::sync::Arc;

use leadscout_core::{
    canonicalize, dedupe, render_csv, CanonicalNumber, LeadRecord, ReachabilityStatus, Region,
    RunResult, ValidationOutcome,
};
use leadscout_reachability::{ReachabilityMap, ReachabilityValidator};
use leadscout_scraper::{DiscoveryCascade, ExtractionOrchestrator, PlacesClient};

use crate::error::PipelineError;
use crate::request::{PipelineSettings, RunRequest};

pub struct Pipeline {
    cascade: DiscoveryCascade,
    extractor: ExtractionOrchestrator,
    validator: Arc<dyn ReachabilityValidator>,
    places: Option<PlacesClient>,
    settings: PipelineSettings,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        cascade: DiscoveryCascade,
        extractor: ExtractionOrchestrator,
        validator: Arc<dyn ReachabilityValidator>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            cascade,
            extractor,
            validator,
            places: None,
            settings,
        }
    }

    /// Consult the places API ahead of web discovery.
    #[must_use]
    pub fn with_places(mut self, places: PlacesClient) -> Self {
        self.places = Some(places);
        self
    }

    /// Run one discovery request end to end.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidInput`] if the request fails validation;
    ///   no search is issued in that case.
    /// - [`PipelineError::Reachability`] if inline validation is enabled and
    ///   the provider fails as a whole.
    pub async fn run(&self, request: RunRequest) -> Result<RunResult, PipelineError> {
        let resolved = request.resolve(&self.settings)?;
        let label = resolved.query.label();
        tracing::info!(query = label.as_str(), volume = resolved.volume, "run started");

        let prior = match &self.places {
            Some(places) => {
                places
                    .lookup_leads(&resolved.query, resolved.volume, self.settings.region)
                    .await
            }
            None => Vec::new(),
        };

        let urls = if prior.len() >= resolved.volume {
            tracing::info!(leads = prior.len(), "places lookup covered the request");
            Vec::new()
        } else {
            self.cascade.discover(&resolved.query).await
        };
        tracing::info!(urls = urls.len(), "discovery finished");

        let mut rows = self
            .extractor
            .extract_leads(&urls, resolved.volume, prior)
            .await;

        if resolved.validate && !rows.is_empty() {
            let numbers: Vec<CanonicalNumber> = rows.iter().map(|r| r.phone.clone()).collect();
            let statuses = self.validator.validate(&numbers).await?;
            for row in &mut rows {
                row.reachability_status = statuses
                    .get(&row.phone)
                    .copied()
                    .unwrap_or(ReachabilityStatus::Unknown);
            }
            tracing::info!(
                provider = self.validator.name(),
                checked = numbers.len(),
                "inline validation finished"
            );
        }

        Ok(build_result(label, rows))
    }

    /// Standalone validation of caller-supplied numbers.
    ///
    /// # Errors
    ///
    /// See [`validate_raw_numbers`].
    pub async fn validate_numbers(
        &self,
        raw: &[String],
    ) -> Result<Vec<ValidationOutcome>, PipelineError> {
        validate_raw_numbers(self.validator.as_ref(), raw, self.settings.region).await
    }
}

fn build_result(query: String, rows: Vec<LeadRecord>) -> RunResult {
    let csv = render_csv(&rows);
    RunResult {
        query,
        total: rows.len(),
        rows,
        csv,
    }
}

/// Trim every entry and drop the empty ones.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] when nothing is left.
pub(crate) fn clean_numbers(raw: &[String]) -> Result<Vec<String>, PipelineError> {
    let cleaned: Vec<String> = raw
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();
    if cleaned.is_empty() {
        return Err(PipelineError::InvalidInput(
            "numbers must contain at least one non-empty entry".to_string(),
        ));
    }
    Ok(cleaned)
}

/// Canonicalize each entry and classify it. Unparsable entries are
/// `invalid` without a probe; each distinct canonical number is probed once
/// no matter how often it appears.
///
/// # Errors
///
/// - [`PipelineError::InvalidInput`] if no non-empty entry was supplied.
/// - [`PipelineError::Reachability`] if the provider fails as a whole.
pub async fn validate_raw_numbers(
    validator: &dyn ReachabilityValidator,
    raw: &[String],
    region: Region,
) -> Result<Vec<ValidationOutcome>, PipelineError> {
    let entries: Vec<(String, Option<CanonicalNumber>)> = clean_numbers(raw)?
        .into_iter()
        .map(|entry| {
            let canonical = canonicalize(&entry, region);
            (entry, canonical)
        })
        .collect();

    let unique = dedupe(entries.iter().filter_map(|(_, c)| c.clone()));
    let statuses = if unique.is_empty() {
        ReachabilityMap::new()
    } else {
        validator.validate(&unique).await?
    };

    Ok(entries
        .into_iter()
        .map(|(raw, canonical)| match canonical {
            Some(number) => ValidationOutcome {
                raw,
                status: statuses
                    .get(&number)
                    .copied()
                    .unwrap_or(ReachabilityStatus::Unknown),
                normalized_id: Some(number.normalized_id()),
                canonical: Some(number),
            },
            None => ValidationOutcome {
                raw,
                canonical: None,
                status: ReachabilityStatus::Invalid,
                normalized_id: None,
            },
        })
        .collect())
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
