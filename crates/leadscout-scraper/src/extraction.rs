//! Visits discovered pages and turns their phone candidates into lead
//! records.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use leadscout_core::{
    canonicalize, dedupe, CanonicalNumber, LeadRecord, Pacing, RawCandidate, Region,
};

use crate::extract::extract_candidates;
use crate::fetch::PageFetcher;

/// A visited page that yielded at least one phone candidate.
#[derive(Debug, Clone)]
pub struct PageHit {
    pub title: String,
    pub url: String,
    pub candidates: Vec<RawCandidate>,
}

pub struct ExtractionOrchestrator {
    fetcher: Arc<dyn PageFetcher>,
    pacing: Pacing,
    max_visits: usize,
    region: Region,
}

impl ExtractionOrchestrator {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        pacing: Pacing,
        max_visits: usize,
        region: Region,
    ) -> Self {
        Self {
            fetcher,
            pacing,
            max_visits,
            region,
        }
    }

    /// Visit `urls` in order and build at most `requested` lead records.
    ///
    /// `prior` records (from a structured source) keep their place at the
    /// front and count toward the working set. Visiting stops once twice
    /// `requested` unique numbers are known or after the visit limit.
    pub async fn extract_leads(
        &self,
        urls: &[String],
        requested: usize,
        prior: Vec<LeadRecord>,
    ) -> Vec<LeadRecord> {
        let known: HashSet<CanonicalNumber> = prior.iter().map(|r| r.phone.clone()).collect();
        let hits = self.visit(urls, requested.saturating_mul(2), known).await;
        let leads = assemble_leads(prior, &hits, requested, self.region);
        tracing::info!(pages = hits.len(), leads = leads.len(), "extraction finished");
        leads
    }

    /// Fetch pages one at a time until `target_unique` distinct numbers are
    /// known. Pages that fail to load are skipped.
    pub async fn visit(
        &self,
        urls: &[String],
        target_unique: usize,
        mut known: HashSet<CanonicalNumber>,
    ) -> Vec<PageHit> {
        let mut hits = Vec::new();

        for (visits, url) in urls.iter().enumerate() {
            if known.len() >= target_unique || visits >= self.max_visits {
                break;
            }
            self.pacing.page_visit.acquire().await;

            let page = match self.fetcher.fetch(url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(url = url.as_str(), error = %e, "page fetch failed, skipping");
                    continue;
                }
            };

            let candidates = extract_candidates(&page.html, self.region);
            if candidates.is_empty() {
                tracing::debug!(url = url.as_str(), "no phone candidates");
                continue;
            }
            known.extend(
                candidates
                    .iter()
                    .filter_map(|c| canonicalize(&c.text, self.region)),
            );
            tracing::debug!(
                url = url.as_str(),
                candidates = candidates.len(),
                unique = known.len(),
                "page yielded candidates"
            );

            hits.push(PageHit {
                title: page.title.unwrap_or_else(|| url.clone()),
                url: url.clone(),
                candidates,
            });
        }
        hits
    }
}

/// Canonicalize every candidate, collapse duplicates across the run, and
/// keep the first `requested` numbers. Name and source come from the page
/// where a number was first seen; `prior` records win over scraped ones.
#[must_use]
pub fn assemble_leads(
    prior: Vec<LeadRecord>,
    hits: &[PageHit],
    requested: usize,
    region: Region,
) -> Vec<LeadRecord> {
    let mut first_page: HashMap<CanonicalNumber, &PageHit> = HashMap::new();
    let mut scraped = Vec::new();
    for hit in hits {
        for candidate in &hit.candidates {
            if let Some(number) = canonicalize(&candidate.text, region) {
                first_page.entry(number.clone()).or_insert(hit);
                scraped.push(number);
            }
        }
    }

    let mut prior_by_number: HashMap<CanonicalNumber, LeadRecord> = HashMap::new();
    let mut prior_numbers = Vec::with_capacity(prior.len());
    for record in prior {
        let phone = record.phone.clone();
        prior_numbers.push(phone.clone());
        prior_by_number.entry(phone).or_insert(record);
    }

    dedupe(prior_numbers.into_iter().chain(scraped))
        .into_iter()
        .take(requested)
        .filter_map(|number| {
            prior_by_number.remove(&number).or_else(|| {
                first_page
                    .get(&number)
                    .map(|hit| LeadRecord::new(hit.title.clone(), number.clone(), hit.url.clone()))
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "extraction_test.rs"]
mod tests;
