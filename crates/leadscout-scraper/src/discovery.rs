//! Short-circuiting cascade over search sources.

use std::collections::HashSet;

use leadscout_core::SearchQuery;

use crate::search::SearchSource;
use crate::urls::normalize_url;

/// Runs search sources in priority order until enough URLs are known.
///
/// The first source is asked every phrasing. Each later source is only
/// consulted while the running set is below `min_results`, and stops as
/// soon as the threshold is met. Every source sees each phrasing at most
/// once per run, and the set never grows past `ceiling`.
pub struct DiscoveryCascade {
    sources: Vec<Box<dyn SearchSource>>,
    min_results: usize,
    ceiling: usize,
}

impl DiscoveryCascade {
    #[must_use]
    pub fn new(sources: Vec<Box<dyn SearchSource>>, min_results: usize, ceiling: usize) -> Self {
        Self {
            sources,
            min_results,
            ceiling,
        }
    }

    /// Source names in priority order.
    #[must_use]
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Discover candidate URLs for `query`, deduplicated by normalized URL.
    pub async fn discover(&self, query: &SearchQuery) -> Vec<String> {
        let phrasings = query.phrasings();
        let mut found = DiscoverySet::new(self.ceiling);

        for (priority, source) in self.sources.iter().enumerate() {
            if priority > 0 && found.len() >= self.min_results {
                break;
            }
            for phrasing in &phrasings {
                if found.is_full() || (priority > 0 && found.len() >= self.min_results) {
                    break;
                }
                let urls = source.search(phrasing, found.remaining()).await;
                let added = found.extend(urls);
                tracing::debug!(
                    source = source.name(),
                    phrasing = phrasing.as_str(),
                    added,
                    total = found.len(),
                    "search phrasing merged"
                );
            }
        }

        tracing::info!(query = %query.label(), urls = found.len(), "discovery finished");
        found.into_vec()
    }
}

/// Ordered, capped set of normalized URLs.
struct DiscoverySet {
    urls: Vec<String>,
    seen: HashSet<String>,
    ceiling: usize,
}

impl DiscoverySet {
    fn new(ceiling: usize) -> Self {
        Self {
            urls: Vec::new(),
            seen: HashSet::new(),
            ceiling,
        }
    }

    fn len(&self) -> usize {
        self.urls.len()
    }

    fn is_full(&self) -> bool {
        self.urls.len() >= self.ceiling
    }

    fn remaining(&self) -> usize {
        self.ceiling.saturating_sub(self.urls.len())
    }

    /// Merge `urls`, returning how many were new.
    fn extend(&mut self, urls: Vec<String>) -> usize {
        let before = self.urls.len();
        for url in urls {
            if self.is_full() {
                break;
            }
            let Some(normalized) = normalize_url(&url) else {
                continue;
            };
            if self.seen.insert(normalized.clone()) {
                self.urls.push(normalized);
            }
        }
        self.urls.len() - before
    }

    fn into_vec(self) -> Vec<String> {
        self.urls
    }
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
