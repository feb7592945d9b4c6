//! Search-engine adapters.
//!
//! Every adapter answers the same question (which URLs does an engine list
//! for this text) and absorbs its own failures: a broken engine yields an
//! empty list and a warning, never an error that would stop the cascade.

mod bing;
mod browser;
mod duckduckgo;

pub use bing::BingHtml;
pub use browser::InteractiveSearch;
pub use duckduckgo::DuckDuckGoHtml;

use async_trait::async_trait;

use crate::urls::host_of;

/// A search engine that turns query text into an ordered list of result
/// URLs.
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Short identifier used in logs and the status endpoint.
    fn name(&self) -> &'static str;

    /// Up to `max_results` organic result URLs for `query`, in engine order.
    /// Returns an empty `Vec` when the engine is unreachable or its markup
    /// cannot be read.
    async fn search(&self, query: &str, max_results: usize) -> Vec<String>;
}

/// Hosts that never count as organic results: the engines themselves plus
/// cache and translation proxies.
const NON_ORGANIC_HOSTS: &[&str] = &[
    "duckduckgo.com",
    "bing.com",
    "microsoft.com",
    "msn.com",
    "google.com",
    "googleusercontent.com",
    "translate.goog",
    "bingj.com",
    "archive.org",
];

/// Whether `url` is an outbound result rather than engine chrome, an ad, or
/// a proxy copy of another page.
pub(crate) fn is_organic_result(url: &str) -> bool {
    let Some(host) = host_of(url) else {
        return false;
    };
    !NON_ORGANIC_HOSTS
        .iter()
        .any(|blocked| host == *blocked || host.ends_with(&format!(".{blocked}")))
}

/// Append `url` to `out` unless it is non-organic or already present.
/// Returns `true` once `out` has reached `max`.
pub(crate) fn push_result(out: &mut Vec<String>, url: String, max: usize) -> bool {
    if is_organic_result(&url) && !out.contains(&url) {
        out.push(url);
    }
    out.len() >= max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_and_proxy_hosts_are_not_organic() {
        assert!(!is_organic_result("https://duckduckgo.com/?q=x"));
        assert!(!is_organic_result("https://html.duckduckgo.com/html"));
        assert!(!is_organic_result("https://www.bing.com/search?q=x"));
        assert!(!is_organic_result(
            "https://webcache.googleusercontent.com/search?q=cache:x"
        ));
        assert!(!is_organic_result("https://example-com.translate.goog/"));
    }

    #[test]
    fn business_sites_are_organic() {
        assert!(is_organic_result("https://clinicasorriso.com.br/contato"));
        assert!(is_organic_result("https://www.doctoralia.com.br/dentista/curitiba"));
    }

    #[test]
    fn lookalike_hosts_are_not_blocked() {
        assert!(is_organic_result("https://notbing.com.br/"));
    }

    #[test]
    fn unparsable_urls_are_not_organic() {
        assert!(!is_organic_result("/l/?uddg=abc"));
        assert!(!is_organic_result(""));
    }

    #[test]
    fn push_result_dedupes_and_reports_full() {
        let mut out = Vec::new();
        assert!(!push_result(&mut out, "https://a.com.br".into(), 2));
        assert!(!push_result(&mut out, "https://a.com.br".into(), 2));
        assert!(!push_result(&mut out, "https://bing.com/x".into(), 2));
        assert!(push_result(&mut out, "https://b.com.br".into(), 2));
        assert_eq!(out, vec!["https://a.com.br", "https://b.com.br"]);
    }
}
