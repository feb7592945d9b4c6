use std::sync::LazyLock;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use regex::Regex;
use reqwest::Client;

use super::{push_result, SearchSource};
use crate::fetch::get_html;
use crate::urls::resolve;

const DEFAULT_BASE_URL: &str = "https://duckduckgo.com";

static ANCHOR_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\s[^>]*>").expect("valid regex"));

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bhref\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

/// Server-rendered HTML results page at `html.duckduckgo.com`.
pub struct DuckDuckGoHtml {
    client: Client,
    base_url: String,
}

impl DuckDuckGoHtml {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Points the adapter at another origin (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn results_url(&self, query: &str) -> String {
        let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC);
        format!("{}/html/?q={encoded}&kl=br-pt", self.base_url)
    }
}

#[async_trait]
impl SearchSource for DuckDuckGoHtml {
    fn name(&self) -> &'static str {
        "duckduckgo_html"
    }

    async fn search(&self, query: &str, max_results: usize) -> Vec<String> {
        let url = self.results_url(query);
        match get_html(&self.client, &url).await {
            Ok(html) => {
                let links = parse_results(&html, &self.base_url, max_results);
                tracing::debug!(engine = self.name(), query, count = links.len(), "parsed results");
                links
            }
            Err(e) => {
                tracing::warn!(engine = self.name(), query, error = %e, "search request failed");
                Vec::new()
            }
        }
    }
}

/// Pull result links out of an `html.duckduckgo.com` results page, decoding
/// redirect wrappers.
pub(crate) fn parse_results(html: &str, base: &str, max_results: usize) -> Vec<String> {
    let mut out = Vec::new();
    if max_results == 0 {
        return out;
    }
    for tag in ANCHOR_TAG_RE.find_iter(html) {
        let tag = tag.as_str();
        let Some(href) = HREF_RE.captures(tag).and_then(|c| c.get(1)) else {
            continue;
        };
        let href = href.as_str().replace("&amp;", "&");
        let is_result =
            tag.contains("result__a") || href.starts_with("/l/") || href.contains("uddg=");
        if !is_result {
            continue;
        }
        let Some(real) = decode_redirect(&href, base) else {
            continue;
        };
        if push_result(&mut out, real, max_results) {
            break;
        }
    }
    out
}

/// Resolve the `/l/?uddg=` and `/r?uddg=` redirect wrappers (relative
/// or absolute) to their destination. Links without the wrapper come back
/// resolved against `base`.
pub(crate) fn decode_redirect(href: &str, base: &str) -> Option<String> {
    let url = resolve(href, base)?;
    let target = url
        .query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned());
    Some(target.unwrap_or_else(|| url.to_string()))
}
