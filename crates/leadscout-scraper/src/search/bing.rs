use std::sync::LazyLock;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use regex::Regex;
use reqwest::Client;

use super::{push_result, SearchSource};
use crate::fetch::get_html;
use crate::urls::resolve;

const DEFAULT_BASE_URL: &str = "https://www.bing.com";

/// Organic results are the links inside `<h2>` headings of the result list.
static RESULT_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<h2[^>]*>\s*<a\s[^>]*?\bhref\s*=\s*["']([^"']+)["']"#)
        .expect("valid regex")
});

/// Bing's server-rendered results page.
pub struct BingHtml {
    client: Client,
    base_url: String,
}

impl BingHtml {
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
        format!("{}/search?q={encoded}&setlang=pt-BR&cc=BR", self.base_url)
    }
}

#[async_trait]
impl SearchSource for BingHtml {
    fn name(&self) -> &'static str {
        "bing_html"
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

pub(crate) fn parse_results(html: &str, base: &str, max_results: usize) -> Vec<String> {
    let mut out = Vec::new();
    if max_results == 0 {
        return out;
    }
    for caps in RESULT_LINK_RE.captures_iter(html) {
        let Some(href) = caps.get(1) else { continue };
        let href = href.as_str().replace("&amp;", "&");
        let Some(real) = decode_redirect(&href, base) else {
            continue;
        };
        if push_result(&mut out, real, max_results) {
            break;
        }
    }
    out
}

/// Unwrap Bing's `/ck/a?...&u=a1<base64url>` click-tracking links. Other
/// links come back resolved against `base`.
pub(crate) fn decode_redirect(href: &str, base: &str) -> Option<String> {
    let url = resolve(href, base)?;
    if !url.path().starts_with("/ck/") {
        return Some(url.to_string());
    }
    let encoded = url
        .query_pairs()
        .find(|(key, _)| key == "u")
        .map(|(_, value)| value.into_owned())?;
    let payload = encoded.strip_prefix("a1")?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    String::from_utf8(bytes).ok()
}
