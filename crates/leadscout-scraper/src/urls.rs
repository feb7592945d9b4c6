//! URL normalization for the discovery set.

use reqwest::Url;

/// Normalize a result URL so that trivially different spellings of the same
/// page compare equal. Only `http`/`https` URLs are kept; the fragment and a
/// trailing path slash are dropped.
#[must_use]
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }

    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    let mut out = url.to_string();
    // `Url` always renders an empty path as `/`.
    if url.path() == "/" && url.query().is_none() {
        out.pop();
    }
    Some(out)
}

/// Resolve a possibly relative `href` against `base`.
pub(crate) fn resolve(raw: &str, base: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.starts_with("http://") || raw.starts_with("https://") {
        Url::parse(raw).ok()
    } else {
        Url::parse(base).ok()?.join(raw).ok()
    }
}

/// Host of `raw`, lower-cased, without a leading `www.`.
pub(crate) fn host_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    Some(host.trim_start_matches("www.").to_string())
}
