//! Phone candidate extraction from fetched page markup.
//!
//! Three strategies run over the same document and their outputs are
//! concatenated without deduplication:
//!
//! 1. `tel:` anchors, taken verbatim.
//! 2. Messaging deep links (`wa.me`, `api.whatsapp.com/send`, ...), whose
//!    digits get the default country prefix when they lack one.
//! 3. A permissive pattern over the visible body text.
//!
//! Nothing here fails: malformed markup simply yields fewer candidates.

use std::sync::LazyLock;

use leadscout_core::{RawCandidate, Region};
use percent_encoding::percent_decode_str;
use regex::Regex;
use scraper::{Html, Node, Selector};

/// Longest page title kept as a record name, in characters.
pub const MAX_TITLE_CHARS: usize = 160;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));

static WA_ME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)wa\.me/(?:%2B|\+)?(\d{10,15})").expect("valid regex"));

static WA_SEND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:(?:api|web)\.whatsapp\.com/send/?|whatsapp://send/?)\?(?:[^#]*?&)?phone=(?:%2B|\+)?(\d{10,15})",
    )
    .expect("valid regex")
});

static FREE_TEXT_PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?55\s*)?(?:\(?\d{2}\)?\s*)?9?\d{4}[-.\s]?\d{4}").expect("valid regex")
});

const INVISIBLE_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Collect raw phone candidates from an HTML document.
#[must_use]
pub fn extract_candidates(html: &str, region: Region) -> Vec<RawCandidate> {
    let document = Html::parse_document(html);
    let hrefs: Vec<&str> = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .collect();

    let mut candidates = tel_link_candidates(&hrefs);
    candidates.extend(deep_link_candidates(&hrefs, region));
    candidates.extend(free_text_candidates(&visible_text(&document)));
    candidates
}

/// Page `<title>` with whitespace collapsed and capped at
/// [`MAX_TITLE_CHARS`]. `None` when the page has no usable title.
#[must_use]
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let raw: String = document.select(&TITLE_SELECTOR).next()?.text().collect();
    clean_title(&raw)
}

pub(crate) fn clean_title(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.chars().take(MAX_TITLE_CHARS).collect())
}

fn tel_link_candidates(hrefs: &[&str]) -> Vec<RawCandidate> {
    hrefs
        .iter()
        .filter_map(|href| {
            let href = href.trim();
            let scheme = href.get(..4)?;
            if !scheme.eq_ignore_ascii_case("tel:") {
                return None;
            }
            let number = percent_decode_str(&href[4..]).decode_utf8_lossy();
            let number = number.trim();
            (!number.is_empty()).then(|| RawCandidate::new(number))
        })
        .collect()
}

fn deep_link_candidates(hrefs: &[&str], region: Region) -> Vec<RawCandidate> {
    let dialing_code = region.dialing_code();
    hrefs
        .iter()
        .filter_map(|href| {
            WA_ME_RE
                .captures(href)
                .or_else(|| WA_SEND_RE.captures(href))
                .and_then(|caps| caps.get(1))
        })
        .map(|digits| {
            let digits = digits.as_str();
            if digits.len() >= 12 && digits.starts_with(dialing_code) {
                RawCandidate::new(format!("+{digits}"))
            } else {
                RawCandidate::new(format!("+{dialing_code}{digits}"))
            }
        })
        .collect()
}

fn free_text_candidates(text: &str) -> Vec<RawCandidate> {
    FREE_TEXT_PHONE_RE
        .find_iter(text)
        .map(|m| RawCandidate::new(m.as_str().trim()))
        .collect()
}

/// Text nodes of the body, skipping script-like containers.
fn visible_text(document: &Html) -> String {
    let Some(body) = document.select(&BODY_SELECTOR).next() else {
        return String::new();
    };

    let mut out = String::new();
    for node in body.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| INVISIBLE_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            out.push_str(trimmed);
            out.push(' ');
        }
    }
    out
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
