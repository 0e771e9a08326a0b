//! Selector-scanning helpers shared by the HTML extraction strategies.
//!
//! Each helper walks a prioritized selector list and returns the first usable
//! hit; selector strings that fail to parse are skipped rather than raised.

use scraper::{ElementRef, Selector};
use time::OffsetDateTime;
use url::Url;

use crate::normalize::{absolutize, parse_date};

// Date-bearing text longer than this is page prose, not a timestamp.
const MAX_DATE_TEXT_CHARS: usize = 32;

/// Collect an element's text with whitespace collapsed.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty text under any of the given selectors.
pub fn first_matching_text(element: &ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(found) = element.select(&selector).next() {
            let text = element_text(&found);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// First text whose length (in characters) falls inside the given range.
pub fn first_text_in_range(
    element: &ElementRef<'_>,
    selectors: &[&str],
    min_chars: usize,
    max_chars: usize,
) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for found in element.select(&selector) {
            let text = element_text(&found);
            let len = text.chars().count();
            if len > min_chars && len < max_chars {
                return Some(text);
            }
        }
    }
    None
}

/// Resolved href of the first anchor under the element.
pub fn first_anchor(element: &ElementRef<'_>, base: &Url) -> Option<String> {
    let selector = Selector::parse("a[href]").ok()?;
    let anchor = element.select(&selector).next()?;
    let href = anchor.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    absolutize(base, href)
}

/// First parsable date under the given selectors, preferring `datetime`
/// attributes over element text.
pub fn first_date(element: &ElementRef<'_>, selectors: &[&str]) -> Option<OffsetDateTime> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for found in element.select(&selector) {
            if let Some(datetime) = found.value().attr("datetime") {
                if let Some(parsed) = parse_date(datetime) {
                    return Some(parsed);
                }
            }
            let text = element_text(&found);
            if text.is_empty() || text.chars().count() > MAX_DATE_TEXT_CHARS {
                continue;
            }
            if let Some(parsed) = parse_date(&text) {
                return Some(parsed);
            }
        }
    }
    None
}

/// Resolved src of the first image under the element, skipping inline data
/// URIs.
pub fn first_image_src(element: &ElementRef<'_>, base: &Url) -> Option<String> {
    let selector = Selector::parse("img[src]").ok()?;
    for image in element.select(&selector) {
        let src = image.value().attr("src")?.trim();
        if src.is_empty() || src.starts_with("data:") {
            continue;
        }
        if src.starts_with("http") {
            return Some(src.to_string());
        }
        if let Some(resolved) = absolutize(base, src) {
            return Some(resolved);
        }
    }
    None
}
