//! Shared normalizer helpers every source adapter calls: date-format
//! resolution, markup stripping, summary truncation, thumbnail extraction,
//! and URL resolution.

use once_cell::sync::Lazy;
use regex::Regex;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime};
use url::Url;

/// Summaries are bounded to this many characters, ellipsis excluded.
pub const SUMMARY_MAX_CHARS: usize = 200;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static IMG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]+src=["']([^"']+)["']"#).expect("valid regex"));
static ESCAPED_IMG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"&lt;img[^&]+src=([^&>\s]+)"#).expect("valid regex"));

/// Remove markup and entities, collapsing runs of whitespace.
///
/// Entities are decoded first so escaped markup inside feed bodies is
/// stripped along with the literal tags.
pub fn strip_html(html: &str) -> String {
    let decoded = html_escape::decode_html_entities(html);
    let stripped = TAG_RE.replace_all(&decoded, "");
    WHITESPACE_RE
        .replace_all(stripped.trim(), " ")
        .into_owned()
}

/// Bound a summary to [`SUMMARY_MAX_CHARS`] characters, appending an ellipsis
/// marker when anything was cut. Operates on characters, not bytes.
pub fn truncate_summary(text: &str) -> String {
    let mut chars = text.chars();
    let truncated: String = chars.by_ref().take(SUMMARY_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{truncated}...")
    } else {
        truncated
    }
}

/// Strip markup from a feed body and bound it to summary length.
pub fn summarize(html: &str) -> String {
    truncate_summary(&strip_html(html))
}

/// First embedded image reference in an HTML fragment, skipping inline
/// `data:` URIs. Handles both literal and entity-escaped `<img>` tags.
pub fn first_image(content: &str) -> Option<String> {
    if let Some(captures) = IMG_RE.captures(content) {
        let src = captures[1].trim();
        if !src.is_empty() && !src.starts_with("data:") {
            return Some(src.to_string());
        }
    }
    if let Some(captures) = ESCAPED_IMG_RE.captures(content) {
        let src = captures[1].trim().trim_matches(['"', '\'']);
        if !src.is_empty() && !src.starts_with("data:") {
            return Some(src.to_string());
        }
    }
    None
}

/// Resolve a possibly-relative reference against a base URL.
pub fn absolutize(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(|url| url.to_string())
}

/// True when a harvested title is a navigation/menu label rather than a post.
pub fn is_navigation_label(title: &str, denylist: &[&str]) -> bool {
    let trimmed = title.trim();
    denylist.iter().any(|label| trimmed.eq_ignore_ascii_case(label))
}

/// True when a resolved URL points at a home/menu/index page instead of a post.
pub fn is_navigation_path(url: &str) -> bool {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    let path = path.trim_end_matches('/');
    path.is_empty()
        || path.ends_with("/home")
        || path.ends_with("/menu")
        || path.ends_with("/index")
}

const DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
// Feed dates with a named zone, like "Tue, 03 Jun 2025 01:02:03 GMT".
const RFC2822_GMT_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

static TEXT_DATE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\d{4})년\s*(\d{1,2})월\s*(\d{1,2})일",
        r"(\d{4})\.(\d{1,2})\.(\d{1,2})",
        r"(\d{4})-(\d{1,2})-(\d{1,2})",
        r"(\d{4})/(\d{1,2})/(\d{1,2})",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

/// Resolve a date string against the ordered list of candidate formats.
///
/// Structured formats are tried first (ISO 8601 / RFC 3339, RFC 2822 feed
/// dates, plain date-times); free text falls through to pattern extraction
/// for localized forms like "2025년 6월 25일" or "2025.06.25". Returns `None`
/// when every candidate fails; callers substitute the current time and treat
/// it as a soft failure.
pub fn parse_date(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc2822) {
        return Some(parsed);
    }
    if let Ok(parsed) = PrimitiveDateTime::parse(raw, RFC2822_GMT_FORMAT) {
        return Some(parsed.assume_utc());
    }
    if let Ok(parsed) = PrimitiveDateTime::parse(raw, DATETIME_FORMAT) {
        return Some(parsed.assume_utc());
    }
    if let Ok(parsed) = Date::parse(raw, DATE_FORMAT) {
        return Some(parsed.midnight().assume_utc());
    }
    extract_text_date(raw)
}

fn extract_text_date(raw: &str) -> Option<OffsetDateTime> {
    for pattern in TEXT_DATE_RES.iter() {
        if let Some(captures) = pattern.captures(raw) {
            let year: i32 = captures[1].parse().ok()?;
            let month: u8 = captures[2].parse().ok()?;
            let day: u8 = captures[3].parse().ok()?;
            let month = Month::try_from(month).ok()?;
            if let Ok(date) = Date::from_calendar_date(year, month, day) {
                return Some(date.midnight().assume_utc());
            }
        }
    }
    None
}
