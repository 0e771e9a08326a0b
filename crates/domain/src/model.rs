//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

/// A blog post normalized into the canonical shape every source adapter
/// must produce.
///
/// A `Post` has no identity beyond its field values; the merge stage decides
/// which posts count as "the same" (see `usecases::aggregate`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Post title; must be non-empty for the post to reach the output set
    pub title: String,
    /// Canonical absolute URL of the post
    pub url: String,
    /// Author name, defaulted per source when the origin omits it
    pub author: String,
    /// Best-effort publication time; never unset (falls back to crawl time)
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    /// Plain-text summary, truncated to a bounded length
    pub summary: String,
    /// Human-readable origin name (e.g. "토스", "네이버 D2")
    pub source: String,
    /// Keyword-classified category bucket
    pub category: Category,
    /// Absolute thumbnail URL, or empty when none was found
    pub image: String,
}

impl Post {
    /// A post is usable only when both its title and URL are present.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// Static descriptor of a configured source; producing one involves no I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub url: String,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Closed set of category buckets a post can land in.
///
/// The bucket labels are the ones the report displays; classification picks a
/// bucket by keyword groups checked in a fixed order (see `classify`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "데이터")]
    Data,
    #[serde(rename = "검색")]
    Search,
    #[default]
    #[serde(rename = "엔지니어링")]
    Engineering,
    #[serde(rename = "IT스타트업")]
    Startup,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Ai,
        Category::Data,
        Category::Search,
        Category::Engineering,
        Category::Startup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ai => "AI",
            Category::Data => "데이터",
            Category::Search => "검색",
            Category::Engineering => "엔지니어링",
            Category::Startup => "IT스타트업",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source's failure during a run, recorded instead of aborting siblings.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

/// Outcome of one aggregation run.
///
/// `posts` is the final ordered list; `tally` is the `source -> count` map the
/// renderer consumes. The drop counters make filter behavior assertable
/// without scraping log output.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub posts: Vec<Post>,
    pub tally: BTreeMap<String, usize>,
    pub failures: Vec<SourceFailure>,
    pub dropped_by_cutoff: usize,
    pub dropped_by_relevance: usize,
    pub duplicates_removed: usize,
}

impl RunReport {
    /// True when the run succeeded but nothing survived the filters.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Input contract for the report renderer: the ordered post list plus the
/// per-source tally.
#[derive(Debug, Serialize)]
pub struct ReportInput<'a> {
    pub title: &'a str,
    pub posts: &'a [Post],
    pub tally: &'a BTreeMap<String, usize>,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn post(title: &str, url: &str) -> Post {
        Post {
            title: title.to_string(),
            url: url.to_string(),
            author: "team".to_string(),
            published_at: datetime!(2025-06-01 00:00:00 UTC),
            summary: String::new(),
            source: "토스".to_string(),
            category: Category::Engineering,
            image: String::new(),
        }
    }

    #[test]
    fn post_validity_requires_title_and_url() {
        assert!(post("제목", "https://toss.tech/article/a").is_valid());
        assert!(!post("", "https://toss.tech/article/a").is_valid());
        assert!(!post("제목", "  ").is_valid());
    }

    #[test]
    fn category_defaults_to_engineering() {
        assert_eq!(Category::default(), Category::Engineering);
        assert_eq!(Category::default().as_str(), "엔지니어링");
    }

    #[test]
    fn category_serializes_to_display_label() {
        let json = serde_json::to_string(&Category::Startup).unwrap();
        assert_eq!(json, "\"IT스타트업\"");
    }
}
