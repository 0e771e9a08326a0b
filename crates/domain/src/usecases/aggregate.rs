//! Aggregation use case - merges per-source crawls into one ranked list
//!
//! Fixed pipeline: concatenate successful crawls, apply the cutoff-date
//! filter, optionally apply the relevance filter, eliminate duplicates, and
//! sort by recency. Source failures are non-fatal; they are logged once and
//! recorded on the run report.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use time::{Date, Duration, OffsetDateTime};
use url::Url;

use crate::classify::RelevanceFilter;
use crate::model::{Post, RunReport, SourceFailure};
use crate::ports::{Clock, SourceAdapter};

/// The instant before which posts are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cutoff {
    /// Absolute date boundary; posts from that day onward survive.
    Absolute(Date),
    /// Rolling window of the last `n` days, anchored at the clock's now.
    RollingDays(i64),
}

impl Cutoff {
    fn boundary<C: Clock + ?Sized>(&self, clock: &C) -> OffsetDateTime {
        match self {
            Cutoff::Absolute(date) => date.midnight().assume_utc(),
            Cutoff::RollingDays(days) => clock.now() - Duration::days(*days),
        }
    }
}

/// Configuration for one aggregation run
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    pub cutoff: Cutoff,
    /// Whether the tech-relevance filter runs after the cutoff filter.
    pub relevance: bool,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            cutoff: Cutoff::RollingDays(365),
            relevance: false,
        }
    }
}

/// Errors that make a whole run unusable, as opposed to the valid degenerate
/// outcome of an empty post list.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("no sources configured")]
    NoSources,
    #[error("every source failed")]
    AllSourcesFailed(Vec<SourceFailure>),
}

/// Merge orchestrator over the configured source adapters.
pub struct Aggregator<Cl>
where
    Cl: Clock + ?Sized,
{
    adapters: Vec<Arc<dyn SourceAdapter>>,
    clock: Arc<Cl>,
    config: AggregateConfig,
}

impl<Cl> Aggregator<Cl>
where
    Cl: Clock + ?Sized,
{
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, clock: Arc<Cl>, config: AggregateConfig) -> Self {
        Self {
            adapters,
            clock,
            config,
        }
    }

    /// Run every adapter concurrently and reduce their outputs.
    ///
    /// The source count is small and fixed, so the outer layer runs without
    /// an admission limit; bounded fan-out lives inside the adapters.
    pub async fn run(&self) -> Result<RunReport, AggregateError> {
        if self.adapters.is_empty() {
            return Err(AggregateError::NoSources);
        }

        let mut crawls: FuturesUnordered<_> = self
            .adapters
            .iter()
            .enumerate()
            .map(|(index, adapter)| {
                let adapter = Arc::clone(adapter);
                async move {
                    let source = adapter.source();
                    tracing::info!(source = %source.name, "crawl started");
                    let started = Instant::now();
                    let outcome = adapter.crawl().await;
                    (index, source, outcome, started.elapsed())
                }
            })
            .collect();

        let mut batches = Vec::with_capacity(self.adapters.len());
        let mut failures = Vec::new();
        while let Some((index, source, outcome, elapsed)) = crawls.next().await {
            match outcome {
                Ok(posts) => {
                    tracing::info!(
                        source = %source.name,
                        count = posts.len(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "crawl finished"
                    );
                    batches.push((index, posts));
                }
                Err(error) => {
                    tracing::error!(source = %source.name, error = %error, "crawl failed");
                    failures.push(SourceFailure {
                        source: source.name,
                        error: error.to_string(),
                    });
                }
            }
        }

        if failures.len() == self.adapters.len() {
            return Err(AggregateError::AllSourcesFailed(failures));
        }

        // Completion order is meaningless; restore registration order before
        // concatenating so tie-breaks stay deterministic.
        batches.sort_by_key(|(index, _)| *index);
        let mut posts: Vec<Post> = batches
            .into_iter()
            .flat_map(|(_, batch)| batch)
            .filter(Post::is_valid)
            .collect();

        let boundary = self.config.cutoff.boundary(self.clock.as_ref());
        let before_cutoff = posts.len();
        posts.retain(|post| post.published_at >= boundary);
        let dropped_by_cutoff = before_cutoff - posts.len();

        let mut dropped_by_relevance = 0;
        if self.config.relevance {
            let filter = RelevanceFilter::default();
            let before_relevance = posts.len();
            posts = filter.filter(posts);
            dropped_by_relevance = before_relevance - posts.len();
        }

        let (mut posts, duplicates_removed) = dedup(posts);

        // Stable sort keeps concatenation order for equal timestamps.
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        let mut tally: BTreeMap<String, usize> = BTreeMap::new();
        for post in &posts {
            *tally.entry(post.source.clone()).or_insert(0) += 1;
        }

        tracing::info!(
            total = posts.len(),
            dropped_by_cutoff,
            dropped_by_relevance,
            duplicates_removed,
            failed_sources = failures.len(),
            "aggregation finished"
        );

        Ok(RunReport {
            posts,
            tally,
            failures,
            dropped_by_cutoff,
            dropped_by_relevance,
            duplicates_removed,
        })
    }
}

/// First-seen-wins duplicate elimination.
///
/// Two posts are the same when they share a canonical URL or a normalized
/// title. Adapters already dedup internally by URL; the title key is what
/// collapses the same article syndicated by two origins.
fn dedup(posts: Vec<Post>) -> (Vec<Post>, usize) {
    let mut seen_urls = HashSet::new();
    let mut seen_titles = HashSet::new();
    let mut unique = Vec::with_capacity(posts.len());
    let mut removed = 0;

    for post in posts {
        let url_key = canonical_url(&post.url);
        let title_key = normalized_title(&post.title);
        if seen_urls.contains(&url_key) || seen_titles.contains(&title_key) {
            tracing::debug!(title = %post.title, url = %post.url, "duplicate dropped");
            removed += 1;
            continue;
        }
        seen_urls.insert(url_key);
        seen_titles.insert(title_key);
        unique.push(post);
    }

    (unique, removed)
}

/// Canonical dedup key for a URL: parsed form without fragment, trailing
/// slash stripped. Unparsable URLs fall back to the trimmed string.
fn canonical_url(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string().trim_end_matches('/').to_string()
        }
        Err(_) => raw.trim().trim_end_matches('/').to_string(),
    }
}

/// Normalized dedup key for a title: trimmed, inner whitespace collapsed,
/// case-folded.
fn normalized_title(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
