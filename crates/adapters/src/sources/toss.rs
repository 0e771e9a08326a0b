//! 토스 tech blog adapter
//!
//! The site is server-rendered with its post list serialized into a script
//! block, so the primary strategy decodes that embedded state and walks into
//! the prefetched API response it carries. A selector-based scan of the page
//! is the fallback. Listing pages are paginated; page 1 is fetched up front
//! to confirm viability, the rest fan out through the bounded executor.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use techdigest_domain::classify::classify;
use techdigest_domain::executor::BoundedExecutor;
use techdigest_domain::{Category, CrawlError, Post, SourceAdapter, SourceDescriptor};
use time::OffsetDateTime;
use url::Url;

use crate::http::{build_client, fetch_text};
use crate::normalize::{absolutize, is_navigation_label, is_navigation_path, truncate_summary, parse_date};
use crate::sources::selectors::{first_anchor, first_date, first_image_src, first_matching_text, first_text_in_range};

const SOURCE_NAME: &str = "토스";
const DEFAULT_AUTHOR: &str = "토스팀";

/// Marker of the rendering framework's embedded state payload.
const STATE_MARKER: &str = "dehydratedState";

/// Pagination stops probing past this page even without an empty page.
const MAX_PAGES: usize = 50;

const CONTAINER_SELECTORS: &[&str] = &[
    "article",
    ".post-item",
    ".blog-item",
    ".content-item",
    "[class*='post']",
    "[class*='article']",
    "[class*='card']",
];

const TITLE_SELECTORS: &[&str] = &[
    "h1",
    "h2",
    "h3",
    "h4",
    ".title",
    ".post-title",
    ".article-title",
    "[class*='title']",
    "[class*='heading']",
];

const DATE_SELECTORS: &[&str] = &[
    "time",
    ".date",
    ".published",
    ".post-date",
    ".article-date",
    "[class*='date']",
    "[class*='time']",
    "[datetime]",
];

const SUMMARY_SELECTORS: &[&str] = &[
    "p",
    ".excerpt",
    ".summary",
    ".description",
    "[class*='excerpt']",
    "[class*='summary']",
    "[class*='description']",
];

const NAV_TITLES: &[&str] = &["홈", "메뉴", "전체보기", "구독하기"];

static SCRIPTS: Lazy<Selector> = Lazy::new(|| Selector::parse("script").expect("valid selector"));
static META_OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property='og:image']").expect("valid selector"));
static META_TWITTER_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[name='twitter:image']").expect("valid selector"));
static IMAGES: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").expect("valid selector"));

pub struct TossAdapter {
    client: Client,
    base_url: String,
    page_limit: usize,
    thumbnail_limit: usize,
    max_pages: usize,
}

impl TossAdapter {
    pub fn new(page_limit: usize, thumbnail_limit: usize) -> Self {
        Self::with_base_url("https://toss.tech".to_string(), page_limit, thumbnail_limit)
    }

    pub fn with_base_url(base_url: String, page_limit: usize, thumbnail_limit: usize) -> Self {
        Self {
            client: build_client(),
            base_url,
            page_limit,
            thumbnail_limit,
            max_pages: MAX_PAGES,
        }
    }

    /// Upper bound on pagination probing; tests shrink this.
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    async fn fetch_page(&self, page: usize) -> Result<Vec<Post>, CrawlError> {
        let url = format!("{}/?page={}", self.base_url, page);
        let body = fetch_text(&self.client, &url).await?;
        let base = Url::parse(&self.base_url).map_err(|e| CrawlError::Decode(e.to_string()))?;

        let posts = extract_embedded(&body, &base);
        if !posts.is_empty() {
            return Ok(posts);
        }
        tracing::debug!(page, "no embedded state, falling back to selectors");
        Ok(extract_fallback(&body, &base))
    }

    /// Posts the listing never gave an image get one from their detail page's
    /// social-preview metadata.
    async fn resolve_thumbnails(&self, posts: &mut [Post]) {
        let pending: Vec<(usize, String)> = posts
            .iter()
            .enumerate()
            .filter(|(_, post)| post.image.is_empty())
            .map(|(index, post)| (index, post.url.clone()))
            .collect();
        if pending.is_empty() {
            return;
        }

        let executor = BoundedExecutor::new(self.thumbnail_limit);
        let tasks: Vec<_> = pending
            .into_iter()
            .map(|(index, url)| async move {
                let image = match fetch_text(&self.client, &url).await {
                    Ok(body) => page_thumbnail(&body),
                    Err(error) => {
                        tracing::debug!(url = %url, %error, "thumbnail fetch failed");
                        None
                    }
                };
                (index, image)
            })
            .collect();

        let mut resolved = 0;
        for (index, image) in executor.run_all(tasks).await {
            if let Some(image) = image {
                posts[index].image = image;
                resolved += 1;
            }
        }
        tracing::info!(resolved, "thumbnails resolved from detail pages");
    }
}

#[async_trait]
impl SourceAdapter for TossAdapter {
    fn source(&self) -> SourceDescriptor {
        SourceDescriptor::new(SOURCE_NAME, self.base_url.clone())
    }

    async fn crawl(&self) -> Result<Vec<Post>, CrawlError> {
        // Page 1 runs alone first: its failure is the source's failure.
        let first = self.fetch_page(1).await?;

        let executor = BoundedExecutor::new(self.page_limit);
        let tasks: Vec<_> = (2..=self.max_pages)
            .map(|page| async move { (page, self.fetch_page(page).await) })
            .collect();
        let outcomes = executor.run_all(tasks).await;

        let mut by_page: BTreeMap<usize, Vec<Post>> = BTreeMap::new();
        by_page.insert(1, first);
        for (page, outcome) in outcomes {
            match outcome {
                Ok(posts) if posts.is_empty() => tracing::debug!(page, "empty page"),
                Ok(posts) => {
                    by_page.insert(page, posts);
                }
                Err(error) => tracing::warn!(page, %error, "page fetch failed"),
            }
        }

        // Re-assemble in page order. The first hole past page 1 ends the
        // sequence so later pages never jump ahead of a missing one.
        let mut posts = Vec::new();
        for page in 1..=self.max_pages {
            match by_page.remove(&page) {
                Some(batch) => posts.extend(batch),
                None => break,
            }
        }
        tracing::info!(count = posts.len(), "pagination assembled");

        self.resolve_thumbnails(&mut posts).await;
        Ok(posts)
    }
}

/// Decode the embedded state payload and walk the fixed lookup path down to
/// the prefetched article pages. Every missing step yields an empty result
/// instead of an error.
fn extract_embedded(html: &str, base: &Url) -> Vec<Post> {
    let document = Html::parse_document(html);
    for script in document.select(&SCRIPTS) {
        let text: String = script.text().collect();
        if text.len() < 1000 || !text.contains(STATE_MARKER) {
            continue;
        }
        let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
            continue;
        };
        if end <= start {
            continue;
        }
        let Ok(state) = serde_json::from_str::<Value>(&text[start..=end]) else {
            tracing::debug!("embedded state block was not valid JSON");
            continue;
        };
        let posts = prefetched_posts(&state, base);
        if !posts.is_empty() {
            return posts;
        }
    }
    Vec::new()
}

fn prefetched_posts(state: &Value, base: &Url) -> Vec<Post> {
    let queries = state
        .get("props")
        .and_then(|v| v.get("pageProps"))
        .and_then(|v| v.get("prefetchResult"))
        .and_then(|v| v.get("dehydratedState"))
        .and_then(|v| v.get("queries"))
        .and_then(Value::as_array);
    let Some(queries) = queries else {
        return Vec::new();
    };

    let mut posts = Vec::new();
    for query in queries {
        // Each query's data is itself a JSON-encoded paginated API response.
        let Some(data) = query
            .get("state")
            .and_then(|v| v.get("data"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        let Ok(page) = serde_json::from_str::<ArticlePage>(data) else {
            tracing::debug!("prefetched query did not decode as an article page");
            continue;
        };
        for item in page.results {
            if let Some(post) = item.into_post(base) {
                posts.push(post);
            }
        }
    }
    posts
}

#[derive(Debug, Deserialize)]
struct ArticlePage {
    #[serde(default)]
    results: Vec<ArticleItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleItem {
    title: Option<String>,
    key: Option<String>,
    created_time: Option<String>,
    published_time: Option<String>,
    #[serde(default)]
    categories: Vec<ArticleCategory>,
    editor: Option<ArticleEditor>,
    short_description: Option<String>,
    thumbnail: Option<String>,
    cover_image: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleCategory {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleEditor {
    name: Option<String>,
}

impl ArticleItem {
    fn into_post(self, base: &Url) -> Option<Post> {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())?
            .to_string();
        let url = {
            let key = self.key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
            absolutize(base, &format!("/article/{key}"))?
        };

        let raw_date = self
            .published_time
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.created_time.as_deref());
        let published_at = match raw_date.and_then(parse_date) {
            Some(parsed) => parsed,
            None => {
                tracing::warn!(title = %title, "article without parsable timestamp, using current time");
                OffsetDateTime::now_utc()
            }
        };

        let summary = truncate_summary(self.short_description.as_deref().unwrap_or("").trim());

        // The API's own category names are preferred when they map onto a
        // bucket; keyword classification covers the rest.
        let category = self
            .categories
            .iter()
            .filter_map(|c| c.name.as_deref())
            .find_map(|name| match name {
                "데이터/ML" => Some(Category::Data),
                "개발" => Some(Category::Engineering),
                _ => None,
            })
            .unwrap_or_else(|| classify(&format!("{title} {summary}")));

        let image = self
            .thumbnail
            .into_iter()
            .chain(self.cover_image)
            .chain(self.image)
            .find(|candidate| !candidate.is_empty())
            .unwrap_or_default();

        let author = self
            .editor
            .and_then(|e| e.name)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        Some(Post {
            title,
            url,
            author,
            published_at,
            summary,
            source: SOURCE_NAME.to_string(),
            category,
            image,
        })
    }
}

/// Selector-based fallback over the rendered listing markup.
fn extract_fallback(html: &str, base: &Url) -> Vec<Post> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut posts = Vec::new();

    for container in CONTAINER_SELECTORS {
        let Ok(selector) = Selector::parse(container) else {
            continue;
        };
        for element in document.select(&selector) {
            let Some(title) = first_matching_text(&element, TITLE_SELECTORS) else {
                continue;
            };
            let Some(url) = first_anchor(&element, base) else {
                continue;
            };
            if is_navigation_label(&title, NAV_TITLES) || is_navigation_path(&url) {
                continue;
            }
            if !seen.insert(url.clone()) {
                continue;
            }

            let published_at =
                first_date(&element, DATE_SELECTORS).unwrap_or_else(OffsetDateTime::now_utc);
            let summary = first_text_in_range(&element, SUMMARY_SELECTORS, 10, 200)
                .map(|text| truncate_summary(&text))
                .unwrap_or_default();
            let image = first_image_src(&element, base).unwrap_or_default();
            let category = classify(&format!("{title} {summary}"));

            posts.push(Post {
                title,
                url,
                author: DEFAULT_AUTHOR.to_string(),
                published_at,
                summary,
                source: SOURCE_NAME.to_string(),
                category,
                image,
            });
        }
    }
    posts
}

/// Social-preview image of a detail page: og:image, twitter:image, then the
/// first image element.
fn page_thumbnail(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    if let Some(meta) = document.select(&META_OG_IMAGE).next() {
        if let Some(content) = meta.value().attr("content") {
            let content = content.trim();
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
    }
    if let Some(meta) = document.select(&META_TWITTER_IMAGE).next() {
        if let Some(content) = meta.value().attr("content") {
            let content = content.trim();
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
    }
    document
        .select(&IMAGES)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| src.trim().to_string())
        .filter(|src| !src.is_empty())
}
