//! 개발자 단민 blog adapter
//!
//! No feed and no embedded state, so this is the pure selector-based
//! strategy: post links are harvested from the listing page, then each post's
//! detail page is fetched through the bounded executor to recover its date,
//! summary, and thumbnail.

use std::collections::HashSet;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use techdigest_domain::classify::classify;
use techdigest_domain::executor::BoundedExecutor;
use techdigest_domain::{CrawlError, Post, SourceAdapter, SourceDescriptor};
use time::OffsetDateTime;
use url::Url;

use crate::http::{build_client, fetch_text};
use crate::normalize::{is_navigation_label, is_navigation_path};
use crate::sources::selectors::{element_text, first_date, first_image_src, first_text_in_range};

const SOURCE_NAME: &str = "단민";
const DEFAULT_AUTHOR: &str = "단민";
const DEFAULT_SUMMARY: &str = "개발자 단민의 기술 블로그 포스트";

/// Category tabs and menu entries on the listing page look like post links.
const NAV_TITLES: &[&str] = &["Dev", "Experience", "회고", "인턴회고", "All"];

const DATE_SELECTORS: &[&str] = &["time[datetime]", "time", "[class*='date']", "div", "span"];

const DETAIL_CONCURRENCY: usize = 5;

// Post paths are numbered slugs like /83-parcel-rsc/.
static POST_PATH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/\d+").expect("valid regex"));

static ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));
static LINK_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.title").expect("valid selector"));

#[derive(Debug, Clone)]
struct Candidate {
    url: String,
    title: String,
}

pub struct DanminAdapter {
    client: Client,
    base_url: String,
}

impl DanminAdapter {
    pub fn new() -> Self {
        Self::with_base_url("https://www.jeong-min.com".to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: build_client(),
            base_url,
        }
    }
}

impl Default for DanminAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for DanminAdapter {
    fn source(&self) -> SourceDescriptor {
        SourceDescriptor::new(SOURCE_NAME, self.base_url.clone())
    }

    async fn crawl(&self) -> Result<Vec<Post>, CrawlError> {
        let base = Url::parse(&self.base_url).map_err(|e| CrawlError::Decode(e.to_string()))?;
        let listing_url = format!("{}/posts", self.base_url);
        let listing = fetch_text(&self.client, &listing_url).await?;

        let candidates = post_candidates(&listing, &base);
        tracing::info!(count = candidates.len(), "post links discovered");
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let executor = BoundedExecutor::new(DETAIL_CONCURRENCY);
        let tasks: Vec<_> = candidates
            .into_iter()
            .map(|candidate| async move {
                let detail = fetch_text(&self.client, &candidate.url).await;
                (candidate, detail)
            })
            .collect();

        let mut posts = Vec::new();
        for (candidate, detail) in executor.run_all(tasks).await {
            match detail {
                Ok(html) => posts.push(detail_post(&html, &candidate, &base)),
                Err(error) => {
                    tracing::warn!(url = %candidate.url, %error, "detail page failed, keeping defaults");
                    posts.push(fallback_post(&candidate));
                }
            }
        }

        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(posts)
    }
}

/// Scan the listing page for post links: numbered paths whose anchor carries
/// a title element, minus navigation labels and home/menu/index paths.
fn post_candidates(html: &str, base: &Url) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for anchor in document.select(&ANCHORS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !POST_PATH_RE.is_match(href) {
            continue;
        }
        let Some(url) = base.join(href).ok().map(|u| u.to_string()) else {
            continue;
        };
        if is_navigation_path(&url) || !seen.insert(url.clone()) {
            continue;
        }
        let Some(title_element) = anchor.select(&LINK_TITLE).next() else {
            continue;
        };
        let title = element_text(&title_element);
        if title.is_empty() || is_navigation_label(&title, NAV_TITLES) {
            continue;
        }
        candidates.push(Candidate { url, title });
    }
    candidates
}

fn detail_post(html: &str, candidate: &Candidate, base: &Url) -> Post {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let published_at = first_date(&root, DATE_SELECTORS).unwrap_or_else(|| {
        tracing::debug!(url = %candidate.url, "no date on detail page, using current time");
        OffsetDateTime::now_utc()
    });
    let summary =
        first_text_in_range(&root, &["p"], 50, 200).unwrap_or_else(|| DEFAULT_SUMMARY.to_string());
    let image = first_image_src(&root, base).unwrap_or_default();
    let category = classify(&format!("{} {}", candidate.title, summary));

    Post {
        title: candidate.title.clone(),
        url: candidate.url.clone(),
        author: DEFAULT_AUTHOR.to_string(),
        published_at,
        summary,
        source: SOURCE_NAME.to_string(),
        category,
        image,
    }
}

fn fallback_post(candidate: &Candidate) -> Post {
    Post {
        title: candidate.title.clone(),
        url: candidate.url.clone(),
        author: DEFAULT_AUTHOR.to_string(),
        published_at: OffsetDateTime::now_utc(),
        summary: DEFAULT_SUMMARY.to_string(),
        source: SOURCE_NAME.to_string(),
        category: classify(&candidate.title),
        image: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use techdigest_domain::Category;
    use time::macros::datetime;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LISTING: &str = r#"<html><body>
      <nav><a href="/dev/"><div class="title">Dev</div></a></nav>
      <a href="/83-parcel-rsc/"><div class="title">Parcel로 RSC 개발하기</div></a>
      <a href="/84-retro/"><div class="title">회고</div></a>
      <a href="/85-docker/"><div class="title">Docker 배포 삽질기</div></a>
      <a href="/85-docker/"><div class="title">Docker 배포 삽질기</div></a>
      <a href="/about"><div class="title">소개 페이지</div></a>
    </body></html>"#;

    const DETAIL: &str = r#"<html><body>
      <div class="post-meta"><div>2025.06.25</div></div>
      <p>짧은 문단</p>
      <p>이 글은 Docker 컨테이너를 운영 환경에 배포하면서 겪은 문제와 해결 과정을 차근차근 정리한 기록입니다.</p>
      <img src="/static/cover.png">
    </body></html>"#;

    #[tokio::test]
    async fn harvests_posts_and_resolves_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/83-parcel-rsc/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DETAIL))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/85-docker/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DETAIL))
            .mount(&server)
            .await;

        let adapter = DanminAdapter::with_base_url(server.uri());
        let posts = adapter.crawl().await.unwrap();

        // "회고" is a navigation label, "/about" and "/dev/" are not numbered
        // post paths, and the duplicate link collapses.
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|p| p.source == SOURCE_NAME));

        let docker = posts.iter().find(|p| p.title.contains("Docker")).unwrap();
        assert_eq!(docker.published_at, datetime!(2025-06-25 00:00:00 UTC));
        assert!(docker.summary.contains("배포하면서"));
        assert!(docker.image.ends_with("/static/cover.png"));
        assert_eq!(docker.category, Category::Engineering);
    }

    #[tokio::test]
    async fn detail_failure_degrades_to_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="/90-rust/"><div class="title">Rust 공부 기록</div></a>"#,
            ))
            .mount(&server)
            .await;

        let adapter = DanminAdapter::with_base_url(server.uri());
        let posts = adapter.crawl().await.unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].summary, DEFAULT_SUMMARY);
        assert!(posts[0].published_at > datetime!(2025-01-01 00:00:00 UTC));
    }

    #[tokio::test]
    async fn listing_failure_fails_the_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let adapter = DanminAdapter::with_base_url(server.uri());
        assert!(matches!(
            adapter.crawl().await.unwrap_err(),
            CrawlError::Status(404)
        ));
    }
}
