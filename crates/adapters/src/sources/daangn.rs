//! 당근마켓 tech blog adapter
//!
//! The blog is hosted on Medium, whose RSS feed carries the most reliable
//! publication timestamps, so this adapter is purely feed-based.

use async_trait::async_trait;
use reqwest::Client;
use techdigest_domain::classify::classify;
use techdigest_domain::{CrawlError, Post, SourceAdapter, SourceDescriptor};
use time::OffsetDateTime;

use crate::feed::Rss;
use crate::http::{build_client, fetch_text};
use crate::normalize::{first_image, parse_date, summarize};

const SOURCE_NAME: &str = "당근마켓";
const DEFAULT_AUTHOR: &str = "당근마켓팀";
const DEFAULT_SUMMARY: &str = "당근마켓 기술 블로그 포스트";

pub struct DaangnAdapter {
    client: Client,
    base_url: String,
}

impl DaangnAdapter {
    pub fn new() -> Self {
        Self::with_base_url("https://medium.com".to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: build_client(),
            base_url,
        }
    }
}

impl Default for DaangnAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for DaangnAdapter {
    fn source(&self) -> SourceDescriptor {
        SourceDescriptor::new(SOURCE_NAME, format!("{}/daangn", self.base_url))
    }

    async fn crawl(&self) -> Result<Vec<Post>, CrawlError> {
        let feed_url = format!("{}/feed/daangn", self.base_url);
        let body = fetch_text(&self.client, &feed_url).await?;
        let rss: Rss =
            quick_xml::de::from_str(&body).map_err(|e| CrawlError::Decode(e.to_string()))?;

        let mut posts = Vec::with_capacity(rss.channel.items.len());
        for item in &rss.channel.items {
            let Some(title) = item.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
            else {
                tracing::debug!("feed item without title skipped");
                continue;
            };
            let Some(link) = item.link.as_deref().map(str::trim).filter(|l| !l.is_empty()) else {
                tracing::debug!(title, "feed item without link skipped");
                continue;
            };

            let published_at = match item.pub_date.as_deref().and_then(parse_date) {
                Some(parsed) => parsed,
                None => {
                    tracing::warn!(title, date = ?item.pub_date, "feed date unparsable, using current time");
                    OffsetDateTime::now_utc()
                }
            };

            let summary = item
                .description
                .as_deref()
                .map(summarize)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

            let author = item
                .creator
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .unwrap_or(DEFAULT_AUTHOR)
                .to_string();

            // content:encoded carries the full body; the description is a
            // shorter fragment that sometimes holds the only image.
            let image = item
                .encoded
                .as_deref()
                .and_then(first_image)
                .or_else(|| item.description.as_deref().and_then(first_image))
                .unwrap_or_default();

            let category = classify(&format!("{title} {summary}"));

            posts.push(Post {
                title: title.to_string(),
                url: link.to_string(),
                author,
                published_at,
                summary,
                source: SOURCE_NAME.to_string(),
                category,
                image,
            });
        }

        tracing::info!(count = posts.len(), "feed items mapped");
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use techdigest_domain::Category;
    use time::macros::datetime;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = r#"<rss version="2.0">
      <channel>
        <title>당근마켓 팀블로그</title>
        <item>
          <title><![CDATA[머신러닝으로 중고거래 검수하기]]></title>
          <link>https://medium.com/daangn/ml-review</link>
          <description><![CDATA[<p>중고거래 이미지를 머신러닝으로 검수한 이야기</p>]]></description>
          <pubDate>Tue, 03 Jun 2025 01:02:03 GMT</pubDate>
          <dc:creator><![CDATA[김개발]]></dc:creator>
          <content:encoded><![CDATA[<figure><img src="https://cdn-images.medium.com/cover.png"></figure><p>본문</p>]]></content:encoded>
        </item>
        <item>
          <title><![CDATA[링크 없는 글]]></title>
          <description><![CDATA[누락 항목]]></description>
        </item>
        <item>
          <title><![CDATA[팀 문화 이야기]]></title>
          <link>https://medium.com/daangn/culture</link>
          <description><![CDATA[조직 문화를 만들어가는 과정]]></description>
          <pubDate>not a date</pubDate>
        </item>
      </channel>
    </rss>"#;

    #[tokio::test]
    async fn maps_feed_items_to_posts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed/daangn"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .mount(&server)
            .await;

        let adapter = DaangnAdapter::with_base_url(server.uri());
        let posts = adapter.crawl().await.unwrap();

        // The item without a link is skipped, not fatal.
        assert_eq!(posts.len(), 2);

        let first = &posts[0];
        assert_eq!(first.title, "머신러닝으로 중고거래 검수하기");
        assert_eq!(first.url, "https://medium.com/daangn/ml-review");
        assert_eq!(first.author, "김개발");
        assert_eq!(first.published_at, datetime!(2025-06-03 01:02:03 UTC));
        assert_eq!(first.image, "https://cdn-images.medium.com/cover.png");
        assert_eq!(first.category, Category::Ai);
        assert!(first.summary.contains("중고거래"));

        // Unparsable date degrades to "now" instead of failing the item.
        let second = &posts[1];
        assert_eq!(second.author, DEFAULT_AUTHOR);
        assert!(second.published_at > datetime!(2025-01-01 00:00:00 UTC));
        assert_eq!(second.category, Category::Startup);
    }

    #[tokio::test]
    async fn non_success_status_fails_the_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed/daangn"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let adapter = DaangnAdapter::with_base_url(server.uri());
        let error = adapter.crawl().await.unwrap_err();
        assert!(matches!(error, CrawlError::Status(503)));
    }

    #[tokio::test]
    async fn undecodable_body_fails_the_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed/daangn"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"xml\"}"))
            .mount(&server)
            .await;

        let adapter = DaangnAdapter::with_base_url(server.uri());
        let error = adapter.crawl().await.unwrap_err();
        assert!(matches!(error, CrawlError::Decode(_)));
    }
}
