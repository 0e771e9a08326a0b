//! Wire models for syndication feeds (RSS 2.0 and Atom)
//!
//! Decoded with quick-xml's serde support; only the elements the adapters
//! consume are modeled, everything else is skipped. CDATA sections arrive as
//! plain text.

use serde::Deserialize;

/// RSS 2.0 document root (`<rss><channel>...`)
#[derive(Debug, Deserialize)]
pub struct Rss {
    pub channel: RssChannel,
}

#[derive(Debug, Deserialize)]
pub struct RssChannel {
    #[serde(rename = "item", default)]
    pub items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
pub struct RssItem {
    pub title: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "category", default)]
    pub categories: Vec<String>,
    pub description: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
    #[serde(rename = "dc:creator")]
    pub creator: Option<String>,
    #[serde(rename = "content:encoded")]
    pub encoded: Option<String>,
}

/// Atom document root (`<feed><entry>...`)
#[derive(Debug, Deserialize)]
pub struct AtomFeed {
    #[serde(rename = "entry", default)]
    pub entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AtomEntry {
    pub title: Option<String>,
    #[serde(rename = "link", default)]
    pub links: Vec<AtomLink>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub content: Option<AtomContent>,
}

impl AtomEntry {
    /// Atom entries carry several `<link>` elements; the post URL is the
    /// `alternate` one (or the first without an explicit `rel`).
    pub fn post_href(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| matches!(link.rel.as_deref(), None | Some("alternate")))
            .or(self.links.first())
            .and_then(|link| link.href.as_deref())
    }

    /// Publication timestamp string, preferring `<published>` and falling
    /// back to `<updated>`.
    pub fn timestamp(&self) -> Option<&str> {
        self.published.as_deref().or(self.updated.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct AtomLink {
    #[serde(rename = "@href")]
    pub href: Option<String>,
    #[serde(rename = "@rel")]
    pub rel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AtomContent {
    #[serde(rename = "$text")]
    pub body: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::de::from_str;

    #[test]
    fn decodes_rss_items_with_cdata_and_namespaces() {
        let xml = r#"<rss version="2.0">
          <channel>
            <title>tech blog</title>
            <item>
              <title><![CDATA[포스트 제목]]></title>
              <link>https://medium.com/daangn/post-1</link>
              <category><![CDATA[engineering]]></category>
              <category><![CDATA[backend]]></category>
              <description><![CDATA[<p>요약</p>]]></description>
              <pubDate>Tue, 03 Jun 2025 01:02:03 GMT</pubDate>
              <dc:creator><![CDATA[김개발]]></dc:creator>
              <content:encoded><![CDATA[<img src="https://cdn.example.com/a.png"><p>본문</p>]]></content:encoded>
            </item>
          </channel>
        </rss>"#;

        let rss: Rss = from_str(xml).unwrap();
        assert_eq!(rss.channel.items.len(), 1);
        let item = &rss.channel.items[0];
        assert_eq!(item.title.as_deref(), Some("포스트 제목"));
        assert_eq!(item.categories, vec!["engineering", "backend"]);
        assert_eq!(item.creator.as_deref(), Some("김개발"));
        assert!(item.encoded.as_deref().unwrap().contains("cdn.example.com"));
    }

    #[test]
    fn decodes_atom_entries_and_picks_the_alternate_link() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
          <entry>
            <title>새 포스트</title>
            <link rel="alternate" href="https://d2.naver.com/helloworld/1"/>
            <link rel="self" href="https://d2.naver.com/d2.atom"/>
            <updated>2025-03-01T00:00:00Z</updated>
            <content type="html">&lt;p&gt;본문&lt;/p&gt;</content>
          </entry>
        </feed>"#;

        let feed: AtomFeed = from_str(xml).unwrap();
        let entry = &feed.entries[0];
        assert_eq!(entry.post_href(), Some("https://d2.naver.com/helloworld/1"));
        assert_eq!(entry.timestamp(), Some("2025-03-01T00:00:00Z"));
        assert!(entry.content.as_ref().unwrap().body.as_deref().unwrap().contains("<p>"));
    }
}
