//! HTML report renderer
//!
//! Turns a run's ordered post list and per-source tally into a standalone
//! static page: tally header, source/category filter toggles, and a card
//! grid. All data is inlined; the page needs no server.

use handlebars::Handlebars;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use techdigest_domain::{Category, ReportInput, RenderError, ReportRenderer};

const TEMPLATE: &str = include_str!("templates/report.hbs");

const KOREAN_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[year]년 [month padding:none]월 [day padding:none]일");

pub struct HtmlReport {
    registry: Handlebars<'static>,
}

impl HtmlReport {
    pub fn new() -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string("report", TEMPLATE)
            .map_err(|e| RenderError::Template(e.to_string()))?;
        Ok(Self { registry })
    }
}

impl ReportRenderer for HtmlReport {
    fn render(&self, input: &ReportInput<'_>) -> Result<String, RenderError> {
        let view = ReportView::build(input);
        self.registry
            .render("report", &view)
            .map_err(|e| RenderError::Template(e.to_string()))
    }
}

#[derive(Serialize)]
struct ReportView {
    title: String,
    generated_at: String,
    total: usize,
    sources: Vec<TallyView>,
    categories: Vec<String>,
    posts: Vec<PostView>,
}

#[derive(Serialize)]
struct TallyView {
    name: String,
    count: usize,
}

#[derive(Serialize)]
struct PostView {
    title: String,
    url: String,
    author: String,
    date: String,
    summary: String,
    source: String,
    category: String,
    image: String,
}

impl ReportView {
    fn build(input: &ReportInput<'_>) -> Self {
        let sources = input
            .tally
            .iter()
            .map(|(name, count)| TallyView {
                name: name.clone(),
                count: *count,
            })
            .collect();

        let categories = Category::ALL
            .iter()
            .filter(|category| input.posts.iter().any(|p| p.category == **category))
            .map(|category| category.as_str().to_string())
            .collect();

        let posts = input
            .posts
            .iter()
            .map(|post| PostView {
                title: post.title.clone(),
                url: post.url.clone(),
                author: post.author.clone(),
                date: korean_date(post.published_at),
                summary: post.summary.clone(),
                source: post.source.clone(),
                category: post.category.as_str().to_string(),
                image: post.image.clone(),
            })
            .collect();

        Self {
            title: input.title.to_string(),
            generated_at: korean_date(input.generated_at),
            total: input.posts.len(),
            sources,
            categories,
            posts,
        }
    }
}

fn korean_date(moment: OffsetDateTime) -> String {
    moment
        .format(KOREAN_DATE)
        .unwrap_or_else(|_| moment.date().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use techdigest_domain::Post;
    use time::macros::datetime;

    fn sample_posts() -> Vec<Post> {
        vec![
            Post {
                title: "결제 재시도 설계".to_string(),
                url: "https://toss.tech/article/retry-design".to_string(),
                author: "토스 페이먼츠".to_string(),
                published_at: datetime!(2025-06-01 10:00:00 UTC),
                summary: "결제 시스템 개발 이야기".to_string(),
                source: "토스".to_string(),
                category: Category::Engineering,
                image: "https://static.toss.im/retry.png".to_string(),
            },
            Post {
                title: "머신러닝 검수 시스템".to_string(),
                url: "https://medium.com/daangn/ml-review".to_string(),
                author: "김개발".to_string(),
                published_at: datetime!(2025-05-01 10:00:00 UTC),
                summary: "이미지 검수 자동화".to_string(),
                source: "당근마켓".to_string(),
                category: Category::Ai,
                image: String::new(),
            },
        ]
    }

    #[test]
    fn renders_posts_tally_and_filters() {
        let posts = sample_posts();
        let mut tally = BTreeMap::new();
        tally.insert("토스".to_string(), 1usize);
        tally.insert("당근마켓".to_string(), 1usize);

        let input = ReportInput {
            title: "개발자들의 이야기 모음집",
            posts: &posts,
            tally: &tally,
            generated_at: datetime!(2025-07-01 00:00:00 UTC),
        };

        let html = HtmlReport::new().unwrap().render(&input).unwrap();

        assert!(html.contains("개발자들의 이야기 모음집"));
        assert!(html.contains("https://toss.tech/article/retry-design"));
        assert!(html.contains("2025년 6월 1일"));
        assert!(html.contains("당근마켓"));
        assert!(html.contains("AI"));
        // Second post has no image; only the first card gets an image block.
        assert_eq!(html.matches("background-image").count(), 1);
    }

    #[test]
    fn escapes_untrusted_markup_in_titles() {
        let mut posts = sample_posts();
        posts[0].title = "<script>alert('x')</script>".to_string();
        let tally = BTreeMap::new();

        let input = ReportInput {
            title: "report",
            posts: &posts,
            tally: &tally,
            generated_at: datetime!(2025-07-01 00:00:00 UTC),
        };

        let html = HtmlReport::new().unwrap().render(&input).unwrap();
        assert!(!html.contains("<script>alert"));
    }
}
