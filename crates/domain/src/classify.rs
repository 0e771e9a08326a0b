//! Keyword policies: category classification and the tech-relevance filter.

use crate::model::{Category, Post};

/// Keyword groups checked in order; the first matching group wins, so a post
/// mentioning both AI and engineering terms lands in the AI bucket.
const CATEGORY_GROUPS: &[(Category, &[&str])] = &[
    (
        Category::Ai,
        &[
            "ai",
            "머신러닝",
            "딥러닝",
            "llm",
            "챗봇",
            "시맨틱",
            "rag",
            "nlp",
            "컴퓨터 비전",
        ],
    ),
    (
        Category::Data,
        &[
            "데이터",
            "data",
            "분석",
            "analytics",
            "빅데이터",
            "datahub",
            "airflow",
        ],
    ),
    (
        Category::Search,
        &[
            "검색",
            "search",
            "indexing",
            "형태소",
            "seo",
            "elasticsearch",
        ],
    ),
    (
        Category::Engineering,
        &[
            "개발",
            "프로그래밍",
            "코딩",
            "프론트엔드",
            "백엔드",
            "웹",
            "앱",
            "서버",
            "클라우드",
            "docker",
            "kubernetes",
            "microservice",
        ],
    ),
    (
        Category::Startup,
        &[
            "협업",
            "팀워크",
            "업무",
            "문화",
            "조직",
            "리더",
            "인터뷰",
            "소개",
            "성장",
            "스타트업",
        ],
    ),
];

/// Classify free text (typically title + summary) into a category bucket.
/// Falls back to the engineering bucket when no group matches.
pub fn classify(text: &str) -> Category {
    let haystack = text.to_lowercase();
    for (category, keywords) in CATEGORY_GROUPS {
        if keywords.iter().any(|keyword| haystack.contains(keyword)) {
            return *category;
        }
    }
    Category::Engineering
}

/// Keeps only posts whose title, category, or summary mentions a tech keyword.
///
/// Matching is a case-insensitive substring test, so running the filter over
/// an already-filtered list is a no-op.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self {
            keywords: TECH_KEYWORDS.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

impl RelevanceFilter {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        let title = post.title.to_lowercase();
        let category = post.category.as_str().to_lowercase();
        let summary = post.summary.to_lowercase();
        self.keywords.iter().any(|keyword| {
            title.contains(keyword) || category.contains(keyword) || summary.contains(keyword)
        })
    }

    pub fn filter(&self, posts: Vec<Post>) -> Vec<Post> {
        posts.into_iter().filter(|p| self.matches(p)).collect()
    }
}

const TECH_KEYWORDS: &[&str] = &[
    "개발",
    "프로그래밍",
    "코딩",
    "소프트웨어",
    "엔지니어링",
    "프론트엔드",
    "백엔드",
    "풀스택",
    "데이터베이스",
    "api",
    "클라우드",
    "devops",
    "ci/cd",
    "테스트",
    "리팩토링",
    "아키텍처",
    "마이크로서비스",
    "모니터링",
    "로깅",
    "보안",
    "성능",
    "최적화",
    "스케일링",
    "컨테이너",
    "쿠버네티스",
    "머신러닝",
    "ai",
    "데이터",
    "분석",
    "알고리즘",
    "자료구조",
    "디자인패턴",
    "클린코드",
    "tdd",
    "ddd",
    "react",
    "vue",
    "node.js",
    "go",
    "python",
    "java",
    "javascript",
    "typescript",
    "rust",
    "kotlin",
    "swift",
    "docker",
    "aws",
    "gcp",
    "azure",
];

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn post(title: &str, summary: &str, category: Category) -> Post {
        Post {
            title: title.to_string(),
            url: "https://example.com/post".to_string(),
            author: "작성자".to_string(),
            published_at: datetime!(2025-06-01 00:00:00 UTC),
            summary: summary.to_string(),
            source: "토스".to_string(),
            category,
            image: String::new(),
        }
    }

    #[test]
    fn classifies_kubernetes_title_as_engineering() {
        assert_eq!(classify("Kubernetes 클러스터 운영기"), Category::Engineering);
    }

    #[test]
    fn ai_group_wins_over_engineering_on_overlap() {
        // Mentions both LLM and server work; AI is checked first.
        assert_eq!(classify("LLM 기반 서버 개발기"), Category::Ai);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("Elasticsearch 인덱스 튜닝"), Category::Search);
        assert_eq!(classify("DataHub 도입기"), Category::Data);
    }

    #[test]
    fn unmatched_text_falls_back_to_engineering() {
        assert_eq!(classify("오늘의 일기"), Category::Engineering);
    }

    #[test]
    fn relevance_matches_on_any_field() {
        let filter = RelevanceFilter::default();
        assert!(filter.matches(&post("Rust로 만드는 CLI", "", Category::Startup)));
        assert!(filter.matches(&post("근황", "레거시 리팩토링 이야기", Category::Startup)));
        // Category label itself counts ("엔지니어링" is a keyword).
        assert!(filter.matches(&post("근황", "", Category::Engineering)));
        assert!(!filter.matches(&post("근황", "사진 모음", Category::Startup)));
    }

    #[test]
    fn relevance_filter_is_idempotent() {
        let filter = RelevanceFilter::default();
        let posts = vec![
            post("Rust로 만드는 CLI", "", Category::Startup),
            post("근황", "사진 모음", Category::Startup),
        ];
        let once = filter.filter(posts);
        let twice = filter.filter(once.clone());
        assert_eq!(once, twice);
    }
}
