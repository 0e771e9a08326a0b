//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Absolute cutoff boundary (YYYY-MM-DD); posts older than this are
    /// dropped during aggregation.
    #[serde(default)]
    pub cutoff_date: Option<String>,

    /// Rolling last-N-days window, used when no absolute cutoff is set.
    #[serde(default)]
    pub window_days: Option<i64>,

    #[serde(default = "default_page_concurrency")]
    pub page_concurrency: usize,

    #[serde(default = "default_thumbnail_concurrency")]
    pub thumbnail_concurrency: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Whether the tech-relevance keyword filter runs during aggregation.
    #[serde(default)]
    pub relevance: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_true")]
    pub toss: bool,

    #[serde(default = "default_true")]
    pub daangn: bool,

    #[serde(default = "default_true")]
    pub naver: bool,

    #[serde(default = "default_true")]
    pub danmin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Destination key the exporter writes the report body under.
    #[serde(default = "default_report_key")]
    pub key: String,

    #[serde(default = "default_report_title")]
    pub title: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_cutoff_date() -> Option<String> {
    Some("2025-01-01".to_string())
}

fn default_page_concurrency() -> usize {
    5
}

fn default_thumbnail_concurrency() -> usize {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./public")
}

fn default_report_key() -> String {
    "index.html".to_string()
}

fn default_report_title() -> String {
    "개발자들의 이야기 모음집".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            cutoff_date: default_cutoff_date(),
            window_days: None,
            page_concurrency: default_page_concurrency(),
            thumbnail_concurrency: default_thumbnail_concurrency(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            toss: true,
            daangn: true,
            naver: true,
            danmin: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            key: default_report_key(),
            title: default_report_title(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("TECHDIGEST")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# techdigest configuration

[general]
log_level = "info"

[crawl]
# Posts published before this date are dropped.
cutoff_date = "2025-01-01"
# Alternatively, keep a rolling window instead of an absolute date:
# window_days = 365
page_concurrency = 5
thumbnail_concurrency = 10

[filter]
# Keep only posts matching the tech keyword list.
relevance = false

[sources]
toss = true
daangn = true
naver = true
danmin = true

[report]
output_dir = "./public"
key = "index.html"
title = "개발자들의 이야기 모음집"
"#
        .to_string()
    }
}
