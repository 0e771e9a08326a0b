//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the pipeline core and external
//! systems. Adapters implement these traits to connect to real origins and
//! sinks.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{Post, ReportInput, SourceDescriptor};

/// Error type for source crawl operations.
///
/// A `CrawlError` means the source as a whole was unusable. A single
/// malformed item never produces one; adapters skip and log such items.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("undecodable body: {0}")]
    Decode(String),
    #[error("no usable content from any extraction strategy")]
    NoContent,
}

/// Port for one post origin.
///
/// Implementations are stateless per run: constructed once, `crawl` invoked
/// once per run, discarded afterwards. Side effects are network reads only.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Static descriptor of this origin; no I/O, cannot fail.
    fn source(&self) -> SourceDescriptor;

    /// Fetch and parse this origin's candidate posts.
    async fn crawl(&self) -> Result<Vec<Post>, CrawlError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Error type for report rendering
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(String),
}

/// Port for turning a run's output into a static document body.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, input: &ReportInput<'_>) -> Result<String, RenderError>;
}

/// Error type for report export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("destination error: {0}")]
    Destination(String),
}

/// Port for shipping a rendered document body to a storage sink.
#[async_trait]
pub trait ReportExporter: Send + Sync {
    /// Store `body` under `key` at the configured destination.
    async fn export(&self, body: &str, key: &str) -> Result<(), ExportError>;
}
