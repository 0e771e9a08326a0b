//! techdigest adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `sources`: One crawl adapter per origin (feed, embedded-state, and
//!   selector extraction strategies)
//! - `normalize`: Shared helpers for dates, markup, summaries, thumbnails
//! - `feed`: RSS/Atom wire models
//! - `report`: HTML report renderer
//! - `export`: Filesystem exporter

mod export_fs;
mod http;
mod report_html;

pub mod feed;
pub mod normalize;
pub mod sources;

/// Re-exports for report rendering adapters
pub mod report {
    pub use crate::report_html::HtmlReport;
}

/// Re-exports for export adapters
pub mod export {
    pub use crate::export_fs::FsExporter;
}

pub use http::{FETCH_TIMEOUT, build_client};
