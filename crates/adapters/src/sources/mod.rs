//! Source adapters, one per origin.
//!
//! Each adapter implements `SourceAdapter` with whichever extraction
//! strategies its origin supports: feed decoding, embedded-state walking,
//! selector scanning, or detail-page enrichment.

mod daangn;
mod danmin;
mod naver;
pub(crate) mod selectors;
mod toss;

pub use daangn::DaangnAdapter;
pub use danmin::DanminAdapter;
pub use naver::NaverD2Adapter;
pub use toss::TossAdapter;
