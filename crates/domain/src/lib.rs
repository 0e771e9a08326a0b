//! techdigest domain crate
//!
//! This crate contains the core pipeline logic following hexagonal
//! architecture:
//! - `model`: Canonical post model and run reporting
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `classify`: Keyword category buckets and the tech-relevance filter
//! - `executor`: Bounded fetch executor for per-page and per-item fan-out
//! - `usecases`: Aggregation pipeline (cutoff, relevance, dedup, sort)

pub mod classify;
pub mod executor;
pub mod model;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use ports::*;
