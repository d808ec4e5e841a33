//! # KLQ Common Library
//!
//! Shared code for the K-pop lyric quiz backend:
//! - Error taxonomy shared across the pipeline
//! - Environment-driven configuration
//! - Chart coordinate type and its opaque-code codec
//! - Bounded TTL/LRU cache shared by the pipeline stages

pub mod cache;
pub mod config;
pub mod coord;
pub mod error;

pub use cache::Cache;
pub use config::Config;
pub use coord::Coordinate;
pub use error::{Error, Result};
