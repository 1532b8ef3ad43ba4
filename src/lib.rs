//! GA4 Data API report pipeline.
//!
//! Issues `runReport` queries with rate-limit retries, row pagination and
//! date-range chunking, then derives the revenue split, period-over-period
//! deltas and ARPU for a dashboard.

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use api::ga4::{ApiError, Ga4Client, ReportSource};
pub use config::{ConfigError, FileConfig, PipelineConfig};
pub use services::Ga4Pipeline;
pub use utils::PipelineError;
