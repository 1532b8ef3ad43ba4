//! Data models for GA4 reports
//!
//! Parsed report rows, the per-day user and revenue series, and the summary
//! document produced by the pipeline.

pub mod report;
pub mod revenue;
pub mod summary;
pub mod trends;
pub mod users;

pub use report::{names, ReportRow};
pub use revenue::{DailyRevenue, RevenueTotals, YearlyRevenue};
pub use summary::{AnalyticsReport, PeriodComparison, PeriodDeltas, PeriodMetrics, ReportMetadata, Summary};
pub use trends::{Aggregation, SeriesPoint};
pub use users::{DailyUsers, UserTotals};
