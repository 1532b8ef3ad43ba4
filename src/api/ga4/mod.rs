pub mod client;
pub mod models;

use std::future::Future;

pub use client::Ga4Client;
pub use models::{ApiError, RunReportRequest, RunReportResponse};

/// Anything that can answer a runReport query for a property.
///
/// `Ga4Client` talks HTTP; tests script responses in memory.
pub trait ReportSource {
    fn run_report(
        &self,
        property_id: &str,
        request: &RunReportRequest,
    ) -> impl Future<Output = Result<RunReportResponse, ApiError>> + Send;
}
