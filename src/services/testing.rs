//! In-memory report source for service tests

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use crate::api::ga4::models::{DimensionHeader, MetricHeader, Row, Value};
use crate::api::ga4::{ApiError, ReportSource, RunReportRequest, RunReportResponse};

/// Replays scripted results in call order and records every request
pub struct ScriptedSource {
    results: Mutex<VecDeque<Result<RunReportResponse, ApiError>>>,
    requests: Mutex<Vec<RunReportRequest>>,
}

impl ScriptedSource {
    pub fn new(results: Vec<Result<RunReportResponse, ApiError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RunReportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ReportSource for ScriptedSource {
    fn run_report(
        &self,
        _property_id: &str,
        request: &RunReportRequest,
    ) -> impl Future<Output = Result<RunReportResponse, ApiError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let result = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::RequestError("script exhausted".to_string())));
        async move { result }
    }
}

/// Build a response; `row_count` matches the number of rows given
pub fn report(dimensions: &[&str], metrics: &[&str], rows: Vec<(Vec<&str>, Vec<&str>)>) -> RunReportResponse {
    let value = |v: &&str| Value { value: v.to_string() };
    RunReportResponse {
        dimension_headers: dimensions
            .iter()
            .map(|name| DimensionHeader { name: name.to_string() })
            .collect(),
        metric_headers: metrics
            .iter()
            .map(|name| MetricHeader {
                name: name.to_string(),
                metric_type: None,
            })
            .collect(),
        row_count: if rows.is_empty() { None } else { Some(rows.len() as u64) },
        rows: rows
            .iter()
            .map(|(dims, mets)| Row {
                dimension_values: dims.iter().map(value).collect(),
                metric_values: mets.iter().map(value).collect(),
            })
            .collect(),
    }
}

/// Single totals row with no dimensions
pub fn totals(metrics: &[&str], values: &[&str]) -> RunReportResponse {
    report(&[], metrics, vec![(vec![], values.to_vec())])
}

pub fn rate_limited() -> Result<RunReportResponse, ApiError> {
    Err(ApiError::RateLimited {
        message: "Exhausted concurrent requests quota".to_string(),
        retry_after_secs: None,
    })
}
