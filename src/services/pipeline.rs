use std::time::Duration;

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::api::ga4::models::{ReportDateRange, Dimension, Metric, OrderBy};
use crate::api::ga4::{ApiError, ReportSource, RunReportRequest, RunReportResponse};
use crate::config::{is_valid_property_id, PipelineConfig, DEFAULT_PAGE_SIZE};
use crate::models::ReportRow;
use crate::utils::dates::resolve_range;
use crate::utils::{DateRange, PipelineError};

/// How often and how patiently rate-limited requests are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total calls per request, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Wait before retry number `attempt + 1`: base, 2x base, 4x base...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.checked_mul(factor).unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Issues parameterized runReport queries for one GA4 property
pub struct Ga4Pipeline<S> {
    source: S,
    property_id: String,
    date_range_days: u32,
    retry: RetryPolicy,
    page_size: u64,
    today: Option<NaiveDate>,
}

impl<S: ReportSource> Ga4Pipeline<S> {
    pub fn new(source: S, property_id: impl Into<String>, date_range_days: u32) -> Result<Self, PipelineError> {
        let property_id = property_id.into();
        if !is_valid_property_id(&property_id) {
            return Err(PipelineError::InvalidPropertyId(property_id));
        }
        if date_range_days == 0 {
            return Err(PipelineError::InvalidRange("number of days must be at least 1".to_string()));
        }

        Ok(Self {
            source,
            property_id,
            date_range_days,
            retry: RetryPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            today: None,
        })
    }

    pub fn from_config(source: S, config: &PipelineConfig) -> Result<Self, PipelineError> {
        Ok(Self::new(source, config.property_id.clone(), config.date_range_days)?
            .with_retry_policy(RetryPolicy {
                max_attempts: config.max_retries,
                base_delay: config.backoff_base,
            })
            .with_page_size(config.page_size))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Pin the calendar date used for relative ranges
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    pub fn property_id(&self) -> &str {
        &self.property_id
    }

    pub fn date_range_days(&self) -> u32 {
        self.date_range_days
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Range for a query; see [`resolve_range`] for precedence
    pub fn date_range(
        &self,
        days: Option<u32>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<DateRange, PipelineError> {
        resolve_range(self.today(), self.date_range_days, days, start_date, end_date)
    }

    pub fn build_request(metrics: &[&str], dimensions: &[&str], range: &DateRange) -> RunReportRequest {
        RunReportRequest {
            date_ranges: vec![ReportDateRange::new(range.start_date, range.end_date)],
            dimensions: dimensions
                .iter()
                .map(|name| Dimension { name: name.to_string() })
                .collect(),
            metrics: metrics
                .iter()
                .map(|name| Metric { name: name.to_string() })
                .collect(),
            order_bys: dimensions.iter().map(|name| OrderBy::dimension_asc(name)).collect(),
            limit: None,
            offset: None,
        }
    }

    /// Run a report and collect every page of rows
    pub async fn run_report(
        &self,
        metrics: &[&str],
        dimensions: &[&str],
        range: &DateRange,
    ) -> Result<RunReportResponse, PipelineError> {
        let mut request = Self::build_request(metrics, dimensions, range);
        request.limit = Some(self.page_size);

        let mut merged: Option<RunReportResponse> = None;
        let mut offset: u64 = 0;

        loop {
            request.offset = if offset > 0 { Some(offset) } else { None };
            let page = self.send_with_retry(&request).await?;

            let received = page.rows.len() as u64;
            let total = page.row_count.unwrap_or(0);
            match merged.as_mut() {
                Some(report) => report.rows.extend(page.rows),
                None => merged = Some(page),
            }

            offset += received;
            if received == 0 || offset >= total {
                break;
            }
            debug!("Fetched {}/{} rows for {}, requesting next page", offset, total, range);
        }

        Ok(merged.unwrap_or_default())
    }

    async fn send_with_retry(&self, request: &RunReportRequest) -> Result<RunReportResponse, PipelineError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt: u32 = 0;

        loop {
            let error = match self.source.run_report(&self.property_id, request).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };
            attempt += 1;

            if !error.is_rate_limited() {
                return Err(PipelineError::from_api(error));
            }
            if attempt >= max_attempts {
                return Err(PipelineError::RateLimitExceeded { attempts: attempt });
            }

            let mut wait = self.retry.delay_for(attempt - 1);
            if let ApiError::RateLimited { retry_after_secs: Some(secs), .. } = error {
                wait = wait.max(Duration::from_secs(secs));
            }
            warn!(
                "Rate limit hit. Retrying in {:?} (attempt {}/{})",
                wait, attempt, max_attempts
            );
            tokio::time::sleep(wait).await;
        }
    }
}

/// Flatten a response into rows keyed by header name.
///
/// Empty metric values read as 0.0. Values that are not numbers are logged
/// and also read as 0.0.
pub fn parse_response(response: &RunReportResponse, include_dimensions: bool) -> Vec<ReportRow> {
    response
        .rows
        .iter()
        .map(|row| {
            let mut parsed = ReportRow::default();

            if include_dimensions {
                for (header, value) in response.dimension_headers.iter().zip(&row.dimension_values) {
                    parsed.dimensions.insert(header.name.clone(), value.value.clone());
                }
            }

            for (header, value) in response.metric_headers.iter().zip(&row.metric_values) {
                let number = if value.value.is_empty() {
                    0.0
                } else {
                    value.value.parse::<f64>().unwrap_or_else(|_| {
                        warn!("Non-numeric value '{}' for metric {}", value.value, header.name);
                        0.0
                    })
                };
                parsed.metrics.insert(header.name.clone(), number);
            }

            parsed
        })
        .collect()
}
