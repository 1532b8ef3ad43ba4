use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// GA4 expects and echoes calendar dates in this form inside `dateRanges`
pub const REQUEST_DATE_FORMAT: &str = "%Y-%m-%d";

/// A single `dateRanges` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportDateRange {
    pub start_date: String,
    pub end_date: String,
}

impl ReportDateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: start.format(REQUEST_DATE_FORMAT).to_string(),
            end_date: end.format(REQUEST_DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metric {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionOrderBy {
    pub dimension_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<DimensionOrderBy>,
    #[serde(default)]
    pub desc: bool,
}

impl OrderBy {
    pub fn dimension_asc(name: &str) -> Self {
        Self {
            dimension: Some(DimensionOrderBy {
                dimension_name: name.to_string(),
            }),
            desc: false,
        }
    }
}

/// Request body for POST properties/{id}:runReport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunReportRequest {
    pub date_ranges: Vec<ReportDateRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_bys: Vec<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DimensionHeader {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MetricHeader {
    pub name: String,
    #[serde(rename = "type", default)]
    pub metric_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Value {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub dimension_values: Vec<Value>,
    #[serde(default)]
    pub metric_values: Vec<Value>,
}

/// Response from runReport. GA4 omits `rows` and `rowCount` for empty reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunReportResponse {
    #[serde(default)]
    pub dimension_headers: Vec<DimensionHeader>,
    #[serde(default)]
    pub metric_headers: Vec<MetricHeader>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub row_count: Option<u64>,
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Error from a single runReport exchange
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// 400 / INVALID_ARGUMENT
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// 401
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 403 / PERMISSION_DENIED
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 429 / RESOURCE_EXHAUSTED
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}

impl ApiError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_camel_case_and_skips_empty() {
        let request = RunReportRequest {
            date_ranges: vec![ReportDateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            )],
            metrics: vec![Metric { name: "totalRevenue".to_string() }],
            ..Default::default()
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["dateRanges"][0]["startDate"], "2024-01-01");
        assert_eq!(json["dateRanges"][0]["endDate"], "2024-01-31");
        assert_eq!(json["metrics"][0]["name"], "totalRevenue");
        assert!(json.get("dimensions").is_none());
        assert!(json.get("limit").is_none());
    }

    #[test]
    fn test_empty_report_response_parses() {
        let body = r#"{
            "dimensionHeaders": [{"name": "date"}],
            "metricHeaders": [{"name": "totalUsers", "type": "TYPE_INTEGER"}],
            "kind": "analyticsData#runReport"
        }"#;
        let response: RunReportResponse = serde_json::from_str(body).unwrap();
        assert!(response.rows.is_empty());
        assert_eq!(response.row_count, None);
        assert_eq!(response.metric_headers[0].metric_type.as_deref(), Some("TYPE_INTEGER"));
    }

    #[test]
    fn test_report_rows_parse() {
        let body = r#"{
            "dimensionHeaders": [{"name": "date"}],
            "metricHeaders": [{"name": "totalUsers"}],
            "rows": [{"dimensionValues": [{"value": "20240105"}], "metricValues": [{"value": "42"}]}],
            "rowCount": 1
        }"#;
        let response: RunReportResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.rows[0].dimension_values[0].value, "20240105");
        assert_eq!(response.rows[0].metric_values[0].value, "42");
        assert_eq!(response.row_count, Some(1));
    }
}
