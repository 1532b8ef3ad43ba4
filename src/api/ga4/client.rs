use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use super::models::{ApiError, ErrorEnvelope, RunReportRequest, RunReportResponse};
use super::ReportSource;
use crate::utils::ratelimit::rate_limit_ga4_api;
use tracing::{debug, warn};

/// GA4 Data API client issuing runReport calls with a bearer access token
pub struct Ga4Client {
    http_client: HttpClient,
    access_token: String,
    base_url: String,
}

impl Ga4Client {
    pub const DEFAULT_BASE_URL: &'static str = "https://analyticsdata.googleapis.com/v1beta";

    /// Create a new GA4 Data API client
    pub fn new(access_token: String) -> Self {
        Self::with_base_url(access_token, Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a new client with custom base URL (for proxies and testing)
    pub fn with_base_url(access_token: String, base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            access_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn report_url(&self, property_id: &str) -> String {
        format!("{}/properties/{}:runReport", self.base_url, property_id)
    }

    /// Create default headers with authorization
    fn create_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.access_token))
            .map_err(|e| ApiError::RequestError(format!("Failed to create auth header: {}", e)))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    /// Seconds from a `Retry-After` header, when the server sent one
    fn extract_retry_after(response: &reqwest::Response) -> Option<u64> {
        response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    }

    async fn handle_error_response(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let retry_after = Self::extract_retry_after(&response);
        let body_text = response.text().await.unwrap_or_default();
        classify_error(status, &body_text, retry_after)
    }
}

/// Map an error status and body to an `ApiError`.
///
/// The GA4 `error.status` string wins over the HTTP code when both are present,
/// so a proxied RESOURCE_EXHAUSTED still counts as a rate limit.
pub fn classify_error(status_code: u16, body_text: &str, retry_after_secs: Option<u64>) -> ApiError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body_text).ok();
    let message = envelope
        .as_ref()
        .and_then(|e| e.error.message.clone())
        .unwrap_or_else(|| body_text.to_string());
    let google_status = envelope.as_ref().and_then(|e| e.error.status.clone());

    match google_status.as_deref() {
        Some("RESOURCE_EXHAUSTED") => {
            return ApiError::RateLimited { message, retry_after_secs };
        }
        Some("PERMISSION_DENIED") => return ApiError::PermissionDenied(message),
        Some("INVALID_ARGUMENT") => return ApiError::InvalidArgument(message),
        Some("UNAUTHENTICATED") => return ApiError::Unauthorized(message),
        _ => {}
    }

    match status_code {
        400 => ApiError::InvalidArgument(message),
        401 => ApiError::Unauthorized(message),
        403 => ApiError::PermissionDenied(message),
        404 => ApiError::NotFound(message),
        429 => {
            warn!("Rate limited, retry after {:?} s", retry_after_secs);
            ApiError::RateLimited { message, retry_after_secs }
        }
        500..=599 => {
            warn!("Server error {}: {}", status_code, message);
            ApiError::ServerError(status_code, message)
        }
        _ => ApiError::HttpError(status_code, message),
    }
}

impl ReportSource for Ga4Client {
    /// POST /properties/{property_id}:runReport
    async fn run_report(
        &self,
        property_id: &str,
        request: &RunReportRequest,
    ) -> Result<RunReportResponse, ApiError> {
        rate_limit_ga4_api().await;

        let url = self.report_url(property_id);
        let headers = self.create_headers()?;
        debug!(
            "runReport {} metrics={} dimensions={} offset={:?}",
            property_id,
            request.metrics.len(),
            request.dimensions.len(),
            request.offset
        );

        let response = self.http_client
            .post(&url)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        response
            .json::<RunReportResponse>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_url_trims_trailing_slash() {
        let client = Ga4Client::with_base_url("t".to_string(), "http://localhost:8080/v1beta/".to_string());
        assert_eq!(
            client.report_url("123456789"),
            "http://localhost:8080/v1beta/properties/123456789:runReport"
        );
    }

    #[test]
    fn test_classify_google_status_over_http_code() {
        let body = r#"{"error": {"code": 429, "message": "Exhausted property tokens", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = classify_error(429, body, Some(3));
        assert_eq!(
            err,
            ApiError::RateLimited {
                message: "Exhausted property tokens".to_string(),
                retry_after_secs: Some(3),
            }
        );

        let body = r#"{"error": {"code": 403, "message": "User does not have sufficient permissions", "status": "PERMISSION_DENIED"}}"#;
        assert!(matches!(classify_error(403, body, None), ApiError::PermissionDenied(m) if m.contains("sufficient")));
    }

    #[test]
    fn test_classify_plain_bodies_by_status() {
        assert!(matches!(classify_error(400, "bad field", None), ApiError::InvalidArgument(m) if m == "bad field"));
        assert!(matches!(classify_error(401, "", None), ApiError::Unauthorized(_)));
        assert!(matches!(classify_error(404, "", None), ApiError::NotFound(_)));
        assert!(classify_error(429, "slow down", None).is_rate_limited());
        assert!(matches!(classify_error(503, "unavailable", None), ApiError::ServerError(503, _)));
        assert!(matches!(classify_error(418, "teapot", None), ApiError::HttpError(418, _)));
    }
}
