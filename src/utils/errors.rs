use thiserror::Error;

use crate::api::ga4::ApiError;

/// Failure of a pipeline operation, worded for the person running it
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error(
        "Rate limit exceeded after {attempts} attempts. \
         Please reduce query frequency or request quota increase."
    )]
    RateLimitExceeded { attempts: u32 },

    #[error(
        "Permission denied. Please verify:\n\
         1. Service account has Viewer access to GA4 property\n\
         2. Property ID is correct\n\
         3. Service account email is added at Property level (not Account level)\n\
         ({0})"
    )]
    PermissionDenied(String),

    #[error("Invalid request parameters: {0}\nPlease check metric and dimension names are correct.")]
    InvalidArgument(String),

    #[error("Authentication failed. Please verify the access token is valid and not expired: {0}")]
    Unauthorized(String),

    #[error("Unexpected error during API call: {0}")]
    Unexpected(ApiError),

    #[error(
        "Property ID must be a numeric string (e.g., '123456789'), got '{0}'. \
         Do not use Measurement ID (G-XXXXXXXXXX)."
    )]
    InvalidPropertyId(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),
}

impl PipelineError {
    /// Translate a non-retryable API error into its user-facing form
    pub fn from_api(error: ApiError) -> Self {
        match error {
            ApiError::PermissionDenied(msg) => PipelineError::PermissionDenied(msg),
            ApiError::InvalidArgument(msg) => PipelineError::InvalidArgument(msg),
            ApiError::Unauthorized(msg) => PipelineError::Unauthorized(msg),
            other => PipelineError::Unexpected(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_carries_guidance() {
        let err = PipelineError::from_api(ApiError::PermissionDenied("no access".to_string()));
        let text = err.to_string();
        assert!(text.starts_with("Permission denied."));
        assert!(text.contains("Property level"));
        assert!(text.contains("no access"));
    }

    #[test]
    fn test_unknown_errors_are_unexpected() {
        let err = PipelineError::from_api(ApiError::ServerError(503, "backend".to_string()));
        assert_eq!(
            err.to_string(),
            "Unexpected error during API call: Server Error (503): backend"
        );
    }

    #[test]
    fn test_rate_limit_message() {
        let err = PipelineError::RateLimitExceeded { attempts: 3 };
        assert!(err.to_string().starts_with("Rate limit exceeded after 3 attempts."));
    }
}
