//! Pipeline configuration
//!
//! Values are layered: `config.json` (explicit path or the working directory),
//! then `GA4_*` environment variables (after `.env` is loaded), then whatever
//! the caller overrides before calling [`PipelineConfig::from_layers`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::api::ga4::Ga4Client;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_DATE_RANGE_DAYS: u32 = 30;
/// GA4 returns at most this many rows per page unless asked otherwise
pub const DEFAULT_PAGE_SIZE: u64 = 10_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

pub const ENV_PROPERTY_ID: &str = "GA4_PROPERTY_ID";
pub const ENV_ACCESS_TOKEN: &str = "GA4_ACCESS_TOKEN";
pub const ENV_DATE_RANGE_DAYS: &str = "GA4_DATE_RANGE_DAYS";
pub const ENV_API_BASE_URL: &str = "GA4_API_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Property ID is required. Set GA4_PROPERTY_ID or provide --property-id")]
    MissingPropertyId,
    #[error(
        "Property ID must be a numeric string (e.g., '123456789'), got '{0}'. \
         Do not use Measurement ID (G-XXXXXXXXXX)."
    )]
    InvalidPropertyId(String),
    #[error("Access token is required. Set GA4_ACCESS_TOKEN or add access_token to the config file")]
    MissingAccessToken,
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: String, value: String },
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One configuration layer; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub property_id: Option<String>,
    pub access_token: Option<String>,
    pub date_range_days: Option<u32>,
    pub base_url: Option<String>,
    pub page_size: Option<u64>,
    pub max_retries: Option<u32>,
    pub backoff_base_ms: Option<u64>,
}

impl FileConfig {
    /// Read `path`, or `./config.json` when no path is given and it exists.
    ///
    /// A missing default file is not an error; a missing explicit one is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        debug!("Loaded config file {}", path.display());
        Self::parse(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Override keys present in the environment
    pub fn apply_env<F>(mut self, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env(ENV_PROPERTY_ID) {
            self.property_id = Some(v);
        }
        if let Some(v) = env(ENV_ACCESS_TOKEN) {
            self.access_token = Some(v);
        }
        if let Some(v) = env(ENV_DATE_RANGE_DAYS) {
            self.date_range_days = Some(parse_positive(ENV_DATE_RANGE_DAYS, &v)?);
        }
        if let Some(v) = env(ENV_API_BASE_URL) {
            self.base_url = Some(v);
        }
        Ok(self)
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// A GA4 property id is purely numeric; `G-...` measurement ids are rejected
pub fn is_valid_property_id(property_id: &str) -> bool {
    !property_id.is_empty() && property_id.chars().all(|c| c.is_ascii_digit())
}

/// Validated configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub property_id: String,
    pub access_token: String,
    pub date_range_days: u32,
    pub base_url: String,
    pub page_size: u64,
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl PipelineConfig {
    pub fn from_layers(layers: FileConfig) -> Result<Self, ConfigError> {
        let property_id = layers
            .property_id
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingPropertyId)?;
        if !is_valid_property_id(&property_id) {
            return Err(ConfigError::InvalidPropertyId(property_id));
        }

        let access_token = layers
            .access_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingAccessToken)?;

        let date_range_days = layers.date_range_days.unwrap_or(DEFAULT_DATE_RANGE_DAYS);
        if date_range_days == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "date_range_days".to_string(),
                value: "0".to_string(),
            });
        }

        let page_size = layers.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "page_size".to_string(),
                value: "0".to_string(),
            });
        }

        let max_retries = layers.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
        if max_retries == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "max_retries".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            property_id,
            access_token,
            date_range_days,
            base_url: layers
                .base_url
                .unwrap_or_else(|| Ga4Client::DEFAULT_BASE_URL.to_string()),
            page_size,
            max_retries,
            backoff_base: Duration::from_millis(layers.backoff_base_ms.unwrap_or(DEFAULT_BACKOFF_BASE_MS)),
        })
    }
}

/// Config file plus process environment, before caller overrides
pub fn load_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    FileConfig::load(path)?.apply_env(|key| std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_fill_in() {
        let layers = FileConfig {
            property_id: Some("123456789".to_string()),
            access_token: Some("ya29.token".to_string()),
            ..Default::default()
        };
        let config = PipelineConfig::from_layers(layers).unwrap();
        assert_eq!(config.date_range_days, 30);
        assert_eq!(config.page_size, 10_000);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.backoff_base, Duration::from_secs(1));
        assert_eq!(config.base_url, Ga4Client::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileConfig::parse(r#"{"property_id": "111", "date_range_days": 7}"#).unwrap();
        let layers = file
            .apply_env(env_from(&[
                ("GA4_PROPERTY_ID", "222"),
                ("GA4_ACCESS_TOKEN", "tok"),
                ("GA4_DATE_RANGE_DAYS", "60"),
            ]))
            .unwrap();
        let config = PipelineConfig::from_layers(layers).unwrap();
        assert_eq!(config.property_id, "222");
        assert_eq!(config.date_range_days, 60);
    }

    #[test]
    fn test_bad_env_number_rejected() {
        let err = FileConfig::default()
            .apply_env(env_from(&[("GA4_DATE_RANGE_DAYS", "thirty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn test_measurement_id_rejected() {
        let layers = FileConfig {
            property_id: Some("G-ABC123XYZ".to_string()),
            access_token: Some("tok".to_string()),
            ..Default::default()
        };
        let err = PipelineConfig::from_layers(layers).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPropertyId(_)));
        assert!(err.to_string().contains("Measurement ID"));
    }

    #[test]
    fn test_missing_values_rejected() {
        assert!(matches!(
            PipelineConfig::from_layers(FileConfig::default()),
            Err(ConfigError::MissingPropertyId)
        ));
        let layers = FileConfig {
            property_id: Some("123".to_string()),
            access_token: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            PipelineConfig::from_layers(layers),
            Err(ConfigError::MissingAccessToken)
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = FileConfig::load(Some(Path::new("/nonexistent/ga4/config.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
