//! Configuration types.
//!
//! `CrawlerConfig` is the single configuration object of a crawler instance. It is
//! built once (programmatically, or from JSON using the camelCase option names) and
//! treated as read-only afterwards.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::config::constants::{
    DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_MAX_REDIRECTS, DEFAULT_MAX_RETRIES,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_DELAY_SECS, DEFAULT_USER_AGENT,
};
use crate::error_handling::ConfigError;
use crate::extract::{ExtractionConfig, ExtractionType};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    #[default]
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Crawler configuration.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```
/// use opencrawl::CrawlerConfig;
///
/// let config = CrawlerConfig::from_json_str(
///     r#"{"maxConcurrentRequests": 4, "extractionStrategy": "markdown"}"#,
/// ).unwrap();
/// assert_eq!(config.max_concurrent_requests, 4);
/// assert_eq!(config.max_retries, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlerConfig {
    /// Maximum number of simultaneous in-flight HTTP exchanges
    pub max_concurrent_requests: usize,

    /// Timeout of a single attempt, in seconds
    pub request_timeout_seconds: f64,

    /// Number of attempts per request (a value of 0 still performs one attempt)
    pub max_retries: u32,

    /// Base retry delay in seconds; attempt `k` waits `retry_delay * 2^k` before the next one
    pub retry_delay_seconds: f64,

    /// Default headers sent with every request (request headers win on collision)
    pub headers: HashMap<String, String>,

    /// Default cookies sent with every request (request cookies win on collision)
    pub cookies: HashMap<String, String>,

    /// Whether redirects are followed
    pub follow_redirects: bool,

    /// Whether TLS certificates are verified
    #[serde(rename = "verifySSL", alias = "verifySsl")]
    pub verify_ssl: bool,

    /// Maximum redirect hops when `follow_redirects` is set
    pub max_redirects: usize,

    /// User-Agent used unless `headers` already carries one
    pub user_agent: String,

    /// Proxy source: a path to a proxy file, or a comma-separated list of proxy URLs
    pub proxy_source: Option<String>,

    /// Extraction strategy applied to every response unless a request overrides it
    pub extraction_strategy: Option<ExtractionType>,

    /// Options shared by all extractors
    pub extraction_config: ExtractionConfig,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_seconds: DEFAULT_RETRY_DELAY_SECS,
            headers: HashMap::new(),
            cookies: HashMap::new(),
            follow_redirects: true,
            verify_ssl: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy_source: None,
            extraction_strategy: None,
            extraction_config: ExtractionConfig::default(),
        }
    }
}

impl CrawlerConfig {
    /// Parses a JSON document and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and any error reported by
    /// [`CrawlerConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Checks the invariants the crawler relies on.
    ///
    /// # Errors
    ///
    /// - `ConfigError::ZeroConcurrency` if `max_concurrent_requests` is 0
    /// - `ConfigError::InvalidTimeout` if the timeout is not a positive finite number
    /// - `ConfigError::InvalidRetryDelay` if the retry delay is negative or not finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if !self.request_timeout_seconds.is_finite() || self.request_timeout_seconds <= 0.0 {
            return Err(ConfigError::InvalidTimeout(self.request_timeout_seconds));
        }
        if !self.retry_delay_seconds.is_finite() || self.retry_delay_seconds < 0.0 {
            return Err(ConfigError::InvalidRetryDelay(self.retry_delay_seconds));
        }
        Ok(())
    }

    /// Per-attempt timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.request_timeout_seconds).unwrap_or(Duration::MAX)
    }

    /// Base retry delay.
    pub fn retry_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.retry_delay_seconds).unwrap_or(Duration::ZERO)
    }

    /// Number of attempts actually performed per request.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = CrawlerConfig::default();
        assert_eq!(config.max_concurrent_requests, 10);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert!(config.follow_redirects);
        assert!(config.verify_ssl);
        assert_eq!(config.max_redirects, 10);
        assert!(config.proxy_source.is_none());
        assert!(config.extraction_strategy.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_uses_camel_case_names() {
        let config = CrawlerConfig::from_json_str(
            r#"{
                "maxConcurrentRequests": 3,
                "requestTimeoutSeconds": 5,
                "maxRetries": 0,
                "retryDelaySeconds": 0.25,
                "headers": {"X-Test": "1"},
                "followRedirects": false,
                "verifySSL": false,
                "proxySource": "http://a:1",
                "extractionStrategy": "content",
                "extractionConfig": {"minTextLength": 3}
            }"#,
        )
        .unwrap();

        assert_eq!(config.max_concurrent_requests, 3);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.attempts(), 1);
        assert_eq!(config.retry_delay(), Duration::from_millis(250));
        assert_eq!(config.headers.get("X-Test").map(String::as_str), Some("1"));
        assert!(!config.follow_redirects);
        assert!(!config.verify_ssl);
        assert_eq!(config.proxy_source.as_deref(), Some("http://a:1"));
        assert_eq!(config.extraction_strategy, Some(ExtractionType::Content));
        assert_eq!(config.extraction_config.min_text_length, 3);
        // Unspecified extraction options keep their defaults
        assert!(config.extraction_config.remove_scripts);
    }

    #[test]
    fn test_from_json_rejects_zero_concurrency() {
        let err = CrawlerConfig::from_json_str(r#"{"maxConcurrentRequests": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroConcurrency));
    }

    #[test]
    fn test_from_json_rejects_malformed_document() {
        let err = CrawlerConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_rejects_negative_retry_delay() {
        let config = CrawlerConfig {
            retry_delay_seconds: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRetryDelay(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_timeout() {
        let config = CrawlerConfig {
            request_timeout_seconds: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn test_from_file_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{"maxRetries": 5}"#).unwrap();
        let config = CrawlerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn test_from_file_missing_path_has_context() {
        let err = CrawlerConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
    }
}
