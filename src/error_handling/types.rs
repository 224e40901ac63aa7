//! Error type definitions.
//!
//! Library-level failures (`CrawlError`, `ConfigError`, `ProxyError`,
//! `InitializationError`) are the only errors a caller ever has to handle.
//! Per-request problems never surface here: they are folded into the response.

use log::SetLoggerError;
use strum_macros::EnumIter;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing an HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    /// A configured default header could not be turned into a valid HTTP header.
    #[error("Invalid default header {name:?}: {reason}")]
    InvalidHeaderError { name: String, reason: String },
}

/// Error types for configuration problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration document is not valid JSON or has wrong field types.
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// `max_concurrent_requests` must be at least 1.
    #[error("max_concurrent_requests must be greater than 0")]
    ZeroConcurrency,

    /// The request timeout must be a positive, finite number of seconds.
    #[error("request_timeout_seconds must be positive and finite, got {0}")]
    InvalidTimeout(f64),

    /// The retry delay must be a non-negative, finite number of seconds.
    #[error("retry_delay_seconds must be non-negative and finite, got {0}")]
    InvalidRetryDelay(f64),
}

/// Error types for proxy pool construction.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The proxy source named a file that could not be read.
    #[error("Failed to read proxy file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by the crawler itself.
///
/// Only precondition and construction problems are reported this way; failed
/// requests come back as responses carrying an error string.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// `fetch`/`fetch_all` was called before `setup()`.
    #[error("engine not initialized: call setup() or scoped() before fetching")]
    NotInitialized,

    /// The crawler configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The proxy pool could not be loaded.
    #[error(transparent)]
    Proxy(#[from] ProxyError),

    /// The HTTP session could not be created.
    #[error(transparent)]
    Initialization(#[from] InitializationError),
}

/// Categories of failed attempts.
///
/// Each category maps onto one of the three message prefixes surfaced in
/// `CrawlResponse::error`: `Timeout error`, `Client error` or `Unexpected error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum ErrorType {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Redirect,
    Builder,
    OtherHttp,
    /// Raised outside the HTTP client: invalid method or header values, closed semaphore
    Unexpected,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Timeout => "timeout",
            ErrorType::Connect => "connect",
            ErrorType::Request => "request",
            ErrorType::Body => "body",
            ErrorType::Decode => "decode",
            ErrorType::Redirect => "redirect",
            ErrorType::Builder => "builder",
            ErrorType::OtherHttp => "other_http",
            ErrorType::Unexpected => "unexpected",
        }
    }

    /// Prefix used in `CrawlResponse::error` for this category.
    pub fn message_prefix(&self) -> &'static str {
        match self {
            ErrorType::Timeout => "Timeout error",
            ErrorType::Unexpected => "Unexpected error",
            _ => "Client error",
        }
    }
}

/// A single failed attempt: its category and the categorized message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptError {
    pub kind: ErrorType,
    pub message: String,
}

impl AttemptError {
    pub fn new(kind: ErrorType, detail: impl std::fmt::Display) -> Self {
        Self {
            kind,
            message: format!("{}: {}", kind.message_prefix(), detail),
        }
    }

    pub fn unexpected(detail: impl std::fmt::Display) -> Self {
        Self::new(ErrorType::Unexpected, detail)
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AttemptError {}
