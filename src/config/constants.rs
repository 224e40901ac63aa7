//! Configuration constants.
//!
//! Defaults for every crawler and extraction option, plus a few operational
//! parameters that are not user-configurable.

use std::time::Duration;

/// Maximum concurrent in-flight HTTP exchanges (semaphore limit)
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;
/// Per-attempt timeout in seconds (covers sending the request and reading the body)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: f64 = 30.0;
/// Number of attempts per request (initial attempt included)
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Base delay before the first retry, doubled on every subsequent attempt
pub const DEFAULT_RETRY_DELAY_SECS: f64 = 1.0;
/// Maximum number of redirect hops to follow when redirects are enabled
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Default User-Agent string for HTTP requests.
///
/// Only applied when the configured default headers carry no `User-Agent`.
pub const DEFAULT_USER_AGENT: &str = "OpenCrawl/0.1.0";

/// HTTP method used when a request does not name one
pub const DEFAULT_HTTP_METHOD: &str = "GET";

// Extraction
/// Minimum text length for a block of text to survive extraction filtering
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 10;

// Proxy validation
/// Echo endpoint used by the optional proxy probe
pub const PROXY_CHECK_URL: &str = "http://httpbin.org/ip";
/// Timeout for a single proxy probe
pub const PROXY_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Status value carried by a response when no HTTP exchange completed
pub const FAILED_STATUS: u16 = 0;
