//! Error handling and crawl statistics.
//!
//! This module provides:
//! - Error type definitions for library-level failures
//! - Categorization of failed attempts (timeout / client / unexpected)
//! - Crawl statistics tracking (attempts, retries, outcomes, in-flight peak)

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::categorize_reqwest_error;
pub use stats::CrawlStats;
pub use types::{
    AttemptError, ConfigError, CrawlError, ErrorType, InitializationError, ProxyError,
};
