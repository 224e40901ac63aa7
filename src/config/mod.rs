//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, timeouts, sentinel values)
//! - The crawler configuration type and its validation
//! - Logging option types

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{CrawlerConfig, LogFormat, LogLevel};
