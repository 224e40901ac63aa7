//! Shared resource initialization.
//!
//! This module provides functions to build the resources a crawler session owns:
//! - Logger (plain or JSON)
//! - HTTP clients (one per proxy, plus the direct client)
//! - The concurrency semaphore

mod client;
mod logger;

use std::sync::Arc;

use tokio::sync::Semaphore;

// Re-export public API
pub use client::{default_headers, init_client};
pub use logger::{init_logger, init_logger_with};

/// Initializes a semaphore for controlling concurrency.
///
/// Every in-flight HTTP exchange holds one permit, so `count` is the maximum
/// number of simultaneous exchanges across all tasks sharing the semaphore.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count))
}
