//! Crawl statistics tracking.
//!
//! Thread-safe counters shared by every in-flight fetch of one crawler.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ErrorType;

/// Thread-safe crawl statistics tracker.
///
/// Tracks attempts, outcomes, failed-attempt categories and the number of HTTP
/// exchanges in flight (with its peak), using atomic counters so it can be read
/// while a batch is running. All error types are initialized to zero on creation.
pub struct CrawlStats {
    attempts: AtomicUsize,
    retries: AtomicUsize,
    successes: AtomicUsize,
    failures: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    errors: HashMap<ErrorType, AtomicUsize>,
}

impl CrawlStats {
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for error in ErrorType::iter() {
            errors.insert(error, AtomicUsize::new(0));
        }

        CrawlStats {
            attempts: AtomicUsize::new(0),
            retries: AtomicUsize::new(0),
            successes: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            errors,
        }
    }

    /// Records the start of an attempt; every attempt after the first is a retry.
    pub(crate) fn record_attempt(&self, attempt_index: u32) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if attempt_index > 0 {
            self.retries.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a request that ended with a completed HTTP exchange.
    pub(crate) fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a request whose attempts were all exhausted.
    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment an error counter.
    pub(crate) fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map. \
                 This indicates a bug in CrawlStats initialization.",
                error
            );
        }
    }

    /// Marks one HTTP exchange as started and returns a guard that ends it on drop.
    pub(crate) fn begin_exchange(&self) -> InFlightGuard<'_> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        InFlightGuard { stats: self }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn retries(&self) -> usize {
        self.retries.load(Ordering::SeqCst)
    }

    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    /// HTTP exchanges currently holding a concurrency slot.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous HTTP exchanges observed so far.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Get the count for an error type.
    ///
    /// Returns 0 if the error type is not in the map (should never happen if properly initialized).
    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total number of failed attempts across all categories.
    pub fn total_errors(&self) -> usize {
        self.errors.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CrawlStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlStats")
            .field("attempts", &self.attempts())
            .field("retries", &self.retries())
            .field("successes", &self.successes())
            .field("failures", &self.failures())
            .field("peak_in_flight", &self.peak_in_flight())
            .field("total_errors", &self.total_errors())
            .finish()
    }
}

/// Ends an in-flight HTTP exchange when dropped.
pub(crate) struct InFlightGuard<'a> {
    stats: &'a CrawlStats,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
