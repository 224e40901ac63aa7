//! opencrawl: concurrent page fetching and content extraction
//!
//! This library fetches batches of web pages with bounded parallelism, automatic
//! retries with exponential backoff and optional proxy rotation, then turns the
//! HTML into cleaned markup, plain text or Markdown.
//!
//! # Example
//!
//! ```no_run
//! use opencrawl::{CrawlRequest, Crawler, CrawlerConfig, ExtractionType};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let crawler = Crawler::new(CrawlerConfig {
//!     max_concurrent_requests: 5,
//!     extraction_strategy: Some(ExtractionType::Content),
//!     ..Default::default()
//! })?;
//!
//! let session = crawler.scoped()?;
//! let responses = session
//!     .fetch_all(&[
//!         CrawlRequest::new("https://example.com"),
//!         CrawlRequest::new("https://example.org").with_extraction(ExtractionType::Markdown),
//!     ])
//!     .await?;
//!
//! for response in &responses {
//!     match (&response.error, &response.extracted) {
//!         (Some(error), _) => println!("{} failed: {}", response.url, error),
//!         (None, Some(extracted)) => println!("{}: {}", response.url, extracted.content),
//!         (None, None) => println!("{}: HTTP {}", response.url, response.status),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Fetching requires a Tokio runtime. Extraction is synchronous and can be used
//! on its own through [`extract::ExtractorRegistry`].

pub mod config;
mod crawler;
mod error_handling;
pub mod extract;
pub mod generation;
pub mod initialization;
mod models;
mod proxy;

// Re-export public API
pub use config::{CrawlerConfig, LogFormat, LogLevel};
pub use crawler::{backoff_schedule, Crawler, CrawlerGuard};
pub use error_handling::{
    categorize_reqwest_error, AttemptError, ConfigError, CrawlError, CrawlStats, ErrorType,
    InitializationError, ProxyError,
};
pub use extract::{
    ExtractedContent, ExtractionConfig, ExtractionType, Extractor, ExtractorRegistry, RawResponse,
};
pub use generation::{Spider, SpiderOutput, TextGenerator};
pub use models::{CrawlRequest, CrawlResponse, RequestBody};
pub use proxy::{Proxy, ProxyCheck, ProxyPool};
