// Shared test helpers for crawler construction and mock pages.

use opencrawl::{Crawler, CrawlerConfig};

/// A config with short timeouts and delays so failure paths stay fast.
#[allow(dead_code)] // Not every test file uses every helper
pub fn fast_config() -> CrawlerConfig {
    CrawlerConfig {
        max_concurrent_requests: 4,
        request_timeout_seconds: 2.0,
        max_retries: 3,
        retry_delay_seconds: 0.01,
        ..Default::default()
    }
}

/// Builds a crawler with an open session.
///
/// The session stays open for the crawler's lifetime; tests that exercise
/// `scoped()` build their crawler directly.
#[allow(dead_code)]
pub fn ready_crawler(config: CrawlerConfig) -> Crawler {
    let crawler = Crawler::new(config).expect("Failed to create crawler");
    crawler.setup().expect("Failed to open crawler session");
    crawler
}

/// A small article page with a script, a nav bar and some Markdown-worthy content.
#[allow(dead_code)]
pub const ARTICLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Release notes</title>
  <meta name="description" content="What changed in this release">
  <script>trackVisit();</script>
</head>
<body>
  <nav><a href="/home">Home navigation link</a></nav>
  <article>
    <h1>Version two is out</h1>
    <p>This release focuses on reliability improvements.</p>
    <p>Tiny</p>
    <ul><li>Faster retries for flaky hosts</li></ul>
    <a href="/changelog">Full changelog here</a>
  </article>
</body>
</html>"#;
