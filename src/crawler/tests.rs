// Crawler lifecycle tests. Network behavior is covered by tests/crawler_fetch.rs.

use super::*;
use crate::error_handling::ConfigError;

fn crawler() -> Crawler {
    Crawler::new(CrawlerConfig::default()).unwrap()
}

#[tokio::test]
async fn test_fetch_before_setup_is_rejected() {
    let crawler = crawler();
    let request = CrawlRequest::new("http://127.0.0.1:1/");

    assert!(matches!(
        crawler.fetch(&request).await,
        Err(CrawlError::NotInitialized)
    ));
    assert!(matches!(
        crawler.fetch_all(std::slice::from_ref(&request)).await,
        Err(CrawlError::NotInitialized)
    ));
    assert!(crawler.fetch_unordered(&[]).is_err());
    // Nothing was attempted
    assert_eq!(crawler.stats().attempts(), 0);
}

#[test]
fn test_not_initialized_message() {
    assert_eq!(
        CrawlError::NotInitialized.to_string(),
        "engine not initialized: call setup() or scoped() before fetching"
    );
}

#[test]
fn test_setup_and_cleanup_are_repeatable() {
    let crawler = crawler();
    assert!(!crawler.is_ready());
    crawler.setup().unwrap();
    crawler.setup().unwrap();
    assert!(crawler.is_ready());
    crawler.cleanup();
    crawler.cleanup();
    assert!(!crawler.is_ready());
}

#[test]
fn test_guard_closes_session_on_drop() {
    let crawler = crawler();
    {
        let guard = crawler.scoped().unwrap();
        assert!(guard.is_ready());
    }
    assert!(!crawler.is_ready());
}

#[test]
fn test_guard_closes_session_on_early_return() {
    fn fails_midway(crawler: &Crawler) -> Result<(), CrawlError> {
        let _guard = crawler.scoped()?;
        Err(CrawlError::NotInitialized)
    }

    let crawler = crawler();
    assert!(fails_midway(&crawler).is_err());
    assert!(!crawler.is_ready());
}

#[test]
fn test_guard_closes_session_on_panic() {
    let crawler = crawler();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = crawler.scoped().unwrap();
        panic!("caller failure");
    }));
    assert!(result.is_err());
    assert!(!crawler.is_ready());
}

#[test]
fn test_invalid_config_rejected() {
    let result = Crawler::new(CrawlerConfig {
        max_concurrent_requests: 0,
        ..Default::default()
    });
    assert!(matches!(
        result,
        Err(CrawlError::Config(ConfigError::ZeroConcurrency))
    ));
}

#[test]
fn test_proxy_source_loaded_at_construction() {
    let crawler = Crawler::new(CrawlerConfig {
        proxy_source: Some("http://127.0.0.1:3128,http://127.0.0.1:3129".to_string()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(crawler.proxy_pool().len(), 2);

    // One client per proxy
    crawler.setup().unwrap();
    let session = crawler.session().unwrap();
    assert_eq!(session.proxied.len(), 2);
    assert!(std::ptr::eq(
        session.client_for(&Proxy::none()),
        &session.direct
    ));
}

#[test]
fn test_malformed_proxy_fails_setup() {
    let crawler = Crawler::with_proxy_pool(
        CrawlerConfig::default(),
        ProxyPool::new(vec![Proxy::new("not a proxy url")]),
    )
    .unwrap();
    assert!(matches!(
        crawler.setup(),
        Err(CrawlError::Initialization(_))
    ));
    assert!(!crawler.is_ready());
}
