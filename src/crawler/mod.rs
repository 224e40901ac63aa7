//! Concurrent fetch engine.
//!
//! A [`Crawler`] owns its configuration, proxy pool, extractor registry and
//! statistics for its whole life. The HTTP session (clients and concurrency
//! semaphore) only exists between [`Crawler::setup`] and [`Crawler::cleanup`];
//! [`Crawler::scoped`] ties that window to a guard value.
//!
//! Each request is tried up to `max_retries` times. Every attempt picks a proxy,
//! waits for a concurrency slot, performs the exchange and releases the slot
//! before any backoff sleep, so a retrying request never blocks others.

mod attempt;

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::join_all;
use futures::stream::{FuturesUnordered, Stream};
use log::{debug, info, warn};
use tokio::sync::Semaphore;
use tokio_retry::Retry;

pub use attempt::backoff_schedule;

use crate::config::CrawlerConfig;
use crate::error_handling::{AttemptError, CrawlError, CrawlStats};
use crate::extract::{ExtractorRegistry, RawResponse};
use crate::initialization::{init_client, init_semaphore};
use crate::models::{CrawlRequest, CrawlResponse};
use crate::proxy::{Proxy, ProxyPool};
use attempt::{build_request, Exchange};

/// Clients and concurrency slots shared by every fetch of one session.
#[derive(Debug)]
struct Session {
    direct: reqwest::Client,
    proxied: HashMap<String, reqwest::Client>,
    semaphore: Arc<Semaphore>,
}

impl Session {
    fn client_for(&self, proxy: &Proxy) -> &reqwest::Client {
        self.proxied.get(&proxy.url).unwrap_or(&self.direct)
    }
}

/// The fetch engine.
///
/// ```no_run
/// use opencrawl::{CrawlRequest, Crawler, CrawlerConfig, ExtractionType};
///
/// # async fn run() -> Result<(), opencrawl::CrawlError> {
/// let crawler = Crawler::new(CrawlerConfig {
///     extraction_strategy: Some(ExtractionType::Markdown),
///     ..Default::default()
/// })?;
/// let session = crawler.scoped()?;
/// let responses = session
///     .fetch_all(&[CrawlRequest::new("https://example.com")])
///     .await?;
/// println!("{}", responses[0].status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Crawler {
    config: CrawlerConfig,
    proxy_pool: ProxyPool,
    registry: ExtractorRegistry,
    stats: CrawlStats,
    session: RwLock<Option<Arc<Session>>>,
}

impl Crawler {
    /// Validates the configuration and loads the proxy pool.
    ///
    /// No network activity happens here; call [`Crawler::setup`] or
    /// [`Crawler::scoped`] before fetching.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Config` for an invalid configuration and
    /// `CrawlError::Proxy` if the proxy file cannot be read.
    pub fn new(config: CrawlerConfig) -> Result<Self, CrawlError> {
        config.validate()?;
        let proxy_pool = match config.proxy_source.as_deref() {
            Some(source) => ProxyPool::from_source(source)?,
            None => ProxyPool::default(),
        };
        Self::with_proxy_pool(config, proxy_pool)
    }

    /// Like [`Crawler::new`], with an already built proxy pool.
    ///
    /// `proxy_source` is ignored.
    pub fn with_proxy_pool(config: CrawlerConfig, proxy_pool: ProxyPool) -> Result<Self, CrawlError> {
        config.validate()?;
        let registry = ExtractorRegistry::new(&config.extraction_config);
        Ok(Self {
            config,
            proxy_pool,
            registry,
            stats: CrawlStats::new(),
            session: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn proxy_pool(&self) -> &ProxyPool {
        &self.proxy_pool
    }

    /// Counters accumulated over the crawler's whole life.
    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Opens the HTTP session, replacing any existing one.
    ///
    /// Builds one client per distinct proxy plus a direct client, and the shared
    /// concurrency semaphore.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Initialization` if a client cannot be built.
    pub fn setup(&self) -> Result<(), CrawlError> {
        let direct = init_client(&self.config, &Proxy::none())?;
        let mut proxied = HashMap::new();
        for proxy in self.proxy_pool.proxies() {
            if !proxied.contains_key(&proxy.url) {
                proxied.insert(proxy.url.clone(), init_client(&self.config, proxy)?);
            }
        }

        let session = Session {
            direct,
            proxied,
            semaphore: init_semaphore(self.config.max_concurrent_requests),
        };
        info!(
            "Crawler session ready: {} concurrent requests, {} proxies",
            self.config.max_concurrent_requests,
            session.proxied.len()
        );
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(session));
        Ok(())
    }

    /// Closes the HTTP session. Calling it without a session is a no-op.
    ///
    /// Fetches already running keep their clients until they finish.
    pub fn cleanup(&self) {
        let closed = self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if closed.is_some() {
            info!("Crawler session closed");
        }
    }

    /// Whether a session is currently open.
    pub fn is_ready(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Opens a session that is closed when the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// Same as [`Crawler::setup`].
    pub fn scoped(&self) -> Result<CrawlerGuard<'_>, CrawlError> {
        self.setup()?;
        Ok(CrawlerGuard { crawler: self })
    }

    /// Fetches one request, retrying transport failures.
    ///
    /// Failures are reported inside the response (`status == 0`, `error` set).
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::NotInitialized` when no session is open.
    pub async fn fetch(&self, request: &CrawlRequest) -> Result<CrawlResponse, CrawlError> {
        let session = self.session()?;
        Ok(self.fetch_with(&session, request).await)
    }

    /// Fetches every request concurrently; responses come back in request order.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::NotInitialized` when no session is open.
    pub async fn fetch_all(&self, requests: &[CrawlRequest]) -> Result<Vec<CrawlResponse>, CrawlError> {
        let session = self.session()?;
        Ok(join_all(
            requests
                .iter()
                .map(|request| self.fetch_with(&session, request)),
        )
        .await)
    }

    /// Fetches every request concurrently, yielding responses as they complete.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::NotInitialized` when no session is open.
    pub fn fetch_unordered<'a>(
        &'a self,
        requests: &'a [CrawlRequest],
    ) -> Result<impl Stream<Item = CrawlResponse> + 'a, CrawlError> {
        let session = self.session()?;
        Ok(requests
            .iter()
            .map(|request| {
                let session = Arc::clone(&session);
                async move { self.fetch_with(&session, request).await }
            })
            .collect::<FuturesUnordered<_>>())
    }

    fn session(&self) -> Result<Arc<Session>, CrawlError> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CrawlError::NotInitialized)
    }

    async fn fetch_with(&self, session: &Session, request: &CrawlRequest) -> CrawlResponse {
        let attempt_counter = AtomicU32::new(0);
        let attempt_counter = &attempt_counter;

        let outcome = Retry::spawn(backoff_schedule(&self.config), move || {
            let attempt_index = attempt_counter.fetch_add(1, Ordering::SeqCst);
            self.attempt(session, request, attempt_index)
        })
        .await;

        match outcome {
            Ok(mut response) => {
                self.stats.record_success();
                let strategy = request
                    .extraction_strategy
                    .or(self.config.extraction_strategy);
                if let Some(extractor) = self.registry.get(strategy) {
                    response.extracted = Some(extractor.extract(&RawResponse::from(&response)));
                }
                response
            }
            Err(last_error) => {
                self.stats.record_failure();
                warn!(
                    "Giving up on {} after {} attempts: {}",
                    request.url,
                    attempt_counter.load(Ordering::SeqCst),
                    last_error
                );
                CrawlResponse::failed(request, last_error.message)
            }
        }
    }

    async fn attempt(
        &self,
        session: &Session,
        request: &CrawlRequest,
        attempt_index: u32,
    ) -> Result<CrawlResponse, AttemptError> {
        self.stats.record_attempt(attempt_index);
        let proxy = self.proxy_pool.rotate_proxy();
        debug!(
            "Attempt {}/{} for {} {} via {}",
            attempt_index + 1,
            self.config.attempts(),
            request.method,
            request.url,
            proxy
        );

        let result = async {
            let builder = build_request(session.client_for(&proxy), request, &self.config.cookies)?;
            let _permit = session
                .semaphore
                .acquire()
                .await
                .map_err(AttemptError::unexpected)?;
            let _in_flight = self.stats.begin_exchange();
            Exchange::perform(builder).await
        }
        .await;

        match result {
            Ok(exchange) => Ok(exchange.into_response(request)),
            Err(error) => {
                self.stats.increment_error(error.kind);
                warn!(
                    "Attempt {}/{} for {} failed: {}",
                    attempt_index + 1,
                    self.config.attempts(),
                    request.url,
                    error
                );
                Err(error)
            }
        }
    }
}

/// An open crawler session, closed on drop.
///
/// Dereferences to the [`Crawler`], so every fetch method is available on it.
#[derive(Debug)]
pub struct CrawlerGuard<'a> {
    crawler: &'a Crawler,
}

impl Deref for CrawlerGuard<'_> {
    type Target = Crawler;

    fn deref(&self) -> &Crawler {
        self.crawler
    }
}

impl Drop for CrawlerGuard<'_> {
    fn drop(&mut self) {
        self.crawler.cleanup();
    }
}

#[cfg(test)]
mod tests;
