//! Proxy pool loading, validation and rotation.
//!
//! A pool is built once from a proxy source and never changes afterwards. The
//! source is either a path to a text file with one proxy URL per line (blank lines
//! and `#` comments skipped) or an inline comma-separated list.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use futures::future::join_all;
use log::{info, warn};
use rand::seq::IndexedRandom;

use crate::config::{PROXY_CHECK_TIMEOUT, PROXY_CHECK_URL};
use crate::error_handling::ProxyError;

/// A proxy endpoint; an empty URL means "connect directly".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Proxy {
    pub url: String,
}

impl Proxy {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The "no proxy" sentinel returned by an empty pool.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.url.is_empty()
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("direct")
        } else {
            f.write_str(&self.url)
        }
    }
}

/// Outcome of probing one proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCheck {
    pub proxy: Proxy,
    /// HTTP status returned through the proxy, if the probe got that far
    pub status: Option<u16>,
    /// Failure description when the probe did not return a 2xx status
    pub error: Option<String>,
}

impl ProxyCheck {
    pub fn is_working(&self) -> bool {
        self.error.is_none()
    }
}

fn looks_like_path(source: &str) -> bool {
    source.contains(['/', std::path::MAIN_SEPARATOR]) && !source.contains("://")
}

/// Immutable set of proxies with uniform random rotation.
#[derive(Debug, Clone, Default)]
pub struct ProxyPool {
    proxies: Vec<Proxy>,
}

impl ProxyPool {
    pub fn new(proxies: Vec<Proxy>) -> Self {
        Self { proxies }
    }

    /// Loads a pool from a file path or an inline comma-separated list.
    ///
    /// A source naming an existing file, or shaped like a path (a separator but no
    /// `://` scheme), is read line by line; anything else is treated as an inline
    /// list. An empty or whitespace-only source gives an empty pool.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::Read` if the named file is missing or cannot be read.
    pub fn from_source(source: &str) -> Result<Self, ProxyError> {
        let source = source.trim();
        if source.is_empty() {
            return Ok(Self::default());
        }

        let path = Path::new(source);
        let proxies: Vec<Proxy> = if path.is_file() || looks_like_path(source) {
            let contents = std::fs::read_to_string(path).map_err(|e| ProxyError::Read {
                path: source.to_string(),
                source: e,
            })?;
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(Proxy::new)
                .collect()
        } else {
            source
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(Proxy::new)
                .collect()
        };

        info!("Loaded {} proxies", proxies.len());
        Ok(Self { proxies })
    }

    /// Picks a proxy uniformly at random, or [`Proxy::none`] when the pool is empty.
    pub fn rotate_proxy(&self) -> Proxy {
        self.proxies
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(Proxy::none)
    }

    pub fn proxies(&self) -> &[Proxy] {
        &self.proxies
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Probes every proxy against the default check URL.
    ///
    /// Diagnostic only: results are logged and returned, the pool is never modified.
    pub async fn validate(&self) -> Vec<ProxyCheck> {
        self.validate_against(PROXY_CHECK_URL, PROXY_CHECK_TIMEOUT)
            .await
    }

    /// Probes every proxy concurrently with a GET to `check_url`.
    pub async fn validate_against(&self, check_url: &str, timeout: Duration) -> Vec<ProxyCheck> {
        let checks = join_all(
            self.proxies
                .iter()
                .map(|proxy| check_proxy(proxy, check_url, timeout)),
        )
        .await;

        let working = checks.iter().filter(|check| check.is_working()).count();
        info!(
            "Proxy validation finished: {}/{} working",
            working,
            checks.len()
        );
        checks
    }
}

async fn check_proxy(proxy: &Proxy, check_url: &str, timeout: Duration) -> ProxyCheck {
    let outcome = async {
        let client = reqwest::Client::builder()
            .proxy(reqwest::Proxy::all(&proxy.url)?)
            .timeout(timeout)
            .build()?;
        client.get(check_url).send().await
    }
    .await;

    match outcome {
        Ok(response) if response.status().is_success() => {
            info!("Proxy {} working", proxy);
            ProxyCheck {
                proxy: proxy.clone(),
                status: Some(response.status().as_u16()),
                error: None,
            }
        }
        Ok(response) => {
            let status = response.status();
            warn!("Proxy {} failed with status {}", proxy, status);
            ProxyCheck {
                proxy: proxy.clone(),
                status: Some(status.as_u16()),
                error: Some(format!("HTTP {}", status.as_u16())),
            }
        }
        Err(e) => {
            warn!("Proxy {} failed: {}", proxy, e);
            ProxyCheck {
                proxy: proxy.clone(),
                status: None,
                error: Some(e.to_string()),
            }
        }
    }
}
