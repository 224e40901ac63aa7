//! HTTP client initialization.
//!
//! One client is built per proxy endpoint (plus one direct client), since reqwest
//! binds proxies at the client level. All clients share the same settings.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::ClientBuilder;

use crate::config::CrawlerConfig;
use crate::error_handling::InitializationError;
use crate::proxy::Proxy;

/// Builds an HTTP client for the given proxy.
///
/// The client is configured with:
/// - Per-attempt timeout (covers sending the request and reading the body)
/// - Idle connection pool sized to the concurrency limit
/// - Default headers from the config, including the User-Agent
/// - Redirect policy (`max_redirects` hops, or none)
/// - TLS verification flag
///
/// A [`Proxy::none`] proxy produces a client that ignores system proxy settings.
///
/// # Errors
///
/// Returns `InitializationError::InvalidHeaderError` for a default header that is
/// not valid HTTP, and `InitializationError::HttpClientError` if the proxy URL is
/// malformed or the client cannot be built.
pub fn init_client(
    config: &CrawlerConfig,
    proxy: &Proxy,
) -> Result<reqwest::Client, InitializationError> {
    let redirect_policy = if config.follow_redirects {
        Policy::limited(config.max_redirects)
    } else {
        Policy::none()
    };

    let mut builder = ClientBuilder::new()
        .timeout(config.request_timeout())
        .pool_max_idle_per_host(config.max_concurrent_requests)
        .default_headers(default_headers(config)?)
        .redirect(redirect_policy)
        .danger_accept_invalid_certs(!config.verify_ssl);

    builder = if proxy.is_none() {
        builder.no_proxy()
    } else {
        builder.proxy(reqwest::Proxy::all(&proxy.url)?)
    };

    Ok(builder.build()?)
}

/// Configured default headers, with the User-Agent added unless one is already set.
///
/// # Errors
///
/// Returns `InitializationError::InvalidHeaderError` if a name or value is not valid HTTP.
pub fn default_headers(config: &CrawlerConfig) -> Result<HeaderMap, InitializationError> {
    let mut headers = HeaderMap::with_capacity(config.headers.len() + 1);
    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            InitializationError::InvalidHeaderError {
                name: name.clone(),
                reason: e.to_string(),
            }
        })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| InitializationError::InvalidHeaderError {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        headers.insert(header_name, header_value);
    }

    if !headers.contains_key(USER_AGENT) {
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|e| {
            InitializationError::InvalidHeaderError {
                name: USER_AGENT.to_string(),
                reason: e.to_string(),
            }
        })?;
        headers.insert(USER_AGENT, user_agent);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_added_from_config() {
        let headers = default_headers(&CrawlerConfig::default()).unwrap();
        assert_eq!(headers[USER_AGENT], "OpenCrawl/0.1.0");
    }

    #[test]
    fn test_explicit_user_agent_header_wins() {
        let mut config = CrawlerConfig::default();
        config
            .headers
            .insert("user-AGENT".to_string(), "custom/2.0".to_string());
        config.headers.insert("Accept".to_string(), "text/html".to_string());
        let headers = default_headers(&config).unwrap();
        assert_eq!(headers[USER_AGENT], "custom/2.0");
        assert_eq!(headers.get_all(USER_AGENT).iter().count(), 1);
        assert_eq!(headers["accept"], "text/html");
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut config = CrawlerConfig::default();
        config
            .headers
            .insert("X-Bad".to_string(), "line\nbreak".to_string());
        let err = default_headers(&config).unwrap_err();
        assert!(matches!(
            err,
            InitializationError::InvalidHeaderError { ref name, .. } if name == "X-Bad"
        ));
    }

    #[test]
    fn test_clients_build_for_direct_and_proxy() {
        let config = CrawlerConfig {
            follow_redirects: false,
            verify_ssl: false,
            ..Default::default()
        };
        assert!(init_client(&config, &Proxy::none()).is_ok());
        assert!(init_client(&config, &Proxy::new("http://127.0.0.1:3128")).is_ok());
    }

    #[test]
    fn test_malformed_proxy_url_rejected() {
        let result = init_client(&CrawlerConfig::default(), &Proxy::new("not a proxy url"));
        assert!(matches!(result, Err(InitializationError::HttpClientError(_))));
    }
}
