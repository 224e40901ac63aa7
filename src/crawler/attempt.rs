//! A single HTTP attempt and the pieces it is assembled from.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::{Client, Method, RequestBuilder, Response};

use crate::config::CrawlerConfig;
use crate::error_handling::AttemptError;
use crate::models::{CrawlRequest, CrawlResponse, RequestBody};

const DEFAULT_ENCODING: &str = "utf-8";

/// Delays slept between attempts: `retry_delay * 2^k` before attempt `k + 1`.
///
/// The schedule has one entry fewer than the number of attempts, so nothing is
/// slept after the final attempt.
///
/// ```
/// use std::time::Duration;
/// use opencrawl::{backoff_schedule, CrawlerConfig};
///
/// let config = CrawlerConfig { max_retries: 4, retry_delay_seconds: 0.5, ..Default::default() };
/// assert_eq!(
///     backoff_schedule(&config).collect::<Vec<_>>(),
///     vec![Duration::from_millis(500), Duration::from_secs(1), Duration::from_secs(2)],
/// );
/// ```
pub fn backoff_schedule(config: &CrawlerConfig) -> impl Iterator<Item = Duration> {
    let base = config.retry_delay();
    (0..config.attempts() - 1).map(move |k| {
        if base.is_zero() {
            return Duration::ZERO;
        }
        let factor = 2f64.powi(i32::try_from(k).unwrap_or(i32::MAX));
        Duration::try_from_secs_f64(base.as_secs_f64() * factor).unwrap_or(Duration::MAX)
    })
}

/// Default cookies overlaid with the request's own; the request wins on collision.
pub(crate) fn merged_cookies(
    defaults: &HashMap<String, String>,
    overrides: &HashMap<String, String>,
) -> BTreeMap<String, String> {
    defaults
        .iter()
        .chain(overrides)
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Renders cookies as a single `Cookie` header value, or `None` when there are none.
pub(crate) fn cookie_header(cookies: &BTreeMap<String, String>) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    Some(
        cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Request-level headers as an HTTP header map.
///
/// The client's default headers are only applied to names missing from this map,
/// so request headers override them (names compare case-insensitively).
pub(crate) fn request_headers(
    request: &CrawlRequest,
    default_cookies: &HashMap<String, String>,
) -> Result<HeaderMap, AttemptError> {
    let mut headers = HeaderMap::with_capacity(request.headers.len() + 1);
    for (name, value) in &request.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AttemptError::unexpected(format!("invalid header name {name:?}: {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| AttemptError::unexpected(format!("invalid value for header {name}: {e}")))?;
        headers.insert(header_name, header_value);
    }

    if let Some(cookies) = cookie_header(&merged_cookies(default_cookies, &request.cookies)) {
        let value = HeaderValue::from_str(&cookies)
            .map_err(|e| AttemptError::unexpected(format!("invalid cookie value: {e}")))?;
        headers.insert(COOKIE, value);
    }

    Ok(headers)
}

/// Assembles the outgoing request on the given client.
pub(crate) fn build_request(
    client: &Client,
    request: &CrawlRequest,
    default_cookies: &HashMap<String, String>,
) -> Result<RequestBuilder, AttemptError> {
    let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
        .map_err(|e| AttemptError::unexpected(format!("invalid method {:?}: {e}", request.method)))?;

    let mut builder = client
        .request(method, request.url.as_str())
        .headers(request_headers(request, default_cookies)?);
    if !request.params.is_empty() {
        builder = builder.query(&request.params);
    }
    builder = match &request.body {
        Some(RequestBody::Text(text)) => builder.body(text.clone()),
        Some(RequestBody::Bytes(bytes)) => builder.body(bytes.clone()),
        Some(RequestBody::Form(fields)) => builder.form(fields),
        None => builder,
    };
    Ok(builder)
}

/// Everything read off the wire during one exchange.
#[derive(Debug)]
pub(crate) struct Exchange {
    url: String,
    status: u16,
    headers: HashMap<String, String>,
    encoding: String,
    content: Vec<u8>,
}

impl Exchange {
    /// Sends the request and reads the full body.
    pub(crate) async fn perform(builder: RequestBuilder) -> Result<Self, AttemptError> {
        let response = builder.send().await?;
        let url = response.url().to_string();
        let status = response.status().as_u16();
        let headers = flatten_headers(&response);
        let encoding = charset(response.headers().get(CONTENT_TYPE))
            .unwrap_or_else(|| DEFAULT_ENCODING.to_string());
        let content = response.bytes().await?.to_vec();

        Ok(Self {
            url,
            status,
            headers,
            encoding,
            content,
        })
    }

    /// Decodes the body with the declared charset; unknown labels fall back to UTF-8.
    pub(crate) fn into_response(self, request: &CrawlRequest) -> CrawlResponse {
        let text = decode_body(&self.content, &self.encoding);
        CrawlResponse {
            url: self.url,
            status: self.status,
            headers: self.headers,
            content: self.content,
            text,
            encoding: self.encoding,
            metadata: request.metadata.clone(),
            error: None,
            extracted: None,
        }
    }
}

fn decode_body(content: &[u8], label: &str) -> String {
    let encoding = Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(content);
    text.into_owned()
}

fn flatten_headers(response: &Response) -> HashMap<String, String> {
    let mut headers: HashMap<String, String> = HashMap::new();
    for (name, value) in response.headers() {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    headers
}

/// Charset parameter of a `Content-Type` header value, lowercased.
pub(crate) fn charset(content_type: Option<&HeaderValue>) -> Option<String> {
    let content_type = content_type?.to_str().ok()?;
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"').to_ascii_lowercase())
        .filter(|value| !value.is_empty())
}
