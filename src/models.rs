//! Request and response value objects.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{DEFAULT_HTTP_METHOD, FAILED_STATUS};
use crate::extract::{ExtractedContent, ExtractionType, RawResponse};

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestBody {
    /// UTF-8 text sent as-is
    Text(String),
    /// Raw bytes sent as-is
    Bytes(Vec<u8>),
    /// URL-encoded form fields
    Form(Vec<(String, String)>),
}

/// A single fetch to perform.
///
/// Built with the `with_*` methods and handed to the crawler by reference; the
/// crawler never modifies it.
///
/// ```
/// use opencrawl::{CrawlRequest, ExtractionType};
///
/// let request = CrawlRequest::new("https://example.com/search")
///     .with_param("q", "rust")
///     .with_header("Accept", "text/html")
///     .with_extraction(ExtractionType::Markdown);
/// assert_eq!(request.method, "GET");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlRequest {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub body: Option<RequestBody>,
    /// Query parameters appended to the URL
    pub params: Vec<(String, String)>,
    /// Caller data echoed unchanged on the response
    pub metadata: Map<String, Value>,
    /// Overrides the crawler's extraction strategy for this request
    pub extraction_strategy: Option<ExtractionType>,
}

impl Default for CrawlRequest {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: DEFAULT_HTTP_METHOD.to_string(),
            headers: HashMap::new(),
            cookies: HashMap::new(),
            body: None,
            params: Vec::new(),
            metadata: Map::new(),
            extraction_strategy: None,
        }
    }
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_extraction(mut self, extraction_type: ExtractionType) -> Self {
        self.extraction_strategy = Some(extraction_type);
        self
    }
}

impl From<&str> for CrawlRequest {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for CrawlRequest {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

/// Outcome of one request.
///
/// A response with `error` set never completed an HTTP exchange: its status is 0
/// and its body is empty. Non-2xx statuses are not errors at this level; they are
/// reported through `status` (and through `extracted.error` when extraction ran).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlResponse {
    /// Final URL, after redirects
    pub url: String,
    pub status: u16,
    /// Response headers, names lowercased, repeated values joined with ", "
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing)]
    pub content: Vec<u8>,
    pub text: String,
    /// Charset announced by the `Content-Type` header
    pub encoding: String,
    pub metadata: Map<String, Value>,
    pub error: Option<String>,
    pub extracted: Option<ExtractedContent>,
}

impl CrawlResponse {
    /// The sentinel response for a request whose attempts were all exhausted.
    pub fn failed(request: &CrawlRequest, error: impl Into<String>) -> Self {
        Self {
            url: request.url.clone(),
            status: FAILED_STATUS,
            headers: HashMap::new(),
            content: Vec::new(),
            text: String::new(),
            encoding: String::new(),
            metadata: request.metadata.clone(),
            error: Some(error.into()),
            extracted: None,
        }
    }

    /// True when an exchange completed with a 2xx status.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

impl From<&CrawlResponse> for RawResponse {
    fn from(response: &CrawlResponse) -> Self {
        RawResponse::new(response.url.clone(), response.text.clone(), response.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder_defaults() {
        let request = CrawlRequest::new("https://example.com");
        assert_eq!(request.method, "GET");
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
        assert!(request.extraction_strategy.is_none());
    }

    #[test]
    fn test_request_builder_chain() {
        let request = CrawlRequest::from("https://example.com/api")
            .with_method("POST")
            .with_header("X-Key", "1")
            .with_cookie("session", "abc")
            .with_body(RequestBody::Form(vec![("a".into(), "b".into())]))
            .with_param("page", "2")
            .with_metadata("id", 42)
            .with_extraction(ExtractionType::Content);
        assert_eq!(request.method, "POST");
        assert_eq!(request.headers["X-Key"], "1");
        assert_eq!(request.cookies["session"], "abc");
        assert_eq!(request.params, vec![("page".to_string(), "2".to_string())]);
        assert_eq!(request.metadata["id"], json!(42));
        assert_eq!(request.extraction_strategy, Some(ExtractionType::Content));
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: CrawlRequest =
            serde_json::from_str(r#"{"url": "https://e.com", "extractionStrategy": "html"}"#)
                .unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.extraction_strategy, Some(ExtractionType::Html));
    }

    #[test]
    fn test_failed_response_invariants() {
        let request = CrawlRequest::new("https://down.example").with_metadata("tag", "x");
        let response = CrawlResponse::failed(&request, "Client error: connection refused");
        assert_eq!(response.status, 0);
        assert!(response.content.is_empty());
        assert!(response.text.is_empty());
        assert!(!response.is_success());
        assert_eq!(response.metadata["tag"], json!("x"));
        assert!(response.extracted.is_none());
    }

    #[test]
    fn test_raw_response_view() {
        let mut response = CrawlResponse::failed(&CrawlRequest::new("https://e.com"), "x");
        response.error = None;
        response.status = 404;
        response.text = "<p>gone</p>".to_string();
        assert!(!response.is_success());
        let raw = RawResponse::from(&response);
        assert_eq!(raw, RawResponse::new("https://e.com", "<p>gone</p>", 404));
    }
}
