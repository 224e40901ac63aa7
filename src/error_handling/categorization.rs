//! Error categorization.
//!
//! Maps transport failures onto `ErrorType` so that every failed attempt carries a
//! stable category and a prefixed message.

use super::types::{AttemptError, ErrorType};

/// Categorizes a `reqwest::Error` into an `ErrorType`.
///
/// Timeouts are checked first: reqwest reports a timed-out body read as both
/// `is_body()` and `is_timeout()`, and it must count as a timeout.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorType {
    if error.is_timeout() {
        ErrorType::Timeout
    } else if error.is_builder() {
        ErrorType::Builder
    } else if error.is_redirect() {
        ErrorType::Redirect
    } else if error.is_connect() {
        ErrorType::Connect
    } else if error.is_request() {
        ErrorType::Request
    } else if error.is_body() {
        ErrorType::Body
    } else if error.is_decode() {
        ErrorType::Decode
    } else {
        ErrorType::OtherHttp
    }
}

impl From<reqwest::Error> for AttemptError {
    fn from(error: reqwest::Error) -> Self {
        AttemptError::new(categorize_reqwest_error(&error), error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_error_is_client_error() {
        // An unparsable URL fails while building the request
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        assert_eq!(
            categorize_reqwest_error(&err),
            ErrorType::Builder
        );
        let attempt: AttemptError = err.into();
        assert!(attempt.message.starts_with("Client error: "));
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_error() {
        // Port 1 on loopback is never listening in test environments
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();
        let kind = categorize_reqwest_error(&err);
        assert!(
            matches!(
                kind,
                ErrorType::Connect | ErrorType::Request
            ),
            "unexpected category {kind:?}"
        );
        assert_eq!(kind.message_prefix(), "Client error");
    }
}
