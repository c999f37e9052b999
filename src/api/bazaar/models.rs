use serde::Deserialize;
use thiserror::Error;

/// Error body the API sends with non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// 429 body; `retry_after` is in milliseconds when present
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitResponse {
    pub retry_after: Option<u64>,
}

/// Comprehensive error type for API operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// 400 Bad Request
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// 401 Unauthorized
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 403 Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// 404 Not Found
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 429 Too Many Requests
    #[error("Rate Limited. Retry after {retry_after_ms} ms")]
    RateLimited { retry_after_ms: u64 },
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other HTTP errors
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Deserialization error
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}

/// Pull a human-readable message out of an error body
///
/// Prefers `message`, then `error`, then the raw body text.
pub fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        if let Some(msg) = parsed.message.or(parsed.error) {
            return msg;
        }
    }
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message": "Product not found"}"#), "Product not found");
        assert_eq!(error_message(r#"{"error": "forbidden access"}"#), "forbidden access");
        assert_eq!(error_message("  plain text\n"), "plain text");
        assert_eq!(error_message(r#"{"status": 500}"#), r#"{"status": 500}"#);
    }
}
