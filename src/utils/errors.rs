use thiserror::Error;

use crate::api::ApiError;
use crate::models::{ObservationError, Role};
use crate::utils::encryption::CryptoError;

/// Error returned by services and commands
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Observation(#[from] ObservationError),
    #[error("You are not logged in. Use: `login <email> <access-token> [name]`")]
    NotLoggedIn,
    #[error("Access denied: this command requires the {required} role")]
    AccessDenied { required: Role },
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Chart error: {0}")]
    Chart(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// One-line message for the terminal
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(ApiError::RateLimited { retry_after_ms }) => format!(
                "⚠️ Rate Limited: the market API is throttling requests. Try again in {}s.",
                (retry_after_ms + 999) / 1000
            ),
            AppError::Api(ApiError::RequestError(_)) => {
                "⚠️ Network Error: could not reach the market API. Please try again.".to_string()
            }
            AppError::Api(ApiError::Unauthorized(_)) => {
                "🔒 Your session was rejected by the API. Log in again with a fresh access token.".to_string()
            }
            AppError::Api(ApiError::Forbidden(msg)) => format!("🔒 Forbidden: {}", msg),
            AppError::Api(ApiError::NotFound(msg)) if !msg.is_empty() => format!("❌ {}", msg),
            AppError::Api(ApiError::NotFound(_)) => "❌ Not found".to_string(),
            other => {
                let text = other.to_string();
                if text.is_empty() {
                    "❌ An error occurred while executing the command.".to_string()
                } else {
                    format!("❌ {}", text)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let limited = AppError::from(ApiError::RateLimited { retry_after_ms: 1500 });
        assert!(limited.user_message().contains("Try again in 2s"));

        let denied = AppError::AccessDenied { required: Role::Admin };
        assert_eq!(
            denied.user_message(),
            "❌ Access denied: this command requires the admin role"
        );

        let missing = AppError::from(ApiError::NotFound("Product not found".to_string()));
        assert_eq!(missing.user_message(), "❌ Product not found");

        let empty = AppError::InvalidInput(String::new());
        assert_eq!(
            empty.user_message(),
            "❌ An error occurred while executing the command."
        );
    }
}
