use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (connect, DNS, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// 2xx response carrying `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for user- or timeout-initiated aborts.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, AppError::Cancelled | AppError::Timeout)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return AppError::Timeout;
        }
        if let Some(status) = e.status() {
            return AppError::Http {
                status: status.as_u16(),
                body: e.to_string(),
            };
        }
        if e.is_decode() {
            return AppError::Internal(format!("Failed to decode response: {e}"));
        }
        AppError::Network(e.to_string())
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
