use thiserror::Error;

/// Domain-level errors for market data fetching
///
/// Infrastructure implementations convert their specific errors to this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {code}: {message}")]
    Api { code: i32, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Data source closed")]
    Closed,
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Errors raised by a remote bot backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed backend response: {0}")]
    Parse(String),

    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("No trading account available")]
    NoAccount,
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;
