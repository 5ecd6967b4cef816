use thiserror::Error;

/// Unified error type for the webproxy library.
#[derive(Debug, Error)]
pub enum WebProxyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("opr not defined")]
    MissingCommand,

    #[error("Invalid opr given: {0}")]
    InvalidCommand(String),

    #[error("Proxy error: {0}")]
    Proxy(String),
}

impl WebProxyError {
    /// Whether this error stems from bad caller input rather than a fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WebProxyError::MissingCommand | WebProxyError::InvalidCommand(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WebProxyError>;
