use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input data: {0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Statuses worth another attempt: rate limiting and the transient 5xx
/// family. Any other 4xx is terminal.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

impl Error {
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Provider { status, .. } => is_retryable_status(*status),
            Error::Network(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            _ => false,
        }
    }

    pub fn provider(status: reqwest::StatusCode, message: impl Into<String>) -> Self {
        Error::Provider {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        for status in [429, 500, 502, 503, 504] {
            assert!(is_retryable_status(status), "{status} should retry");
        }
        for status in [400, 401, 403, 404, 422] {
            assert!(!is_retryable_status(status), "{status} should not retry");
        }
    }

    #[test]
    fn provider_error_classification() {
        let rate_limited = Error::Provider {
            status: 429,
            message: "slow down".into(),
        };
        assert!(rate_limited.is_retryable());

        let bad_request = Error::Provider {
            status: 400,
            message: "invalid payload".into(),
        };
        assert!(!bad_request.is_retryable());

        assert!(!Error::Config("missing key".into()).is_retryable());
        assert!(!Error::Parse("garbage".into()).is_retryable());
    }
}
