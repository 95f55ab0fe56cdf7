//! The error taxonomy reported by the remote data gateway.
//!
//! Every fetch failure funnels into one of three cases so the reload
//! coordinator can decide, at a single classification point, whether the
//! failure is user-visible. Cancellation is expected and stays silent.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The request was superseded or torn down before it finished.
    #[error("operation was cancelled")]
    Cancelled,

    /// Transport failure, non-2xx status, or an undecodable response body.
    #[error("network error: {0}")]
    Network(String),

    /// A structured error reported by the remote API itself.
    #[error("{message}")]
    Api { message: String },
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_cancellation_is_cancelled() {
        assert!(FetchError::Cancelled.is_cancelled());
        assert!(!FetchError::Network("connection refused".to_string()).is_cancelled());
        assert!(
            !FetchError::Api {
                message: "invalid_app_id".to_string()
            }
            .is_cancelled()
        );
    }
}
