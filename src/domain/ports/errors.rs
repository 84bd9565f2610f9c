use thiserror::Error;

/// Failures reported by an upstream completion gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Upstream is throttling requests (HTTP 429)
    #[error("Upstream rate limit exceeded")]
    RateLimited,

    /// Upstream account credits or budget are depleted (HTTP 402)
    #[error("Upstream quota exhausted")]
    QuotaExhausted,

    /// Any other non-success status
    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS or body transfer failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Success status but the envelope could not be read
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Client misconfiguration (missing key, bad header value)
    #[error("Gateway configuration error: {0}")]
    Configuration(String),
}

impl GatewayError {
    /// Map an upstream HTTP status and body to an error
    ///
    /// - 429: rate limited
    /// - 402: quota exhausted
    /// - Other: status with body kept for logs
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => Self::RateLimited,
            402 => Self::QuotaExhausted,
            _ => Self::Status { status, body },
        }
    }

    /// Returns true if the caller may reasonably retry later
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited | Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::QuotaExhausted | Self::InvalidResponse(_) | Self::Configuration(_) => false,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_429() {
        let error = GatewayError::from_status(429, "slow down".to_string());
        assert!(matches!(error, GatewayError::RateLimited));
    }

    #[test]
    fn test_from_status_402() {
        let error = GatewayError::from_status(402, "payment required".to_string());
        assert!(matches!(error, GatewayError::QuotaExhausted));
    }

    #[test]
    fn test_from_status_other_keeps_body() {
        let error = GatewayError::from_status(503, "overloaded".to_string());
        match error {
            GatewayError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("Expected Status error, got {other:?}"),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(GatewayError::RateLimited.is_transient());
        assert!(GatewayError::Transport("reset".to_string()).is_transient());
        assert!(GatewayError::from_status(500, String::new()).is_transient());
        assert!(!GatewayError::from_status(400, String::new()).is_transient());
        assert!(!GatewayError::QuotaExhausted.is_transient());
    }
}
