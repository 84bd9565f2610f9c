//! Caller-facing error taxonomy for generation requests.

use thiserror::Error;

use super::ports::GatewayError;

/// Failure classes surfaced to callers.
///
/// Each class has one short user-facing message and one HTTP status. Upstream
/// bodies and transport details stay in the logs.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Required context fields missing; rejected before any upstream call.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Upstream throttling; the caller may retry shortly.
    #[error("Rate limited by upstream")]
    RateLimited,

    /// Upstream credits depleted; retrying will not help.
    #[error("Upstream quota exhausted")]
    QuotaExhausted,

    /// Any other upstream or transport failure.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream succeeded but the content did not decode into the expected shape.
    #[error("Upstream response unparseable: {0}")]
    ResponseUnparseable(String),
}

pub type GenerationResult<T> = Result<T, GenerationError>;

impl GenerationError {
    /// HTTP status returned to the caller.
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::MalformedRequest(_) => 400,
            Self::RateLimited => 429,
            Self::QuotaExhausted => 402,
            Self::UpstreamUnavailable(_) | Self::ResponseUnparseable(_) => 500,
        }
    }

    /// Short message safe to show a student.
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedRequest(detail) => detail.clone(),
            Self::RateLimited => {
                "Too many requests right now. Please try again in a moment.".to_string()
            }
            Self::QuotaExhausted => {
                "AI credits are exhausted. Please contact the administrator to add credits."
                    .to_string()
            }
            Self::UpstreamUnavailable(_) => {
                "The AI service is unavailable. Please try again or contact support.".to_string()
            }
            Self::ResponseUnparseable(_) => {
                "The AI response could not be understood. Please try again.".to_string()
            }
        }
    }

    /// Whether a deterministic local fallback may stand in for the upstream.
    pub const fn allows_fallback(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::QuotaExhausted | Self::UpstreamUnavailable(_)
        )
    }
}

impl From<GatewayError> for GenerationError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::RateLimited => Self::RateLimited,
            GatewayError::QuotaExhausted => Self::QuotaExhausted,
            GatewayError::InvalidResponse(detail) => Self::ResponseUnparseable(detail),
            other @ (GatewayError::Status { .. }
            | GatewayError::Transport(_)
            | GatewayError::Configuration(_)) => Self::UpstreamUnavailable(other.to_string()),
        }
    }
}
