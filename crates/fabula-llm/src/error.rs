use http::StatusCode;
use thiserror::Error;

/// Errors that can occur while generating text
#[derive(Debug, Error)]
pub enum LlmError {
    /// Could not reach the provider, or it failed on its side
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The provider did not answer within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Provider rejected the request because of rate limiting
    #[error("rate limited by provider")]
    RateLimited,

    /// Provider answered successfully but without any text
    #[error("provider returned an empty response")]
    EmptyResponse,

    /// Provider rejected the request as malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider rejected the credentials
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LlmError {
    /// Whether repeating the same request may succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Upstream(_) | Self::Timeout | Self::RateLimited | Self::EmptyResponse
        )
    }

    /// Classify a non-success provider status
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::InvalidRequest(body)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(body),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            _ => Self::Upstream(format!("provider returned {status}: {body}")),
        }
    }

    /// Classify a transport-level failure
    pub fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Upstream(error.to_string())
        }
    }
}
