use thiserror::Error;

/// Failure talking to the StrataMind backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("{0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

impl BackendError {
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        BackendError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}

/// Outcome of an upload or ask that did not produce a backend answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("input is empty")]
    EmptyInput,
    #[error("backend is offline")]
    Offline,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type Result<T, E = ChatError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = BackendError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
    }

    #[test]
    fn test_chat_error_is_transparent_over_backend() {
        let err = ChatError::from(BackendError::Transport("connection refused".to_string()));
        assert_eq!(err.to_string(), "connection refused");
    }
}
