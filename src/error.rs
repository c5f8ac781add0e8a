use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Remote service error{}: {message}", status_suffix(.status))]
    RemoteService {
        status: Option<u16>,
        message: String,
    },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Missing credential: {0}")]
    MissingCredential(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GenerationError {
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        GenerationError::RemoteService {
            status,
            message: message.into(),
        }
    }

    /// HTTP status of a failed remote call, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GenerationError::RemoteService { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = GenerationError::remote(Some(429), "Too Many Requests");
        assert_eq!(
            err.to_string(),
            "Remote service error (HTTP 429): Too Many Requests"
        );
        assert!(err.is_rate_limited());

        let err = GenerationError::remote(None, "connection refused");
        assert_eq!(err.to_string(), "Remote service error: connection refused");
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_only_remote_errors_carry_status() {
        assert_eq!(GenerationError::remote(Some(500), "boom").status(), Some(500));
        assert_eq!(
            GenerationError::MalformedResponse("no choices".into()).status(),
            None
        );
    }
}
