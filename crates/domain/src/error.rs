//! Domain error taxonomy shared by the stores and services.

use thiserror::Error;

/// Errors surfaced by the RSVP store, token service and identity resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token expired")]
    Expired,

    #[error("IP address mismatch")]
    IpMismatch,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// True for the token failures that should end an interactive session.
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            DomainError::Expired | DomainError::IpMismatch | DomainError::NotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            DomainError::InvalidArgument("game id".into()).to_string(),
            "Invalid argument: game id"
        );
        assert_eq!(DomainError::Expired.to_string(), "Token expired");
        assert_eq!(DomainError::IpMismatch.to_string(), "IP address mismatch");
    }

    #[test]
    fn test_ends_session() {
        assert!(DomainError::Expired.ends_session());
        assert!(DomainError::IpMismatch.ends_session());
        assert!(!DomainError::Internal("db".into()).ends_session());
    }
}
