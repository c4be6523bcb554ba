//! Identity-bearing token model.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// What a token may be used for. Purposes never authenticate each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    /// Embedded in reminder links. Not IP bound.
    Reminder,
    /// Backs an interactive cookie session. IP bound.
    Session,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Reminder => "reminder",
            TokenPurpose::Session => "session",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenPurpose {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reminder" => Ok(TokenPurpose::Reminder),
            "session" => Ok(TokenPurpose::Session),
            other => Err(DomainError::Internal(format!(
                "unknown token purpose: {other}"
            ))),
        }
    }
}

/// A stored token. Only the SHA-256 of the raw token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_hash: String,
    pub player_id: i64,
    pub purpose: TokenPurpose,
    pub ip: Option<IpAddr>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Token {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Returned once at issuance. The raw token is never stored or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub player_id: i64,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"<redacted>")
            .field("player_id", &self.player_id)
            .field("purpose", &self.purpose)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_purpose_round_trip() {
        for purpose in [TokenPurpose::Reminder, TokenPurpose::Session] {
            assert_eq!(purpose.as_str().parse::<TokenPurpose>().unwrap(), purpose);
        }
        assert!("login".parse::<TokenPurpose>().is_err());
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let token = Token {
            token_hash: "abc".to_string(),
            player_id: 1,
            purpose: TokenPurpose::Reminder,
            ip: None,
            expires_at: now + Duration::days(7),
            created_at: now,
        };
        assert!(!token.is_expired(now));
        assert!(token.is_expired(now + Duration::days(7)));
    }

    #[test]
    fn test_issued_token_debug_redacts() {
        let issued = IssuedToken {
            token: "super-secret-token".to_string(),
            player_id: 1,
            purpose: TokenPurpose::Session,
            expires_at: Utc::now(),
        };
        let rendered = format!("{issued:?}");
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains("redacted"));
    }
}
