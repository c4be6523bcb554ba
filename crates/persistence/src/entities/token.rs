//! Token entity (database row mapping).

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use domain::models::{Token, TokenPurpose};
use domain::DomainError;
use sqlx::FromRow;

/// Database row mapping for the tokens table.
#[derive(Debug, Clone, FromRow)]
pub struct TokenEntity {
    pub token_hash: String,
    pub player_id: i64,
    pub purpose: String,
    pub ip: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TokenEntity> for Token {
    type Error = DomainError;

    fn try_from(entity: TokenEntity) -> Result<Self, Self::Error> {
        let purpose: TokenPurpose = entity.purpose.parse()?;
        let ip = entity
            .ip
            .as_deref()
            .map(str::parse::<IpAddr>)
            .transpose()
            .map_err(|e| DomainError::Internal(format!("corrupt token ip: {e}")))?;
        Ok(Self {
            token_hash: entity.token_hash,
            player_id: entity.player_id,
            purpose,
            ip,
            expires_at: entity.expires_at,
            created_at: entity.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(purpose: &str, ip: Option<&str>) -> TokenEntity {
        TokenEntity {
            token_hash: "hash".to_string(),
            player_id: 5,
            purpose: purpose.to_string(),
            ip: ip.map(str::to_string),
            expires_at: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_token_with_ip() {
        let token = Token::try_from(entity("session", Some("10.0.0.1"))).unwrap();
        assert_eq!(token.purpose, TokenPurpose::Session);
        assert_eq!(token.ip, Some("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_invalid_rows_are_internal() {
        assert!(Token::try_from(entity("login", None)).is_err());
        let err = Token::try_from(entity("reminder", Some("not-an-ip"))).unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
