//! Token service: issues and verifies identity-bearing tokens.
//!
//! Raw tokens are 24 random bytes, URL-safe base64 encoded. Only their
//! SHA-256 is persisted, so a leaked table cannot be replayed as links.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use domain::models::{IssuedToken, Player, Token, TokenPurpose};
use domain::services::{PlayerDirectory, TokenStore};
use domain::DomainError;
use shared::crypto::{generate_token, sha256_hex, token_fingerprint};
use tracing::{debug, warn};

use crate::config::TokensConfig;

#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn TokenStore>,
    players: Arc<dyn PlayerDirectory>,
    reminder_ttl: Duration,
    session_ttl: Duration,
}

impl TokenService {
    pub fn new(
        store: Arc<dyn TokenStore>,
        players: Arc<dyn PlayerDirectory>,
        config: &TokensConfig,
    ) -> Self {
        Self {
            store,
            players,
            reminder_ttl: Duration::days(i64::from(config.reminder_ttl_days)),
            session_ttl: Duration::days(i64::from(config.session_ttl_days)),
        }
    }

    /// Issues a token bound to `player_id` and persists its hash.
    pub async fn issue(
        &self,
        player_id: i64,
        ttl: Duration,
        purpose: TokenPurpose,
        ip: Option<IpAddr>,
    ) -> Result<IssuedToken, DomainError> {
        let raw = generate_token();
        let now = Utc::now();
        let token = Token {
            token_hash: sha256_hex(&raw),
            player_id,
            purpose,
            ip,
            expires_at: now + ttl,
            created_at: now,
        };
        self.store.insert(&token).await?;

        debug!(
            player_id,
            purpose = %purpose,
            fingerprint = %token_fingerprint(&raw),
            "Token issued"
        );

        Ok(IssuedToken {
            token: raw,
            player_id,
            purpose,
            expires_at: token.expires_at,
        })
    }

    /// Long-lived, not IP bound. Embedded in reminder emails.
    pub async fn issue_reminder_token(&self, player_id: i64) -> Result<IssuedToken, DomainError> {
        self.issue(player_id, self.reminder_ttl, TokenPurpose::Reminder, None)
            .await
    }

    /// Entry point for the login layer: an IP-bound cookie session.
    pub async fn issue_session(
        &self,
        player_id: i64,
        ip: IpAddr,
    ) -> Result<IssuedToken, DomainError> {
        self.issue(player_id, self.session_ttl, TokenPurpose::Session, Some(ip))
            .await
    }

    pub async fn resolve(&self, token: &str, purpose: TokenPurpose) -> Result<Player, DomainError> {
        self.resolve_at(token, purpose, None, Utc::now()).await
    }

    /// Resolves a cookie session, rejecting it when presented from another IP.
    pub async fn resolve_session(&self, token: &str, ip: IpAddr) -> Result<Player, DomainError> {
        self.resolve_at(token, TokenPurpose::Session, Some(ip), Utc::now())
            .await
    }

    pub async fn resolve_at(
        &self,
        token: &str,
        purpose: TokenPurpose,
        presented_ip: Option<IpAddr>,
        now: DateTime<Utc>,
    ) -> Result<Player, DomainError> {
        let stored = self
            .store
            .find(&sha256_hex(token))
            .await?
            .filter(|t| t.purpose == purpose)
            .ok_or_else(|| DomainError::NotFound("token".into()))?;

        if stored.is_expired(now) {
            return Err(DomainError::Expired);
        }

        if let (Some(bound), Some(presented)) = (stored.ip, presented_ip) {
            if bound != presented {
                warn!(
                    player_id = stored.player_id,
                    fingerprint = %token_fingerprint(token),
                    bound_ip = %bound,
                    presented_ip = %presented,
                    "Session presented from a different IP, rejecting"
                );
                return Err(DomainError::IpMismatch);
            }
        }

        self.players
            .find_by_id(stored.player_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("player".into()))
    }

    /// Deletes the token. Used at logout.
    pub async fn revoke(&self, token: &str) -> Result<bool, DomainError> {
        self.store.delete(&sha256_hex(token)).await
    }

    pub async fn purge_expired(&self) -> Result<u64, DomainError> {
        self.store.delete_expired(Utc::now()).await
    }
}
