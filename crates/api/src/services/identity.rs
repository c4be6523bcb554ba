//! Identity resolution: maps an inbound credential to a player.

use std::net::IpAddr;
use std::sync::Arc;

use domain::models::{Player, TokenPurpose};
use domain::services::PlayerDirectory;
use domain::DomainError;
use tracing::debug;

use super::tokens::TokenService;

/// A credential presented by a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Token from a reminder link. Not IP bound.
    ReminderToken(String),
    /// Cookie session token plus the client address it was presented from.
    Session { token: String, ip: IpAddr },
    /// Sender number of an inbound SMS, as received.
    Phone(String),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::ReminderToken(_) => f.write_str("ReminderToken(<redacted>)"),
            Credential::Session { ip, .. } => write!(f, "Session {{ ip: {ip} }}"),
            Credential::Phone(_) => f.write_str("Phone(<redacted>)"),
        }
    }
}

#[derive(Clone)]
pub struct IdentityResolver {
    tokens: TokenService,
    players: Arc<dyn PlayerDirectory>,
}

impl IdentityResolver {
    pub fn new(tokens: TokenService, players: Arc<dyn PlayerDirectory>) -> Self {
        Self { tokens, players }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn resolve(&self, credential: &Credential) -> Result<Player, DomainError> {
        match credential {
            Credential::ReminderToken(token) => {
                self.tokens.resolve(token, TokenPurpose::Reminder).await
            }
            Credential::Session { token, ip } => self.tokens.resolve_session(token, *ip).await,
            Credential::Phone(raw) => {
                let phone = shared::phone::normalize(raw)
                    .map_err(|e| DomainError::InvalidArgument(e.to_string()))?;
                debug!(phone, "Resolving player by phone");
                self.players
                    .find_by_phone(phone)
                    .await?
                    .ok_or_else(|| DomainError::NotFound("player for phone".into()))
            }
        }
    }
}
