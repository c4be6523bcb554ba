//! Player identity extractor for reminder links and cookie sessions.
//!
//! The `token` query parameter (reminder link) is tried first. Without it the
//! `rsvp-session` cookie is resolved as an IP-bound session.

use std::net::{IpAddr, SocketAddr};

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Query},
    http::{request::Parts, HeaderMap},
};
use domain::models::Player;
use domain::DomainError;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::cookies::extract_session_token;
use crate::services::Credential;

const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    ReminderLink,
    Session,
}

/// The player a request acts for.
#[derive(Debug, Clone)]
pub struct PlayerIdentity {
    pub player: Player,
    pub source: IdentitySource,
}

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Client address: the last `X-Forwarded-For` entry, else the peer address.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit(',').next())
        .and_then(|ip| ip.trim().parse().ok())
        .or_else(|| peer.map(|addr| addr.ip()))
}

/// Token failures read as 401 here, whatever the lookup reported.
fn reject(err: DomainError) -> ApiError {
    if err.ends_session() {
        ApiError::Unauthorized(err.to_string())
    } else {
        err.into()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for PlayerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let query = Query::<TokenQuery>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();

        if let Some(token) = query.token.filter(|t| !t.is_empty()) {
            let player = state
                .identity
                .resolve(&Credential::ReminderToken(token))
                .await
                .map_err(reject)?;
            return Ok(Self {
                player,
                source: IdentitySource::ReminderLink,
            });
        }

        let token = extract_session_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?
            .to_string();

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let ip = client_ip(&parts.headers, peer).ok_or_else(|| {
            ApiError::Unauthorized("Could not determine client address".to_string())
        })?;

        let player = state
            .identity
            .resolve(&Credential::Session { token, ip })
            .await
            .map_err(reject)?;

        Ok(Self {
            player,
            source: IdentitySource::Session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_last_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.9, 198.51.100.7"),
        );
        let peer: SocketAddr = "10.0.0.1:443".parse().unwrap();
        assert_eq!(
            client_ip(&headers, Some(peer)),
            Some("198.51.100.7".parse().unwrap())
        );
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        let peer: SocketAddr = "10.0.0.1:443".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(peer)), Some(peer.ip()));

        headers.insert(FORWARDED_FOR, HeaderValue::from_static("garbage"));
        assert_eq!(client_ip(&headers, Some(peer)), Some(peer.ip()));
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }

    #[test]
    fn test_token_failures_are_unauthorized() {
        assert!(matches!(reject(DomainError::Expired), ApiError::Unauthorized(_)));
        assert!(matches!(
            reject(DomainError::NotFound("token".into())),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            reject(DomainError::Internal("db".into())),
            ApiError::Internal(_)
        ));
    }
}
