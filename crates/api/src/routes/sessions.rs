//! Cookie session endpoints.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::cookies::{clear_session_cookie, extract_session_token};

/// `POST /logout`: revokes the cookie session and clears the cookie.
///
/// Succeeds without a cookie so repeated logouts are harmless.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = extract_session_token(&headers) {
        let revoked = state.identity.tokens().revoke(token).await?;
        info!(revoked, "Session logout");
    }

    let secure = state.config.reminders.base_url.starts_with("https://");
    Ok((
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, clear_session_cookie(secure))],
    ))
}
