//! Session cookie helpers.

use axum::http::{header::COOKIE, HeaderMap};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "rsvp-session";

/// Builds a `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax",
        SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .map(str::trim)
        .find_map(|cookie| {
            let (cookie_name, value) = cookie.split_once('=')?;
            (cookie_name == name && !value.is_empty()).then_some(value)
        })
}

pub fn extract_session_token(headers: &HeaderMap) -> Option<&str> {
    extract_cookie(headers, SESSION_COOKIE)
}
