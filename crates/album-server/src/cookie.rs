//! Session cookie parsing and `Set-Cookie` construction.

use album_session::SessionId;
use axum::http::{HeaderMap, HeaderValue, header::COOKIE};

/// What the response should tell the browser about its session cookie.
///
/// Handlers that change the session identifier (login) or end the session
/// (logout) insert one of these into the response extensions; the session
/// middleware turns it into a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieAction {
    /// Hand the browser this identifier.
    Issue(SessionId),
    /// Tell the browser to drop the cookie.
    Expire,
}

/// Find the value of cookie `name` in the request headers, URL-unescaped.
///
/// Looks through every `Cookie` header; the first non-empty match wins.
pub fn find(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| match urlencoding::decode(value) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => value.to_string(),
        })
        .next()
}

/// `Set-Cookie` value carrying `id`, valid for `max_age_secs`.
pub fn issue(name: &str, id: &SessionId, max_age_secs: u64) -> Option<HeaderValue> {
    let value = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        name,
        urlencoding::encode(id.as_str()),
        max_age_secs
    );
    HeaderValue::from_str(&value).ok()
}

/// `Set-Cookie` value that makes the browser discard the cookie.
pub fn expire(name: &str) -> Option<HeaderValue> {
    let value = format!(
        "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax",
        name
    );
    HeaderValue::from_str(&value).ok()
}
