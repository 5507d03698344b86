//! Session and login middleware.
//!
//! [`session_middleware`] attaches a [`Session`] to every page request and
//! keeps the browser's cookie in step with it. [`require_login`] guards the
//! album pages.
//!
//! # Security
//!
//! Password comparison uses constant-time comparison to prevent timing attacks.

use album_session::Session;
use axum::{
    body::Body,
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use subtle::ConstantTimeEq;
use tracing::{debug, trace};

use crate::cookie::{self, CookieAction};
use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Session attribute recording the login state.
pub const AUTH_STATUS_KEY: &str = "status";

/// Value of [`AUTH_STATUS_KEY`] once the password was accepted.
pub const AUTH_OK: &str = "OK";

/// Where unauthenticated requests are sent.
pub const LOGIN_PATH: &str = "/login";

// ─────────────────────────────────────────────────────────────────────────────
// Security Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Compare two strings in constant time.
///
/// When lengths differ a dummy comparison still runs so the time taken does
/// not depend on where the inputs diverge.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    if a_bytes.len() == b_bytes.len() {
        a_bytes.ct_eq(b_bytes).into()
    } else {
        let _ = a_bytes.ct_eq(a_bytes);
        false
    }
}

/// Check a submitted password against the configured one.
///
/// Without a configured (non-empty) password every attempt fails.
pub fn password_matches(state: &AppState, candidate: &str) -> bool {
    match state.config().password.as_deref() {
        Some(expected) if !expected.is_empty() => constant_time_eq(candidate, expected),
        _ => false,
    }
}

/// Whether the session has passed the login form.
pub fn is_logged_in(session: &Session) -> bool {
    session.get(AUTH_STATUS_KEY).as_deref() == Some(AUTH_OK)
}

// ─────────────────────────────────────────────────────────────────────────────
// Middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Session middleware function.
///
/// Resolves the session cookie through the session store and injects the
/// resulting [`Session`] into request extensions. On the way out it writes
/// `Set-Cookie` when a handler asked for it via [`CookieAction`], or when the
/// resolved session is not the one the browser presented.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let presented = cookie::find(request.headers(), state.cookie_name());
    let session = state.sessions.start(presented.as_deref())?;

    if presented.as_deref() != Some(session.id().as_str()) {
        debug!(session = %session.id().short(), "Assigned session");
    } else {
        trace!(session = %session.id().short(), "Resolved session");
    }

    request.extensions_mut().insert(session.clone());
    let mut response = next.run(request).await;

    let action = match response.extensions_mut().remove::<CookieAction>() {
        Some(action) => Some(action),
        None if presented.as_deref() != Some(session.id().as_str()) => {
            Some(CookieAction::Issue(session.id().clone()))
        }
        None => None,
    };

    let header = match action {
        Some(CookieAction::Issue(id)) => cookie::issue(
            state.cookie_name(),
            &id,
            state.sessions.config().max_idle_secs(),
        ),
        Some(CookieAction::Expire) => cookie::expire(state.cookie_name()),
        None => None,
    };
    if let Some(value) = header {
        response.headers_mut().append(SET_COOKIE, value);
    }

    Ok(response)
}

/// Login guard for album pages.
///
/// Must run inside [`session_middleware`]. Requests whose session has not
/// logged in are redirected (307) to the login page.
pub async fn require_login(request: Request<Body>, next: Next) -> Response {
    let logged_in = request
        .extensions()
        .get::<Session>()
        .is_some_and(is_logged_in);

    if !logged_in {
        debug!(path = %request.uri().path(), "Redirecting to login");
        return Redirect::temporary(LOGIN_PATH).into_response();
    }

    next.run(request).await
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
