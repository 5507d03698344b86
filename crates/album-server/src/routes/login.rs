//! Login and logout.

use album_session::Session;
use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{AUTH_OK, AUTH_STATUS_KEY, LOGIN_PATH, password_matches};
use crate::cookie::CookieAction;
use crate::error::Result;
use crate::state::AppState;

/// Message shown for a rejected password.
pub const PASSWORD_ERROR: &str = "password error";

/// Login form body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Submitted password.
    #[serde(default)]
    pub password: String,
}

/// GET /login - render the login form.
pub async fn login_page(State(state): State<AppState>) -> Result<Html<String>> {
    Ok(Html(state.templates.login(None)?))
}

/// POST /login - check the password and mark the session as logged in.
///
/// On success the session moves to a fresh identifier before it is marked,
/// so whatever identifier the browser held before login stops working.
pub async fn login_submit(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if !password_matches(&state, &form.password) {
        warn!(session = %session.id().short(), "Login rejected");
        let page = state.templates.login(Some(PASSWORD_ERROR))?;
        return Ok((StatusCode::UNAUTHORIZED, Html(page)).into_response());
    }

    let session = state.sessions.renew(&session)?;
    session.set(AUTH_STATUS_KEY, AUTH_OK);
    info!(session = %session.id().short(), "Login accepted");

    let mut response = Redirect::to("/").into_response();
    response
        .extensions_mut()
        .insert(CookieAction::Issue(session.id().clone()));
    Ok(response)
}

/// POST /logout - end the session and drop the cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Response {
    if state.sessions.destroy(session.id().as_str()) {
        info!(session = %session.id().short(), "Logged out");
    }

    let mut response = Redirect::to(LOGIN_PATH).into_response();
    response.extensions_mut().insert(CookieAction::Expire);
    response
}
