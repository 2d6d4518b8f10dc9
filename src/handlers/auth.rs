use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use crate::identity::logout_url;
use crate::models::{AppState, UserSession};
use crate::services::random_session_id;
use crate::templates::AccessDeniedTemplate;

use super::helpers::{build_template_globals, current_username_from_jar, render_template, TemplateGlobals, SESSION_COOKIE};

const STATE_COOKIE: &str = "oauth_state";
const STATE_COOKIE_MINUTES: i64 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
    pub error: String,
    pub error_description: String,
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie
}

pub async fn login_get(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if current_username_from_jar(&state, &jar).is_some() {
        return Redirect::to("/").into_response();
    }
    let oauth_state = random_session_id();
    let mut cookie = Cookie::new(STATE_COOKIE, oauth_state.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_max_age(time::Duration::minutes(STATE_COOKIE_MINUTES));
    let target = state.identity.authorize_url(&oauth_state);
    (jar.add(cookie), Redirect::to(&target)).into_response()
}

pub async fn auth_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    if !query.error.is_empty() {
        tracing::warn!(error = %query.error, description = %query.error_description, "Azure AD returned an error");
        return (StatusCode::BAD_REQUEST, format!("Sign-in failed: {}", query.error)).into_response();
    }
    if query.code.is_empty() {
        return (StatusCode::BAD_REQUEST, "Code not found").into_response();
    }
    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    if expected.as_deref() != Some(query.state.as_str()) {
        tracing::warn!("OAuth state mismatch on callback");
        return (StatusCode::BAD_REQUEST, "Invalid sign-in state").into_response();
    }
    let jar = jar.remove(removal_cookie(STATE_COOKIE));

    let token = match state.identity.exchange_code(&query.code).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(%e, "Failed to exchange authorization code");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to exchange token").into_response();
        }
    };

    match state.identity.is_member(&token.access_token).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!(group_id = %state.identity.group_id(), "Signed-in user is not in the required group");
            return (jar, Redirect::to("/access_denied")).into_response();
        }
        Err(e) => {
            tracing::error!(%e, "Failed to fetch group memberships");
            return (jar, Redirect::to("/access_denied")).into_response();
        }
    }

    let display_name = match state.identity.display_name(&token.access_token).await {
        Ok(name) => name,
        Err(e) => {
            tracing::error!(%e, "Failed to fetch user info");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch user info").into_response();
        }
    };

    state.prune_sessions();
    let sid = random_session_id();
    state
        .sessions
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(sid.clone(), UserSession::new(display_name.clone(), token.lifetime_secs()));
    tracing::info!(user = %display_name, "User signed in");

    let mut cookie = Cookie::new(SESSION_COOKIE, sid);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_expires(time::OffsetDateTime::now_utc() + time::Duration::seconds(token.lifetime_secs()));
    (jar.add(cookie), Redirect::to("/")).into_response()
}

pub async fn logout_get(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(sid) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        state.sessions.lock().unwrap_or_else(|e| e.into_inner()).remove(&sid);
        state.flash_store.lock().unwrap_or_else(|e| e.into_inner()).remove(&sid);
    }
    let cleared = jar.remove(removal_cookie(SESSION_COOKIE));
    (cleared, Redirect::to(&logout_url(&state.public_base_url))).into_response()
}

pub async fn access_denied_get(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let TemplateGlobals {
        current_user,
        environment,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    let response = render_template(AccessDeniedTemplate {
        current_user,
        environment,
        base_url,
        flash_messages,
        has_flash_messages,
        logout_url: logout_url(&state.public_base_url),
    });
    (StatusCode::FORBIDDEN, response)
}
