use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::handlers::helpers::ensure_logged_in;
use crate::models::AppState;

/// Sends requests without a live session to `/login`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    match ensure_logged_in(&state, &jar) {
        None => next.run(request).await,
        Some(redirect) => {
            tracing::debug!(path = %request.uri().path(), "Unauthenticated request redirected to login");
            redirect.into_response()
        }
    }
}
