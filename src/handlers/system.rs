use axum::{
    extract::State,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;

use crate::models::AppState;
use crate::templates::AboutTemplate;
use super::helpers::{build_template_globals, render_template, TemplateGlobals};

pub async fn about_get(
    State(state): State<AppState>,
    jar: CookieJar,
) -> impl IntoResponse {
    let TemplateGlobals {
        current_user,
        environment,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);

    render_template(AboutTemplate {
        current_user,
        environment,
        base_url,
        flash_messages,
        has_flash_messages,
        version: env!("CARGO_PKG_VERSION"),
        region: state.settings.region.clone(),
        role_name: state.settings.role_name.clone(),
    })
}
