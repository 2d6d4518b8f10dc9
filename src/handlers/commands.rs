use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Redirect},
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::models::{AppState, StatusRow};
use crate::utils::{first_value, parse_urlencoded_body, status_class};
use crate::templates::CommandStatusTemplate;

use super::helpers::{build_template_globals, flash, render_template, TemplateGlobals};

/// Accepts the listing form: `instance_ids` (repeated), `command_type` and
/// `custom_command`.
pub async fn command_post(State(state): State<AppState>, jar: CookieJar, body: Bytes) -> impl IntoResponse {
    let form = parse_urlencoded_body(&body);
    let instance_ids: Vec<String> = form
        .get("instance_ids")
        .map(|ids| ids.iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let command_type = first_value(&form, "command_type");
    let custom_command = first_value(&form, "custom_command");

    if instance_ids.is_empty() {
        flash(&state, &jar, "Select at least one instance");
        return Redirect::to("/");
    }

    let report = state.dispatcher.dispatch(&instance_ids, &command_type, &custom_command).await;
    flash(
        &state,
        &jar,
        format!("Submitted {} command(s), {} failed", report.submitted, report.failed),
    );
    Redirect::to("/command-status")
}

pub async fn command_status_get(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let mut rows: Vec<StatusRow> = state
        .statuses
        .snapshot()
        .into_iter()
        .map(|(instance_id, entry)| {
            let record = state.directory.get(&instance_id).unwrap_or_default();
            StatusRow {
                name: record.name,
                account_name: record.account_name,
                region: record.region,
                status_class: status_class(&entry.status),
                instance_id,
                entry,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.instance_id.cmp(&b.instance_id)));
    let any_active = rows.iter().any(|r| r.entry.is_active());

    let TemplateGlobals {
        current_user,
        environment,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    render_template(CommandStatusTemplate {
        current_user,
        environment,
        base_url,
        flash_messages,
        has_flash_messages,
        rows: &rows,
        any_active,
    })
}

pub async fn command_status_json(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.statuses.snapshot())
}
