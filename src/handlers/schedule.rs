use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;

use crate::models::{AppState, ScheduleConfig, SelectOption, WEEKDAYS};
use crate::templates::ConfigTemplate;

use super::helpers::{build_template_globals, flash, render_template, TemplateGlobals};

pub async fn config_get(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let schedule = match state.schedule.load().await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(%e, parameter = %state.schedule.parameter_name(), "Error loading schedule config");
            flash(&state, &jar, "Could not load the schedule from Parameter Store; showing cached values");
            state.schedule.current().await
        }
    };

    let TemplateGlobals {
        current_user,
        environment,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    render_template(ConfigTemplate {
        current_user,
        environment,
        base_url,
        flash_messages,
        has_flash_messages,
        stg_dev_days: SelectOption::list(&WEEKDAYS, &schedule.stg_dev_day),
        prod_days: SelectOption::list(&WEEKDAYS, &schedule.prod_day),
        schedule: &schedule,
        parameter_name: state.schedule.parameter_name(),
    })
}

pub async fn config_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ScheduleConfig>,
) -> impl IntoResponse {
    match state.schedule.save(form).await {
        Ok(()) => flash(&state, &jar, "Schedule updated"),
        Err(e) => {
            tracing::error!(%e, "Error saving schedule config");
            flash(&state, &jar, format!("Failed to save schedule: {e}"));
        }
    }
    Redirect::to("/config")
}
