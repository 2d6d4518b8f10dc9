use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;

use crate::models::{AppState, FilterSelect, InstanceRow, SelectOption};
use crate::services::{inventory, FilterOptions, InstanceFilter};
use crate::templates::InstancesPageTemplate;

use super::helpers::{build_template_globals, flash, render_template, TemplateGlobals};

fn filter_selects(options: &FilterOptions, filter: &InstanceFilter) -> Vec<FilterSelect> {
    vec![
        FilterSelect {
            name: "owner",
            label: "Owner",
            options: SelectOption::list(&options.owners, &filter.owner),
        },
        FilterSelect {
            name: "service",
            label: "Service",
            options: SelectOption::list(&options.services, &filter.service),
        },
        FilterSelect {
            name: "account_name",
            label: "Account",
            options: SelectOption::list(&options.account_names, &filter.account_name),
        },
        FilterSelect {
            name: "region",
            label: "Region",
            options: SelectOption::list(&options.regions, &filter.region),
        },
        FilterSelect {
            name: "environment_class",
            label: "Environment",
            options: SelectOption::list(&options.environment_classes, &filter.environment_class),
        },
    ]
}

/// Instance listing with the filter drop-downs and the command form.
pub async fn instances_get(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(filter): Query<InstanceFilter>,
) -> impl IntoResponse {
    let all = state.directory.list();
    let options = FilterOptions::from_records(&all);
    let statuses = state.statuses.snapshot();
    let rows: Vec<InstanceRow> = all
        .iter()
        .filter(|r| filter.matches(r))
        .map(|r| InstanceRow::new(r.clone(), statuses.get(&r.id)))
        .collect();
    let filters = filter_selects(&options, &filter);
    let filtered = filters.iter().any(|f| f.options.iter().any(|o| o.selected));

    let TemplateGlobals {
        current_user,
        environment,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    render_template(InstancesPageTemplate {
        current_user,
        environment,
        base_url,
        flash_messages,
        has_flash_messages,
        rows: &rows,
        filters: &filters,
        filtered,
        total: all.len(),
    })
}

/// Re-reads the inventory snapshot now instead of waiting for the refresher.
pub async fn inventory_refresh_post(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    match inventory::refresh(state.inventory.as_ref(), &state.directory).await {
        Ok(count) => flash(&state, &jar, format!("Inventory reloaded: {count} running instances")),
        Err(e) => {
            tracing::error!(%e, source = %state.inventory.describe(), "Manual inventory refresh failed");
            flash(&state, &jar, format!("Inventory reload failed: {e}"));
        }
    }
    Redirect::to("/")
}
