use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::models::AppState;

// Embed the default stylesheet in the binary
pub const DEFAULT_STYLESHEET: &str = include_str!("../static/styles.css");

pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/", get(handlers::instances::instances_get))
        .route("/command", post(handlers::commands::command_post))
        .route("/command-status", get(handlers::commands::command_status_get))
        .route("/command-status.json", get(handlers::commands::command_status_json))
        .route(
            "/config",
            get(handlers::schedule::config_get).post(handlers::schedule::config_post),
        )
        .route("/inventory/refresh", post(handlers::instances::inventory_refresh_post))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            handlers::middleware::auth_middleware,
        ));

    // Serve the custom stylesheet if one was provided, otherwise the embedded default
    let stylesheet_content = state
        .custom_css
        .clone()
        .unwrap_or_else(|| DEFAULT_STYLESHEET.to_string());

    Router::new()
        .route("/login", get(handlers::auth::login_get))
        .route("/auth/callback", get(handlers::auth::auth_callback))
        .route("/logout", get(handlers::auth::logout_get))
        .route("/access_denied", get(handlers::auth::access_denied_get))
        .route("/about", get(handlers::system::about_get))
        .route(
            "/static/styles.css",
            get(move || {
                let css = stylesheet_content.clone();
                async move { ([(CONTENT_TYPE, "text/css")], css) }
            })
            .layer(ServiceBuilder::new().layer(SetResponseHeaderLayer::if_not_present(
                CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=3600"),
            ))),
        )
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
