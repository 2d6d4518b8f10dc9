mod support;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use ec2rm::config;
use ec2rm::identity::AzureAdClient;
use ec2rm::models::{AppState, UserSession};
use ec2rm::services::{Dispatcher, InstanceDirectory, StatusStore};

use support::{record, schedule_store, FakeExecutor, FakeSessions, StaticSource};

const CONFIG: &str = r#"
env:
  test:
    s3: { bucket: inventory, key: running.csv }
    azure_ad:
      tenant_id: tenant-1
      client_id: client-1
      redirect_url: http://localhost:8080/auth/callback
      group_id: group-ops
"#;

const CSV: &str = "\
AWS Account Name,AWS Account ID,State,EC2 Name,Service,Owner,ID,Region,EnvironmentClass
payments,123456789012,running,pay-api,payments,team-pay,i-0aaa,eu-west-2,prod
data,210987654321,running,etl,data,team-data,i-0bbb,us-east-1,dev
";

fn state() -> AppState {
    let settings = Arc::new(config::parse_config(CONFIG, "test").unwrap());
    let directory = InstanceDirectory::new();
    directory.replace(vec![
        record("i-0aaa", "123456789012", "eu-west-2", "prod"),
        record("i-0bbb", "210987654321", "us-east-1", "dev"),
    ]);
    let statuses = StatusStore::new();
    let schedule = schedule_store();
    let sessions = Arc::new(FakeSessions::new(Arc::new(FakeExecutor::default())));
    AppState {
        public_base_url: settings.public_base_url(),
        identity: AzureAdClient::new(settings.azure_ad.clone(), "secret".into(), reqwest::Client::new()),
        settings,
        sessions: Arc::new(Mutex::new(HashMap::new())),
        flash_store: Arc::new(Mutex::new(HashMap::new())),
        dispatcher: Dispatcher::new(directory.clone(), statuses.clone(), schedule.clone(), sessions),
        directory,
        statuses,
        schedule,
        inventory: Arc::new(StaticSource(CSV.to_string())),
        custom_css: None,
    }
}

fn signed_in(state: &AppState) -> String {
    state
        .sessions
        .lock()
        .unwrap()
        .insert("sid-1".into(), UserSession::new("Ada Operator", 3600));
    "session_id=sid-1".to_string()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_protected_routes_redirect_to_login() {
    for path in ["/", "/command-status", "/command-status.json", "/config"] {
        let app = ec2rm::build_router(state());
        let resp = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(resp.headers()[header::LOCATION], "/login", "{path}");
    }
}

#[tokio::test]
async fn test_about_and_stylesheet_are_public() {
    let app = ec2rm::build_router(state());
    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/about").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(env!("CARGO_PKG_VERSION")));

    let resp = app
        .oneshot(Request::builder().uri("/static/styles.css").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/css");
}

#[tokio::test]
async fn test_login_redirects_to_azure_with_state_cookie() {
    let app = ec2rm::build_router(state());
    let resp = app
        .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://login.microsoftonline.com/tenant-1/oauth2/v2.0/authorize?"));
    let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("oauth_state="));
}

#[tokio::test]
async fn test_callback_rejects_mismatched_state() {
    let app = ec2rm::build_router(state());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/auth/callback?code=abc&state=forged")
                .header(header::COOKIE, "oauth_state=expected")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listing_filters_by_region() {
    let state = state();
    let cookie = signed_in(&state);
    let app = ec2rm::build_router(state);
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/?region=us-east-1")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("i-0bbb"));
    assert!(!html.contains("value=\"i-0aaa\""));
    assert!(html.contains("Ada Operator"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn test_expired_session_is_dropped_and_redirects_to_login() {
    let state = state();
    state
        .sessions
        .lock()
        .unwrap()
        .insert("sid-old".into(), UserSession::new("Ada Operator", 0));
    state.push_flash("sid-old", "Submitted 1 command(s), 0 failed");
    let app = ec2rm::build_router(state.clone());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::COOKIE, "session_id=sid-old")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/login");
    assert!(state.sessions.lock().unwrap().is_empty());
    assert!(state.flash_store.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_prune_keeps_only_live_sessions() {
    let state = state();
    {
        let mut sessions = state.sessions.lock().unwrap();
        sessions.insert("live".into(), UserSession::new("Ada Operator", 3600));
        sessions.insert("stale".into(), UserSession::new("Grace Operator", -5));
    }
    state.prune_sessions();
    let sessions = state.sessions.lock().unwrap();
    assert_eq!(sessions.len(), 1);
    assert!(sessions.contains_key("live"));
}

#[tokio::test]
async fn test_custom_stylesheet_replaces_embedded_one() {
    let mut state = state();
    state.custom_css = Some("body { color: teal; }".into());
    let app = ec2rm::build_router(state);
    let resp = app
        .oneshot(Request::builder().uri("/static/styles.css").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "body { color: teal; }");
}

#[tokio::test]
async fn test_command_status_views_show_recorded_entries() {
    let state = state();
    let cookie = signed_in(&state);
    state
        .statuses
        .record("i-0aaa", "Success", "patched 3 packages", "cmd-42", "sudo yum update -y", "System Upgrade");
    let app = ec2rm::build_router(state);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/command-status")
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("cmd-42"));
    assert!(html.contains("status-success"));

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/command-status.json")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["i-0aaa"]["status"], "Success");
    assert_eq!(json["i-0aaa"]["output"], "patched 3 packages");
}

#[tokio::test]
async fn test_command_post_without_selection_flashes_and_returns_to_listing() {
    let state = state();
    let cookie = signed_in(&state);
    let app = ec2rm::build_router(state.clone());
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/command")
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("command_type=restart"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/");
    let flashes = state.flash_store.lock().unwrap().get("sid-1").cloned().unwrap();
    assert_eq!(flashes, vec!["Select at least one instance".to_string()]);
    assert!(state.statuses.is_empty());
}

#[tokio::test]
async fn test_schedule_post_saves_valid_values() {
    let state = state();
    let cookie = signed_in(&state);
    let app = ec2rm::build_router(state.clone());
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/config")
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("stg_dev_day=Tuesday&stg_dev_time=09%3A30&prod_day=Sunday&prod_time=02%3A00"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let current = state.schedule.current().await;
    assert_eq!(current.stg_dev_day, "Tuesday");
    assert_eq!(current.prod_time, "02:00");
}

#[tokio::test]
async fn test_inventory_refresh_reloads_directory() {
    let state = state();
    let cookie = signed_in(&state);
    state.directory.replace(vec![]);
    let app = ec2rm::build_router(state.clone());
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/inventory/refresh")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.directory.len(), 2);
    assert_eq!(state.directory.get("i-0bbb").unwrap().name, "etl");
}

#[tokio::test]
async fn test_logout_clears_session_and_leaves_via_azure() {
    let state = state();
    let cookie = signed_in(&state);
    let app = ec2rm::build_router(state.clone());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/logout")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://login.microsoftonline.com/common/oauth2/logout?"));
    assert!(state.sessions.lock().unwrap().is_empty());
}
