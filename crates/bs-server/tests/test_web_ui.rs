//! The HTML status page served at `/`.

mod common;

use axum::http::StatusCode;
use bs_core::models::ServerConfig;
use bs_core::services::fakes::MemoryLogSource;

use common::{test_app, test_app_with, PUBLIC_KEY};

#[tokio::test]
async fn page_lists_every_repository() {
    let app = test_app();
    let (status, html) = app.get_html("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<title>NixOS Build Server - nixbox</title>"));
    assert!(html.contains("<h3>alpha</h3>"));
    assert!(html.contains(r#"<h3>beta <span class="badge">RUNNING</span></h3>"#));
    assert!(html.contains(r#"<span style="color: green;">success</span>"#));
    assert!(html.contains(r#"<span style="color: gray;">never built</span>"#));
    assert!(html.contains("<strong>Last Commit:</strong> 3f2a9c1"));
    assert!(html.contains("<strong>Last Finish:</strong> 2024-01-01 00:05:00"));
    assert!(html.contains(r#"href="/build/logs/beta?lines=100""#));
}

#[tokio::test]
async fn page_shows_substituter_snippet() {
    let app = test_app();
    let (_, html) = app.get_html("/").await;

    assert!(html.contains(r#"substituters = [ "http://nixbox:5000" ];"#));
    assert!(html.contains(&format!(r#"trusted-public-keys = [ "{PUBLIC_KEY}" ];"#)));
}

#[tokio::test]
async fn page_reflects_trigger() {
    let app = test_app();
    let (_, html) = app.get_html("/").await;
    assert!(html.contains("<h3>alpha</h3>"));

    app.post_json("/build/trigger/alpha").await;
    let (_, html) = app.get_html("/").await;
    assert!(html.contains(r#"<h3>alpha <span class="badge">RUNNING</span></h3>"#));
}

#[tokio::test]
async fn page_survives_unreachable_supervisor() {
    let app = test_app();
    app.supervisor.set_reachable(false);

    let (status, html) = app.get_html("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!html.contains(r#"<div class="repo">"#));
}

#[tokio::test]
async fn disabled_web_ui() {
    let config = ServerConfig {
        enable_web_ui: false,
        ..ServerConfig::default()
    };
    let app = test_app_with(config, MemoryLogSource::new());

    let (status, html) = app.get_html("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html, "<h1>Web UI disabled</h1>");

    let (status, _) = app.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
}
