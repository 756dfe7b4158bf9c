// Each test binary compiles this module independently and uses a different
// subset of helpers, so unused-function warnings are expected.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use bs_core::models::ServerConfig;
use bs_core::services::fakes::{FakeSupervisor, MemoryLogSource, StaticKeySource};
use bs_core::BuildServer;

pub const PUBLIC_KEY: &str = "build-server:Q0FDSEVLRVk=";

/// A router over fake collaborators plus handles to steer them.
pub struct TestApp {
    pub app: Router,
    pub supervisor: Arc<FakeSupervisor>,
    _data_dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.send(Method::GET, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    pub async fn post_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.send(Method::POST, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    pub async fn get_html(&self, uri: &str) -> (StatusCode, String) {
        let (status, body) = self.send(Method::GET, uri).await;
        (status, String::from_utf8(body).unwrap())
    }
}

/// alpha: last build succeeded, idle. beta: never built, running.
/// The cache unit is up.
pub fn test_app() -> TestApp {
    test_app_with(ServerConfig::default(), MemoryLogSource::new())
}

pub fn test_app_with(config: ServerConfig, logs: MemoryLogSource) -> TestApp {
    let data_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(data_dir.path().join("status")).unwrap();
    std::fs::write(
        data_dir.path().join("status/alpha.json"),
        r#"{
            "last_start": "2024-01-01T00:00:00",
            "last_finish": "2024-01-01T00:05:00",
            "last_status": "success",
            "last_commit": "3f2a9c1"
        }"#,
    )
    .unwrap();

    let config = Arc::new(ServerConfig {
        data_dir: data_dir.path().to_path_buf(),
        hostname: "nixbox".into(),
        ..config
    });
    let supervisor = Arc::new(
        FakeSupervisor::new()
            .with_unit("nix-build-alpha.service", false)
            .with_unit("nix-build-beta.service", true)
            .with_unit(config.cache_unit.clone(), true),
    );
    let server = BuildServer::new(
        config,
        supervisor.clone(),
        Arc::new(logs),
        Arc::new(StaticKeySource::new(PUBLIC_KEY)),
    );

    TestApp {
        app: bs_server::router(Arc::new(server)),
        supervisor,
        _data_dir: data_dir,
    }
}
