//! Shared test helpers for integration tests.
#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use reportflow_api::{AppState, build_app};
use reportflow_core::config::{AppConfig, EngineKind};
use reportflow_entity::job::JobKind;
use reportflow_worker::{FireOutcome, JobKey};

/// Base path of the personal report routes.
pub const PERSONAL: &str = "/job/report/personal";
/// Base path of the project report routes.
pub const PROJECT: &str = "/job/report/project";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application state, for driving the engine directly
    pub state: AppState,
    /// Artifact root of this app
    pub artifacts: TempDir,
}

impl TestApp {
    /// Create a new test application on in-memory stores and the manual engine
    pub async fn new() -> Self {
        let artifacts = tempfile::tempdir().expect("Failed to create artifact dir");

        let mut config = AppConfig::default();
        config.worker.engine = EngineKind::Manual;
        config.reports.artifact_root = artifacts.path().display().to_string();
        config.reports.public_base_url = "https://reports.test".to_string();

        let state = AppState::build(config)
            .await
            .expect("Failed to build application state");
        state.engine.start().await.expect("Failed to start engine");

        Self {
            router: build_app(state.clone()),
            state,
            artifacts,
        }
    }

    /// Send a request through the router
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Create a job and return its id
    pub async fn create_job(&self, base: &str, body: Value) -> String {
        let response = self.request("POST", base, Some(body)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"]["id"]
            .as_str()
            .expect("Job id missing")
            .to_string()
    }

    /// Fire a registered job once through the engine
    pub async fn fire(&self, kind: JobKind, id: &str) -> FireOutcome {
        self.state
            .engine
            .fire_now(&JobKey::new(id, kind.group()))
            .await
            .expect("Failed to fire job")
    }

    /// Monitoring log statuses of a job, oldest first
    pub async fn log_statuses(&self, base: &str, id: &str) -> Vec<String> {
        let response = self.request("GET", &format!("{base}/{id}/logs"), None).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["data"]
            .as_array()
            .expect("Logs missing")
            .iter()
            .map(|log| log["status"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

/// A parsed response
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Request body for a bounded fixed-interval job
pub fn fixed_job(total_fire_count: i32) -> Value {
    json!({
        "subscriberId": uuid::Uuid::new_v4(),
        "name": "weekly digest",
        "totalFireCount": total_fire_count,
        "runForever": false,
        "repeatInterval": 1000,
        "initialOffsetMs": 0,
        "from": "2026-10-05",
        "to": "2026-10-11",
        "email": "ada@example.com",
    })
}

/// Merge `extra` into `body`
pub fn with(mut body: Value, extra: Value) -> Value {
    for (k, v) in extra.as_object().expect("extra must be an object") {
        body[k] = v.clone();
    }
    body
}
