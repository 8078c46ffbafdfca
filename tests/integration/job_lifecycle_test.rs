//! Integration tests for the report job lifecycle endpoints.

mod helpers;

use http::StatusCode;
use serde_json::json;

use reportflow_entity::job::JobKind;
use reportflow_worker::{FireOutcome, JobKey};

use helpers::{PERSONAL, PROJECT, TestApp, fixed_job, with};

#[tokio::test]
async fn test_create_then_get_returns_running_job() {
    let app = TestApp::new().await;
    let id = app.create_job(PERSONAL, fixed_job(3)).await;

    let response = app.request("GET", &format!("{PERSONAL}/{id}"), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let job = &response.body["data"];
    assert_eq!(job["status"], "RUNNING");
    assert_eq!(job["name"], "weekly digest");
    assert_eq!(job["totalFireCount"], 3);
    assert_eq!(job["remainingFireCount"], 3);
    assert_eq!(job["repeatIntervalMs"], 1000);
    assert_eq!(job["jobType"], "personal_report");

    let again = app.request("GET", &format!("{PERSONAL}/{id}"), None).await;
    assert_eq!(again.body, response.body);
}

#[tokio::test]
async fn test_list_jobs_is_per_family() {
    let app = TestApp::new().await;
    app.create_job(PERSONAL, fixed_job(1)).await;
    app.create_job(
        PROJECT,
        with(fixed_job(1), json!({ "projectId": uuid::Uuid::new_v4() })),
    )
    .await;

    let personal = app.request("GET", PERSONAL, None).await;
    assert_eq!(personal.status, StatusCode::OK);
    assert_eq!(personal.body["data"].as_array().unwrap().len(), 1);

    let project = app.request("GET", PROJECT, None).await;
    assert_eq!(project.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(project.body["data"][0]["jobType"], "project_report");
}

#[tokio::test]
async fn test_invalid_request_is_rejected() {
    let app = TestApp::new().await;

    for body in [
        with(fixed_job(3), json!({ "name": "" })),
        with(fixed_job(0), json!({})),
        with(fixed_job(3), json!({ "initialOffsetMs": -1 })),
        with(fixed_job(3), json!({ "cron": "whenever" })),
        with(fixed_job(3), json!({ "from": "2026-12-01" })),
    ] {
        let response = app.request("POST", PERSONAL, Some(body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);
        assert_eq!(response.body["status"], 400);
        assert_eq!(response.body["reason"], "Bad Request");
        assert!(response.body["timestamp"].is_string());
    }

    let no_project = app.request("POST", PROJECT, Some(fixed_job(3))).await;
    assert_eq!(no_project.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let app = TestApp::new().await;

    let missing = app
        .request("GET", &format!("{PERSONAL}/{}", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["reason"], "Not Found");

    let malformed = app.request("GET", &format!("{PERSONAL}/42"), None).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);

    let stop = app
        .request("PUT", &format!("{PERSONAL}/{}/stop", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(stop.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_family_cannot_see_job() {
    let app = TestApp::new().await;
    let id = app.create_job(PERSONAL, fixed_job(3)).await;

    let response = app.request("GET", &format!("{PROJECT}/{id}"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bounded_job_completes_after_last_firing() {
    let app = TestApp::new().await;
    let id = app.create_job(PERSONAL, fixed_job(2)).await;

    assert_eq!(app.fire(JobKind::PersonalReport, &id).await, FireOutcome::Executed);
    let after_one = app.request("GET", &format!("{PERSONAL}/{id}"), None).await;
    assert_eq!(after_one.body["data"]["remainingFireCount"], 1);
    assert_eq!(after_one.body["data"]["status"], "RUNNING");

    assert_eq!(app.fire(JobKind::PersonalReport, &id).await, FireOutcome::Executed);
    let done = app.request("GET", &format!("{PERSONAL}/{id}"), None).await;
    assert_eq!(done.body["data"]["remainingFireCount"], 0);
    assert_eq!(done.body["data"]["status"], "COMPLETED");

    let key = JobKey::new(id.as_str(), JobKind::PersonalReport.group());
    assert!(app.state.engine.state(&key).await.is_none());
}

#[tokio::test]
async fn test_forever_job_keeps_its_count() {
    let app = TestApp::new().await;
    let id = app
        .create_job(PERSONAL, with(fixed_job(1), json!({ "runForever": true })))
        .await;

    for _ in 0..4 {
        assert_eq!(app.fire(JobKind::PersonalReport, &id).await, FireOutcome::Executed);
    }
    let job = app.request("GET", &format!("{PERSONAL}/{id}"), None).await;
    assert_eq!(job.body["data"]["remainingFireCount"], 1);
    assert_eq!(job.body["data"]["status"], "RUNNING");
}

#[tokio::test]
async fn test_stop_and_restart() {
    let app = TestApp::new().await;
    let id = app.create_job(PERSONAL, fixed_job(3)).await;

    let stopped = app.request("PUT", &format!("{PERSONAL}/{id}/stop"), None).await;
    assert_eq!(stopped.status, StatusCode::OK);
    assert_eq!(stopped.body["data"]["status"], "STOPPED");
    assert_eq!(app.fire(JobKind::PersonalReport, &id).await, FireOutcome::Skipped);

    let scheduled = app.request("GET", &format!("{PERSONAL}/scheduled"), None).await;
    assert_eq!(scheduled.body["data"][0]["engineState"], "PAUSED");

    let restarted = app
        .request("PUT", &format!("{PERSONAL}/{id}/restart"), None)
        .await;
    assert_eq!(restarted.status, StatusCode::OK);
    assert_eq!(restarted.body["data"]["status"], "RESTARTED");
    assert_eq!(app.fire(JobKind::PersonalReport, &id).await, FireOutcome::Executed);

    let job = app.request("GET", &format!("{PERSONAL}/{id}"), None).await;
    assert_eq!(job.body["data"]["remainingFireCount"], 2);
}

#[tokio::test]
async fn test_delete_unregisters_and_hides_job() {
    let app = TestApp::new().await;
    let id = app.create_job(PERSONAL, fixed_job(3)).await;

    let deleted = app.request("DELETE", &format!("{PERSONAL}/{id}"), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app.request("GET", &format!("{PERSONAL}/{id}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let scheduled = app.request("GET", &format!("{PERSONAL}/scheduled"), None).await;
    assert_eq!(scheduled.body["data"].as_array().unwrap().len(), 0);

    let again = app.request("DELETE", &format!("{PERSONAL}/{id}"), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cron_job_is_scheduled_by_expression() {
    let app = TestApp::new().await;
    let id = app
        .create_job(
            PROJECT,
            with(
                fixed_job(0),
                json!({ "cron": "0 8 * * 1", "projectId": uuid::Uuid::new_v4() }),
            ),
        )
        .await;

    let scheduled = app.request("GET", &format!("{PROJECT}/scheduled"), None).await;
    let view = &scheduled.body["data"][0];
    assert_eq!(view["job"]["id"], id.as_str());
    assert_eq!(view["engineState"], "ACTIVE");
    assert!(view["nextFireTime"].is_string());

    assert_eq!(app.fire(JobKind::ProjectReport, &id).await, FireOutcome::Executed);
    let job = app.request("GET", &format!("{PROJECT}/{id}"), None).await;
    assert_eq!(job.body["data"]["status"], "RUNNING");
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "memory");
    assert_eq!(response.body["data"]["engine"], "manual");
    assert_eq!(response.body["data"]["storage"], "local");
    assert_eq!(response.body["data"]["storageAvailable"], true);
}

#[tokio::test]
async fn test_health_degrades_without_artifact_root() {
    let app = TestApp::new().await;
    std::fs::remove_dir_all(app.artifacts.path()).expect("Failed to remove artifact root");

    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "degraded");
    assert_eq!(response.body["data"]["storageAvailable"], false);
    assert_eq!(response.body["data"]["databaseConnected"], true);
}
