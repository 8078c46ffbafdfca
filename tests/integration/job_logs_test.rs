//! Integration tests for the job monitoring log endpoints.

mod helpers;

use http::StatusCode;
use serde_json::json;

use reportflow_entity::job::JobKind;

use helpers::{PERSONAL, PROJECT, TestApp, fixed_job, with};

#[tokio::test]
async fn test_logs_follow_insertion_order() {
    let app = TestApp::new().await;
    let id = app.create_job(PERSONAL, fixed_job(1)).await;

    app.fire(JobKind::PersonalReport, &id).await;

    assert_eq!(
        app.log_statuses(PERSONAL, &id).await,
        vec!["CREATED", "STARTED", "SUCCESS", "FINISHED"]
    );
}

#[tokio::test]
async fn test_success_entry_carries_report_url() {
    let app = TestApp::new().await;
    let id = app.create_job(PERSONAL, fixed_job(3)).await;
    app.fire(JobKind::PersonalReport, &id).await;

    let response = app.request("GET", &format!("{PERSONAL}/{id}/logs"), None).await;
    let logs = response.body["data"].as_array().unwrap();
    let success = logs
        .iter()
        .find(|log| log["status"] == "SUCCESS")
        .expect("no SUCCESS entry");

    let url = success["data"]["reportUrl"].as_str().unwrap();
    assert!(url.starts_with("https://reports.test/reports/personal_report/"));
    assert!(url.ends_with("personal_report.json"));
    assert_eq!(success["jobId"], id.as_str());
}

#[tokio::test]
async fn test_stopped_job_logs_nothing_until_restart() {
    let app = TestApp::new().await;
    let id = app.create_job(PROJECT, with(fixed_job(5), json!({ "projectId": uuid::Uuid::new_v4() }))).await;

    app.request("PUT", &format!("{PROJECT}/{id}/stop"), None).await;
    app.fire(JobKind::ProjectReport, &id).await;
    app.fire(JobKind::ProjectReport, &id).await;
    assert_eq!(app.log_statuses(PROJECT, &id).await, vec!["CREATED", "STOPPED"]);

    app.request("PUT", &format!("{PROJECT}/{id}/restart"), None).await;
    app.fire(JobKind::ProjectReport, &id).await;
    assert_eq!(
        app.log_statuses(PROJECT, &id).await,
        vec!["CREATED", "STOPPED", "RESTARTED", "STARTED", "SUCCESS"]
    );
}

#[tokio::test]
async fn test_logs_outlive_deleted_job() {
    let app = TestApp::new().await;
    let id = app.create_job(PERSONAL, fixed_job(3)).await;

    app.request("DELETE", &format!("{PERSONAL}/{id}"), None).await;
    assert_eq!(app.log_statuses(PERSONAL, &id).await, vec!["CREATED", "DELETED"]);
}

#[tokio::test]
async fn test_logs_of_unknown_job() {
    let app = TestApp::new().await;

    let missing = app
        .request("GET", &format!("{PERSONAL}/{}/logs", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let id = app.create_job(PERSONAL, fixed_job(3)).await;
    let wrong_family = app.request("GET", &format!("{PROJECT}/{id}/logs"), None).await;
    assert_eq!(wrong_family.status, StatusCode::NOT_FOUND);
}
