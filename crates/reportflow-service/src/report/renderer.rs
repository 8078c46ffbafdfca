//! Report rendering.

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use reportflow_core::error::AppError;
use reportflow_core::result::AppResult;
use reportflow_core::types::{JobId, ProjectId, SubscriberId};
use reportflow_entity::job::{JobInformation, JobKind, ReportPeriod};

/// A rendered artifact ready to be stored.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// File name, without directories.
    pub file_name: String,
    /// MIME type of `body`.
    pub content_type: &'static str,
    /// Artifact bytes.
    pub body: Bytes,
}

/// Turns a job's payload into a report artifact.
#[async_trait]
pub trait ReportRenderer: Send + Sync + Debug + 'static {
    /// Render the report covering the job's period.
    async fn render(
        &self,
        job: &JobInformation,
        generated_at: DateTime<Utc>,
    ) -> AppResult<RenderedReport>;
}

/// Renders reports as pretty-printed JSON documents.
#[derive(Debug, Clone, Default)]
pub struct JsonReportRenderer;

impl JsonReportRenderer {
    /// Creates a new JSON renderer.
    pub fn new() -> Self {
        Self
    }
}

/// Body of a JSON report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    /// Report title.
    pub title: String,
    /// Job that produced the report.
    pub job_id: JobId,
    /// Report owner.
    pub subscriber_id: SubscriberId,
    /// Report family.
    pub kind: JobKind,
    /// Project covered, for project reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// Covered window.
    pub period: ReportPeriod,
    /// When the document was produced.
    pub generated_at: DateTime<Utc>,
    /// One row per day in the window.
    pub days: Vec<DaySummary>,
}

/// One day of a report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    /// Calendar day.
    pub date: NaiveDate,
    /// Weekday name, e.g. `Mon`.
    pub weekday: String,
    /// Whether the day falls on a weekend.
    pub weekend: bool,
}

/// Build the document for `job` without serializing it.
pub fn build_document(job: &JobInformation, generated_at: DateTime<Utc>) -> AppResult<ReportDocument> {
    let period = *job.payload.period();
    if period.from > period.to {
        return Err(AppError::validation(format!(
            "report period starts after it ends ({} > {})",
            period.from, period.to
        )));
    }

    let days = period
        .from
        .iter_days()
        .take_while(|d| *d <= period.to)
        .map(|date| {
            let weekday = date.weekday();
            DaySummary {
                date,
                weekday: weekday.to_string(),
                weekend: weekday.number_from_monday() >= 6,
            }
        })
        .collect();

    Ok(ReportDocument {
        title: format!("{} ({} to {})", job.name, period.from, period.to),
        job_id: job.id,
        subscriber_id: job.subscriber_id,
        kind: job.job_type,
        project_id: job.payload.project_id(),
        period,
        generated_at,
        days,
    })
}

#[async_trait]
impl ReportRenderer for JsonReportRenderer {
    async fn render(
        &self,
        job: &JobInformation,
        generated_at: DateTime<Utc>,
    ) -> AppResult<RenderedReport> {
        let document = build_document(job, generated_at)?;
        let body = serde_json::to_vec_pretty(&document)?;
        Ok(RenderedReport {
            file_name: format!("{}.json", job.job_type),
            content_type: "application/json",
            body: Bytes::from(body),
        })
    }
}
