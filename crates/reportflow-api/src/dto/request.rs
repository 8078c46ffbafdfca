//! Request DTOs with validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use reportflow_core::error::AppError;
use reportflow_core::result::AppResult;
use reportflow_core::types::{ProjectId, SubscriberId};
use reportflow_entity::job::{JobInformation, JobKind, ReportPayload, ReportPeriod, TriggerSpec};
use reportflow_worker::engine::Schedule;

/// Body of `POST /job/report/{family}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_schedule"))]
pub struct CreateReportJobRequest {
    /// Owning subscriber.
    pub subscriber_id: SubscriberId,
    /// Job name.
    #[validate(length(min = 1, max = 200, message = "name must not be empty"))]
    pub name: String,
    /// Firings for a bounded fixed schedule.
    #[serde(default)]
    #[validate(range(min = 0, message = "totalFireCount must not be negative"))]
    pub total_fire_count: i32,
    /// Repeat the fixed schedule forever.
    #[serde(default)]
    pub run_forever: bool,
    /// Milliseconds between fixed-schedule firings.
    #[serde(default)]
    #[validate(range(min = 0, message = "repeatInterval must not be negative"))]
    pub repeat_interval: i64,
    /// Milliseconds before the first firing.
    #[serde(default)]
    #[validate(range(min = 0, message = "initialOffsetMs must not be negative"))]
    pub initial_offset_ms: i64,
    /// Cron expression, five or six fields.
    #[serde(default)]
    pub cron: Option<String>,
    /// First day of the report window.
    pub from: NaiveDate,
    /// Last day of the report window.
    pub to: NaiveDate,
    /// Target project, project reports only.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Delivery address.
    #[serde(default)]
    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,
}

fn schedule_error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn validate_schedule(req: &CreateReportJobRequest) -> Result<(), ValidationError> {
    if req.from > req.to {
        return Err(schedule_error(
            "period",
            format!("from ({}) must not be after to ({})", req.from, req.to),
        ));
    }

    if let Some(cron) = req.cron.as_deref().filter(|c| !c.trim().is_empty()) {
        return Schedule::cron(cron)
            .map(|_| ())
            .map_err(|e| schedule_error("cron", e.to_string()));
    }

    if !req.run_forever && req.total_fire_count < 1 {
        return Err(schedule_error(
            "totalFireCount",
            "totalFireCount must be at least 1 unless runForever or cron is set".to_string(),
        ));
    }
    if req.repeat_interval < 1 {
        return Err(schedule_error(
            "repeatInterval",
            "repeatInterval must be at least 1 ms for fixed schedules".to_string(),
        ));
    }
    Ok(())
}

impl CreateReportJobRequest {
    /// Build the job for `kind` from this request.
    pub fn into_job(self, kind: JobKind) -> AppResult<JobInformation> {
        let period = ReportPeriod {
            from: self.from,
            to: self.to,
        };
        let payload = match kind {
            JobKind::PersonalReport => ReportPayload::PersonalReport {
                period,
                email: self.email,
            },
            JobKind::ProjectReport => ReportPayload::ProjectReport {
                project_id: self
                    .project_id
                    .ok_or_else(|| AppError::validation("projectId is required for project reports"))?,
                period,
                email: self.email,
            },
        };

        let trigger = TriggerSpec {
            total_fire_count: self.total_fire_count,
            run_forever: self.run_forever,
            repeat_interval_ms: self.repeat_interval,
            initial_offset_ms: self.initial_offset_ms,
            cron: self.cron,
        };
        Ok(JobInformation::new(self.subscriber_id, self.name, trigger, payload))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(extra: serde_json::Value) -> CreateReportJobRequest {
        let mut body = json!({
            "subscriberId": "7f1c1c36-4d8e-4f5e-9f6b-0a4f6c3f2b11",
            "name": "weekly digest",
            "totalFireCount": 3,
            "repeatInterval": 1000,
            "from": "2026-10-01",
            "to": "2026-10-07",
        });
        for (k, v) in extra.as_object().unwrap() {
            body[k] = v.clone();
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_fixed_schedule_is_valid() {
        assert!(request(json!({})).validate().is_ok());
    }

    #[test]
    fn test_cron_overrides_count_checks() {
        let req = request(json!({ "totalFireCount": 0, "repeatInterval": 0, "cron": "0 8 * * 1" }));
        assert!(req.validate().is_ok());

        let bad = request(json!({ "cron": "at eight" }));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_fields() {
        assert!(request(json!({ "name": "" })).validate().is_err());
        assert!(request(json!({ "totalFireCount": 0 })).validate().is_err());
        assert!(request(json!({ "initialOffsetMs": -5 })).validate().is_err());
        assert!(request(json!({ "repeatInterval": 0 })).validate().is_err());
        assert!(request(json!({ "from": "2026-10-09" })).validate().is_err());
        assert!(request(json!({ "email": "not-an-address" })).validate().is_err());
    }

    #[test]
    fn test_project_jobs_need_a_project() {
        let err = request(json!({})).into_job(JobKind::ProjectReport).unwrap_err();
        assert_eq!(err.kind, reportflow_core::error::ErrorKind::Validation);

        let job = request(json!({ "projectId": "0b5a2f1e-3c4d-4e5f-8a9b-1c2d3e4f5a6b" }))
            .into_job(JobKind::ProjectReport)
            .unwrap();
        assert_eq!(job.job_type, JobKind::ProjectReport);
        assert_eq!(job.repeat_interval_ms, 1000);
        assert_eq!(job.remaining_fire_count, 3);
    }
}
