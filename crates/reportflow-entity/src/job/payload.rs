//! Job families and their typed payloads.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use reportflow_core::types::ProjectId;

/// Discriminator for the job families the scheduler knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Report about the subscriber's own activity.
    PersonalReport,
    /// Report about a single project.
    ProjectReport,
}

impl JobKind {
    /// Engine group the family's jobs are registered under.
    pub fn group(&self) -> &'static str {
        match self {
            Self::PersonalReport => "personal-report-jobs",
            Self::ProjectReport => "project-report-jobs",
        }
    }

    /// Return the kind as a snake-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonalReport => "personal_report",
            Self::ProjectReport => "project_report",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive date range a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// First day of the range.
    pub from: NaiveDate,
    /// Last day of the range.
    pub to: NaiveDate,
}

impl ReportPeriod {
    /// Number of days in the range, counting both ends.
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

/// Family-specific payload of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ReportPayload {
    /// Personal report settings.
    PersonalReport {
        /// Report window.
        period: ReportPeriod,
        /// Where to send the finished report, if anywhere.
        email: Option<String>,
    },
    /// Project report settings.
    ProjectReport {
        /// Project the report is about.
        project_id: ProjectId,
        /// Report window.
        period: ReportPeriod,
        /// Where to send the finished report, if anywhere.
        email: Option<String>,
    },
}

impl ReportPayload {
    /// The family this payload belongs to.
    pub fn kind(&self) -> JobKind {
        match self {
            Self::PersonalReport { .. } => JobKind::PersonalReport,
            Self::ProjectReport { .. } => JobKind::ProjectReport,
        }
    }

    /// The report window.
    pub fn period(&self) -> &ReportPeriod {
        match self {
            Self::PersonalReport { period, .. } | Self::ProjectReport { period, .. } => period,
        }
    }

    /// Destination e-mail, if one was given.
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::PersonalReport { email, .. } | Self::ProjectReport { email, .. } => {
                email.as_deref()
            }
        }
    }

    /// Target project for project reports.
    pub fn project_id(&self) -> Option<ProjectId> {
        match self {
            Self::ProjectReport { project_id, .. } => Some(*project_id),
            Self::PersonalReport { .. } => None,
        }
    }
}
