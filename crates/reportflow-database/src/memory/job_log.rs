//! In-memory monitoring log.

use async_trait::async_trait;
use dashmap::DashMap;

use reportflow_core::result::AppResult;
use reportflow_core::types::JobId;
use reportflow_entity::job::{JobLog, NewJobLog};

use crate::store::JobLogStore;

/// Per-job vectors of entries; push order is insertion order.
#[derive(Debug, Default)]
pub struct MemoryJobLogStore {
    logs: DashMap<JobId, Vec<JobLog>>,
}

impl MemoryJobLogStore {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobLogStore for MemoryJobLogStore {
    async fn append(&self, entry: NewJobLog) -> AppResult<JobLog> {
        let log = entry.into_log();
        self.logs.entry(log.job_id).or_default().push(log.clone());
        Ok(log)
    }

    async fn find_by_job(&self, job_id: JobId) -> AppResult<Vec<JobLog>> {
        Ok(self
            .logs
            .get(&job_id)
            .map(|entries| entries.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use reportflow_core::types::{ProjectId, SubscriberId};
    use reportflow_entity::job::{
        JobInformation, JobLogStatus, ReportPayload, ReportPeriod, TriggerSpec,
    };

    use super::*;

    #[tokio::test]
    async fn test_entries_come_back_in_insertion_order() {
        let job = JobInformation::new(
            SubscriberId::new(),
            "project digest",
            TriggerSpec {
                run_forever: true,
                repeat_interval_ms: 500,
                ..TriggerSpec::default()
            },
            ReportPayload::ProjectReport {
                project_id: ProjectId::new(),
                period: ReportPeriod {
                    from: NaiveDate::from_ymd_opt(2026, 4, 1).expect("date"),
                    to: NaiveDate::from_ymd_opt(2026, 4, 30).expect("date"),
                },
                email: None,
            },
        );
        let store = MemoryJobLogStore::new();

        for status in [JobLogStatus::Created, JobLogStatus::Started, JobLogStatus::Success] {
            store
                .append(job.log_entry(status, status.as_str()))
                .await
                .expect("append");
        }

        let statuses: Vec<_> = store
            .find_by_job(job.id)
            .await
            .expect("find")
            .into_iter()
            .map(|log| log.status)
            .collect();
        assert_eq!(
            statuses,
            vec![JobLogStatus::Created, JobLogStatus::Started, JobLogStatus::Success]
        );
        assert!(store.find_by_job(JobId::new()).await.expect("find").is_empty());
    }
}
