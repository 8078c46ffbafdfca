//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use reportflow_core::config::AppConfig;
use reportflow_core::result::AppResult;
use reportflow_core::traits::storage::StorageProvider;
use reportflow_database::Stores;
use reportflow_entity::job::JobKind;
use reportflow_service::{
    JobExecutorService, JobInformationService, JsonReportRenderer, MonitoringService, Notifier,
    TracingNotifier,
};
use reportflow_storage::LocalStorageProvider;
use reportflow_worker::{
    FireCountListener, FireDispatcher, JobSchedulerService, RecoveryReport, ReportJobService,
    TimingEngine, TriggerListener, build_engine,
};

/// Shared application state, cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Job information and log stores.
    pub stores: Stores,
    /// Timing engine every family registers with.
    pub engine: Arc<dyn TimingEngine>,
    /// Where report artifacts are written.
    pub storage: Arc<dyn StorageProvider>,
    /// Personal report jobs.
    pub personal_reports: Arc<ReportJobService>,
    /// Project report jobs.
    pub project_reports: Arc<ReportJobService>,
    /// When the state was built.
    pub started_at: Instant,
}

impl AppState {
    /// Open the configured stores and wire every service.
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        let stores = Stores::open(&config.database).await?;
        Self::with_stores(config, stores).await
    }

    /// Wire every service on top of already opened stores.
    ///
    /// The engine is created but not started.
    pub async fn with_stores(config: AppConfig, stores: Stores) -> AppResult<Self> {
        let jobs = JobInformationService::new(Arc::clone(&stores.jobs));
        let monitoring = MonitoringService::new(Arc::clone(&stores.logs));

        let listener: Arc<dyn TriggerListener> = Arc::new(FireCountListener::new(jobs.clone()));
        let dispatcher = Arc::new(FireDispatcher::new(vec![listener]));
        let engine = build_engine(config.worker.engine, Arc::clone(&dispatcher)).await?;
        let scheduler = JobSchedulerService::new(Arc::clone(&engine), dispatcher, jobs.clone());

        let storage: Arc<dyn StorageProvider> =
            Arc::new(LocalStorageProvider::new(&config.reports.artifact_root).await?);
        let executor = JobExecutorService::new(
            Arc::new(JsonReportRenderer::new()),
            Arc::clone(&storage),
            &config.reports,
            config.worker.execution_timeout(),
        );
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier::new());

        let family = |kind| {
            Arc::new(ReportJobService::new(
                kind,
                jobs.clone(),
                monitoring.clone(),
                scheduler.clone(),
                executor.clone(),
                Arc::clone(&notifier),
            ))
        };

        info!(
            engine = engine.name(),
            store = stores.backend_name(),
            artifact_root = %config.reports.artifact_root,
            "Application state ready"
        );

        Ok(Self {
            personal_reports: family(JobKind::PersonalReport),
            project_reports: family(JobKind::ProjectReport),
            config: Arc::new(config),
            stores,
            engine,
            storage,
            started_at: Instant::now(),
        })
    }

    /// The service for one job family.
    pub fn family(&self, kind: JobKind) -> &Arc<ReportJobService> {
        match kind {
            JobKind::PersonalReport => &self.personal_reports,
            JobKind::ProjectReport => &self.project_reports,
        }
    }

    /// Re-register persisted jobs of every family.
    pub async fn recover(&self) -> AppResult<Vec<(JobKind, RecoveryReport)>> {
        let mut reports = Vec::new();
        for service in [&self.personal_reports, &self.project_reports] {
            reports.push((service.kind(), service.recover().await?));
        }
        Ok(reports)
    }
}
