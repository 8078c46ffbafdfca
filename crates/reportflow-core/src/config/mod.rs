//! Application configuration schemas.
//!
//! Configuration is read from TOML files via the `config` crate and then
//! overlaid with `REPORTFLOW__SECTION__KEY` environment variables. Every
//! section has defaults, so an empty configuration yields a runnable
//! in-memory setup.

pub mod app;
pub mod database;
pub mod logging;
pub mod reports;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::database::{DatabaseBackend, DatabaseConfig};
pub use self::logging::LoggingConfig;
pub use self::reports::ReportsConfig;
pub use self::worker::{EngineKind, WorkerConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Job store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Timing engine and execution settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Report artifact settings.
    #[serde(default)]
    pub reports: ReportsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml` (both optional) and
    /// environment variables prefixed with `REPORTFLOW__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("REPORTFLOW")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_in_memory() {
        let config = AppConfig::default();
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert_eq!(config.worker.engine, EngineKind::Cron);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "worker": { "execution_timeout_seconds": 5 },
            "logging": { "format": "pretty" }
        }))
        .expect("deserialize");

        assert_eq!(config.worker.execution_timeout_seconds, 5);
        assert!(config.worker.recover_on_startup);
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.level, "info");
    }
}
