//! Local filesystem storage for report artifacts.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use reportflow_core::error::{AppError, ErrorKind};
use reportflow_core::result::AppResult;
use reportflow_core::traits::storage::StorageProvider;

/// Stores artifacts under a single root directory.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create the provider, creating `root` if it does not exist.
    pub async fn new(root: impl AsRef<Path>) -> AppResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create artifact root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Map a relative artifact path into the root.
    ///
    /// Absolute paths and `..` segments are rejected so an artifact can never
    /// land outside the root.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AppError::validation(format!("Invalid artifact path: {path}")));
        }
        Ok(self.root.join(relative))
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        self.ensure_parent(&full_path).await?;

        // Write next to the target and rename so readers never see a partial file.
        let staging = full_path.with_extension("partial");
        fs::write(&staging, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write artifact: {path}"),
                e,
            )
        })?;
        fs::rename(&staging, &full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to publish artifact: {path}"),
                e,
            )
        })?;

        debug!(path, bytes = data.len(), "Stored report artifact");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_publishes_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path()).await.unwrap();

        let data = Bytes::from("{\"rows\":[]}");
        provider
            .write("reports/personal_report/abc/report.json", data.clone())
            .await
            .unwrap();

        let stored = dir.path().join("reports/personal_report/abc");
        assert_eq!(fs::read(stored.join("report.json")).await.unwrap(), data);
        assert!(!fs::try_exists(stored.join("report.partial")).await.unwrap());

        // Rewriting replaces the artifact.
        provider
            .write("reports/personal_report/abc/report.json", Bytes::from("{}"))
            .await
            .unwrap();
        assert_eq!(fs::read(stored.join("report.json")).await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_rejects_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path().join("root")).await.unwrap();

        let err = provider
            .write("../escape.json", Bytes::from("x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(!fs::try_exists(dir.path().join("escape.json")).await.unwrap());
        assert!(provider.write("", Bytes::from("x")).await.is_err());
    }

    #[tokio::test]
    async fn test_health_follows_root_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested");
        let provider = LocalStorageProvider::new(&root).await.unwrap();
        assert_eq!(provider.provider_type(), "local");
        assert!(provider.health_check().await.unwrap());

        fs::remove_dir(&root).await.unwrap();
        assert!(!provider.health_check().await.unwrap());
    }
}
