//! Storage provider trait for report artifacts.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Backend that persists rendered report artifacts.
///
/// Paths are relative and `/`-separated; the provider decides where they
/// live physically.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write bytes to the given path, creating parents as needed.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;
}
