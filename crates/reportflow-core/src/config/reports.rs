//! Report artifact configuration.

use serde::{Deserialize, Serialize};

/// Where rendered reports are written and how they are addressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Root directory of the local artifact store.
    #[serde(default = "default_artifact_root")]
    pub artifact_root: String,
    /// Base URL prefixed to artifact paths in execution results.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            artifact_root: default_artifact_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_artifact_root() -> String {
    "data/reports".to_string()
}

fn default_public_base_url() -> String {
    "file://data/reports".to_string()
}
