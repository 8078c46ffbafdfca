//! Engine-level job identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name and group a job is registered under. Unique within an engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey {
    /// Job name; report jobs use their id.
    pub name: String,
    /// Job group; one per job family.
    pub group: String,
}

impl JobKey {
    /// Create a key.
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.name)
    }
}
