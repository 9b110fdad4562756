use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an embedded browsing session (one per partition).
///
/// Persistent partitions follow the `persist:<partition id>` convention so
/// storage survives restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn for_partition(partition_id: &str) -> Self {
        Self(format!("persist:{}", partition_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Partition id when this is a persistent partition session.
    pub fn partition_id(&self) -> Option<&str> {
        self.0.strip_prefix("persist:")
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
