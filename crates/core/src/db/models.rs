use serde::{Deserialize, Serialize};

use crate::model::BuildId;

/// Summary row describing one build held in the gadget cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildSummary {
    pub build_id: BuildId,
    /// Human-friendly name (e.g., "libc-2.27"), if the build file carried one.
    pub name: Option<String>,
    pub gadget_count: usize,
    /// RFC 3339 timestamp of the import.
    pub imported_at: String,
}
