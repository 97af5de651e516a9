//! Wire types shared across the resource APIs.

use serde::{Deserialize, Serialize};

/// Status patch applied by a bulk update, e.g. `{"status": "paid"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPatch {
    pub status: String,
}

impl StatusPatch {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

/// Backend report for a bulk update. The backend may apply the patch to
/// only a subset of the requested ids; callers compare `updated_count`
/// against the request size to detect partial failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BulkUpdateReport {
    #[serde(alias = "updatedCount")]
    pub updated_count: u64,
}

/// Reference to a downloadable export artifact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportHandle {
    #[serde(alias = "downloadUrl")]
    pub download_url: String,
    #[serde(default, alias = "fileName")]
    pub file_name: Option<String>,
}

/// Payment reminder payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderRequest {
    pub message: Option<String>,
    pub email: Option<String>,
    pub sms: bool,
}
