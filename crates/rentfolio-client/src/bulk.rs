//! Bulk action dispatch.
//!
//! Maps a user-chosen action keyword onto one bulk-status mutation, one
//! export request, or a per-item sequential mutation, and reports the
//! aggregate outcome. Partial failure is surfaced distinctly from total
//! success and total failure, never collapsed into either.

use crate::types::{BulkUpdateReport, ExportHandle, StatusPatch};
use async_trait::async_trait;
use rentfolio_common::types::ExportFormat;
use rentfolio_common::{ApiError, Result};
use std::fmt;
use std::str::FromStr;

/// The supported bulk action keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    MarkPaid,
    MarkUnpaid,
    MarkOverdue,
    ExportPdf,
    ExportExcel,
    SendReminder,
    Delete,
    Activate,
    Deactivate,
}

impl BulkAction {
    pub fn keyword(&self) -> &'static str {
        match self {
            BulkAction::MarkPaid => "mark-paid",
            BulkAction::MarkUnpaid => "mark-unpaid",
            BulkAction::MarkOverdue => "mark-overdue",
            BulkAction::ExportPdf => "export-pdf",
            BulkAction::ExportExcel => "export-excel",
            BulkAction::SendReminder => "send-reminder",
            BulkAction::Delete => "delete",
            BulkAction::Activate => "activate",
            BulkAction::Deactivate => "deactivate",
        }
    }

    /// The status patch for status-changing actions.
    pub fn status_patch(&self) -> Option<StatusPatch> {
        let status = match self {
            BulkAction::MarkPaid => "paid",
            BulkAction::MarkUnpaid => "unpaid",
            BulkAction::MarkOverdue => "overdue",
            BulkAction::Activate => "active",
            BulkAction::Deactivate => "inactive",
            _ => return None,
        };
        Some(StatusPatch::new(status))
    }

    pub fn export_format(&self) -> Option<ExportFormat> {
        match self {
            BulkAction::ExportPdf => Some(ExportFormat::Pdf),
            BulkAction::ExportExcel => Some(ExportFormat::Excel),
            _ => None,
        }
    }

    /// Whether the action changes backend data (and so warrants a refetch).
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            BulkAction::ExportPdf | BulkAction::ExportExcel | BulkAction::SendReminder
        )
    }
}

impl FromStr for BulkAction {
    type Err = ApiError;

    fn from_str(keyword: &str) -> Result<Self> {
        match keyword {
            "mark-paid" => Ok(BulkAction::MarkPaid),
            "mark-unpaid" => Ok(BulkAction::MarkUnpaid),
            "mark-overdue" => Ok(BulkAction::MarkOverdue),
            "export-pdf" => Ok(BulkAction::ExportPdf),
            "export-excel" => Ok(BulkAction::ExportExcel),
            "send-reminder" => Ok(BulkAction::SendReminder),
            "delete" => Ok(BulkAction::Delete),
            "activate" => Ok(BulkAction::Activate),
            "deactivate" => Ok(BulkAction::Deactivate),
            other => Err(ApiError::UnsupportedAction(other.to_string())),
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// The client calls a bulk action can need, implemented per resource kind.
#[async_trait]
pub trait BulkBackend: Send + Sync {
    type Filter: Send + Sync;

    async fn bulk_update(&self, ids: &[String], patch: &StatusPatch) -> Result<BulkUpdateReport>;
    async fn export(&self, filters: &Self::Filter, format: ExportFormat) -> Result<ExportHandle>;
    async fn send_reminder(&self, id: &str) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Aggregate result of one bulk action attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkOutcome {
    pub succeeded: usize,
    pub failed: usize,
    /// Per-item error messages, when individual failures are
    /// distinguishable (sequential actions only).
    pub errors: Vec<String>,
    pub export: Option<ExportHandle>,
}

impl BulkOutcome {
    pub fn is_total_success(&self) -> bool {
        self.failed == 0
    }

    /// Some ids succeeded and some failed.
    pub fn is_partial_failure(&self) -> bool {
        self.succeeded > 0 && self.failed > 0
    }
}

/// Perform `action` for `ids` against `backend` and report the outcome.
///
/// Status keywords become one `bulk_update` call; `export-*` one export
/// call; `send-reminder` and `delete` run per item, sequentially. An
/// unrecognized keyword never reaches this function — `BulkAction` parsing
/// rejects it with an explicit unsupported-action error.
pub async fn dispatch<B: BulkBackend>(
    backend: &B,
    action: BulkAction,
    ids: &[String],
    filters: &B::Filter,
) -> Result<BulkOutcome> {
    if let Some(format) = action.export_format() {
        let handle = backend.export(filters, format).await?;
        return Ok(BulkOutcome {
            succeeded: ids.len(),
            export: Some(handle),
            ..Default::default()
        });
    }

    if ids.is_empty() {
        return Err(ApiError::validation("no items selected"));
    }

    if let Some(patch) = action.status_patch() {
        let report = backend.bulk_update(ids, &patch).await?;
        let succeeded = (report.updated_count as usize).min(ids.len());
        let outcome = BulkOutcome {
            succeeded,
            failed: ids.len() - succeeded,
            ..Default::default()
        };
        if outcome.is_partial_failure() {
            tracing::warn!(
                action = action.keyword(),
                succeeded = outcome.succeeded,
                failed = outcome.failed,
                "bulk update partially failed"
            );
        }
        return Ok(outcome);
    }

    // Per-item sequential actions.
    let mut outcome = BulkOutcome::default();
    for id in ids {
        let result = match action {
            BulkAction::SendReminder => backend.send_reminder(id).await,
            BulkAction::Delete => backend.delete(id).await,
            _ => unreachable!("status and export actions are handled above"),
        };
        match result {
            Ok(()) => outcome.succeeded += 1,
            Err(err) => {
                outcome.failed += 1;
                outcome.errors.push(format!("{id}: {err}"));
            }
        }
    }
    Ok(outcome)
}
