//! Payment records, proof attachments and the payment API surface.

use crate::bills::require_id;
use crate::client::ApiClient;
use crate::list::HasId;
use crate::types::{BulkUpdateReport, ExportHandle};
use chrono::{DateTime, NaiveDate, Utc};
use rentfolio_common::types::{BillId, ExportFormat, PaymentId, PaymentMethod, PaymentStatus, ProofId, TenantId};
use rentfolio_common::{ApiError, Result};
use rentfolio_core::filter::{ListFilter, SortOrder};
use rentfolio_core::pagination::{PageRequest, PageResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An uploaded payment-proof attachment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentProof {
    pub id: ProofId,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub upload_date: DateTime<Utc>,
    pub url: String,
}

/// A recorded payment against a bill.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub bill_id: BillId,
    pub tenant_id: TenantId,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub proofs: Vec<PaymentProof>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl HasId for Payment {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Wire body for `POST /payments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPayment {
    pub bill_id: BillId,
    pub tenant_id: TenantId,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update for `PUT /payments/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
}

/// Constraints for the payment list view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaymentFilter {
    pub search: Option<String>,
    pub status: Option<PaymentStatus>,
    pub method: Option<PaymentMethod>,
    pub tenant: Option<TenantId>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ListFilter for PaymentFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(method) = self.method {
            pairs.push(("method", method.to_string()));
        }
        if let Some(tenant) = &self.tenant {
            pairs.push(("tenant", tenant.to_string()));
        }
        if let Some(from) = self.date_from {
            pairs.push(("date_from", from.to_string()));
        }
        if let Some(to) = self.date_to {
            pairs.push(("date_to", to.to_string()));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sort_by", sort_by.clone()));
        }
        if let Some(order) = self.sort_order {
            pairs.push(("sort_order", order.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize)]
struct BulkUpdatePaymentsBody<'a> {
    payment_ids: &'a [String],
    status: &'a str,
}

/// Collected-amount summary for a reporting period.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentSummary {
    pub period: String,
    pub total_collected: Decimal,
    pub payment_count: u64,
    pub pending_amount: Decimal,
}

// ===== Payments =====

impl ApiClient {
    pub async fn list_payments(
        &self,
        filters: &PaymentFilter,
        page: PageRequest,
    ) -> Result<PageResult<Payment>> {
        self.get_page("/payments", filters.query_pairs(), page).await
    }

    pub async fn get_payment(&self, id: &PaymentId) -> Result<Payment> {
        require_id(id.as_str())?;
        self.get(&format!("/payments/{id}")).await
    }

    pub async fn record_payment(&self, payment: &NewPayment) -> Result<Payment> {
        self.post("/payments", payment).await
    }

    pub async fn update_payment(
        &self,
        id: &PaymentId,
        update: &PaymentUpdate,
    ) -> Result<Payment> {
        require_id(id.as_str())?;
        self.put(&format!("/payments/{id}"), update).await
    }

    pub async fn delete_payment(&self, id: &PaymentId) -> Result<()> {
        require_id(id.as_str())?;
        self.delete(&format!("/payments/{id}")).await
    }

    pub async fn bulk_update_payment_status(
        &self,
        ids: &[String],
        status: PaymentStatus,
    ) -> Result<BulkUpdateReport> {
        if ids.is_empty() {
            return Err(ApiError::validation("no payments selected"));
        }
        self.post(
            "/payments/bulk-update-status",
            &BulkUpdatePaymentsBody {
                payment_ids: ids,
                status: status.as_str(),
            },
        )
        .await
    }

    pub async fn export_payments(
        &self,
        filters: &PaymentFilter,
        format: ExportFormat,
    ) -> Result<ExportHandle> {
        let mut query = filters.query_pairs();
        query.push(("format", format.to_string()));
        self.get_query("/payments/export", &query).await
    }

    /// Attach a proof file to a payment (multipart upload).
    pub async fn upload_payment_proof(
        &self,
        id: &PaymentId,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<PaymentProof> {
        require_id(id.as_str())?;
        if file_name.trim().is_empty() {
            return Err(ApiError::validation("file name must be non-empty"));
        }
        let part = reqwest::multipart::Part::bytes(content).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("proof_file", part)
            .text("payment_id", id.to_string());
        self.upload(&format!("/payments/{id}/proof"), form).await
    }

    pub async fn delete_payment_proof(&self, id: &PaymentId, proof: &ProofId) -> Result<()> {
        require_id(id.as_str())?;
        require_id(proof.as_str())?;
        self.delete(&format!("/payments/{id}/proof/{proof}")).await
    }

    pub async fn payment_summary(&self, period: &str) -> Result<PaymentSummary> {
        self.get_query("/payments/summary", &[("period", period.to_string())])
            .await
    }
}

/// The payment list's view of the client, for the list controller and the
/// bulk dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct PaymentsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn payments(&self) -> PaymentsApi<'_> {
        PaymentsApi { client: self }
    }
}

#[async_trait::async_trait]
impl crate::list::PageFetcher for PaymentsApi<'_> {
    type Filter = PaymentFilter;
    type Item = Payment;

    async fn fetch_page(
        &self,
        filters: &PaymentFilter,
        page: PageRequest,
    ) -> Result<PageResult<Payment>> {
        self.client.list_payments(filters, page).await
    }
}

#[async_trait::async_trait]
impl crate::bulk::BulkBackend for PaymentsApi<'_> {
    type Filter = PaymentFilter;

    async fn bulk_update(
        &self,
        ids: &[String],
        patch: &crate::types::StatusPatch,
    ) -> Result<BulkUpdateReport> {
        let status = match patch.status.as_str() {
            "paid" => PaymentStatus::Paid,
            "unpaid" => PaymentStatus::Unpaid,
            "partial" => PaymentStatus::Partial,
            "overdue" => PaymentStatus::Overdue,
            other => {
                return Err(ApiError::validation(format!(
                    "'{other}' is not a payment status"
                )))
            }
        };
        self.client.bulk_update_payment_status(ids, status).await
    }

    async fn export(&self, filters: &PaymentFilter, format: ExportFormat) -> Result<ExportHandle> {
        self.client.export_payments(filters, format).await
    }

    async fn send_reminder(&self, _id: &str) -> Result<()> {
        Err(ApiError::UnsupportedAction("send-reminder".to_string()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_payment(&PaymentId::new(id)).await
    }
}
