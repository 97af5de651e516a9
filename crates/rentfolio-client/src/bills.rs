//! Bill records and the bill API surface.
//!
//! The backend speaks snake_case JSON; the request payload structs here are
//! the single place that translation lives, so it can be tested without any
//! network code. The backend is authoritative for `id` and `bill_number` —
//! client-supplied values are an advisory preview only.

use crate::client::ApiClient;
use crate::list::HasId;
use crate::types::{BulkUpdateReport, ExportHandle, ReminderRequest, StatusPatch};
use chrono::{DateTime, NaiveDate, Utc};
use rentfolio_common::types::{BillId, BillStatus, BillingPeriod, ExportFormat, TenantId};
use rentfolio_common::{ApiError, Result};
use rentfolio_core::billing::{compute_bill_total, ChargeInput};
use rentfolio_core::filter::{ListFilter, SortOrder};
use rentfolio_core::pagination::{PageRequest, PageResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One additional charge on a bill. The id is local to the owning bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalCharge {
    #[serde(default)]
    pub id: String,
    pub description: String,
    pub amount: Decimal,
}

/// A rent bill as returned by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub bill_number: String,
    pub tenant_id: TenantId,
    pub billing_period: BillingPeriod,
    pub due_date: NaiveDate,
    pub rent_amount: Decimal,
    #[serde(default)]
    pub additional_charges: Vec<AdditionalCharge>,
    pub total_amount: Decimal,
    pub status: BillStatus,
    pub created_at: DateTime<Utc>,
}

impl HasId for Bill {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Input for creating a bill, as assembled by the bill-creation form.
///
/// Charges are kept as raw form rows; only complete rows are sent, and the
/// total is recomputed here rather than trusted from the view.
#[derive(Debug, Clone)]
pub struct NewBill {
    pub tenant_id: TenantId,
    pub billing_period: BillingPeriod,
    pub due_date: NaiveDate,
    pub rent_amount: Decimal,
    pub charges: Vec<ChargeInput>,
    /// Preview number shown before creation; overwritten by the backend.
    pub bill_number: Option<String>,
    pub status: BillStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ChargeBody {
    pub description: String,
    pub amount: Decimal,
}

/// Wire body for `POST /bills`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CreateBillBody {
    pub tenant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_number: Option<String>,
    pub billing_month: u8,
    pub billing_year: u16,
    pub due_date: NaiveDate,
    pub rent_amount: Decimal,
    pub additional_charges: Vec<ChargeBody>,
    pub total_amount: Decimal,
    pub status: BillStatus,
}

impl From<&NewBill> for CreateBillBody {
    fn from(bill: &NewBill) -> Self {
        let additional_charges = bill
            .charges
            .iter()
            .filter(|charge| charge.is_complete())
            .map(|charge| ChargeBody {
                description: charge.description.trim().to_string(),
                amount: charge.parsed_amount().unwrap_or(Decimal::ZERO),
            })
            .collect();

        Self {
            tenant_id: bill.tenant_id.to_string(),
            bill_number: bill.bill_number.clone(),
            billing_month: bill.billing_period.month,
            billing_year: bill.billing_period.year,
            due_date: bill.due_date,
            rent_amount: bill.rent_amount,
            additional_charges,
            total_amount: compute_bill_total(bill.rent_amount, &bill.charges),
            status: bill.status,
        }
    }
}

/// Partial update for `PUT /bills/{id}`. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BillUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BillStatus>,
}

/// Constraints for the bill list view. `None` means unconstrained.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BillFilter {
    pub search: Option<String>,
    pub status: Option<BillStatus>,
    pub tenant: Option<TenantId>,
    pub period: Option<BillingPeriod>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ListFilter for BillFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(tenant) = &self.tenant {
            pairs.push(("tenant", tenant.to_string()));
        }
        if let Some(period) = self.period {
            pairs.push(("month", format!("{:04}-{:02}", period.year, period.month)));
        }
        if let Some(min) = self.min_amount {
            pairs.push(("min_amount", min.to_string()));
        }
        if let Some(max) = self.max_amount {
            pairs.push(("max_amount", max.to_string()));
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
struct BulkUpdateBillsBody<'a> {
    bill_ids: &'a [String],
    update_data: &'a StatusPatch,
}

/// Aggregate bill counters for the stats cards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BillStats {
    pub total_bills: u64,
    pub paid_count: u64,
    pub unpaid_count: u64,
    pub overdue_count: u64,
    pub total_amount: Decimal,
    pub collected_amount: Decimal,
}

// ===== Bills =====

impl ApiClient {
    pub async fn list_bills(
        &self,
        filters: &BillFilter,
        page: PageRequest,
    ) -> Result<PageResult<Bill>> {
        self.get_page("/bills", filters.query_pairs(), page).await
    }

    pub async fn get_bill(&self, id: &BillId) -> Result<Bill> {
        require_id(id.as_str())?;
        self.get(&format!("/bills/{id}")).await
    }

    pub async fn create_bill(&self, bill: &NewBill) -> Result<Bill> {
        self.post("/bills", &CreateBillBody::from(bill)).await
    }

    pub async fn update_bill(&self, id: &BillId, update: &BillUpdate) -> Result<Bill> {
        require_id(id.as_str())?;
        self.put(&format!("/bills/{id}"), update).await
    }

    pub async fn delete_bill(&self, id: &BillId) -> Result<()> {
        require_id(id.as_str())?;
        self.delete(&format!("/bills/{id}")).await
    }

    pub async fn bulk_update_bills(
        &self,
        ids: &[String],
        patch: &StatusPatch,
    ) -> Result<BulkUpdateReport> {
        if ids.is_empty() {
            return Err(ApiError::validation("no bills selected"));
        }
        self.post(
            "/bills/bulk-update",
            &BulkUpdateBillsBody {
                bill_ids: ids,
                update_data: patch,
            },
        )
        .await
    }

    pub async fn export_bills(
        &self,
        filters: &BillFilter,
        format: ExportFormat,
    ) -> Result<ExportHandle> {
        let mut query = filters.query_pairs();
        query.push(("format", format.to_string()));
        self.get_query("/bills/export", &query).await
    }

    pub async fn send_bill_reminder(
        &self,
        id: &BillId,
        reminder: &ReminderRequest,
    ) -> Result<()> {
        require_id(id.as_str())?;
        self.post_empty(&format!("/bills/{id}/reminder"), reminder)
            .await
    }

    pub async fn bill_stats(&self) -> Result<BillStats> {
        self.get("/bills/stats").await
    }

    /// Most recently created bills, for the dashboard table.
    pub async fn recent_bills(&self, limit: u32) -> Result<Vec<Bill>> {
        self.get_query("/bills/recent", &[("limit", limit.to_string())])
            .await
    }
}

/// The bill list's view of the client: one type that both feeds a
/// [`crate::ListController`] and serves as the bulk-action backend.
#[derive(Debug, Clone, Copy)]
pub struct BillsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn bills(&self) -> BillsApi<'_> {
        BillsApi { client: self }
    }
}

#[async_trait::async_trait]
impl crate::list::PageFetcher for BillsApi<'_> {
    type Filter = BillFilter;
    type Item = Bill;

    async fn fetch_page(
        &self,
        filters: &BillFilter,
        page: PageRequest,
    ) -> Result<PageResult<Bill>> {
        self.client.list_bills(filters, page).await
    }
}

#[async_trait::async_trait]
impl crate::bulk::BulkBackend for BillsApi<'_> {
    type Filter = BillFilter;

    async fn bulk_update(&self, ids: &[String], patch: &StatusPatch) -> Result<BulkUpdateReport> {
        self.client.bulk_update_bills(ids, patch).await
    }

    async fn export(&self, filters: &BillFilter, format: ExportFormat) -> Result<ExportHandle> {
        self.client.export_bills(filters, format).await
    }

    async fn send_reminder(&self, id: &str) -> Result<()> {
        self.client
            .send_bill_reminder(&BillId::new(id), &ReminderRequest::default())
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_bill(&BillId::new(id)).await
    }
}

pub(crate) fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        Err(ApiError::validation("id must be non-empty"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn new_bill() -> NewBill {
        NewBill {
            tenant_id: TenantId::new("t-1"),
            billing_period: BillingPeriod::new(8, 2026).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 8, 31).unwrap(),
            rent_amount: dec!(25000),
            charges: vec![
                ChargeInput::new("Maintenance", "1500"),
                ChargeInput::new("", "500"),
            ],
            bill_number: Some("BILL-1724800000000-042".to_string()),
            status: BillStatus::Unpaid,
        }
    }

    #[test]
    fn create_body_drops_incomplete_charges_and_recomputes_total() {
        let body = CreateBillBody::from(&new_bill());
        assert_eq!(body.additional_charges.len(), 1);
        assert_eq!(body.additional_charges[0].description, "Maintenance");
        assert_eq!(body.total_amount, dec!(26500.00));
    }

    #[test]
    fn create_body_serializes_snake_case_wire_names() {
        let value = serde_json::to_value(CreateBillBody::from(&new_bill())).unwrap();
        assert_eq!(value["tenant_id"], json!("t-1"));
        assert_eq!(value["billing_month"], json!(8));
        assert_eq!(value["billing_year"], json!(2026));
        assert_eq!(value["due_date"], json!("2026-08-31"));
        assert_eq!(value["rent_amount"], json!("25000"));
        assert_eq!(value["total_amount"], json!("26500.00"));
        assert_eq!(value["status"], json!("unpaid"));
        assert_eq!(value["additional_charges"][0]["amount"], json!("1500"));
    }

    #[test]
    fn update_body_skips_untouched_fields() {
        let update = BillUpdate {
            status: Some(BillStatus::Paid),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, json!({"status": "paid"}));
    }

    #[test]
    fn filter_emits_only_constrained_pairs() {
        let filter = BillFilter {
            status: Some(BillStatus::Unpaid),
            period: BillingPeriod::new(3, 2026),
            sort_by: Some("due_date".to_string()),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("status", "unpaid".to_string()),
                ("month", "2026-03".to_string()),
                ("sort_by", "due_date".to_string()),
                ("sort_order", "desc".to_string()),
            ]
        );

        assert!(BillFilter::default().is_unconstrained());
    }

    #[test]
    fn bill_deserializes_from_backend_json() {
        let bill: Bill = serde_json::from_value(json!({
            "id": "b-1",
            "bill_number": "BILL-2026-0001",
            "tenant_id": "t-1",
            "billing_period": {"month": 8, "year": 2026},
            "due_date": "2026-08-31",
            "rent_amount": 25000,
            "additional_charges": [
                {"id": "c-1", "description": "Maintenance", "amount": "1500"}
            ],
            "total_amount": "26500.00",
            "status": "unpaid",
            "created_at": "2026-08-01T09:30:00Z"
        }))
        .unwrap();

        assert_eq!(bill.bill_number, "BILL-2026-0001");
        assert_eq!(bill.rent_amount, dec!(25000));
        assert_eq!(bill.total_amount, dec!(26500));
        assert_eq!(bill.status, BillStatus::Unpaid);
        assert_eq!(HasId::id(&bill), "b-1");
    }

    #[test]
    fn empty_id_is_rejected_before_any_network_call() {
        assert!(matches!(
            require_id("  ").unwrap_err(),
            ApiError::Validation { .. }
        ));
        assert!(require_id("b-1").is_ok());
    }
}
