//! Tenant records and the tenant API surface.

use crate::bills::require_id;
use crate::client::ApiClient;
use crate::list::HasId;
use crate::types::{BulkUpdateReport, ExportHandle, StatusPatch};
use chrono::NaiveDate;
use rentfolio_common::types::{ExportFormat, TenantId, TenantStatus};
use rentfolio_common::{ApiError, Result};
use rentfolio_core::filter::{ListFilter, SortOrder};
use rentfolio_core::pagination::{PageRequest, PageResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tenant as returned by the backend. `serial_number` is assigned
/// sequentially by the backend and is unique.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub serial_number: u64,
    pub name: String,
    #[serde(default)]
    pub business_name: Option<String>,
    pub contact: String,
    pub email: String,
    pub property_address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub rent_amount: Decimal,
    pub security_deposit: Decimal,
    pub lease_start: NaiveDate,
    #[serde(default)]
    pub lease_end: Option<NaiveDate>,
    pub property_type: String,
    pub status: TenantStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl HasId for Tenant {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Wire body for `POST /tenants` and `PUT /tenants/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    pub contact: String,
    pub email: String,
    pub property_address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub rent_amount: Decimal,
    pub security_deposit: Decimal,
    pub lease_start: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_end: Option<NaiveDate>,
    pub property_type: String,
    pub status: TenantStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Constraints for the tenant list view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TenantFilter {
    pub search: Option<String>,
    pub status: Option<TenantStatus>,
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ListFilter for TenantFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(property_type) = &self.property_type {
            pairs.push(("property_type", property_type.clone()));
        }
        if let Some(city) = &self.city {
            pairs.push(("city", city.clone()));
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
struct BulkUpdateTenantsBody<'a> {
    tenant_ids: &'a [String],
    update_data: &'a StatusPatch,
}

/// Aggregate tenant counters for the stats cards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TenantStats {
    pub total_tenants: u64,
    pub active_count: u64,
    pub inactive_count: u64,
    pub pending_count: u64,
    pub overdue_count: u64,
}

// ===== Tenants =====

impl ApiClient {
    pub async fn list_tenants(
        &self,
        filters: &TenantFilter,
        page: PageRequest,
    ) -> Result<PageResult<Tenant>> {
        self.get_page("/tenants", filters.query_pairs(), page).await
    }

    pub async fn get_tenant(&self, id: &TenantId) -> Result<Tenant> {
        require_id(id.as_str())?;
        self.get(&format!("/tenants/{id}")).await
    }

    pub async fn create_tenant(&self, tenant: &TenantPayload) -> Result<Tenant> {
        self.post("/tenants", tenant).await
    }

    pub async fn update_tenant(&self, id: &TenantId, tenant: &TenantPayload) -> Result<Tenant> {
        require_id(id.as_str())?;
        self.put(&format!("/tenants/{id}"), tenant).await
    }

    pub async fn delete_tenant(&self, id: &TenantId) -> Result<()> {
        require_id(id.as_str())?;
        self.delete(&format!("/tenants/{id}")).await
    }

    pub async fn bulk_update_tenants(
        &self,
        ids: &[String],
        patch: &StatusPatch,
    ) -> Result<BulkUpdateReport> {
        if ids.is_empty() {
            return Err(ApiError::validation("no tenants selected"));
        }
        self.post(
            "/tenants/bulk-update",
            &BulkUpdateTenantsBody {
                tenant_ids: ids,
                update_data: patch,
            },
        )
        .await
    }

    pub async fn export_tenants(
        &self,
        filters: &TenantFilter,
        format: ExportFormat,
    ) -> Result<ExportHandle> {
        let mut query = filters.query_pairs();
        query.push(("format", format.to_string()));
        self.get_query("/tenants/export", &query).await
    }

    pub async fn tenant_stats(&self) -> Result<TenantStats> {
        self.get("/tenants/stats").await
    }
}

/// The tenant list's view of the client, for the list controller and the
/// bulk dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct TenantsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn tenants(&self) -> TenantsApi<'_> {
        TenantsApi { client: self }
    }
}

#[async_trait::async_trait]
impl crate::list::PageFetcher for TenantsApi<'_> {
    type Filter = TenantFilter;
    type Item = Tenant;

    async fn fetch_page(
        &self,
        filters: &TenantFilter,
        page: PageRequest,
    ) -> Result<PageResult<Tenant>> {
        self.client.list_tenants(filters, page).await
    }
}

#[async_trait::async_trait]
impl crate::bulk::BulkBackend for TenantsApi<'_> {
    type Filter = TenantFilter;

    async fn bulk_update(&self, ids: &[String], patch: &StatusPatch) -> Result<BulkUpdateReport> {
        self.client.bulk_update_tenants(ids, patch).await
    }

    async fn export(&self, filters: &TenantFilter, format: ExportFormat) -> Result<ExportHandle> {
        self.client.export_tenants(filters, format).await
    }

    async fn send_reminder(&self, _id: &str) -> Result<()> {
        Err(ApiError::UnsupportedAction("send-reminder".to_string()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_tenant(&TenantId::new(id)).await
    }
}
