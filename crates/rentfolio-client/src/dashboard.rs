//! Dashboard read models: headline metrics and collection trends.

use crate::client::ApiClient;
use rentfolio_common::Result;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyMetrics {
    pub total_tenants: u64,
    pub active_tenants: u64,
    pub monthly_income: Decimal,
    pub outstanding_amount: Decimal,
    /// Collected / billed for the current period, 0..=100.
    pub collection_rate: Decimal,
}

/// One point of the collection-rate trend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionRatePoint {
    pub period: String,
    pub rate: Decimal,
}

/// Summary of bills currently overdue.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverdueSummary {
    pub count: u64,
    pub total_amount: Decimal,
}

// ===== Dashboard =====

impl ApiClient {
    pub async fn key_metrics(&self) -> Result<KeyMetrics> {
        self.get("/dashboard/metrics").await
    }

    pub async fn collection_rates(&self, period: &str) -> Result<Vec<CollectionRatePoint>> {
        self.get_query("/dashboard/collection-rates", &[("period", period.to_string())])
            .await
    }

    pub async fn overdue_payments(&self) -> Result<OverdueSummary> {
        self.get("/dashboard/overdue-payments").await
    }
}
