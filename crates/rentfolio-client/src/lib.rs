//! Data-access layer for the Rentfolio property-management dashboard.
//!
//! Three pieces live here:
//! - [`client::ApiClient`] — a thin REST client over the backend, with a
//!   uniform error envelope and per-request structured logging;
//! - [`list::ListController`] — the generic filter/paginate/select state
//!   machine shared by the bill, payment and tenant list views;
//! - [`bulk`] — the dispatcher mapping a bulk-action keyword onto the
//!   right client calls and reporting aggregate outcome.

pub mod bills;
pub mod bulk;
pub mod client;
pub mod dashboard;
pub mod list;
pub mod payments;
pub mod tenants;
pub mod types;

pub use bulk::{BulkAction, BulkBackend, BulkOutcome};
pub use client::{ApiClient, ClientBuilder};
pub use list::{HasId, ListController, PageFetcher};
pub use rentfolio_common::{ApiError, Result};
