//! Pure business logic for the Rentfolio dashboard.
//!
//! Nothing in this crate performs I/O; everything is synchronous and
//! deterministic, which keeps it fully testable without a backend.

pub mod billing;
pub mod filter;
pub mod format;
pub mod pagination;
pub mod selection;

pub use billing::{compute_bill_total, BillDraft, ChargeInput};
pub use filter::{ListFilter, SortOrder};
pub use pagination::{PageRequest, PageResult};
pub use selection::SelectionSet;
