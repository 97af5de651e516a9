//! Filter and sort abstractions for list views.
//!
//! Each resource defines its own filter struct with one `Option` per
//! constraint; `None` is the only spelling for "unconstrained" (there is no
//! `"all"` sentinel value). The trait turns a filter into query-string
//! pairs, so the translation is testable without any network code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A conjunction of optional constraints over one resource kind.
pub trait ListFilter: Clone + PartialEq {
    /// Query-string pairs for the constrained fields only.
    fn query_pairs(&self) -> Vec<(&'static str, String)>;

    fn is_unconstrained(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

/// No-filter marker for list endpoints without constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unfiltered;

impl ListFilter for Unfiltered {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Sort direction for `sort_order` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
