//! Generic paginated list controller.
//!
//! One controller instance owns the full lifecycle of a filterable,
//! sortable, paginated view over a single resource kind: the active
//! filters, page, page size, selection set, and the items themselves.
//! Fetches go through the [`PageFetcher`] seam so views, tests and the
//! real [`crate::ApiClient`] all drive the same state machine.
//!
//! Ordering: every issued fetch takes a generation number; a response is
//! applied only if no newer fetch has been issued since. Stale responses
//! are discarded without touching state, so the most recently issued
//! request always wins, even when an earlier one resolves later.

use crate::bulk::{self, BulkAction, BulkBackend, BulkOutcome};
use async_trait::async_trait;
use rentfolio_common::{ApiError, Result};
use rentfolio_core::filter::ListFilter;
use rentfolio_core::pagination::{clamp_page, PageRequest, PageResult};
use rentfolio_core::selection::SelectionSet;
use std::sync::Mutex;

/// Anything with a stable backend-assigned identifier.
pub trait HasId {
    fn id(&self) -> &str;
}

/// The fetch seam between a controller and its data source.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    type Filter: ListFilter + Send + Sync;
    type Item: Clone + HasId + Send;

    async fn fetch_page(
        &self,
        filters: &Self::Filter,
        page: PageRequest,
    ) -> Result<PageResult<Self::Item>>;
}

/// A read-only copy of the controller state, cheap enough to hand to a
/// view layer on every render.
#[derive(Debug, Clone)]
pub struct ListSnapshot<T, F> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub filters: F,
    pub limit: u32,
    pub selected: Vec<String>,
}

struct Inner<T, F> {
    items: Vec<T>,
    loading: bool,
    error: Option<String>,
    page: u32,
    total_pages: u32,
    total_items: u64,
    filters: F,
    limit: u32,
    selection: SelectionSet,
    /// Generation of the most recently issued fetch.
    issued: u64,
    /// Whether any fetch has ever succeeded (controls the
    /// stale-data-beats-empty rule on failure).
    loaded_once: bool,
}

pub struct ListController<F: PageFetcher> {
    fetcher: F,
    inner: Mutex<Inner<F::Item, F::Filter>>,
}

impl<F: PageFetcher> ListController<F> {
    pub fn new(fetcher: F, filters: F::Filter, limit: u32) -> Result<Self> {
        if limit == 0 {
            return Err(ApiError::validation("limit must be at least 1"));
        }
        Ok(Self {
            fetcher,
            inner: Mutex::new(Inner {
                items: Vec::new(),
                loading: false,
                error: None,
                page: 1,
                total_pages: 0,
                total_items: 0,
                filters,
                limit,
                selection: SelectionSet::new(),
                issued: 0,
                loaded_once: false,
            }),
        })
    }

    /// Initial fetch with the constructor's parameters.
    pub async fn load(&self) {
        self.refetch().await;
    }

    /// Replace the filter set, reset to page 1, clear the selection and
    /// re-fetch. Structurally identical filters are a no-op: no fetch is
    /// issued.
    pub async fn set_filters(&self, filters: F::Filter) {
        let params = {
            let mut inner = self.lock();
            if inner.filters == filters {
                return;
            }
            inner.filters = filters;
            inner.page = 1;
            inner.selection.clear();
            Self::begin_fetch(&mut inner)
        };
        self.run_fetch(params).await;
    }

    /// Move to page `n`, clamped into `[1, max(total_pages, 1)]`. A no-op
    /// (no fetch) when the clamped page equals the current one.
    pub async fn set_page(&self, n: u32) {
        let params = {
            let mut inner = self.lock();
            let clamped = clamp_page(n, inner.total_pages);
            if clamped == inner.page {
                return;
            }
            inner.page = clamped;
            inner.selection.clear();
            Self::begin_fetch(&mut inner)
        };
        self.run_fetch(params).await;
    }

    /// Replace the page size, reset to page 1, clear the selection and
    /// re-fetch. A no-op when the size is unchanged.
    pub async fn set_limit(&self, limit: u32) -> Result<()> {
        let params = {
            let mut inner = self.lock();
            if limit == 0 {
                return Err(ApiError::validation("limit must be at least 1"));
            }
            if limit == inner.limit {
                return Ok(());
            }
            inner.limit = limit;
            inner.page = 1;
            inner.selection.clear();
            Self::begin_fetch(&mut inner)
        };
        self.run_fetch(params).await;
        Ok(())
    }

    /// Re-issue the list call with the current filters, page and limit.
    /// The selection is re-validated against the fresh items rather than
    /// cleared.
    pub async fn refetch(&self) {
        let params = {
            let mut inner = self.lock();
            Self::begin_fetch(&mut inner)
        };
        self.run_fetch(params).await;
    }

    // ===== Selection =====

    /// Toggle one visible item. Ids not on the current page are ignored.
    pub fn toggle_selected(&self, id: &str) -> bool {
        let mut inner = self.lock();
        if !inner.items.iter().any(|item| item.id() == id) {
            return false;
        }
        inner.selection.toggle(id)
    }

    pub fn select_all_visible(&self) {
        let mut inner = self.lock();
        let visible: Vec<String> = inner.items.iter().map(|item| item.id().to_string()).collect();
        inner.selection.select_all(visible.iter().map(String::as_str));
    }

    pub fn clear_selection(&self) {
        self.lock().selection.clear();
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.lock().selection.ids()
    }

    // ===== Bulk actions =====

    /// Run a bulk action over the current selection. The selection is
    /// cleared before dispatch, so it never survives the attempt, whatever
    /// the outcome. Mutating actions that succeed for at least one item
    /// trigger a refetch.
    pub async fn run_bulk<B>(&self, backend: &B, action: BulkAction) -> Result<BulkOutcome>
    where
        B: BulkBackend<Filter = F::Filter>,
    {
        let (ids, filters) = {
            let mut inner = self.lock();
            (inner.selection.take_ids(), inner.filters.clone())
        };
        let outcome = bulk::dispatch(backend, action, &ids, &filters).await;
        if let Ok(result) = &outcome {
            if action.is_mutation() && result.succeeded > 0 {
                self.refetch().await;
            }
        }
        outcome
    }

    // ===== State access =====

    pub fn snapshot(&self) -> ListSnapshot<F::Item, F::Filter> {
        let inner = self.lock();
        ListSnapshot {
            items: inner.items.clone(),
            loading: inner.loading,
            error: inner.error.clone(),
            page: inner.page,
            total_pages: inner.total_pages,
            total_items: inner.total_items,
            filters: inner.filters.clone(),
            limit: inner.limit,
            selected: inner.selection.ids(),
        }
    }

    // ===== Fetch plumbing =====

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<F::Item, F::Filter>> {
        // No await ever runs under the guard.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_fetch(inner: &mut Inner<F::Item, F::Filter>) -> (u64, F::Filter, PageRequest) {
        inner.issued += 1;
        inner.loading = true;
        inner.error = None;
        (
            inner.issued,
            inner.filters.clone(),
            PageRequest {
                page: inner.page,
                limit: inner.limit,
            },
        )
    }

    async fn run_fetch(&self, (generation, filters, page): (u64, F::Filter, PageRequest)) {
        let result = self.fetcher.fetch_page(&filters, page).await;

        let mut inner = self.lock();
        if generation != inner.issued {
            // A newer fetch was issued while this one was in flight; its
            // result (and its loading flag) belong to that newer fetch.
            tracing::debug!(generation, latest = inner.issued, "discarding stale page response");
            return;
        }
        inner.loading = false;

        match result {
            Ok(fresh) => {
                inner.items = fresh.items;
                inner.total_items = fresh.total_items;
                inner.total_pages = fresh.total_pages;
                inner.page = clamp_page(inner.page, inner.total_pages);
                inner.error = None;
                inner.loaded_once = true;

                let visible: Vec<String> =
                    inner.items.iter().map(|item| item.id().to_string()).collect();
                inner.selection.retain_visible(visible.iter().map(String::as_str));
            }
            Err(err) => {
                // Keep the last good items; only a never-loaded view
                // shows empty on failure.
                inner.error = Some(err.to_string());
                if !inner.loaded_once {
                    inner.items.clear();
                }
            }
        }
    }
}
