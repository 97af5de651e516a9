//! State-machine tests for the paginated list controller, driven by fake
//! fetchers so every scheduling order can be pinned down.

use async_trait::async_trait;
use rentfolio_client::bulk::{BulkAction, BulkBackend};
use rentfolio_client::list::{HasId, ListController, PageFetcher};
use rentfolio_client::types::{BulkUpdateReport, ExportHandle, StatusPatch};
use rentfolio_common::types::ExportFormat;
use rentfolio_common::{ApiError, Result};
use rentfolio_core::filter::ListFilter;
use rentfolio_core::pagination::{total_pages, PageRequest, PageResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Default)]
struct RowFilter {
    status: Option<String>,
}

impl ListFilter for RowFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.status
            .as_ref()
            .map(|status| ("status", status.clone()))
            .into_iter()
            .collect()
    }
}

fn status(s: &str) -> RowFilter {
    RowFilter {
        status: Some(s.to_string()),
    }
}

#[derive(Debug, Clone)]
struct Row {
    id: String,
}

impl HasId for Row {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Rows `r-{start+1}..=r-{end}` for a dataset of `total` rows.
fn page_of(total: u64, page: PageRequest) -> PageResult<Row> {
    let start = u64::from(page.page - 1) * u64::from(page.limit);
    let end = (start + u64::from(page.limit)).min(total);
    let items = (start + 1..=end)
        .map(|i| Row {
            id: format!("r-{i}"),
        })
        .collect();
    PageResult {
        items,
        total_items: total,
        total_pages: total_pages(total, page.limit),
    }
}

/// Answers immediately from a synthetic dataset and records every request.
struct CountingFetcher {
    total: u64,
    fail: Arc<AtomicBool>,
    log: Arc<Mutex<Vec<(RowFilter, PageRequest)>>>,
}

impl CountingFetcher {
    fn new(total: u64) -> (Self, Arc<Mutex<Vec<(RowFilter, PageRequest)>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                total,
                fail: Arc::new(AtomicBool::new(false)),
                log: log.clone(),
            },
            log,
        )
    }
}

#[async_trait]
impl PageFetcher for CountingFetcher {
    type Filter = RowFilter;
    type Item = Row;

    async fn fetch_page(&self, filters: &RowFilter, page: PageRequest) -> Result<PageResult<Row>> {
        self.log.lock().unwrap().push((filters.clone(), page));
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Server {
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(page_of(self.total, page))
    }
}

#[tokio::test]
async fn forty_seven_rows_across_two_pages() {
    let (fetcher, log) = CountingFetcher::new(47);
    let controller = ListController::new(fetcher, status("unpaid"), 25).unwrap();

    controller.load().await;
    let snap = controller.snapshot();
    assert_eq!(snap.items.len(), 25);
    assert_eq!(snap.page, 1);
    assert_eq!(snap.total_items, 47);
    assert_eq!(snap.total_pages, 2);
    assert!(!snap.loading);
    assert!(snap.error.is_none());

    controller.set_page(2).await;
    let snap = controller.snapshot();
    assert_eq!(snap.page, 2);
    assert_eq!(snap.items.len(), 22);
    assert_eq!(snap.items[0].id, "r-26");

    let requests = log.lock().unwrap().clone();
    assert_eq!(
        requests,
        vec![
            (status("unpaid"), PageRequest::new(1, 25).unwrap()),
            (status("unpaid"), PageRequest::new(2, 25).unwrap()),
        ]
    );
}

#[tokio::test]
async fn identical_filters_and_pages_issue_no_fetch() {
    let (fetcher, log) = CountingFetcher::new(47);
    let controller = ListController::new(fetcher, status("unpaid"), 25).unwrap();
    controller.load().await;

    controller.set_filters(status("unpaid")).await;
    controller.set_page(1).await;
    controller.set_limit(25).await.unwrap();
    // Out-of-range pages clamp onto the last page.
    controller.set_page(99).await;
    assert_eq!(log.lock().unwrap().len(), 2);
    assert_eq!(controller.snapshot().page, 2);

    controller.set_page(2).await;
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn changing_filters_resets_to_page_one() {
    let (fetcher, log) = CountingFetcher::new(47);
    let controller = ListController::new(fetcher, status("unpaid"), 25).unwrap();
    controller.load().await;
    controller.set_page(2).await;

    controller.set_filters(status("paid")).await;
    let snap = controller.snapshot();
    assert_eq!(snap.page, 1);
    assert_eq!(snap.filters, status("paid"));

    let last = log.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last, (status("paid"), PageRequest::new(1, 25).unwrap()));
}

#[tokio::test]
async fn changing_limit_resets_to_page_one() {
    let (fetcher, _log) = CountingFetcher::new(47);
    let controller = ListController::new(fetcher, RowFilter::default(), 25).unwrap();
    controller.load().await;
    controller.set_page(2).await;

    controller.set_limit(10).await.unwrap();
    let snap = controller.snapshot();
    assert_eq!(snap.page, 1);
    assert_eq!(snap.limit, 10);
    assert_eq!(snap.total_pages, 5);
    assert_eq!(snap.items.len(), 10);

    assert!(controller.set_limit(0).await.is_err());
}

#[tokio::test]
async fn selection_tracks_visible_items_only() {
    let (fetcher, _log) = CountingFetcher::new(47);
    let controller = ListController::new(fetcher, RowFilter::default(), 25).unwrap();
    controller.load().await;

    assert!(controller.toggle_selected("r-1"));
    assert!(controller.toggle_selected("r-2"));
    // r-30 lives on page 2; not visible, so not selectable.
    assert!(!controller.toggle_selected("r-30"));
    assert_eq!(controller.selected_ids().len(), 2);

    // Toggling again deselects.
    assert!(!controller.toggle_selected("r-2"));
    assert_eq!(controller.selected_ids(), vec!["r-1".to_string()]);

    controller.select_all_visible();
    assert_eq!(controller.selected_ids().len(), 25);
    controller.clear_selection();
    assert!(controller.selected_ids().is_empty());
}

#[tokio::test]
async fn selection_never_survives_a_view_change() {
    let (fetcher, _log) = CountingFetcher::new(47);
    let controller = ListController::new(fetcher, RowFilter::default(), 25).unwrap();
    controller.load().await;

    controller.toggle_selected("r-1");
    controller.set_page(2).await;
    assert!(controller.selected_ids().is_empty());

    controller.toggle_selected("r-26");
    controller.set_filters(status("paid")).await;
    assert!(controller.selected_ids().is_empty());

    controller.toggle_selected("r-1");
    controller.set_limit(10).await.unwrap();
    assert!(controller.selected_ids().is_empty());
}

#[tokio::test]
async fn refetch_revalidates_selection_instead_of_clearing() {
    let (fetcher, log) = CountingFetcher::new(47);
    let controller = ListController::new(fetcher, RowFilter::default(), 25).unwrap();
    controller.load().await;

    controller.toggle_selected("r-1");
    controller.toggle_selected("r-3");
    controller.refetch().await;

    let mut selected = controller.selected_ids();
    selected.sort();
    assert_eq!(selected, vec!["r-1".to_string(), "r-3".to_string()]);
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn failure_after_success_keeps_stale_items() {
    let (fetcher, _log) = CountingFetcher::new(47);
    let fail = fetcher.fail.clone();
    let controller = ListController::new(fetcher, RowFilter::default(), 25).unwrap();
    controller.load().await;
    assert_eq!(controller.snapshot().items.len(), 25);

    fail.store(true, Ordering::SeqCst);
    controller.refetch().await;

    let snap = controller.snapshot();
    assert!(snap.error.is_some());
    assert_eq!(snap.items.len(), 25);
    assert!(!snap.loading);
}

#[tokio::test]
async fn failure_on_first_load_shows_empty() {
    let (fetcher, _log) = CountingFetcher::new(47);
    fetcher.fail.store(true, Ordering::SeqCst);
    let controller = ListController::new(fetcher, RowFilter::default(), 25).unwrap();
    controller.load().await;

    let snap = controller.snapshot();
    assert!(snap.error.is_some());
    assert!(snap.items.is_empty());
}

#[tokio::test]
async fn zero_limit_is_rejected_at_construction() {
    let (fetcher, _log) = CountingFetcher::new(1);
    assert!(ListController::new(fetcher, RowFilter::default(), 0).is_err());
}

// ===== Out-of-order responses =====

type Parked = Arc<Mutex<Vec<(u32, oneshot::Sender<()>)>>>;

/// Serves `immediate` requests instantly, then parks each request on a
/// oneshot channel so the test controls the order responses arrive in.
struct GatedFetcher {
    total: u64,
    immediate: AtomicU64,
    parked: Parked,
}

impl GatedFetcher {
    fn new(total: u64, immediate: u64) -> (Self, Parked) {
        let parked = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                total,
                immediate: AtomicU64::new(immediate),
                parked: parked.clone(),
            },
            parked,
        )
    }
}

#[async_trait]
impl PageFetcher for GatedFetcher {
    type Filter = RowFilter;
    type Item = Row;

    async fn fetch_page(&self, _: &RowFilter, page: PageRequest) -> Result<PageResult<Row>> {
        let budget = self.immediate.load(Ordering::SeqCst);
        if budget > 0 {
            self.immediate.store(budget - 1, Ordering::SeqCst);
            return Ok(page_of(self.total, page));
        }
        let (tx, rx) = oneshot::channel();
        self.parked.lock().unwrap().push((page.page, tx));
        let _ = rx.await;
        Ok(page_of(self.total, page))
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..100_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}

fn release(parked: &Parked, page: u32) {
    let mut parked = parked.lock().unwrap();
    let index = parked
        .iter()
        .position(|(p, _)| *p == page)
        .expect("no parked request for that page");
    let (_, tx) = parked.remove(index);
    let _ = tx.send(());
}

/// Issues page 2 then page 3 while page 2 is still in flight, releases the
/// two responses in the given order, and returns the final snapshot.
async fn race_pages(stale_resolves_last: bool) -> rentfolio_client::list::ListSnapshot<Row, RowFilter> {
    let (fetcher, parked) = GatedFetcher::new(50, 1);
    let controller = ListController::new(fetcher, RowFilter::default(), 10).unwrap();
    controller.load().await;

    let drive = async {
        tokio::join!(controller.set_page(2), async {
            wait_until(|| parked.lock().unwrap().len() == 1).await;
            controller.set_page(3).await;
        });
    };
    let referee = async {
        wait_until(|| parked.lock().unwrap().len() == 2).await;
        let order = if stale_resolves_last { [3, 2] } else { [2, 3] };
        release(&parked, order[0]);
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        release(&parked, order[1]);
    };
    tokio::join!(drive, referee);

    controller.snapshot()
}

#[tokio::test]
async fn newest_request_wins_when_stale_resolves_last() {
    let snap = race_pages(true).await;
    assert_eq!(snap.page, 3);
    assert_eq!(snap.items[0].id, "r-21");
    assert!(!snap.loading);
    assert!(snap.error.is_none());
}

#[tokio::test]
async fn newest_request_wins_when_stale_resolves_first() {
    let snap = race_pages(false).await;
    assert_eq!(snap.page, 3);
    assert_eq!(snap.items[0].id, "r-21");
    assert!(!snap.loading);
    assert!(snap.error.is_none());
}

// ===== Bulk actions through the controller =====

struct FakeBulk {
    updated_count: u64,
    fail: bool,
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl BulkBackend for FakeBulk {
    type Filter = RowFilter;

    async fn bulk_update(&self, ids: &[String], patch: &StatusPatch) -> Result<BulkUpdateReport> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("update {} -> {}", ids.len(), patch.status));
        if self.fail {
            return Err(ApiError::Server {
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(BulkUpdateReport {
            updated_count: self.updated_count,
        })
    }

    async fn export(&self, filters: &RowFilter, format: ExportFormat) -> Result<ExportHandle> {
        self.calls.lock().unwrap().push(format!(
            "export {format} {:?}",
            filters.status.as_deref()
        ));
        Ok(ExportHandle {
            download_url: "https://x/export".to_string(),
            file_name: None,
        })
    }

    async fn send_reminder(&self, id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("remind {id}"));
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("delete {id}"));
        Ok(())
    }
}

#[tokio::test]
async fn bulk_mutation_clears_selection_and_refetches() {
    let (fetcher, log) = CountingFetcher::new(47);
    let controller = ListController::new(fetcher, RowFilter::default(), 25).unwrap();
    controller.load().await;
    controller.select_all_visible();

    let backend = FakeBulk {
        updated_count: 25,
        fail: false,
        calls: Mutex::new(Vec::new()),
    };
    let outcome = controller
        .run_bulk(&backend, BulkAction::MarkPaid)
        .await
        .unwrap();

    assert_eq!(outcome.succeeded, 25);
    assert!(controller.selected_ids().is_empty());
    assert_eq!(
        backend.calls.lock().unwrap().as_slice(),
        ["update 25 -> paid"]
    );
    // Initial load plus the post-mutation refetch.
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn partial_bulk_failure_still_clears_selection_and_refetches() {
    let (fetcher, log) = CountingFetcher::new(47);
    let controller = ListController::new(fetcher, RowFilter::default(), 25).unwrap();
    controller.load().await;
    for i in 1..=5 {
        controller.toggle_selected(&format!("r-{i}"));
    }

    let backend = FakeBulk {
        updated_count: 3,
        fail: false,
        calls: Mutex::new(Vec::new()),
    };
    let outcome = controller
        .run_bulk(&backend, BulkAction::MarkOverdue)
        .await
        .unwrap();

    assert_eq!(outcome.succeeded, 3);
    assert_eq!(outcome.failed, 2);
    assert!(outcome.is_partial_failure());
    assert!(controller.selected_ids().is_empty());
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn failed_bulk_clears_selection_without_refetch() {
    let (fetcher, log) = CountingFetcher::new(47);
    let controller = ListController::new(fetcher, RowFilter::default(), 25).unwrap();
    controller.load().await;
    controller.toggle_selected("r-1");

    let backend = FakeBulk {
        updated_count: 0,
        fail: true,
        calls: Mutex::new(Vec::new()),
    };
    let err = controller
        .run_bulk(&backend, BulkAction::MarkPaid)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Server { .. }));
    assert!(controller.selected_ids().is_empty());
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn bulk_export_uses_current_filters_and_skips_refetch() {
    let (fetcher, log) = CountingFetcher::new(47);
    let controller = ListController::new(fetcher, status("unpaid"), 25).unwrap();
    controller.load().await;
    controller.toggle_selected("r-1");

    let backend = FakeBulk {
        updated_count: 0,
        fail: false,
        calls: Mutex::new(Vec::new()),
    };
    let outcome = controller
        .run_bulk(&backend, BulkAction::ExportExcel)
        .await
        .unwrap();

    assert!(outcome.export.is_some());
    assert_eq!(
        backend.calls.lock().unwrap().as_slice(),
        ["export excel Some(\"unpaid\")"]
    );
    assert_eq!(log.lock().unwrap().len(), 1);
}
