//! Unified logging initialization for applications embedding Rentfolio.
//!
//! Respects `RUST_LOG` when set, otherwise falls back to the caller's
//! default filter.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with the given default filter.
///
/// # Example
///
/// ```no_run
/// use rentfolio_common::logging;
///
/// logging::init_logging("rentfolio_client=debug").unwrap();
/// ```
pub fn init_logging(default_filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();

    Ok(())
}
