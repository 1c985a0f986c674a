//! Log subscriber setup shared by the runner binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the fmt subscriber. `RUST_LOG` wins when set; otherwise the
/// configured level is applied as a bare directive so events from every
/// target pass the filter — the runner binaries emit under their own targets
/// (`ingest_runner`, `evaluation_runner`), not under the library crate name.
pub fn init(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(default_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(level)
}
