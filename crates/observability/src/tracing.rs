//! Process-wide log setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset. Catalog HTTP client internals are
/// noisy at `info`.
pub const DEFAULT_FILTER: &str = "info,hyper=warn,hyper_util=warn,reqwest=warn";

/// Install the JSON subscriber.
///
/// Only the first call installs anything; later calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_target(false)
        .try_init();
}
