//! Log output for the command-line tool.
//!
//! The library emits `log` records; the tracing subscriber below collects
//! them together with the tool's own events and writes to stderr, leaving
//! stdout to the JSON results.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber, filtered by RUST_LOG (`info` when unset)
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Module targets are enough to tell generator, engine and table apart
    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry().with(filter).with(stderr).init();

    tracing::debug!("stderr logging ready");
}

/// Report how long a command step took, warning once it crosses `slow_after_ms`
///
/// `detail` carries step context such as the algorithm that produced a
/// fixture list.
pub fn log_timing(step: &str, elapsed_ms: u64, slow_after_ms: u64, detail: Option<&str>) {
    if elapsed_ms > slow_after_ms {
        tracing::warn!(
            step,
            elapsed_ms,
            slow_after_ms,
            detail,
            "{step} took longer than expected"
        );
    } else {
        tracing::debug!(step, elapsed_ms, detail, "{step} finished");
    }
}
