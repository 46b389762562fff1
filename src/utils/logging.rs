//! Tracing setup for binaries and tests embedding this library.

use tracing_subscriber::EnvFilter;

/// Initializes a compact stdout subscriber honoring `RUST_LOG`.
///
/// Falls back to `info` when no filter is set. Safe to call more than once;
/// subsequent calls are no-ops because a global subscriber is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_target(false)
        .with_writer(std::io::stdout)
        .compact()
        .try_init();
}
