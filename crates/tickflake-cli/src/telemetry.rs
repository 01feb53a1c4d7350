//! Structured logging for the `tickflake` binary.
//!
//! Logs go to stderr; stdout carries only IDs and decoded fields.
//!
//! - Filtering comes from `RUST_LOG`, defaulting to `info`.
//! - Each line carries the thread ID, file and line, and a local RFC 3339
//!   timestamp.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global `tracing-subscriber` formatter.
///
/// Silently does nothing if a global subscriber is already installed.
pub fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_span_events(FmtSpan::NONE)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .try_init();
}
