//! # Logging Setup
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=cafe=trace` - Show trace for cafe crates only
//! - Default: `info,cafe=debug,sqlx=warn`

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,cafe=debug,sqlx=warn";

/// Installs the global tracing subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
