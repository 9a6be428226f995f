//! Logging initialization for wizard drivers.
//!
//! The engine itself only emits `tracing` events; drivers (and tests) call
//! this to get a subscriber. Logs go to stderr so they never interleave
//! with a terminal driver's rendering on stdout.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr.
///
/// The level defaults to `info` (`debug` with `debug_override`) and is
/// superseded by `RUST_LOG` when set.
pub fn init_logging(debug_override: bool) -> Result<()> {
    let default_level = if debug_override { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}
