//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Ember tracing/logging system.
///
/// Reads the `EMBER_LOG` environment variable for per-module log levels.
/// Format: `EMBER_LOG=ember_learning=debug,ember_delivery=info`
///
/// Falls back to `ember=info` if `EMBER_LOG` is not set or is invalid.
/// Calling it more than once is a no-op.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("EMBER_LOG").unwrap_or_else(|_| EnvFilter::new("ember=info"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
