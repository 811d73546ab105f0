//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "LLMAUDIT_LOG";

static INIT: Once = Once::new();

/// Initialize logging to stderr.
///
/// Reads `LLMAUDIT_LOG` (e.g. `LLMAUDIT_LOG=llmaudit=debug`), falling back to
/// `default_filter` when unset or invalid. Safe to call more than once.
pub fn init(default_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .with(filter)
            .init();
    });
}
