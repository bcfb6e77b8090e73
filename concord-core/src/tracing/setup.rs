//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Concord tracing/logging system.
///
/// Reads the `CONCORD_LOG` environment variable for per-subsystem log
/// levels. Format: `CONCORD_LOG=masks=debug,stats=info,storage=warn`
///
/// Falls back to `concord=info` if `CONCORD_LOG` is not set or is invalid.
///
/// This function is idempotent; calling it multiple times is safe.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("CONCORD_LOG")
            .unwrap_or_else(|_| EnvFilter::new("concord=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
