//! logging
//!
//! Diagnostic logging setup.
//!
//! Events go to stderr so command output on stdout stays parseable.
//! `RUST_LOG` wins when set; otherwise `--debug` enables `refcode=debug`
//! and the default is `warn`.
//!
//! Events may carry reference codes but never name, email, or phone.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Default filter directive for the given debug flag.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "refcode=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(debug: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(debug)
                    .compact(),
            )
            .try_init();
    });
}
