//! Logging setup
//!
//! Diagnostics go to stderr through `tracing` so stdout only carries task
//! output and can be piped.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for the given verbosity
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "taskwait=debug,info"
    } else {
        "taskwait=info,warn"
    }
}

/// Initialize logging; `RUST_LOG` overrides the default filter
pub fn init_logging(verbose: bool) {
    let filter = default_filter(verbose);

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
