//! Installs the `tracing` subscriber for the process.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive that overrides the
/// level chosen from `--quiet` / `--verbose`.
pub const LOG_ENV: &str = "CATALYZE_LOG";

/// The default filter directive for the given flags.
pub fn default_directive(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Installs a stderr subscriber. A second call is a no-op.
pub fn init_tracing(quiet: bool, verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet, verbose)));
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .try_init();
}
