//! Logging setup for the Tandem CLI.
//!
//! Structured logging through the `tracing` ecosystem. `--verbose`
//! enables debug output for the tandem crates, `--quiet` restricts output
//! to errors, and `RUST_LOG` overrides both defaults.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("tandem_cli=debug,tandem_pipeline=debug,tandem_config=debug")
    } else if quiet {
        EnvFilter::new("tandem_cli=error,tandem_pipeline=error,tandem_config=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("tandem_cli=info,tandem_pipeline=info,tandem_config=info")
        })
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_ansi(!no_color)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
