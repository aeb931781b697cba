//! CLI error layering over the pipeline and config crates.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] tandem_config::ConfigError),

    #[error(transparent)]
    Pipeline(#[from] tandem_pipeline::PipelineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),
}

/// Convert a CLI error into a miette report for terminal rendering.
///
/// Pipeline errors carry their own diagnostic codes and help text; other
/// variants render as plain messages.
pub fn into_miette(err: CliError) -> miette::Report {
    match err {
        CliError::Pipeline(e) => miette::Report::new(e),
        other => miette::Report::msg(other.to_string()),
    }
}
