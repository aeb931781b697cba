//! Command-line interface definition.
//!
//! - `tandem build` - one-shot build generation (mode from flag or env)
//! - `tandem dev` - development watch loop with incremental rebuilds

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tandem_config::BuildMode;

/// Tandem - dual-target asset build pipeline
#[derive(Parser, Debug)]
#[command(
    name = "tandem",
    version,
    about = "Compile one source tree into browser and server deployment artifacts",
    long_about = "Tandem compiles a single application source tree into two deployment\n\
                  artifacts: a hashed, optimized browser bundle and a server-executable\n\
                  bundle with natively resolved dependencies, plus a manifest mapping\n\
                  source names to deployed artifact names."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one build generation and exit
    Build(BuildArgs),
    /// Watch the source tree and rebuild incrementally
    Dev(DevArgs),
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Build mode; defaults to the TANDEM_ENV environment variable
    /// (production when unset)
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,

    /// Path to the configuration template
    /// (default: <project-root>/tandem.config.json when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project root directory (default: current directory)
    #[arg(long)]
    pub project_root: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DevArgs {
    /// Path to the configuration template
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project root directory (default: current directory)
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Backend port for the development proxy; defaults to the PORT
    /// environment variable, then the template value
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Debounce window for file-change events, in milliseconds
    #[arg(long, default_value_t = 150)]
    pub debounce_ms: u64,
}

/// CLI-facing build mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Development,
    Production,
}

impl From<Mode> for BuildMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Development => BuildMode::Development,
            Mode::Production => BuildMode::Production,
        }
    }
}
