//! Tandem CLI - dual-target asset build pipeline.
//!
//! Entry point: parses arguments, initializes logging and dispatches to
//! the selected command.

use clap::Parser;
use miette::Result;
use tandem_cli::{cli, commands, error, logger};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build::execute(build_args).await,
        cli::Command::Dev(dev_args) => commands::dev::execute(dev_args).await,
    };

    result.map_err(error::into_miette)
}
