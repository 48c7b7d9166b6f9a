//! `mounts` command-line entry point.
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use mounts_cli::cli::{Cli, Command};
use mounts_cli::commands;
use mounts_cli::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let name = args.command.name();
    let quiet = matches!(&args.command, Command::Plan(opts) if opts.json);
    logging::init_subscriber(args.verbose, quiet, name);
    let log = Arc::new(Logger::new(name));

    match args.command {
        Command::Apply(opts) => commands::apply::run(&args.global, &opts, &log),
        Command::Plan(opts) => commands::plan::run(&args.global, &opts, &log),
        Command::Remove(opts) => commands::remove::run(&args.global, &opts, &log),
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
