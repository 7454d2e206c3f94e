//! Locguard CLI - Command-line utility for guarded file access inside a
//! trusted project root.

mod cli;
mod commands;
mod error;
mod output;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use cli::Cli;
use cli::Commands;
use locguard_core::PathGuard;
use locguard_core::audit::RotatingFileSink;
use locguard_core::audit::SecurityLogger;
use locguard_core::audit::install_default_logger;
use output::OutputFormatter;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.effective_log_level());

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match run(&cli, &*formatter) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected subcommand, returning `false` when it completed but
/// rejected some input.
fn run(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<bool> {
    match &cli.command {
        Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            return Ok(true);
        }
        Commands::Sanitize(args) => {
            commands::sanitize::execute(args, formatter, io::stdin().lock())?;
            return Ok(true);
        }
        _ => {}
    }

    if install_default_logger(build_logger(cli)?).is_err() {
        tracing::debug!("security logger already installed");
    }

    let guard = match &cli.base {
        Some(base) => PathGuard::new(base)
            .with_context(|| format!("invalid project root '{}'", base.display()))?,
        None => PathGuard::current_dir().context("cannot use the current directory as root")?,
    };

    match &cli.command {
        Commands::Check(args) => return commands::check::execute(args, &guard, formatter),
        Commands::Read(args) => commands::read::execute(args, &guard, formatter)?,
        Commands::Write(args) => {
            commands::write::execute(args, &guard, formatter, io::stdin().lock())?;
        }
        Commands::Ls(args) => commands::ls::execute(args, &guard, formatter)?,
        Commands::Mkdir(args) => commands::mkdir::execute(args, &guard, formatter)?,
        Commands::Rm(args) => commands::rm::execute(args, &guard, formatter)?,
        Commands::Stat(args) => commands::stat::execute(args, &guard, formatter)?,
        Commands::Sanitize(_) | Commands::Completion(_) => {}
    }
    Ok(true)
}

/// Builds the security logger, attaching a rotating audit file when
/// `--audit-log` is given.
fn build_logger(cli: &Cli) -> Result<SecurityLogger> {
    let logger = SecurityLogger::new("locguard-cli");
    let Some(path) = &cli.audit_log else {
        return Ok(logger);
    };

    let sink = RotatingFileSink::new(path, cli.audit_log_max_size, cli.audit_log_keep)
        .with_context(|| format!("cannot open audit log '{}'", path.display()))?;
    Ok(logger.with_sink(sink))
}

/// Initialize the logging subsystem.
///
/// `RUST_LOG` directives are honored, with `level` added as the default.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(io::stderr)
        .init();
}
