//! Stat command implementation

use crate::cli::PathArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use crate::output::StatReport;
use anyhow::Result;
use locguard_core::PathGuard;
use std::path::Path;

pub fn execute(args: &PathArgs, guard: &PathGuard, formatter: &dyn OutputFormatter) -> Result<()> {
    let metadata = add_path_context(guard.secure_stat(&args.path), &args.path)?;
    formatter.format_stat(&StatReport::new(Path::new(&args.path), &metadata))
}
