//! Rm command implementation

use crate::cli::PathArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use locguard_core::PathGuard;

pub fn execute(args: &PathArgs, guard: &PathGuard, formatter: &dyn OutputFormatter) -> Result<()> {
    add_path_context(guard.try_remove(&args.path), &args.path)?;
    formatter.format_success("rm", &format!("Removed {}", args.path));
    Ok(())
}
