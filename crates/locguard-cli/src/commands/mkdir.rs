//! Mkdir command implementation

use crate::cli::MkdirArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use locguard_core::MkdirOptions;
use locguard_core::PathGuard;

pub fn execute(args: &MkdirArgs, guard: &PathGuard, formatter: &dyn OutputFormatter) -> Result<()> {
    let options = MkdirOptions {
        recursive: args.parents,
        ..Default::default()
    };

    let created = add_path_context(guard.try_create_dir(&args.path, &options), &args.path)?;
    formatter.format_success("mkdir", &format!("Directory ready: {created}"));
    Ok(())
}
