//! Ls command implementation

use crate::cli::LsArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use locguard_core::PathGuard;
use locguard_core::ReaddirOptions;
use std::path::Path;

pub fn execute(args: &LsArgs, guard: &PathGuard, formatter: &dyn OutputFormatter) -> Result<()> {
    let options = ReaddirOptions {
        allowed_subdirs: args.allowed_subdirs.clone(),
        verify_entries: args.verify_links,
        recursive: args.recursive,
        ..Default::default()
    };

    let entries = add_path_context(guard.read_dir(&args.path, &options), &args.path)?;
    formatter.format_listing(Path::new(&args.path), &entries)
}
