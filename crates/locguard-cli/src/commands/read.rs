//! Read command implementation

use crate::cli::ReadArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use locguard_core::PathGuard;
use locguard_core::SanitizeOptions;
use std::path::Path;

pub fn execute(args: &ReadArgs, guard: &PathGuard, formatter: &dyn OutputFormatter) -> Result<()> {
    let options = SanitizeOptions::default().with_extensions(&args.extensions);
    let content = add_path_context(guard.secure_read(&args.path, &options), &args.path)?;
    formatter.format_content(Path::new(&args.path), &content)
}
