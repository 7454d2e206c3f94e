//! Write command implementation

use crate::cli::WriteArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use locguard_core::PathGuard;
use locguard_core::WriteOptions;
use std::io::Read;

pub fn execute(
    args: &WriteArgs,
    guard: &PathGuard,
    formatter: &dyn OutputFormatter,
    input: impl Read,
) -> Result<()> {
    let mut data = Vec::new();
    input
        .take(locguard_core::MAX_FILE_SIZE + 1)
        .read_to_end(&mut data)
        .context("failed to read data from stdin")?;

    let options = WriteOptions {
        create_parents: !args.no_create_parents,
        ..Default::default()
    };
    add_path_context(guard.try_write(&args.path, &data, &options), &args.path)?;

    formatter.format_success("write", &format!("Wrote {} bytes to {}", data.len(), args.path));
    Ok(())
}
