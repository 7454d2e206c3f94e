//! Sanitize command implementation

use crate::cli::SanitizeArgs;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use locguard_core::InputOptions;
use locguard_core::security::sanitize_input;
use std::io::Read;

pub fn execute(args: &SanitizeArgs, formatter: &dyn OutputFormatter, input: impl Read) -> Result<()> {
    let text = match &args.text {
        Some(text) => text.clone(),
        None => {
            let mut buffer = String::new();
            input
                .take(locguard_core::MAX_FILE_SIZE)
                .read_to_string(&mut buffer)
                .context("failed to read text from stdin")?;
            buffer
        }
    };

    let options = InputOptions {
        max_length: args.max_length,
        strip_tags: !args.keep_tags,
    };
    formatter.format_sanitized(&sanitize_input(&text, &options))
}
