//! Check command implementation

use crate::cli::CheckArgs;
use crate::output::CheckOutcome;
use crate::output::OutputFormatter;
use anyhow::Result;
use locguard_core::PathGuard;
use locguard_core::SanitizeOptions;

/// Validates every candidate and reports each outcome.
///
/// Returns `true` when all candidates were accepted.
pub fn execute(args: &CheckArgs, guard: &PathGuard, formatter: &dyn OutputFormatter) -> Result<bool> {
    let options = SanitizeOptions {
        allow_absolute: args.allow_absolute,
        create_if_not_exists: args.create,
        ..Default::default()
    }
    .with_extensions(&args.extensions);

    let outcomes: Vec<CheckOutcome> = args
        .paths
        .iter()
        .map(|candidate| match guard.try_validate(candidate, &options) {
            Ok(resolved) => CheckOutcome {
                candidate: candidate.clone(),
                accepted: true,
                resolved: Some(resolved.as_path().display().to_string()),
                relative: Some(resolved.relative().display().to_string()),
                kind: None,
                error: None,
            },
            Err(err) => CheckOutcome {
                candidate: candidate.clone(),
                accepted: false,
                resolved: None,
                relative: None,
                kind: Some(err.kind()),
                error: Some(err.to_string()),
            },
        })
        .collect();

    formatter.format_check_results(&outcomes)?;
    Ok(outcomes.iter().all(|outcome| outcome.accepted))
}
