//! expire command - Delete every object older than a day threshold
//!
//! Lists all versions of all objects in the bound bucket and deletes the
//! ones whose age in whole days is at least the threshold. Per-object
//! failures are reported at the end but never stop the scan.

use clap::Args;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use bkt_core::StorageSession;

/// Delete all objects at or past an age threshold
#[derive(Args, Debug)]
pub struct ExpireArgs {
    /// Age threshold in whole days, inclusive. An object created 30 days
    /// and 23 hours ago has age 30; one at 29 days 23 hours has age 29
    /// and survives a threshold of 30.
    #[arg(long = "older-than-days", default_value_t = 30)]
    pub older_than_days: i64,
}

/// Execute the expire command
pub async fn execute(
    args: ExpireArgs,
    session: &StorageSession,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if args.older_than_days < 0 {
        formatter.error("--older-than-days must be zero or positive");
        return ExitCode::UsageError;
    }

    let report = match session.delete_older_than(args.older_than_days).await {
        Ok(report) => report,
        Err(e) => {
            formatter.error(&format!("Sweep aborted: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&report);
    } else {
        formatter.println(&format!(
            "Sweep of '{}' complete: {} visited, {} deleted, {} failed (threshold {} days)",
            session.bucket(),
            report.visited,
            report.deleted,
            report.failures.len(),
            report.threshold_days
        ));
        for (key, message) in &report.failures {
            formatter.error(&format!("Could not delete '{key}': {message}"));
        }
    }

    if report.is_clean() {
        ExitCode::Success
    } else {
        ExitCode::GeneralError
    }
}
