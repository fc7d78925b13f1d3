//! cat command - Print object contents to stdout
//!
//! The object is buffered fully in memory and written as raw bytes, so
//! binary payloads pass through unchanged. `--json` has no effect here:
//! the content is the output.

use std::io::Write;

use clap::Args;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use bkt_core::StorageSession;

/// Print one or more objects to stdout
#[derive(Args, Debug)]
pub struct CatArgs {
    /// Object key(s) to print
    #[arg(required = true)]
    pub keys: Vec<String>,
}

/// Execute the cat command
pub async fn execute(
    args: CatArgs,
    session: &StorageSession,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    for key in &args.keys {
        let data = match session.read_object(key).await {
            Ok(data) => data,
            Err(e) => {
                formatter.error(&format!("Failed to read '{key}': {e}"));
                return ExitCode::from_error(&e);
            }
        };

        let mut stdout = std::io::stdout().lock();
        if stdout.write_all(&data).and_then(|_| stdout.flush()).is_err() {
            // Broken pipe; nothing sensible left to report
            return ExitCode::GeneralError;
        }
    }

    ExitCode::Success
}
