//! rm command - Delete objects from the bound bucket
//!
//! Keys are deleted in the order given; the first failure aborts the
//! batch. Deleting an absent key fails with exit code 5, never silently.

use clap::Args;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use bkt_core::StorageSession;

/// Delete one or more objects
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object key(s) to delete
    #[arg(required = true)]
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    bucket: String,
    deleted: Vec<String>,
}

/// Execute the rm command
pub async fn execute(
    args: RmArgs,
    session: &StorageSession,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let mut deleted = Vec::new();
    for key in &args.keys {
        if let Err(e) = session.delete_object(key).await {
            formatter.error(&format!("Failed to delete '{key}': {e}"));
            return ExitCode::from_error(&e);
        }
        formatter.success(&format!(
            "Deleted '{}' from '{}'",
            formatter.style_key(key),
            formatter.style_name(session.bucket())
        ));
        deleted.push(key.clone());
    }

    if formatter.is_json() {
        formatter.json(&RmOutput {
            bucket: session.bucket().to_string(),
            deleted,
        });
    }

    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rm_output_serialization() {
        let output = RmOutput {
            bucket: "data".to_string(),
            deleted: vec!["stale.log".to_string()],
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"deleted\":[\"stale.log\"]"));
    }
}
