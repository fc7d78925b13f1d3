//! get command - Download objects into local files
//!
//! Each object streams straight to disk without full buffering. The
//! remote stream is opened before the local file is created, so a bad
//! key leaves nothing behind; a mid-stream failure leaves the file
//! truncated.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use bkt_core::StorageSession;

/// Download one or more objects, named after their keys
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Object key(s) to download
    #[arg(required = true)]
    pub keys: Vec<String>,

    /// Directory to write into (default: current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    bucket: String,
    downloaded: Vec<DownloadedObject>,
}

#[derive(Debug, Serialize)]
struct DownloadedObject {
    key: String,
    bytes: u64,
}

/// Execute the get command
pub async fn execute(
    args: GetArgs,
    session: &StorageSession,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let mut downloaded = Vec::new();
    for key in &args.keys {
        let result = match &args.output_dir {
            Some(dir) => session.download_object_to(key, &dir.join(key)).await,
            None => session.download_object(key).await,
        };

        match result {
            Ok(bytes) => {
                formatter.success(&format!(
                    "Downloaded '{}' ({})",
                    formatter.style_key(key),
                    formatter.style_size(&humansize::format_size(bytes, humansize::BINARY))
                ));
                downloaded.push(DownloadedObject {
                    key: key.clone(),
                    bytes,
                });
            }
            Err(e) => {
                formatter.error(&format!("Failed to download '{key}': {e}"));
                return ExitCode::from_error(&e);
            }
        }
    }

    if formatter.is_json() {
        formatter.json(&GetOutput {
            bucket: session.bucket().to_string(),
            downloaded,
        });
    }

    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_output_serialization() {
        let output = GetOutput {
            bucket: "data".to_string(),
            downloaded: vec![DownloadedObject {
                key: "report.csv".to_string(),
                bytes: 2048,
            }],
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"key\":\"report.csv\""));
        assert!(json.contains("\"bytes\":2048"));
    }
}
