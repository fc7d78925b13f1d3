//! put command - Upload local files to the bound bucket
//!
//! Files are uploaded in the order given; the first failure aborts the
//! batch and the remaining files are never attempted. Already-uploaded
//! files stay uploaded.

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use bkt_core::StorageSession;

/// Upload one or more local files, keyed by their file names
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file path(s); each becomes the object key
    #[arg(required = true)]
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    bucket: String,
    uploaded: Vec<String>,
}

/// Execute the put command
pub async fn execute(
    args: PutArgs,
    session: &StorageSession,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let progress = if args.files.len() > 1 && !formatter.is_quiet() && !formatter.is_json() {
        let pb = ProgressBar::new(args.files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("valid template")
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut uploaded = Vec::new();
    for file in &args.files {
        if let Some(pb) = &progress {
            pb.set_message(file.clone());
        }

        if let Err(e) = session.upload_object(file).await {
            if let Some(pb) = &progress {
                pb.abandon();
            }
            formatter.error(&format!("Failed to upload '{file}': {e}"));
            if !uploaded.is_empty() {
                formatter.warning(&format!(
                    "{} file(s) were already uploaded and remain in '{}'",
                    uploaded.len(),
                    session.bucket()
                ));
            }
            return ExitCode::from_error(&e);
        }

        uploaded.push(file.clone());
        if progress.is_none() {
            formatter.success(&format!(
                "Uploaded '{}' to '{}'",
                formatter.style_key(file),
                formatter.style_name(session.bucket())
            ));
        }
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    if formatter.is_json() {
        formatter.json(&PutOutput {
            bucket: session.bucket().to_string(),
            uploaded,
        });
    } else if args.files.len() > 1 {
        formatter.success(&format!(
            "Uploaded {} file(s) to '{}'",
            args.files.len(),
            session.bucket()
        ));
    }

    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bkt_core::types::{BucketPage, BucketUpdate, ObjectPage, ObjectRecord};
    use bkt_core::{Error, ObjectBody, ObjectReader, ObjectStore};
    use std::sync::{Arc, Mutex};

    /// Backend that accepts puts except for keys ending in a chosen
    /// suffix, recording each accepted upload in order
    struct FlakyStore {
        uploaded: Mutex<Vec<String>>,
        fail_suffix: &'static str,
    }

    impl FlakyStore {
        fn failing_on(fail_suffix: &'static str) -> Self {
            Self {
                uploaded: Mutex::new(Vec::new()),
                fail_suffix,
            }
        }
    }

    #[async_trait]
    impl ObjectStore for FlakyStore {
        async fn put_object<'a>(
            &self,
            _bucket: &str,
            key: &str,
            _body: ObjectBody,
            _content_type: Option<&'a str>,
        ) -> bkt_core::Result<ObjectRecord> {
            if key.ends_with(self.fail_suffix) {
                return Err(Error::RemoteWrite(format!("injected failure for '{key}'")));
            }
            self.uploaded.lock().unwrap().push(key.to_string());
            Ok(ObjectRecord::new(key))
        }

        async fn get_object(&self, _: &str, _: &str) -> bkt_core::Result<ObjectReader> {
            unreachable!()
        }
        async fn delete_object<'a>(
            &self,
            _: &str,
            _: &str,
            _: Option<&'a str>,
        ) -> bkt_core::Result<()> {
            unreachable!()
        }
        async fn list_objects(
            &self,
            _: &str,
            _: bool,
            _: Option<String>,
        ) -> bkt_core::Result<ObjectPage> {
            unreachable!()
        }
        async fn list_buckets(&self, _: Option<String>) -> bkt_core::Result<BucketPage> {
            unreachable!()
        }
        async fn create_bucket<'a>(&self, _: &str, _: Option<&'a str>) -> bkt_core::Result<()> {
            unreachable!()
        }
        async fn delete_bucket(&self, _: &str) -> bkt_core::Result<()> {
            unreachable!()
        }
        async fn update_bucket(&self, _: &str, _: &BucketUpdate) -> bkt_core::Result<()> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_batch_aborts_on_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for name in ["first.txt", "broken.txt", "third.txt"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"payload").unwrap();
            files.push(path.to_str().unwrap().to_string());
        }

        let store = Arc::new(FlakyStore::failing_on("broken.txt"));
        let session = StorageSession::new(store.clone(), "data");
        let config = OutputConfig {
            quiet: true,
            ..Default::default()
        };

        let code = execute(PutArgs { files }, &session, config).await;

        assert_eq!(code, ExitCode::GeneralError);
        // The file before the failure stays uploaded; the one after it is
        // never attempted
        let uploaded = store.uploaded.lock().unwrap();
        assert_eq!(uploaded.len(), 1);
        assert!(uploaded[0].ends_with("first.txt"));
    }

    #[test]
    fn test_put_output_serialization() {
        let output = PutOutput {
            bucket: "backups".to_string(),
            uploaded: vec!["a.txt".to_string(), "b.txt".to_string()],
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"bucket\":\"backups\""));
        assert!(json.contains("\"uploaded\":[\"a.txt\",\"b.txt\"]"));
    }
}
