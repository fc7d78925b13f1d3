//! bucket subcommands - manage the bound bucket and list the account
//!
//! `create`, `rm`, and `update` all operate on the bucket the session is
//! bound to; `ls` lists every bucket the account can see.

use clap::{Subcommand, ValueEnum};
use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use bkt_core::{BucketRecord, BucketUpdate, StorageSession};

/// Bucket management subcommands
#[derive(Subcommand, Debug)]
pub enum BucketCommands {
    /// List all buckets in the account
    Ls,

    /// List object keys in the bound bucket, in backend order
    Objects,

    /// Create the bound bucket (fails if it already exists)
    Create,

    /// Delete the bound bucket (fails if it is not empty)
    Rm,

    /// Update attributes of the bound bucket
    Update(UpdateArgs),
}

/// On/off switch for boolean bucket attributes
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> bool {
        toggle == Toggle::On
    }
}

/// Arguments for `bucket update`
#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Enable or suspend object versioning
    #[arg(long, value_enum)]
    pub versioning: Option<Toggle>,

    /// Block or allow public access
    #[arg(long, value_enum)]
    pub block_public_access: Option<Toggle>,

    /// Default storage class (rejected by backends without one)
    #[arg(long)]
    pub storage_class: Option<String>,
}

#[derive(Serialize)]
struct BucketListOutput {
    buckets: Vec<BucketRecord>,
}

#[derive(Serialize)]
struct ObjectListOutput {
    bucket: String,
    keys: Vec<String>,
}

#[derive(Serialize)]
struct BucketOperationOutput {
    success: bool,
    bucket: String,
    message: String,
}

/// Execute a bucket subcommand
pub async fn execute(
    cmd: BucketCommands,
    session: &StorageSession,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    match cmd {
        BucketCommands::Ls => execute_ls(session, &formatter).await,
        BucketCommands::Objects => execute_objects(session, &formatter).await,
        BucketCommands::Create => execute_create(session, &formatter).await,
        BucketCommands::Rm => execute_rm(session, &formatter).await,
        BucketCommands::Update(args) => execute_update(args, session, &formatter).await,
    }
}

async fn execute_ls(session: &StorageSession, formatter: &Formatter) -> ExitCode {
    let buckets = match session.list_buckets().await {
        Ok(buckets) => buckets,
        Err(e) => {
            formatter.error(&format!("Failed to list buckets: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&BucketListOutput { buckets });
        return ExitCode::Success;
    }

    if buckets.is_empty() {
        formatter.println("No buckets.");
        return ExitCode::Success;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["NAME", "LOCATION", "CREATED"]);
    for bucket in &buckets {
        table.add_row(vec![
            bucket.name.clone(),
            bucket.location.clone().unwrap_or_else(|| "-".to_string()),
            bucket
                .created
                .map(format_created)
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    formatter.println(&table.to_string());
    ExitCode::Success
}

async fn execute_objects(session: &StorageSession, formatter: &Formatter) -> ExitCode {
    let keys = match session.list_bucket_objects().await {
        Ok(keys) => keys,
        Err(e) => {
            formatter.error(&format!("Failed to list objects: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&ObjectListOutput {
            bucket: session.bucket().to_string(),
            keys,
        });
    } else if keys.is_empty() {
        formatter.println(&format!("Bucket '{}' is empty.", session.bucket()));
    } else {
        for key in &keys {
            formatter.println(&formatter.style_key(key));
        }
    }
    ExitCode::Success
}

async fn execute_create(session: &StorageSession, formatter: &Formatter) -> ExitCode {
    match session.create_bucket().await {
        Ok(()) => {
            emit_operation(formatter, session, "created");
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!(
                "Failed to create bucket '{}': {e}",
                session.bucket()
            ));
            ExitCode::from_error(&e)
        }
    }
}

async fn execute_rm(session: &StorageSession, formatter: &Formatter) -> ExitCode {
    match session.delete_bucket().await {
        Ok(()) => {
            emit_operation(formatter, session, "deleted");
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!(
                "Failed to delete bucket '{}': {e}",
                session.bucket()
            ));
            ExitCode::from_error(&e)
        }
    }
}

async fn execute_update(
    args: UpdateArgs,
    session: &StorageSession,
    formatter: &Formatter,
) -> ExitCode {
    let update = BucketUpdate {
        versioning_enabled: args.versioning.map(bool::from),
        public_access_blocked: args.block_public_access.map(bool::from),
        storage_class: args.storage_class,
    };

    if update.is_empty() {
        formatter.error("Nothing to update: pass at least one attribute flag");
        return ExitCode::UsageError;
    }

    match session.update_bucket(&update).await {
        Ok(()) => {
            emit_operation(formatter, session, "updated");
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!(
                "Failed to update bucket '{}': {e}",
                session.bucket()
            ));
            ExitCode::from_error(&e)
        }
    }
}

fn format_created(ts: jiff::Timestamp) -> String {
    ts.strftime("%Y-%m-%d %H:%M:%S").to_string()
}

fn emit_operation(formatter: &Formatter, session: &StorageSession, verb: &str) {
    if formatter.is_json() {
        formatter.json(&BucketOperationOutput {
            success: true,
            bucket: session.bucket().to_string(),
            message: format!("Bucket '{}' {verb}", session.bucket()),
        });
    } else {
        formatter.success(&format!(
            "Bucket '{}' {verb}",
            formatter.style_name(session.bucket())
        ));
    }
}
