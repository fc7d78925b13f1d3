//! bkt - single-bucket object storage CLI
//!
//! One invocation = one session bound to a profile's endpoint, bucket,
//! and deadline. Commands run sequentially on a current-thread runtime;
//! the first failing operation ends the process with a mapped exit code.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

mod commands;
mod exit_code;
mod output;

use commands::{bucket, cat, completions, expire, get, profile, put, rm};
use exit_code::ExitCode;
use output::{Formatter, OutputConfig};

use bkt_core::{ProfileStore, StorageSession};
use bkt_s3::S3Store;

#[derive(Parser, Debug)]
#[command(
    name = "bkt",
    version,
    about = "Upload, download, delete, and expire objects in one configured bucket",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand
#[derive(clap::Args, Debug)]
pub struct GlobalArgs {
    /// Strict JSON output on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Profile to bind this invocation to
    #[arg(long, global = true, env = "BKT_PROFILE", default_value = "default")]
    pub profile: String,

    /// Override the profile's bucket for this invocation
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    /// Override the profile's wall-clock budget, in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload local files to the bound bucket
    Put(put::PutArgs),

    /// Print object contents to stdout
    Cat(cat::CatArgs),

    /// Download objects into local files
    Get(get::GetArgs),

    /// Delete objects
    Rm(rm::RmArgs),

    /// Delete all objects older than a day threshold
    Expire(expire::ExpireArgs),

    /// Manage the bound bucket and list the account's buckets
    Bucket {
        #[command(subcommand)]
        cmd: bucket::BucketCommands,
    },

    /// Manage endpoint/bucket profiles
    Profile {
        #[command(subcommand)]
        cmd: profile::ProfileCommands,
    },

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_from_env("BKT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the session for storage commands: load the profile, construct
/// the S3 client, apply per-invocation overrides.
async fn open_session(
    global: &GlobalArgs,
    formatter: &Formatter,
) -> Result<StorageSession, ExitCode> {
    let store = match ProfileStore::new() {
        Ok(store) => store,
        Err(e) => {
            formatter.error(&format!("Failed to load profiles: {e}"));
            return Err(ExitCode::GeneralError);
        }
    };

    let profile = match store.get(&global.profile) {
        Ok(profile) => profile,
        Err(e) => {
            formatter.error(&format!(
                "Profile '{}' unavailable: {e} (run 'bkt profile set' first)",
                global.profile
            ));
            return Err(ExitCode::from_error(&e));
        }
    };

    tracing::debug!(
        profile = %global.profile,
        endpoint = %profile.endpoint,
        bucket = %profile.bucket,
        "profile loaded"
    );

    let client = match S3Store::from_profile(&profile).await {
        Ok(client) => client,
        Err(e) => {
            formatter.error(&format!("Failed to create storage client: {e}"));
            return Err(ExitCode::NetworkError);
        }
    };

    let bucket = global
        .bucket
        .clone()
        .unwrap_or_else(|| profile.bucket.clone());
    let timeout_secs = global.timeout_secs.unwrap_or(profile.timeout_secs);

    Ok(StorageSession::new(Arc::new(client), bucket)
        .with_location(profile.region.clone())
        .with_project(profile.project.clone())
        .with_timeout(Duration::from_secs(timeout_secs)))
}

async fn run(cli: Cli, output_config: OutputConfig) -> ExitCode {
    match cli.command {
        // Local-only commands need no session
        Commands::Profile { cmd } => profile::execute(cmd, output_config).await,
        Commands::Completions(args) => completions::execute(args),

        command => {
            let formatter = Formatter::new(output_config.clone());
            let session = match open_session(&cli.global, &formatter).await {
                Ok(session) => session,
                Err(code) => return code,
            };

            match command {
                Commands::Put(args) => put::execute(args, &session, output_config).await,
                Commands::Cat(args) => cat::execute(args, &session, output_config).await,
                Commands::Get(args) => get::execute(args, &session, output_config).await,
                Commands::Rm(args) => rm::execute(args, &session, output_config).await,
                Commands::Expire(args) => expire::execute(args, &session, output_config).await,
                Commands::Bucket { cmd } => bucket::execute(cmd, &session, output_config).await,
                Commands::Profile { .. } | Commands::Completions(_) => unreachable!(),
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let output_config = OutputConfig {
        json: cli.global.json,
        quiet: cli.global.quiet,
        no_color: cli.global.no_color,
    };

    run(cli, output_config).await.exit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_put_with_globals() {
        let cli = Cli::parse_from(["bkt", "put", "a.txt", "b.txt", "--json", "--bucket", "alt"]);
        assert!(cli.global.json);
        assert_eq!(cli.global.bucket.as_deref(), Some("alt"));
        match cli.command {
            Commands::Put(args) => assert_eq!(args.files, vec!["a.txt", "b.txt"]),
            _ => panic!("expected put"),
        }
    }

    #[test]
    fn test_parse_expire_default() {
        let cli = Cli::parse_from(["bkt", "expire"]);
        match cli.command {
            Commands::Expire(args) => assert_eq!(args.older_than_days, 30),
            _ => panic!("expected expire"),
        }
    }

    #[test]
    fn test_no_arguments_is_usage_error() {
        // Bare invocation and unknown subcommands are usage errors (clap
        // exits 2), never success
        assert!(Cli::try_parse_from(["bkt"]).is_err());
        assert!(Cli::try_parse_from(["bkt", "frobnicate"]).is_err());
    }

    #[test]
    fn test_put_requires_files() {
        assert!(Cli::try_parse_from(["bkt", "put"]).is_err());
    }

    #[test]
    fn test_default_profile_name() {
        let cli = Cli::parse_from(["bkt", "bucket", "ls"]);
        assert_eq!(cli.global.profile, "default");
    }
}
