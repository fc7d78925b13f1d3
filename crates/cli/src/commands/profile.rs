//! Profile management commands
//!
//! A profile names an endpoint, credentials, and the single bucket the
//! tool is bound to. Secrets never appear in list output.

use clap::Subcommand;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use bkt_core::{Profile, ProfileStore};

/// Profile subcommands for managing endpoint/bucket bindings
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile
    Set(SetArgs),

    /// List all configured profiles
    List(ListArgs),

    /// Remove a profile
    Remove(RemoveArgs),
}

/// Arguments for the `profile set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (e.g., "default", "staging")
    pub name: String,

    /// Endpoint URL (e.g., `http://localhost:9000`, `https://s3.amazonaws.com`)
    pub endpoint: String,

    /// Access key ID
    pub access_key: String,

    /// Secret access key
    pub secret_key: String,

    /// Bucket this profile is bound to
    pub bucket: String,

    /// Region / location (default: us-east-1)
    #[arg(long, default_value = "us-east-1")]
    pub region: String,

    /// Project or account label, shown in output only
    #[arg(long)]
    pub project: Option<String>,

    /// Wall-clock budget for one invocation, in seconds
    #[arg(long, default_value_t = bkt_core::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

/// Arguments for the `profile list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show full details including region and timeout
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `profile remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

/// JSON output for profile list
#[derive(Serialize)]
struct ProfileListOutput {
    profiles: Vec<ProfileInfo>,
}

/// Profile information for JSON output (without credentials)
#[derive(Serialize)]
struct ProfileInfo {
    name: String,
    endpoint: String,
    region: String,
    bucket: String,
    project: Option<String>,
    timeout_secs: u64,
}

impl ProfileInfo {
    fn new(name: &str, profile: &Profile) -> Self {
        Self {
            name: name.to_string(),
            endpoint: profile.endpoint.clone(),
            region: profile.region.clone(),
            bucket: profile.bucket.clone(),
            project: profile.project.clone(),
            timeout_secs: profile.timeout_secs,
        }
    }
}

/// JSON output for profile set/remove operations
#[derive(Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

/// Execute a profile subcommand
pub async fn execute(cmd: ProfileCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let store = match ProfileStore::new() {
        Ok(store) => store,
        Err(e) => {
            formatter.error(&format!("Failed to load profiles: {e}"));
            return ExitCode::GeneralError;
        }
    };

    match cmd {
        ProfileCommands::Set(args) => execute_set(args, &store, &formatter),
        ProfileCommands::List(args) => execute_list(args, &store, &formatter),
        ProfileCommands::Remove(args) => execute_remove(args, &store, &formatter),
    }
}

fn execute_set(args: SetArgs, store: &ProfileStore, formatter: &Formatter) -> ExitCode {
    if args.name.is_empty() {
        formatter.error("Profile name cannot be empty");
        return ExitCode::UsageError;
    }

    let mut profile = Profile::new(
        &args.endpoint,
        &args.access_key,
        &args.secret_key,
        &args.bucket,
    );
    profile.region = args.region;
    profile.project = args.project;
    profile.timeout_secs = args.timeout_secs;

    match store.set(&args.name, profile) {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name.clone(),
                    message: format!("Profile '{}' configured successfully", args.name),
                });
            } else {
                let styled_name = formatter.style_name(&args.name);
                formatter.success(&format!("Profile '{styled_name}' configured successfully."));
            }
            ExitCode::Success
        }
        Err(e @ bkt_core::Error::Config(_)) => {
            formatter.error(&e.to_string());
            ExitCode::UsageError
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::GeneralError
        }
    }
}

fn execute_list(args: ListArgs, store: &ProfileStore, formatter: &Formatter) -> ExitCode {
    match store.list() {
        Ok(profiles) => {
            if formatter.is_json() {
                formatter.json(&ProfileListOutput {
                    profiles: profiles
                        .iter()
                        .map(|(name, p)| ProfileInfo::new(name, p))
                        .collect(),
                });
            } else if profiles.is_empty() {
                formatter.println("No profiles configured.");
            } else if args.long {
                for (name, profile) in &profiles {
                    let styled_name = formatter.style_name(&format!("{name:<12}"));
                    let styled_url = formatter.style_url(&profile.endpoint);
                    let styled_bucket = formatter.style_name(&profile.bucket);
                    let styled_region = formatter.style_date(&profile.region);
                    formatter.println(&format!(
                        "{styled_name} {styled_url} -> {styled_bucket} (region: {styled_region}, timeout: {}s)",
                        profile.timeout_secs
                    ));
                }
            } else {
                for (name, profile) in &profiles {
                    let styled_name = formatter.style_name(&format!("{name:<12}"));
                    let styled_url = formatter.style_url(&profile.endpoint);
                    let styled_bucket = formatter.style_name(&profile.bucket);
                    formatter.println(&format!("{styled_name} {styled_url} -> {styled_bucket}"));
                }
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::GeneralError
        }
    }
}

fn execute_remove(args: RemoveArgs, store: &ProfileStore, formatter: &Formatter) -> ExitCode {
    match store.remove(&args.name) {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name.clone(),
                    message: format!("Profile '{}' removed successfully", args.name),
                });
            } else {
                let styled_name = formatter.style_name(&args.name);
                formatter.success(&format!("Profile '{styled_name}' removed successfully."));
            }
            ExitCode::Success
        }
        Err(bkt_core::Error::ProfileNotFound(_)) => {
            formatter.error(&format!("Profile '{}' not found", args.name));
            ExitCode::NotFound
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_args_defaults() {
        use clap::Parser;

        #[derive(Parser)]
        struct Harness {
            #[command(flatten)]
            args: SetArgs,
        }

        let harness = Harness::parse_from([
            "set",
            "default",
            "http://localhost:9000",
            "accesskey",
            "secretkey",
            "backups",
        ]);
        assert_eq!(harness.args.region, "us-east-1");
        assert_eq!(harness.args.timeout_secs, 600);
        assert_eq!(harness.args.project, None);
    }

    #[test]
    fn test_profile_info_masks_credentials() {
        let profile = Profile::new("http://localhost:9000", "key", "secret", "data");
        let info = ProfileInfo::new("default", &profile);
        let json = serde_json::to_string(&info).unwrap();

        assert!(json.contains("\"bucket\":\"data\""));
        assert!(!json.contains("secret"));
        assert!(!json.contains("access_key"));
    }
}
