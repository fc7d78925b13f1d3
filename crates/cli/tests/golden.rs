//! Golden tests for verifying JSON output format stability
//!
//! These exercise the built binary's `--json` output for the profile
//! commands, which run without a storage backend.
//!
//! Run with: `cargo test --features golden`

#![cfg(feature = "golden")]

use std::process::Command;

/// Build the bkt binary and return its path
fn bkt_binary() -> String {
    let output = Command::new("cargo")
        .args(["build", "--release", "-p", "bucket-cli"])
        .output()
        .expect("Failed to build bkt binary");

    if !output.status.success() {
        panic!(
            "Failed to build bkt binary: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    env!("CARGO_MANIFEST_DIR").to_string() + "/../../target/release/bkt"
}

mod profile_tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_env() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    fn set_profile(config_dir: &str, name: &str) {
        let output = Command::new(bkt_binary())
            .args([
                "profile",
                "set",
                name,
                "http://localhost:9000",
                "accesskey",
                "secretkey",
                "backups",
                "--json",
            ])
            .env("BKT_CONFIG_DIR", config_dir)
            .output()
            .expect("Failed to set profile");
        assert!(output.status.success(), "profile set should succeed");
    }

    #[test]
    fn test_profile_list_empty_json() {
        let temp_dir = setup_test_env();
        let config_dir = temp_dir.path().to_str().unwrap();

        let output = Command::new(bkt_binary())
            .args(["profile", "list", "--json"])
            .env("BKT_CONFIG_DIR", config_dir)
            .output()
            .expect("Failed to execute bkt");

        assert!(output.status.success(), "Command should succeed");

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value =
            serde_json::from_str(&stdout).expect("Output should be valid JSON");

        insta::assert_json_snapshot!("profile_list_empty", json);
    }

    #[test]
    fn test_profile_set_json() {
        let temp_dir = setup_test_env();
        let config_dir = temp_dir.path().to_str().unwrap();

        let output = Command::new(bkt_binary())
            .args([
                "profile",
                "set",
                "test-profile",
                "http://localhost:9000",
                "accesskey",
                "secretkey",
                "backups",
                "--json",
            ])
            .env("BKT_CONFIG_DIR", config_dir)
            .output()
            .expect("Failed to execute bkt");

        assert!(output.status.success(), "Command should succeed");

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value =
            serde_json::from_str(&stdout).expect("Output should be valid JSON");

        insta::assert_json_snapshot!("profile_set_success", json);
    }

    #[test]
    fn test_profile_list_masks_credentials() {
        let temp_dir = setup_test_env();
        let config_dir = temp_dir.path().to_str().unwrap();
        set_profile(config_dir, "default");

        let output = Command::new(bkt_binary())
            .args(["profile", "list", "--json"])
            .env("BKT_CONFIG_DIR", config_dir)
            .output()
            .expect("Failed to execute bkt");

        assert!(output.status.success(), "Command should succeed");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            !stdout.contains("secretkey"),
            "secret key must never appear in list output"
        );

        let json: serde_json::Value =
            serde_json::from_str(&stdout).expect("Output should be valid JSON");
        assert_eq!(json["profiles"].as_array().unwrap().len(), 1);

        insta::assert_json_snapshot!("profile_list_with_profile", json);
    }

    #[test]
    fn test_profile_remove_not_found_json() {
        let temp_dir = setup_test_env();
        let config_dir = temp_dir.path().to_str().unwrap();

        let output = Command::new(bkt_binary())
            .args(["profile", "remove", "nonexistent", "--json"])
            .env("BKT_CONFIG_DIR", config_dir)
            .output()
            .expect("Failed to execute bkt");

        // NOT_FOUND exit code
        assert!(!output.status.success(), "Command should fail");
        assert_eq!(
            output.status.code(),
            Some(5),
            "Exit code should be 5 (NOT_FOUND)"
        );

        let stderr = String::from_utf8_lossy(&output.stderr);
        let json: serde_json::Value =
            serde_json::from_str(&stderr).expect("Output should be valid JSON");

        insta::assert_json_snapshot!("profile_remove_not_found", json);
    }

    #[test]
    fn test_unknown_subcommand_is_usage_error() {
        let output = Command::new(bkt_binary())
            .args(["frobnicate"])
            .output()
            .expect("Failed to execute bkt");

        // Unknown actions are usage errors, exit 2 - never 0
        assert_eq!(output.status.code(), Some(2));
    }
}
