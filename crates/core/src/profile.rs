//! Profile management
//!
//! A profile binds one invocation to an endpoint, credentials, a project
//! label, a location, and the single bucket the tool operates on. Profiles
//! live in a TOML file under the user config directory
//! (`~/.config/bkt/config.toml`), overridable with `BKT_CONFIG_DIR`.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default per-invocation deadline, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Connection and binding details for one storage endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Endpoint URL, e.g. `http://localhost:9000`
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// Region / location the bucket lives in
    #[serde(default = "default_region")]
    pub region: String,
    /// Project or account label, carried through to output only
    #[serde(default)]
    pub project: Option<String>,
    /// The bucket this profile is bound to
    pub bucket: String,
    /// Wall-clock budget for one whole invocation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Profile {
    pub fn new(
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: default_region(),
            project: None,
            bucket: bucket.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Reject unusable endpoints and empty bindings before anything is saved
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint '{}': {e}", self.endpoint)))?;
        if self.bucket.is_empty() {
            return Err(Error::Config("bucket name cannot be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// On-disk layout: `[profiles.<name>]` tables
#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: BTreeMap<String, Profile>,
}

/// Loads and persists profiles
#[derive(Debug, Clone)]
pub struct ProfileStore {
    config_dir: PathBuf,
}

impl ProfileStore {
    /// Resolve the config directory from `BKT_CONFIG_DIR` or the platform
    /// config location
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os("BKT_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("cannot determine config directory".to_string()))?
                .join("bkt"),
        };
        Ok(Self { config_dir })
    }

    /// Use an explicit directory (tests)
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    fn load(&self) -> Result<ProfileFile> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(ProfileFile::default());
        }
        let raw = fs::read_to_string(&path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("malformed {}: {e}", path.display())))
    }

    fn save(&self, file: &ProfileFile) -> Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        let rendered = toml::to_string_pretty(file)
            .map_err(|e| Error::Config(format!("cannot serialize config: {e}")))?;
        // Write-then-rename so a crash never leaves a half-written config
        let tmp = self.config_dir.join("config.toml.tmp");
        fs::write(&tmp, rendered)?;
        fs::rename(&tmp, self.config_path())?;
        Ok(())
    }

    /// Add or replace a named profile
    pub fn set(&self, name: &str, profile: Profile) -> Result<()> {
        profile.validate()?;
        let mut file = self.load()?;
        file.profiles.insert(name.to_string(), profile);
        self.save(&file)
    }

    /// Fetch one profile by name
    pub fn get(&self, name: &str) -> Result<Profile> {
        let file = self.load()?;
        file.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    /// All profiles, sorted by name
    pub fn list(&self) -> Result<Vec<(String, Profile)>> {
        Ok(self.load()?.profiles.into_iter().collect())
    }

    /// Remove a profile; absent names are an error, never a silent success
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut file = self.load()?;
        if file.profiles.remove(name).is_none() {
            return Err(Error::ProfileNotFound(name.to_string()));
        }
        self.save(&file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_profile() -> Profile {
        Profile::new("http://localhost:9000", "ak", "sk", "backups")
    }

    #[test]
    fn test_set_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::with_dir(dir.path());

        store.set("default", test_profile()).unwrap();
        let loaded = store.get("default").unwrap();

        assert_eq!(loaded.endpoint, "http://localhost:9000");
        assert_eq!(loaded.bucket, "backups");
        assert_eq!(loaded.region, "us-east-1");
        assert_eq!(loaded.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_get_missing_profile() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::with_dir(dir.path());

        let err = store.get("nope").unwrap_err();
        assert!(matches!(err, Error::ProfileNotFound(_)));
    }

    #[test]
    fn test_remove_missing_profile_errors() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::with_dir(dir.path());
        store.set("default", test_profile()).unwrap();

        assert!(matches!(
            store.remove("other"),
            Err(Error::ProfileNotFound(_))
        ));
        // The existing profile is untouched
        assert!(store.get("default").is_ok());
    }

    #[test]
    fn test_list_sorted_by_name() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::with_dir(dir.path());
        store.set("staging", test_profile()).unwrap();
        store.set("default", test_profile()).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["default", "staging"]);
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::with_dir(dir.path());

        let mut profile = test_profile();
        profile.endpoint = "not a url".to_string();
        assert!(matches!(
            store.set("bad", profile),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_defaults_applied_on_load() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(
            dir.path().join("config.toml"),
            r#"
[profiles.minimal]
endpoint = "http://localhost:9000"
access_key = "ak"
secret_key = "sk"
bucket = "data"
"#,
        )
        .unwrap();

        let store = ProfileStore::with_dir(dir.path());
        let profile = store.get("minimal").unwrap();
        assert_eq!(profile.region, "us-east-1");
        assert_eq!(profile.timeout_secs, 600);
        assert_eq!(profile.project, None);
    }

    #[test]
    fn test_malformed_config_is_config_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join("config.toml"), "profiles = 3").unwrap();

        let store = ProfileStore::with_dir(dir.path());
        assert!(matches!(store.get("any"), Err(Error::Config(_))));
    }
}
