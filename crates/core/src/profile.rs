//! Profile management
//!
//! Profiles are named sets of connection details and credentials for a
//! storage host, persisted in the settings file.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigUpdate, DEFAULT_TIMEOUT_MS};
use crate::error::{Error, Result};
use crate::settings::SettingsManager;

/// A named storage host with its upload account
#[derive(Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique name for this profile
    pub name: String,

    /// Storage host name
    pub host: String,

    /// Upload account key name
    pub key_name: String,

    /// Upload account key
    pub key: String,

    /// Use https
    #[serde(default = "default_true")]
    pub tls: bool,

    /// Include server bodies in error messages
    #[serde(default)]
    pub verbose: bool,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("key_name", &self.key_name)
            .field("tls", &self.tls)
            .field("verbose", &self.verbose)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl Profile {
    /// Create a profile with required fields
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        key_name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            key_name: key_name.into(),
            key: key.into(),
            tls: default_true(),
            verbose: false,
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Client configuration for this profile
    pub fn to_update(&self) -> ConfigUpdate {
        ConfigUpdate::default()
            .host(&self.host)
            .key_name(&self.key_name)
            .key(&self.key)
            .use_tls(self.tls)
            .verbose(self.verbose)
            .timeout_ms(self.timeout_ms)
    }
}

/// Manager for profile operations
pub struct ProfileManager {
    settings: SettingsManager,
}

impl ProfileManager {
    /// Create a ProfileManager over a specific SettingsManager
    pub fn with_settings_manager(settings: SettingsManager) -> Self {
        Self { settings }
    }

    /// Create a ProfileManager using the default settings location
    pub fn new() -> Result<Self> {
        Ok(Self {
            settings: SettingsManager::new()?,
        })
    }

    /// Name of the profile used when none is requested
    pub fn default_name(&self) -> Result<String> {
        Ok(self.settings.load()?.defaults.profile)
    }

    /// List all profiles
    pub fn list(&self) -> Result<Vec<Profile>> {
        Ok(self.settings.load()?.profiles)
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Result<Profile> {
        self.settings
            .load()?
            .profiles
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    /// Add or replace a profile
    pub fn set(&self, profile: Profile) -> Result<()> {
        let mut settings = self.settings.load()?;
        settings.profiles.retain(|p| p.name != profile.name);
        settings.profiles.push(profile);
        self.settings.save(&settings)
    }

    /// Add a profile, failing if the name is taken
    pub fn add(&self, profile: Profile) -> Result<()> {
        if self.exists(&profile.name)? {
            return Err(Error::ProfileExists(profile.name));
        }
        self.set(profile)
    }

    /// Remove a profile
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut settings = self.settings.load()?;
        let original_len = settings.profiles.len();

        settings.profiles.retain(|p| p.name != name);

        if settings.profiles.len() == original_len {
            return Err(Error::ProfileNotFound(name.to_string()));
        }

        self.settings.save(&settings)
    }

    /// Check if a profile exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.settings.load()?.profiles.iter().any(|p| p.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn temp_profile_manager() -> (ProfileManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let settings = SettingsManager::with_path(temp_dir.path().join("config.toml"));
        (ProfileManager::with_settings_manager(settings), temp_dir)
    }

    fn profile(name: &str, host: &str) -> Profile {
        Profile::new(name, host, "upload", "secret")
    }

    #[test]
    fn test_profile_new() {
        let profile = profile("edge", "example-nsu.akamaihd.net");
        assert_eq!(profile.name, "edge");
        assert!(profile.tls);
        assert!(!profile.verbose);
        assert_eq!(profile.timeout_ms, 20_000);
    }

    #[test]
    fn test_profile_to_config() {
        let mut profile = profile("edge", "example-nsu.akamaihd.net");
        profile.tls = false;
        profile.timeout_ms = 1_500;

        let config = Config::new().merged(profile.to_update());
        let creds = config.credentials().unwrap();
        assert_eq!(creds.host, "example-nsu.akamaihd.net");
        assert_eq!(creds.key_name, "upload");
        assert!(!config.use_tls);
        assert_eq!(config.request.timeout_ms, 1_500);
    }

    #[test]
    fn test_profile_debug_hides_key() {
        let debug = format!("{:?}", profile("edge", "h"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_set_and_get() {
        let (manager, _temp_dir) = temp_profile_manager();
        manager.set(profile("edge", "a.example.com")).unwrap();

        let retrieved = manager.get("edge").unwrap();
        assert_eq!(retrieved.host, "a.example.com");
    }

    #[test]
    fn test_list() {
        let (manager, _temp_dir) = temp_profile_manager();
        manager.set(profile("a", "a.example.com")).unwrap();
        manager.set(profile("b", "b.example.com")).unwrap();
        assert_eq!(manager.list().unwrap().len(), 2);
    }

    #[test]
    fn test_update_existing() {
        let (manager, _temp_dir) = temp_profile_manager();
        manager.set(profile("edge", "old.example.com")).unwrap();
        manager.set(profile("edge", "new.example.com")).unwrap();

        let profiles = manager.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].host, "new.example.com");
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let (manager, _temp_dir) = temp_profile_manager();
        manager.add(profile("edge", "a.example.com")).unwrap();
        let err = manager.add(profile("edge", "b.example.com")).unwrap_err();
        assert!(matches!(err, Error::ProfileExists(_)));
    }

    #[test]
    fn test_remove() {
        let (manager, _temp_dir) = temp_profile_manager();
        manager.set(profile("edge", "a.example.com")).unwrap();
        assert!(manager.exists("edge").unwrap());

        manager.remove("edge").unwrap();
        assert!(!manager.exists("edge").unwrap());
    }

    #[test]
    fn test_not_found() {
        let (manager, _temp_dir) = temp_profile_manager();
        assert!(matches!(
            manager.remove("nonexistent").unwrap_err(),
            Error::ProfileNotFound(_)
        ));
        assert!(matches!(
            manager.get("nonexistent").unwrap_err(),
            Error::ProfileNotFound(_)
        ));
    }

    #[test]
    fn test_default_name() {
        let (manager, _temp_dir) = temp_profile_manager();
        assert_eq!(manager.default_name().unwrap(), "default");
    }
}
