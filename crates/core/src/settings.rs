//! Settings file management
//!
//! This module handles loading and saving the ns settings file. The file is
//! stored in TOML format at `~/.config/ns/config.toml`, or under the directory
//! named by `NS_CONFIG_DIR` when that variable is set.
//!
//! Changes to `schema_version` require migration support.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::profile::Profile;

/// Current settings schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the settings directory
pub const CONFIG_DIR_ENV: &str = "NS_CONFIG_DIR";

/// Default output format
const DEFAULT_OUTPUT: &str = "human";

/// Default profile name
const DEFAULT_PROFILE: &str = "default";

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Configured profiles
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// Default settings for CLI behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Output format: "human" or "json"
    #[serde(default = "default_output")]
    pub output: String,

    /// Profile used when none is given on the command line
    #[serde(default = "default_profile")]
    pub profile: String,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            profile: default_profile(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            profiles: Vec::new(),
        }
    }
}

/// Loads and saves the settings file
#[derive(Debug)]
pub struct SettingsManager {
    path: PathBuf,
}

impl SettingsManager {
    /// Create a manager for the default settings path
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("ns"),
        };
        Ok(Self {
            path: dir.join("config.toml"),
        })
    }

    /// Create a manager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the settings file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load settings from disk
    ///
    /// A missing file yields the defaults. A file written by a newer version
    /// is rejected.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut settings: Settings = toml::from_str(&content)?;

        if settings.schema_version < SCHEMA_VERSION {
            settings.schema_version = SCHEMA_VERSION;
        } else if settings.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Settings file version {} is newer than supported version {}. Please upgrade ns.",
                settings.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(settings)
    }

    /// Save settings to disk
    ///
    /// Creates parent directories as needed. The file holds keys, so it is
    /// made readable by the owner only.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(settings)?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)?;
        }

        tracing::debug!(path = %self.path.display(), "Saved settings");
        Ok(())
    }
}
