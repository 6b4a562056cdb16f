//! Configuration - backend credentials and profile text
//!
//! Loaded from `~/.garistagram/config.yaml`, then overridden by environment
//! variables. Every field has a default so a missing file is not an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_DIR, CONFIG_FILE, DEFAULT_BUCKET, DEFAULT_TABLE, REQUEST_TIMEOUT_SECS};
use crate::models::Profile;

/// Connection settings for the Supabase project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub table: String,
    pub bucket: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            url: String::new(),
            anon_key: String::new(),
            table: String::from(DEFAULT_TABLE),
            bucket: String::from(DEFAULT_BUCKET),
            timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl BackendConfig {
    /// Reason the backend cannot be used, if any
    pub fn missing(&self) -> Option<String> {
        let mut missing = Vec::new();
        if self.url.trim().is_empty() {
            missing.push("SUPABASE_URL");
        }
        if self.anon_key.trim().is_empty() {
            missing.push("SUPABASE_ANON_KEY");
        }
        if missing.is_empty() {
            None
        } else {
            Some(format!("set {}", missing.join(" and ")))
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub profile: Profile,
}

impl AppConfig {
    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    }

    /// Load from the default path and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::from_file(&Self::default_path())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file; a missing file yields defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the environment in production)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *target = value;
            }
        };
        set(&mut self.backend.url, "SUPABASE_URL");
        set(&mut self.backend.anon_key, "SUPABASE_ANON_KEY");
        set(&mut self.backend.table, "GARISTAGRAM_TABLE");
        set(&mut self.backend.bucket, "GARISTAGRAM_BUCKET");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::from_file(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.backend.table, "card_collection");
        assert!(config.backend.missing().is_some());
    }

    #[test]
    fn test_partial_file_and_env_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "backend:\n  url: https://file.supabase.co\n  bucket: scans\nprofile:\n  handle: binder\n",
        )
        .unwrap();

        let mut config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.backend.bucket, "scans");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.profile.handle, "binder");

        let env: HashMap<&str, &str> =
            HashMap::from([("SUPABASE_ANON_KEY", "anon"), ("SUPABASE_URL", "  ")]);
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.backend.url, "https://file.supabase.co");
        assert_eq!(config.backend.anon_key, "anon");
        assert!(config.backend.missing().is_none());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "backend: [not, a, map]").unwrap();
        assert!(AppConfig::from_file(&path).is_err());
    }
}
