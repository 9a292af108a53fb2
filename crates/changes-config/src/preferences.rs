//! File-backed preference store
//!
//! One TOML file per user, read once when opened and rewritten on every
//! change:
//!
//! ```toml
//! [meta]
//! last_modified = "2024-05-01T10:00:00Z"
//! version = 1
//!
//! [preferences]
//! "diff.view_style" = "line-by-line"
//! "diff.line_breaks" = true
//! ```
//!
//! Entries are kept as TOML values and converted one at a time, so an entry
//! of an unexpected type only affects its own key.

use anyhow::{Context, Result};
use changes_viewer::PreferenceStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

const PREFERENCES_VERSION: u32 = 1;

/// Preference file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesMeta {
    pub last_modified: DateTime<Utc>,
    pub version: u32,
}

/// Complete preference file with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesFile {
    pub meta: PreferencesMeta,
    #[serde(default)]
    pub preferences: BTreeMap<String, toml::Value>,
}

impl Default for PreferencesFile {
    fn default() -> Self {
        Self {
            meta: PreferencesMeta {
                last_modified: Utc::now(),
                version: PREFERENCES_VERSION,
            },
            preferences: BTreeMap::new(),
        }
    }
}

/// Preference store persisted to a TOML file.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
    file: PreferencesFile,
}

impl FilePreferenceStore {
    /// Open the preference file of `user` in the config directory.
    pub fn open_for_user(user: &str) -> Result<Self> {
        let path = paths::user_preferences_path(user)?;
        Ok(Self::open(path))
    }

    /// Open a preference file, starting empty if it is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = if path.exists() {
            match Self::load_from_path(&path) {
                Ok(file) => {
                    log::info!("Loaded preferences from {:?}", path);
                    file
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable preferences: {:#}", e);
                    PreferencesFile::default()
                }
            }
        } else {
            log::debug!("No preferences at {:?}, using defaults", path);
            PreferencesFile::default()
        };

        Self { path, file }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_path(path: &Path) -> Result<PreferencesFile> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences file: {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse preferences file: {:?}", path))
    }

    fn save(&mut self) -> Result<()> {
        self.file.meta.last_modified = Utc::now();

        let content =
            toml::to_string_pretty(&self.file).context("Failed to serialize preferences")?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write preferences file: {:?}", self.path))?;

        log::debug!("Saved preferences to {:?}", self.path);
        Ok(())
    }
}

/// Render a stored value in the string form the view layer parses.
fn value_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Store booleans as TOML booleans, everything else as strings.
fn string_to_value(value: &str) -> toml::Value {
    match value {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        other => toml::Value::String(other.to_string()),
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.file.preferences.get(key).map(value_to_string)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.file
            .preferences
            .insert(key.to_string(), string_to_value(value));
        self.save()
    }
}
