//! Configuration and data directory paths
//!
//! Uses XDG directories via `dirs` crate with fallbacks.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/pr-changes/`, `~/.cache/pr-changes/`
//! - macOS: `~/Library/Application Support/pr-changes/`, `~/Library/Caches/pr-changes/`
//! - Windows: `%APPDATA%\pr-changes\`, `%LOCALAPPDATA%\pr-changes\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "pr-changes";
const DEFAULT_USER: &str = "default";

/// Get the application config directory
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the application cache directory
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get path to the preference file of `user`
/// Returns ~/.config/pr-changes/preferences/<user>.toml on Linux
pub fn user_preferences_path(user: &str) -> Result<PathBuf> {
    Ok(config_dir()?
        .join("preferences")
        .join(format!("{}.toml", file_stem_for(user))))
}

/// Name of the acting user: `$USER`, then `$USERNAME`, then "default"
pub fn current_user() -> String {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USER.to_string())
}

/// Make a user name safe to use as a file name.
fn file_stem_for(user: &str) -> String {
    let stem: String = user
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        DEFAULT_USER.to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_for() {
        assert_eq!(file_stem_for("alice"), "alice");
        assert_eq!(file_stem_for("DOMAIN\\bob smith"), "DOMAIN_bob_smith");
        assert_eq!(file_stem_for("../etc"), ".._etc");
        assert_eq!(file_stem_for(".."), "default");
        assert_eq!(file_stem_for("  "), "default");
    }

    #[test]
    fn test_current_user_is_never_empty() {
        assert!(!current_user().trim().is_empty());
    }
}
