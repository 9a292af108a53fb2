//! Configuration and file management for pr-changes
//!
//! This crate provides:
//! - File path utilities for config and cache files
//! - A per-user, file-backed [`PreferenceStore`](changes_viewer::PreferenceStore)

pub mod paths;
pub mod preferences;

pub use paths::{cache_dir, config_dir, current_user, user_preferences_path};
pub use preferences::FilePreferenceStore;
