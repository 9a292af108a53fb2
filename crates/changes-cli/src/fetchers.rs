//! Diff transports used by the command line.
//!
//! [`GhCliDiffFetcher`] asks the GitHub compare API for the diff through the
//! `gh` CLI, which takes care of authentication. [`FileDiffFetcher`] reads a
//! diff that was saved to disk.

use async_trait::async_trait;
use changes_viewer::{ComparisonKey, DiffFetcher, FetchError};
use std::path::PathBuf;
use std::process::Output;

pub const DEFAULT_HOST: &str = "github.com";

/// Fetches comparison diffs with `gh api`.
pub struct GhCliDiffFetcher {
    hostname: Option<String>,
}

impl GhCliDiffFetcher {
    pub fn new(hostname: Option<String>) -> Self {
        Self { hostname }
    }

    fn args(&self, key: &ComparisonKey) -> Vec<String> {
        let mut args = vec![
            "api".to_string(),
            format!("/repos/{}/compare/{}", key.repository, key.range()),
            "-H".to_string(),
            "Accept: application/vnd.github.diff".to_string(),
        ];

        // Add --hostname for GitHub Enterprise hosts
        if let Some(h) = &self.hostname {
            if h != DEFAULT_HOST {
                args.push("--hostname".to_string());
                args.push(h.to_string());
            }
        }

        args
    }
}

#[async_trait]
impl DiffFetcher for GhCliDiffFetcher {
    async fn fetch_diff(&self, key: &ComparisonKey) -> Result<String, FetchError> {
        log::debug!("Fetching diff for {}", key);

        let output = tokio::process::Command::new("gh")
            .args(self.args(key))
            .output()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to run gh api: {}", e)))?;

        read_output(output)
    }

    fn is_available(&self) -> bool {
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join("gh").is_file()))
            .unwrap_or(false)
    }
}

/// Turn the output of `gh api` into the diff text or a fetch error.
fn read_output(output: Output) -> Result<String, FetchError> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(match http_status(&stderr) {
            Some(status) => FetchError::Http {
                status,
                message: stderr,
            },
            None => FetchError::Transport(format!("gh api failed: {}", stderr)),
        });
    }

    String::from_utf8(output.stdout).map_err(|e| FetchError::InvalidUtf8(e.to_string()))
}

/// Extract the status code from a `gh api` error such as `(HTTP 404)`.
fn http_status(stderr: &str) -> Option<u16> {
    let start = stderr.find("(HTTP ")? + "(HTTP ".len();
    let rest = &stderr[start..];
    let end = rest.find(')')?;
    rest[..end].trim().parse().ok()
}

/// Serves a diff stored in a local file, whatever the comparison.
pub struct FileDiffFetcher {
    path: PathBuf,
}

impl FileDiffFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DiffFetcher for FileDiffFetcher {
    async fn fetch_diff(&self, key: &ComparisonKey) -> Result<String, FetchError> {
        log::debug!("Reading diff for {} from {:?}", key, self.path);

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read {:?}: {}", self.path, e)))?;

        String::from_utf8(bytes).map_err(|e| FetchError::InvalidUtf8(e.to_string()))
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }
}
