//! File changes enriched with their render anchors, and the comparison they belong to.

use super::{FileDiff, FileStatus};
use crate::anchors::{derive_anchors, FileAnchors};

/// A parsed file diff plus the stable anchors the rendering layer keys it by.
///
/// Anchors depend on the path pair only, never on the position of the file
/// in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub diff: FileDiff,
    pub anchors: FileAnchors,
}

impl FileChange {
    /// Enrich a parsed file diff with its anchors.
    pub fn new(diff: FileDiff) -> Self {
        let anchors = derive_anchors(diff.old_path.as_deref(), diff.new_path.as_deref());
        Self { diff, anchors }
    }

    pub fn container_id(&self) -> &str {
        &self.anchors.container_id
    }

    pub fn content_id(&self) -> &str {
        &self.anchors.content_id
    }

    pub fn old_path(&self) -> Option<&str> {
        self.diff.old_path.as_deref()
    }

    pub fn new_path(&self) -> Option<&str> {
        self.diff.new_path.as_deref()
    }

    pub fn status(&self) -> FileStatus {
        self.diff.status
    }
}

impl From<FileDiff> for FileChange {
    fn from(diff: FileDiff) -> Self {
        Self::new(diff)
    }
}

/// Enrich every parsed file diff, preserving order.
pub fn enrich(files: Vec<FileDiff>) -> Vec<FileChange> {
    files.into_iter().map(FileChange::new).collect()
}

/// Identifies one comparison: a repository and the two revisions being compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComparisonKey {
    /// Repository identifier (e.g. `owner/name`).
    pub repository: String,
    /// Revision the changes are merged into.
    pub target: String,
    /// Revision carrying the changes.
    pub source: String,
}

impl ComparisonKey {
    /// Build a key when both revisions are present and non-empty.
    ///
    /// Returns `None` otherwise, which callers treat as "do not fetch".
    pub fn from_endpoints(
        repository: impl Into<String>,
        target: Option<&str>,
        source: Option<&str>,
    ) -> Option<Self> {
        let target = target.map(str::trim).filter(|t| !t.is_empty())?;
        let source = source.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Self {
            repository: repository.into(),
            target: target.to_string(),
            source: source.to_string(),
        })
    }

    /// Three-dot range notation, `target...source`.
    pub fn range(&self) -> String {
        format!("{}...{}", self.target, self.source)
    }
}

impl std::fmt::Display for ComparisonKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.repository, self.range())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrich_preserves_order_and_paths() {
        let files = vec![
            FileDiff::new(Some("b.rs".into()), Some("b.rs".into())),
            FileDiff::new(None, Some("a.rs".into())),
        ];
        let changes = enrich(files);

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].container_id(), "container-b.rs::::b.rs");
        assert_eq!(changes[1].content_id(), "content-a.rs");
        assert_eq!(changes[1].status(), FileStatus::Added);
    }

    #[test]
    fn test_comparison_key_requires_both_endpoints() {
        assert!(ComparisonKey::from_endpoints("o/r", Some("main"), None).is_none());
        assert!(ComparisonKey::from_endpoints("o/r", None, Some("feature")).is_none());
        assert!(ComparisonKey::from_endpoints("o/r", Some(""), Some("feature")).is_none());
        assert!(ComparisonKey::from_endpoints("o/r", Some("main"), Some("  ")).is_none());

        let key = ComparisonKey::from_endpoints("o/r", Some("main"), Some("feature")).unwrap();
        assert_eq!(key.range(), "main...feature");
        assert_eq!(key.to_string(), "o/r@main...feature");
    }
}
