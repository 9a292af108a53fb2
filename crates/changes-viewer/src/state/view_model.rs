//! What the rendering layer receives on each update.

use crate::model::{FileChange, FileStatus};
use crate::parser::parse_unified_diff;
use crate::stats::{aggregate, DiffStats};
use crate::traits::FetchError;
use crate::view_config::ViewConfiguration;

/// Records and totals of one successfully loaded comparison.
///
/// Built in one go and swapped in whole, so the renderer never sees a
/// partially parsed list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangesView {
    pub files: Vec<FileChange>,
    pub stats: DiffStats,
}

impl ChangesView {
    /// Parse, enrich and aggregate a raw diff.
    pub fn from_raw(raw_diff: &str) -> Self {
        let files = crate::model::enrich(parse_unified_diff(raw_diff));
        let stats = aggregate(&files);
        Self { files, stats }
    }
}

/// Composed, read-only view of the controller.
#[derive(Debug, Clone, Copy)]
pub struct ChangesViewModel<'a> {
    pub files: &'a [FileChange],
    pub stats: DiffStats,
    pub config: ViewConfiguration,
    /// Show the "scroll to top" affordance.
    pub is_sticky: bool,
    /// Offset at which per-file headers pin.
    pub sticky_top_position: u32,
    pub loading: bool,
    pub error: Option<&'a FetchError>,
    pub read_only: bool,
}

/// One row of the changed-files dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIndexEntry {
    pub display_name: String,
    /// Scroll target for the row.
    pub container_id: String,
    pub status: FileStatus,
    pub additions: usize,
    pub deletions: usize,
}

impl From<&FileChange> for FileIndexEntry {
    fn from(change: &FileChange) -> Self {
        Self {
            display_name: change.diff.display_name(),
            container_id: change.anchors.container_id.clone(),
            status: change.diff.status,
            additions: change.diff.additions,
            deletions: change.diff.deletions,
        }
    }
}
