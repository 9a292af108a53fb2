//! Data models for diff representation.

mod change;
mod diff;

pub use change::{enrich, ComparisonKey, FileChange};
pub use diff::{DiffLine, FileDiff, FileStatus, Hunk, LineKind};
