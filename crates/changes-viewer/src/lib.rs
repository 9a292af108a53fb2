//! # changes-viewer
//!
//! Turns the raw unified diff of a comparison (`target...source`) into a
//! stable, renderable list of file changes with aggregate statistics, and
//! keeps the view state around it: layout style, line wrapping and the
//! sticky header.
//!
//! ## Design Principles
//!
//! This crate is **instrumented**: it receives data and emits events without
//! calling external services itself. Fetching goes through the
//! [`DiffFetcher`] trait, persistence through [`PreferenceStore`], and the
//! controller reports what it needs as [`ChangesEvent`]s.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use changes_viewer::{ChangesAction, ChangesController, ChangesSession, MemoryPreferenceStore};
//!
//! let controller = ChangesController::new(MemoryPreferenceStore::new());
//! let mut session = ChangesSession::new(controller, fetcher);
//!
//! session.dispatch(ChangesAction::SetComparison {
//!     repository: "owner/repo".into(),
//!     target: Some("main".into()),
//!     source: Some("feature".into()),
//! });
//! session.settle().await;
//!
//! let view = session.controller().view_model();
//! println!("{}", view.stats.summary_label());
//! ```

pub mod action;
pub mod anchors;
pub mod event;
pub mod model;
pub mod parser;
pub mod session;
pub mod state;
pub mod stats;
pub mod sticky;
pub mod traits;
pub mod view_config;

// Re-export commonly used types
pub use action::ChangesAction;
pub use anchors::{derive_anchors, FileAnchors};
pub use event::ChangesEvent;
pub use model::{ComparisonKey, DiffLine, FileChange, FileDiff, FileStatus, Hunk, LineKind};
pub use parser::{parse_unified_diff, parse_unified_diff_with_report, ParseAnomaly};
pub use session::ChangesSession;
pub use state::{
    ChangesController, ChangesView, ChangesViewModel, FetchRequest, FileIndexEntry, LoadState,
    RequestId,
};
pub use stats::{aggregate, DiffStats, LineCounts};
pub use sticky::{ScrollEmitter, ScrollStickiness, ScrollSubscription};
pub use traits::{DiffFetcher, FetchError, MemoryPreferenceStore, NoOpDiffFetcher, PreferenceStore};
pub use view_config::{LayoutStyle, Preference, PreferenceKey, ViewConfigStore, ViewConfiguration};
