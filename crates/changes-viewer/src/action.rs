//! Changes View Actions
//!
//! Tagged actions the changes controller can process. The host maps its own
//! inputs (route changes, fetch completions, clicks, scroll events) to these
//! and dispatches them to the controller.

use crate::state::RequestId;
use crate::traits::FetchError;
use crate::view_config::LayoutStyle;

/// Actions that can be performed on the changes view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangesAction {
    // === Data ===
    /// The comparison endpoints changed. Missing or empty revisions mean
    /// there is nothing to fetch.
    SetComparison {
        repository: String,
        target: Option<String>,
        source: Option<String>,
    },
    /// A fetch issued earlier finished.
    FetchCompleted {
        request: RequestId,
        result: Result<String, FetchError>,
    },
    /// Re-issue the fetch for the current comparison.
    Retry,

    // === Scrolling ===
    /// The viewport scrolled to this offset.
    Scrolled(u32),
    /// The "scroll to top" affordance was pressed.
    ScrollToTop,

    // === View configuration ===
    SetLayoutStyle(LayoutStyle),
    SetLineBreaks(bool),
    ToggleLineBreaks,
}
