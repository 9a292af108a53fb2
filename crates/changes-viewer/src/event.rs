//! Events emitted by the changes controller for the host to handle.

use crate::state::FetchRequest;
use crate::traits::FetchError;
use crate::view_config::ViewConfiguration;

/// Events emitted by the changes controller.
///
/// The controller performs no I/O. Fetching, scrolling the viewport and
/// re-rendering are the host's job, triggered by these events.
///
/// # Example
///
/// ```ignore
/// for event in controller.handle_action(action) {
///     match event {
///         ChangesEvent::FetchRequested(request) => {
///             let result = fetcher.fetch_diff(&request.key).await;
///             controller.handle_action(ChangesAction::FetchCompleted {
///                 request: request.id,
///                 result,
///             });
///         }
///         ChangesEvent::ScrollToTop => viewport.scroll_to(0),
///         _ => redraw(controller.view_model()),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangesEvent {
    /// A diff must be fetched and reported back with its request id.
    FetchRequested(FetchRequest),
    /// New records and stats are available.
    ViewUpdated,
    /// Previously displayed records were dropped.
    Cleared,
    /// The fetch failed; the view shows the error with a retry action.
    LoadFailed(FetchError),
    /// The sticky header flag flipped.
    StickyChanged(bool),
    /// The host should scroll the viewport back to the top.
    ScrollToTop,
    /// Layout style or line wrapping changed.
    ViewConfigChanged(ViewConfiguration),
}
