//! Main state for the changes view.

use super::{ChangesView, ChangesViewModel, FetchRequest, FileIndexEntry, LoadState, RequestId};
use crate::action::ChangesAction;
use crate::event::ChangesEvent;
use crate::model::{ComparisonKey, FileChange};
use crate::sticky::{ScrollStickiness, STICKY_TOP_POSITION};
use crate::stats::DiffStats;
use crate::traits::{FetchError, PreferenceStore};
use crate::view_config::{Preference, ViewConfigStore, ViewConfiguration};

/// Binds fetched diff data, view configuration and scroll position.
///
/// The controller is driven by [`ChangesAction`]s and answers with
/// [`ChangesEvent`]s; it never fetches anything itself.
#[derive(Debug)]
pub struct ChangesController<S> {
    comparison: Option<ComparisonKey>,
    load_state: LoadState,
    view: Option<ChangesView>,
    next_request: u64,
    view_config: ViewConfigStore<S>,
    sticky: ScrollStickiness,
    read_only: bool,
}

impl<S: PreferenceStore> ChangesController<S> {
    /// Create a controller, reading view preferences from `store`.
    pub fn new(store: S) -> Self {
        Self {
            comparison: None,
            load_state: LoadState::Idle,
            view: None,
            next_request: 0,
            view_config: ViewConfigStore::load(store),
            sticky: ScrollStickiness::default(),
            read_only: false,
        }
    }

    /// Hide review affordances in the rendered output.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    // === Accessors ===

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn comparison(&self) -> Option<&ComparisonKey> {
        self.comparison.as_ref()
    }

    /// Records of the loaded comparison (empty unless ready).
    pub fn files(&self) -> &[FileChange] {
        self.view.as_ref().map(|v| v.files.as_slice()).unwrap_or_default()
    }

    pub fn stats(&self) -> DiffStats {
        self.view.as_ref().map(|v| v.stats).unwrap_or_default()
    }

    pub fn view_config(&self) -> ViewConfiguration {
        self.view_config.config()
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky.is_stuck()
    }

    /// Everything the renderer needs for one frame.
    pub fn view_model(&self) -> ChangesViewModel<'_> {
        ChangesViewModel {
            files: self.files(),
            stats: self.stats(),
            config: self.view_config(),
            is_sticky: self.is_sticky(),
            sticky_top_position: STICKY_TOP_POSITION,
            loading: self.load_state.is_loading(),
            error: self.load_state.error(),
            read_only: self.read_only,
        }
    }

    /// Rows for the changed-files dropdown, in display order.
    pub fn file_index(&self) -> Vec<FileIndexEntry> {
        self.files().iter().map(FileIndexEntry::from).collect()
    }

    // === Action handling ===

    /// Handle an action and return any events for the host.
    pub fn handle_action(&mut self, action: ChangesAction) -> Vec<ChangesEvent> {
        match action {
            ChangesAction::SetComparison {
                repository,
                target,
                source,
            } => self.set_comparison(repository, target.as_deref(), source.as_deref()),
            ChangesAction::FetchCompleted { request, result } => {
                self.complete_fetch(request, result)
            }
            ChangesAction::Retry => self.retry(),
            ChangesAction::Scrolled(offset) => {
                let was_stuck = self.sticky.is_stuck();
                let stuck = self.sticky.on_scroll(offset);
                if stuck != was_stuck {
                    vec![ChangesEvent::StickyChanged(stuck)]
                } else {
                    vec![]
                }
            }
            ChangesAction::ScrollToTop => vec![ChangesEvent::ScrollToTop],
            ChangesAction::SetLayoutStyle(style) => {
                self.update_preference(Preference::LayoutStyle(style))
            }
            ChangesAction::SetLineBreaks(enabled) => {
                self.update_preference(Preference::LineBreaks(enabled))
            }
            ChangesAction::ToggleLineBreaks => {
                let enabled = !self.view_config.line_breaks_enabled();
                self.update_preference(Preference::LineBreaks(enabled))
            }
        }
    }

    fn set_comparison(
        &mut self,
        repository: String,
        target: Option<&str>,
        source: Option<&str>,
    ) -> Vec<ChangesEvent> {
        let Some(key) = ComparisonKey::from_endpoints(repository, target, source) else {
            log::debug!("Comparison endpoints incomplete, staying idle");
            return self.reset_to_idle();
        };

        if self.comparison.as_ref() == Some(&key)
            && matches!(self.load_state, LoadState::Loading(_) | LoadState::Ready)
        {
            return vec![];
        }

        let mut events = Vec::new();
        if self.comparison.as_ref() != Some(&key) && self.view.take().is_some() {
            events.push(ChangesEvent::Cleared);
        }

        log::info!("Loading changes for {}", key);
        self.comparison = Some(key);
        events.extend(self.issue_fetch());
        events
    }

    fn reset_to_idle(&mut self) -> Vec<ChangesEvent> {
        self.comparison = None;
        self.load_state = LoadState::Idle;
        if self.view.take().is_some() {
            vec![ChangesEvent::Cleared]
        } else {
            vec![]
        }
    }

    fn retry(&mut self) -> Vec<ChangesEvent> {
        match self.load_state {
            LoadState::Error(_) | LoadState::Loading(_) => self.issue_fetch().into_iter().collect(),
            LoadState::Idle | LoadState::Ready => {
                log::debug!("Ignoring retry in state {:?}", self.load_state);
                vec![]
            }
        }
    }

    fn issue_fetch(&mut self) -> Option<ChangesEvent> {
        let key = self.comparison.clone()?;
        let id = RequestId(self.next_request);
        self.next_request += 1;
        self.load_state = LoadState::Loading(id);
        log::debug!("Issuing fetch {} for {}", id, key);
        Some(ChangesEvent::FetchRequested(FetchRequest { id, key }))
    }

    fn complete_fetch(
        &mut self,
        request: RequestId,
        result: Result<String, FetchError>,
    ) -> Vec<ChangesEvent> {
        if self.load_state != LoadState::Loading(request) {
            log::debug!("Discarding superseded fetch result {}", request);
            return vec![];
        }

        match result {
            Ok(raw_diff) => {
                let view = ChangesView::from_raw(&raw_diff);
                log::info!(
                    "Loaded {} file(s): +{} -{}",
                    view.files.len(),
                    view.stats.added_lines,
                    view.stats.deleted_lines
                );
                self.view = Some(view);
                self.load_state = LoadState::Ready;
                vec![ChangesEvent::ViewUpdated]
            }
            Err(e) => {
                log::warn!("Failed to load changes: {}", e);
                self.view = None;
                self.load_state = LoadState::Error(e.clone());
                vec![ChangesEvent::LoadFailed(e)]
            }
        }
    }

    fn update_preference(&mut self, preference: Preference) -> Vec<ChangesEvent> {
        if self.view_config.get(preference.key()) == preference {
            return vec![];
        }
        self.view_config.set(preference);
        vec![ChangesEvent::ViewConfigChanged(self.view_config.config())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MemoryPreferenceStore;
    use crate::view_config::LayoutStyle;
    use pretty_assertions::assert_eq;

    const DIFF: &str = "diff --git a/file1.txt b/file1.txt
--- a/file1.txt
+++ b/file1.txt
@@ -1,2 +1,4 @@
 keep
-drop
+one
+two
+three
diff --git a/file2.txt b/file2.txt
--- a/file2.txt
+++ b/file2.txt
@@ -1,3 +1,1 @@
-gone
 stay
-also gone
";

    fn controller() -> ChangesController<MemoryPreferenceStore> {
        ChangesController::new(MemoryPreferenceStore::new())
    }

    fn compare(target: Option<&str>, source: Option<&str>) -> ChangesAction {
        ChangesAction::SetComparison {
            repository: "acme/widgets".to_string(),
            target: target.map(String::from),
            source: source.map(String::from),
        }
    }

    fn requested(events: &[ChangesEvent]) -> FetchRequest {
        events
            .iter()
            .find_map(|e| match e {
                ChangesEvent::FetchRequested(request) => Some(request.clone()),
                _ => None,
            })
            .expect("expected a fetch request")
    }

    #[test]
    fn test_stays_idle_without_both_endpoints() {
        let mut state = controller();

        assert!(state.handle_action(compare(Some("main"), None)).is_empty());
        assert!(state.handle_action(compare(None, Some("feature"))).is_empty());
        assert!(state.handle_action(compare(Some(""), Some("feature"))).is_empty());
        assert_eq!(state.load_state(), &LoadState::Idle);
    }

    #[test]
    fn test_load_to_ready() {
        let mut state = controller();
        let request = requested(&state.handle_action(compare(Some("main"), Some("feature"))));
        assert_eq!(request.key.range(), "main...feature");
        assert!(state.view_model().loading);
        assert!(state.files().is_empty());

        let events = state.handle_action(ChangesAction::FetchCompleted {
            request: request.id,
            result: Ok(DIFF.to_string()),
        });

        assert_eq!(events, vec![ChangesEvent::ViewUpdated]);
        assert_eq!(state.load_state(), &LoadState::Ready);
        assert_eq!(state.files().len(), 2);
        assert_eq!(state.files()[0].container_id(), "container-file1.txt::::file1.txt");
        assert_eq!(state.stats().added_lines, 3);
        assert_eq!(state.stats().deleted_lines, 3);
    }

    #[test]
    fn test_same_comparison_does_not_refetch() {
        let mut state = controller();
        let request = requested(&state.handle_action(compare(Some("main"), Some("feature"))));
        state.handle_action(ChangesAction::FetchCompleted {
            request: request.id,
            result: Ok(DIFF.to_string()),
        });

        assert!(state.handle_action(compare(Some("main"), Some("feature"))).is_empty());
        assert!(state.load_state().is_ready());
    }

    #[test]
    fn test_error_discards_view_and_retry_refetches() {
        let mut state = controller();
        let first = requested(&state.handle_action(compare(Some("main"), Some("feature"))));
        state.handle_action(ChangesAction::FetchCompleted {
            request: first.id,
            result: Ok(DIFF.to_string()),
        });

        let second = requested(&state.handle_action(compare(Some("main"), Some("other"))));
        let events = state.handle_action(ChangesAction::FetchCompleted {
            request: second.id,
            result: Err(FetchError::Http {
                status: 500,
                message: "boom".to_string(),
            }),
        });

        assert!(matches!(events[0], ChangesEvent::LoadFailed(_)));
        assert!(state.files().is_empty());
        assert_eq!(state.stats(), DiffStats::default());
        assert!(state.view_model().error.is_some());

        let retry = requested(&state.handle_action(ChangesAction::Retry));
        assert_eq!(retry.key, second.key);
        assert!(retry.id > second.id);
        assert!(state.load_state().is_loading());
    }

    #[test]
    fn test_retry_ignored_when_idle_or_ready() {
        let mut state = controller();
        assert!(state.handle_action(ChangesAction::Retry).is_empty());

        let request = requested(&state.handle_action(compare(Some("main"), Some("feature"))));
        state.handle_action(ChangesAction::FetchCompleted {
            request: request.id,
            result: Ok(String::new()),
        });
        assert!(state.handle_action(ChangesAction::Retry).is_empty());
        assert!(state.load_state().is_ready());
        assert!(state.files().is_empty());
    }

    #[test]
    fn test_last_issued_request_wins() {
        let mut state = controller();
        let first = requested(&state.handle_action(compare(Some("main"), Some("a"))));
        let second = requested(&state.handle_action(compare(Some("main"), Some("b"))));

        // The superseded result arrives late and must be ignored.
        let events = state.handle_action(ChangesAction::FetchCompleted {
            request: first.id,
            result: Ok(DIFF.to_string()),
        });
        assert!(events.is_empty());
        assert!(state.load_state().is_loading());

        state.handle_action(ChangesAction::FetchCompleted {
            request: second.id,
            result: Ok(String::new()),
        });
        assert!(state.load_state().is_ready());
        assert!(state.files().is_empty());

        // And after the newer result, an old one still cannot overwrite it.
        assert!(state
            .handle_action(ChangesAction::FetchCompleted {
                request: first.id,
                result: Ok(DIFF.to_string()),
            })
            .is_empty());
        assert!(state.files().is_empty());
    }

    #[test]
    fn test_clearing_endpoints_returns_to_idle() {
        let mut state = controller();
        let request = requested(&state.handle_action(compare(Some("main"), Some("feature"))));
        state.handle_action(ChangesAction::FetchCompleted {
            request: request.id,
            result: Ok(DIFF.to_string()),
        });

        let events = state.handle_action(compare(Some("main"), None));
        assert_eq!(events, vec![ChangesEvent::Cleared]);
        assert_eq!(state.load_state(), &LoadState::Idle);
        assert!(state.files().is_empty());
        assert!(state.comparison().is_none());
    }

    #[test]
    fn test_new_comparison_drops_previous_records() {
        let mut state = controller();
        let request = requested(&state.handle_action(compare(Some("main"), Some("feature"))));
        state.handle_action(ChangesAction::FetchCompleted {
            request: request.id,
            result: Ok(DIFF.to_string()),
        });

        let events = state.handle_action(compare(Some("main"), Some("next")));
        assert_eq!(events[0], ChangesEvent::Cleared);
        assert!(matches!(events[1], ChangesEvent::FetchRequested(_)));
        assert!(state.files().is_empty());
    }

    #[test]
    fn test_scroll_updates_sticky_flag() {
        let mut state = controller();

        assert_eq!(
            state.handle_action(ChangesAction::Scrolled(200)),
            vec![ChangesEvent::StickyChanged(true)]
        );
        assert!(state.view_model().is_sticky);
        assert!(state.handle_action(ChangesAction::Scrolled(300)).is_empty());
        assert_eq!(
            state.handle_action(ChangesAction::Scrolled(100)),
            vec![ChangesEvent::StickyChanged(false)]
        );
    }

    #[test]
    fn test_view_config_changes_are_written_through() {
        let mut backing = MemoryPreferenceStore::new();
        {
            let mut state = ChangesController::new(&mut backing);
            let events = state.handle_action(ChangesAction::SetLayoutStyle(LayoutStyle::Unified));
            assert_eq!(
                events,
                vec![ChangesEvent::ViewConfigChanged(ViewConfiguration {
                    layout_style: LayoutStyle::Unified,
                    line_breaks_enabled: false,
                })]
            );
            assert_eq!(state.view_config().layout_style, LayoutStyle::Unified);

            // Setting the same value again is a no-op.
            assert!(state
                .handle_action(ChangesAction::SetLayoutStyle(LayoutStyle::Unified))
                .is_empty());

            state.handle_action(ChangesAction::ToggleLineBreaks);
            assert!(state.view_model().config.line_breaks_enabled);
        }

        let remounted = ChangesController::new(&mut backing);
        assert_eq!(remounted.view_config().layout_style, LayoutStyle::Unified);
        assert!(remounted.view_config().line_breaks_enabled);
        assert!(!remounted.is_sticky());
    }

    #[test]
    fn test_file_index_rows() {
        let mut state = controller().with_read_only(true);
        let request = requested(&state.handle_action(compare(Some("main"), Some("feature"))));
        state.handle_action(ChangesAction::FetchCompleted {
            request: request.id,
            result: Ok(DIFF.to_string()),
        });

        let index = state.file_index();
        assert_eq!(index.len(), 2);
        assert_eq!(index[1].display_name, "file2.txt");
        assert_eq!(index[1].container_id, "container-file2.txt::::file2.txt");
        assert_eq!((index[1].additions, index[1].deletions), (0, 2));
        assert!(state.view_model().read_only);
    }
}
