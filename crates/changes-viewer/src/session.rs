//! Async driver connecting a [`ChangesController`] to a [`DiffFetcher`].
//!
//! Fetches run as tokio tasks. Their results, like the scroll offsets of a
//! mounted [`ScrollEmitter`], come back through a single channel and are
//! applied one at a time, so the controller is only ever mutated from the
//! task that owns the session.

use crate::action::ChangesAction;
use crate::event::ChangesEvent;
use crate::state::{ChangesController, FetchRequest};
use crate::sticky::{ScrollEmitter, ScrollSubscription};
use crate::traits::{DiffFetcher, FetchError, PreferenceStore};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Owns a controller and performs the fetches it asks for.
pub struct ChangesSession<S> {
    controller: ChangesController<S>,
    fetcher: Arc<dyn DiffFetcher>,
    actions_tx: mpsc::UnboundedSender<ChangesAction>,
    actions_rx: mpsc::UnboundedReceiver<ChangesAction>,
    in_flight: usize,
    scroll: Option<ScrollSubscription>,
}

impl<S: PreferenceStore> ChangesSession<S> {
    pub fn new(controller: ChangesController<S>, fetcher: Arc<dyn DiffFetcher>) -> Self {
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            fetcher,
            actions_tx,
            actions_rx,
            in_flight: 0,
            scroll: None,
        }
    }

    pub fn controller(&self) -> &ChangesController<S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ChangesController<S> {
        &mut self.controller
    }

    /// Number of fetches whose results have not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    // === Scroll subscription ===

    /// Follow scroll offsets published on `emitter`. Does nothing if
    /// already mounted.
    ///
    /// Offsets are queued as [`ChangesAction::Scrolled`] and applied by
    /// [`drain_pending`](Self::drain_pending) or while waiting for fetches.
    pub fn mount(&mut self, emitter: &ScrollEmitter) {
        if self.scroll.is_some() {
            return;
        }

        let tx = self.actions_tx.clone();
        self.scroll = Some(emitter.subscribe(move |offset| {
            // The receiver lives as long as the session, which owns this guard.
            let _ = tx.send(ChangesAction::Scrolled(offset));
        }));
        log::debug!("Changes view mounted");
    }

    /// Stop following the emitter.
    pub fn unmount(&mut self) {
        if self.scroll.take().is_some() {
            log::debug!("Changes view unmounted");
        }
    }

    // === Dispatch ===

    /// Apply an action and start any fetch it requests.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, action: ChangesAction) -> Vec<ChangesEvent> {
        let events = self.controller.handle_action(action);
        for event in &events {
            if let ChangesEvent::FetchRequested(request) = event {
                self.spawn_fetch(request.clone());
            }
        }
        events
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        if !self.fetcher.is_available() {
            log::warn!("Diff fetcher reports unavailable, trying anyway");
        }

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.actions_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let key = request.key.clone();
            let fetch = tokio::spawn(async move { fetcher.fetch_diff(&key).await });
            let result = match fetch.await {
                Ok(result) => result,
                Err(e) => {
                    log::error!("Fetch {} for {} did not finish: {}", request.id, request.key, e);
                    Err(FetchError::Transport(format!("Fetch task failed: {}", e)))
                }
            };

            if tx
                .send(ChangesAction::FetchCompleted {
                    request: request.id,
                    result,
                })
                .is_err()
            {
                log::debug!("Session closed before fetch {} completed", request.id);
            }
        });
    }

    /// Apply one queued action, keeping the in-flight count in step.
    fn apply(&mut self, action: ChangesAction) -> Vec<ChangesEvent> {
        if matches!(action, ChangesAction::FetchCompleted { .. }) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        self.dispatch(action)
    }

    /// Apply every queued action without waiting.
    pub fn drain_pending(&mut self) -> Vec<ChangesEvent> {
        let mut events = Vec::new();
        while let Ok(action) = self.actions_rx.try_recv() {
            events.extend(self.apply(action));
        }
        events
    }

    /// Wait for the next fetch to finish and apply its result, together
    /// with any scroll offsets queued before it.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Vec<ChangesEvent>> {
        if self.in_flight == 0 {
            return None;
        }

        let mut events = Vec::new();
        while let Some(action) = self.actions_rx.recv().await {
            let completed = matches!(action, ChangesAction::FetchCompleted { .. });
            events.extend(self.apply(action));
            if completed {
                return Some(events);
            }
        }
        Some(events)
    }

    /// Apply results until no fetch is in flight, collecting all events.
    pub async fn settle(&mut self) -> Vec<ChangesEvent> {
        let mut events = Vec::new();
        while let Some(batch) = self.next_completion().await {
            events.extend(batch);
        }
        events.extend(self.drain_pending());
        events
    }
}
