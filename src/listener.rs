//! Lifecycle callbacks delivered by the search pipeline.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{SearchError, SearchItem};

/// Receiver of search lifecycle events.
///
/// Callbacks run on whichever task drives the search and must not block.
/// No lock is held while a callback runs, so listeners may read the session
/// and the result store.
pub trait SearchListener: Send + Sync {
    /// A search was accepted and is about to start loading.
    fn on_loading_data(&self);

    /// The result store is being cleared; `count` items existed.
    fn on_old_result_cleared(&self, count: usize);

    /// No network connection was available.
    fn on_network_unavailable(&self);

    /// The current search completed and all items were delivered.
    fn on_finished_data(&self);

    /// The current search failed.
    fn on_error(&self, error: &SearchError);

    /// A result was parsed and appended to the store.
    fn on_item_found(&self, item: &SearchItem);
}

/// Listener that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl SearchListener for NoopListener {
    fn on_loading_data(&self) {}
    fn on_old_result_cleared(&self, _count: usize) {}
    fn on_network_unavailable(&self) {}
    fn on_finished_data(&self) {}
    fn on_error(&self, _error: &SearchError) {}
    fn on_item_found(&self, _item: &SearchItem) {}
}

/// Owned representation of a listener callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchEvent {
    LoadingData,
    OldResultCleared { count: usize },
    NetworkUnavailable,
    FinishedData,
    Error { message: String, status: Option<u16> },
    ItemFound { item: SearchItem },
}

impl SearchEvent {
    /// Builds the event for a failed search.
    pub fn error(error: &SearchError) -> Self {
        Self::Error {
            message: error.to_string(),
            status: error.status(),
        }
    }

    /// Returns true for events that end a search.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NetworkUnavailable | Self::FinishedData | Self::Error { .. }
        )
    }
}

/// Listener that forwards every callback as a [`SearchEvent`] over a channel.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<SearchEvent>,
}

impl ChannelListener {
    /// Creates a listener together with the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: SearchEvent) {
        // A dropped receiver just means nobody is watching anymore.
        let _ = self.sender.send(event);
    }
}

impl SearchListener for ChannelListener {
    fn on_loading_data(&self) {
        self.send(SearchEvent::LoadingData);
    }

    fn on_old_result_cleared(&self, count: usize) {
        self.send(SearchEvent::OldResultCleared { count });
    }

    fn on_network_unavailable(&self) {
        self.send(SearchEvent::NetworkUnavailable);
    }

    fn on_finished_data(&self) {
        self.send(SearchEvent::FinishedData);
    }

    fn on_error(&self, error: &SearchError) {
        self.send(SearchEvent::error(error));
    }

    fn on_item_found(&self, item: &SearchItem) {
        self.send(SearchEvent::ItemFound { item: item.clone() });
    }
}

/// Listener that keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<SearchEvent>>,
}

impl RecordingListener {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: SearchEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<SearchEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Counts recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&SearchEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| predicate(e))
            .count()
    }
}

impl SearchListener for RecordingListener {
    fn on_loading_data(&self) {
        self.push(SearchEvent::LoadingData);
    }

    fn on_old_result_cleared(&self, count: usize) {
        self.push(SearchEvent::OldResultCleared { count });
    }

    fn on_network_unavailable(&self) {
        self.push(SearchEvent::NetworkUnavailable);
    }

    fn on_finished_data(&self) {
        self.push(SearchEvent::FinishedData);
    }

    fn on_error(&self, error: &SearchError) {
        self.push(SearchEvent::error(error));
    }

    fn on_item_found(&self, item: &SearchItem) {
        self.push(SearchEvent::ItemFound { item: item.clone() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_listener_keeps_order() {
        let listener = RecordingListener::new();
        listener.on_loading_data();
        listener.on_item_found(&SearchItem::new("t", "l", "d"));
        listener.on_finished_data();

        let events = listener.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], SearchEvent::LoadingData);
        assert!(matches!(events[1], SearchEvent::ItemFound { .. }));
        assert_eq!(events[2], SearchEvent::FinishedData);
        assert_eq!(listener.count(SearchEvent::is_terminal), 1);
    }

    #[test]
    fn test_error_event_carries_status() {
        let event = SearchEvent::error(&SearchError::HttpStatus(503));
        assert_eq!(
            event,
            SearchEvent::Error {
                message: "Server returned HTTP code 503".to_string(),
                status: Some(503),
            }
        );
        assert!(event.is_terminal());
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&SearchEvent::OldResultCleared { count: 4 }).unwrap();
        assert_eq!(json, r#"{"event":"old_result_cleared","count":4}"#);
    }

    #[tokio::test]
    async fn test_channel_listener_forwards_events() {
        let (listener, mut rx) = ChannelListener::new();
        listener.on_loading_data();
        listener.on_network_unavailable();

        assert_eq!(rx.recv().await, Some(SearchEvent::LoadingData));
        assert_eq!(rx.recv().await, Some(SearchEvent::NetworkUnavailable));
    }

    #[test]
    fn test_channel_listener_ignores_closed_receiver() {
        let (listener, rx) = ChannelListener::new();
        drop(rx);
        listener.on_finished_data();
    }

    #[test]
    fn test_noop_listener() {
        let listener = NoopListener;
        listener.on_old_result_cleared(3);
        listener.on_error(&SearchError::NetworkUnavailable);
    }
}
