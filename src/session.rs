//! Shared state of one search session.
//!
//! A session lives as long as the [`Search`](crate::Search) that owns it.
//! Nothing is ever reset: the request counter only moves forward (wrapping
//! at `i64::MAX`), the store is cleared by each new search generation and
//! the loading flag is cleared only by the latest search, once it ends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::result::{ResultStore, SearchItem};
use crate::sequencer::{Generation, RequestId, RequestSequencer};

/// Session context shared by all in-flight searches.
#[derive(Debug, Default)]
pub struct SearchSession {
    sequencer: Arc<RequestSequencer>,
    store: ResultStore,
    loading: AtomicBool,
    last_search: RwLock<Option<String>>,
    lifecycle: Mutex<()>,
}

impl SearchSession {
    /// Creates a fresh session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation, superseding every earlier one.
    pub fn next_generation(&self) -> Generation {
        Generation::next(&self.sequencer)
    }

    fn lifecycle(&self) -> MutexGuard<'_, ()> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new generation and raises the loading flag in one step.
    pub(crate) fn start(&self) -> Generation {
        let _guard = self.lifecycle();
        let generation = self.next_generation();
        self.set_loading(true);
        generation
    }

    /// Lowers the loading flag on behalf of `generation`.
    ///
    /// Returns false, leaving the flag alone, if a newer generation exists.
    pub(crate) fn finish(&self, generation: &Generation) -> bool {
        let _guard = self.lifecycle();
        if generation.is_superseded() {
            return false;
        }
        self.set_loading(false);
        true
    }

    /// The id of the most recent submission.
    pub fn current_id(&self) -> RequestId {
        self.sequencer.current_id()
    }

    /// The result store of the active generation.
    pub fn results(&self) -> &ResultStore {
        &self.store
    }

    /// Snapshot of the results.
    pub fn items(&self) -> Vec<SearchItem> {
        self.store.items()
    }

    /// Whether a search is currently loading.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::SeqCst);
    }

    /// The last raw query submitted, before normalization.
    pub fn last_search(&self) -> Option<String> {
        self.last_search
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn record_search(&self, raw: &str) {
        *self
            .last_search
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(raw.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new() {
        let session = SearchSession::new();
        assert!(!session.is_loading());
        assert!(session.last_search().is_none());
        assert!(session.items().is_empty());
        assert_eq!(session.current_id(), RequestId::INITIAL);
    }

    #[test]
    fn test_session_generations_supersede() {
        let session = SearchSession::new();
        let first = session.next_generation();
        let second = session.next_generation();
        assert!(first.is_superseded());
        assert!(second.is_current());
        assert_eq!(session.current_id(), second.id());
    }

    #[test]
    fn test_session_loading_flag() {
        let session = SearchSession::new();
        session.set_loading(true);
        assert!(session.is_loading());
        session.set_loading(false);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_session_finish_ignores_superseded_generation() {
        let session = SearchSession::new();
        let first = session.start();
        let second = session.start();

        assert!(!session.finish(&first));
        assert!(session.is_loading());
        assert!(session.finish(&second));
        assert!(!session.is_loading());
    }

    #[test]
    fn test_session_concurrent_starts_keep_latest_loading() {
        let session = Arc::new(SearchSession::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let generation = session.start();
                        session.finish(&generation);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let last = session.start();
        assert!(session.is_loading());
        assert!(session.finish(&last));
        assert!(!session.is_loading());
    }

    #[test]
    fn test_session_records_raw_query() {
        let session = SearchSession::new();
        session.record_search("  hello   world ");
        assert_eq!(session.last_search().as_deref(), Some("  hello   world "));
    }
}
