//! Search result types.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::listener::SearchListener;
use crate::sequencer::Generation;

/// A single search result as delivered by a YaCy peer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    /// Result title.
    pub title: String,
    /// Result URL.
    pub link: String,
    /// Result description/snippet.
    pub description: String,
    /// Publication date as sent by the peer (RFC 822).
    pub pub_date: Option<String>,
    /// Document size in bytes.
    pub size: Option<u64>,
    /// Human readable document size.
    pub size_name: Option<String>,
    /// Unique identifier of the document in the peer's index.
    pub guid: Option<String>,
    /// Host part of the result URL.
    pub host: Option<String>,
    /// Path part of the result URL.
    pub path: Option<String>,
    /// File name part of the result URL.
    pub file: Option<String>,
}

impl SearchItem {
    /// Creates a new search result.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Sets the publication date.
    pub fn with_pub_date(mut self, date: impl Into<String>) -> Self {
        self.pub_date = Some(date.into());
        self
    }

    /// Sets the document size in bytes.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the document GUID.
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }
}

/// Ordered collection of the results of the active search generation.
///
/// Insertion order is display order. The store does not arbitrate between
/// writers; the orchestrator's staleness checks make sure only the current
/// search appends.
#[derive(Debug, Default)]
pub struct ResultStore {
    items: RwLock<Vec<SearchItem>>,
}

impl ResultStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<SearchItem>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<SearchItem>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes all items and returns how many there were.
    ///
    /// The listener always hears the pre-clear count, zero included. It is
    /// notified after the lock is released and may read the store.
    pub fn clear(&self, listener: &dyn SearchListener) -> usize {
        let count = self.take_all();
        listener.on_old_result_cleared(count);
        count
    }

    fn take_all(&self) -> usize {
        let mut items = self.write();
        let count = items.len();
        if count > 0 {
            items.clear();
        }
        count
    }

    /// Clears the store on behalf of `generation`, unless it is superseded.
    ///
    /// Returns the pre-clear count, or `None` if nothing happened.
    pub fn clear_if_current(
        &self,
        listener: &dyn SearchListener,
        generation: &Generation,
    ) -> Option<usize> {
        let count = {
            let mut items = self.write();
            if generation.is_superseded() {
                return None;
            }
            let count = items.len();
            if count > 0 {
                items.clear();
            }
            count
        };
        listener.on_old_result_cleared(count);
        Some(count)
    }

    /// Appends an item at the end.
    pub fn append(&self, item: SearchItem) {
        self.write().push(item);
    }

    /// Appends an item only if `generation` is still current.
    ///
    /// The check happens under the write lock, so an item can never land
    /// after a newer generation has cleared the store.
    pub fn append_if_current(&self, item: SearchItem, generation: &Generation) -> bool {
        let mut items = self.write();
        if generation.is_superseded() {
            return false;
        }
        items.push(item);
        true
    }

    /// Returns a snapshot of the current items.
    pub fn items(&self) -> Vec<SearchItem> {
        self.read().clone()
    }

    /// Returns the item at `index`, if any.
    pub fn get(&self, index: usize) -> Option<SearchItem> {
        self.read().get(index).cloned()
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
