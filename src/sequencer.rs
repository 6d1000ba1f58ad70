//! Request identifiers and staleness detection.
//!
//! Every submitted search takes a fresh [`RequestId`]. Only the most recently
//! issued id is current; a search whose id is no longer current has been
//! superseded and must stop delivering results. The counter wraps from
//! `i64::MAX` to `i64::MIN`, so ordering only holds within a practical
//! session lifetime.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier of one search submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(i64);

impl RequestId {
    /// Value held by a sequencer that has not issued anything yet.
    pub const INITIAL: RequestId = RequestId(i64::MIN);

    /// Returns the raw counter value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues request identifiers and tracks the current one.
#[derive(Debug)]
pub struct RequestSequencer {
    current: AtomicI64,
}

impl RequestSequencer {
    /// Creates a sequencer positioned at [`RequestId::INITIAL`].
    pub fn new() -> Self {
        Self::starting_at(RequestId::INITIAL)
    }

    /// Creates a sequencer whose next id follows `id`.
    pub fn starting_at(id: RequestId) -> Self {
        Self {
            current: AtomicI64::new(id.0),
        }
    }

    /// Issues a fresh id and makes it current.
    ///
    /// Concurrent callers always receive distinct ids. The atomic add wraps
    /// at `i64::MAX` back to `i64::MIN`.
    pub fn next_id(&self) -> RequestId {
        let previous = self.current.fetch_add(1, Ordering::SeqCst);
        RequestId(previous.wrapping_add(1))
    }

    /// Returns the most recently issued id.
    pub fn current_id(&self) -> RequestId {
        RequestId(self.current.load(Ordering::SeqCst))
    }

    /// Returns true if `id` is still the current one.
    pub fn is_current(&self, id: RequestId) -> bool {
        self.current_id() == id
    }
}

impl Default for RequestSequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation token for one search generation.
///
/// Holds the id issued for a submission together with the sequencer that
/// issued it. The generation is live for as long as no newer id has been
/// handed out.
#[derive(Debug, Clone)]
pub struct Generation {
    id: RequestId,
    sequencer: Arc<RequestSequencer>,
}

impl Generation {
    /// Issues a new id from `sequencer` and wraps it in a token.
    pub fn next(sequencer: &Arc<RequestSequencer>) -> Self {
        Self {
            id: sequencer.next_id(),
            sequencer: Arc::clone(sequencer),
        }
    }

    /// The id of this generation.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Returns true while no newer search has been submitted.
    pub fn is_current(&self) -> bool {
        self.sequencer.is_current(self.id)
    }

    /// Returns true once a newer search has been submitted.
    pub fn is_superseded(&self) -> bool {
        !self.is_current()
    }
}
