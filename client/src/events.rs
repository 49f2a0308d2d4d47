use std::{mem, vec::IntoIter};

use crate::SyncClientError;

/// Outcomes queued by the sync engine & client since they were last taken.
///
/// Read a specific kind with `events.read::<SyncSucceededEvent>()`.
pub struct SyncEvents {
    successes: Vec<f64>,
    success_texts: Vec<String>,
    failures: Vec<()>,
    errors: Vec<SyncClientError>,

    empty: bool,
}

impl SyncEvents {
    pub(crate) fn new() -> Self {
        Self {
            successes: Vec::new(),
            success_texts: Vec::new(),
            failures: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: SyncEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: SyncEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_success(&mut self, offset_seconds: f64) {
        self.successes.push(offset_seconds);
        self.success_texts.push(offset_seconds.to_string());
        self.empty = false;
    }

    pub(crate) fn push_failure(&mut self) {
        self.failures.push(());
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: SyncClientError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait SyncEvent {
    type Iter;

    fn iter(events: &mut SyncEvents) -> Self::Iter;

    fn has(events: &SyncEvents) -> bool;
}

// SyncSucceededEvent
/// Offset in seconds of every session that succeeded
pub struct SyncSucceededEvent;
impl SyncEvent for SyncSucceededEvent {
    type Iter = IntoIter<f64>;

    fn iter(events: &mut SyncEvents) -> Self::Iter {
        let list = mem::take(&mut events.successes);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SyncEvents) -> bool {
        !events.successes.is_empty()
    }
}

// SyncSucceededTextEvent
/// Same offsets as `SyncSucceededEvent`, formatted for display
pub struct SyncSucceededTextEvent;
impl SyncEvent for SyncSucceededTextEvent {
    type Iter = IntoIter<String>;

    fn iter(events: &mut SyncEvents) -> Self::Iter {
        let list = mem::take(&mut events.success_texts);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SyncEvents) -> bool {
        !events.success_texts.is_empty()
    }
}

// SyncFailedEvent
/// One item per session that ran out of retries
pub struct SyncFailedEvent;
impl SyncEvent for SyncFailedEvent {
    type Iter = IntoIter<()>;

    fn iter(events: &mut SyncEvents) -> Self::Iter {
        let list = mem::take(&mut events.failures);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SyncEvents) -> bool {
        !events.failures.is_empty()
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl SyncEvent for ErrorEvent {
    type Iter = IntoIter<SyncClientError>;

    fn iter(events: &mut SyncEvents) -> Self::Iter {
        let list = mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SyncEvents) -> bool {
        !events.errors.is_empty()
    }
}
