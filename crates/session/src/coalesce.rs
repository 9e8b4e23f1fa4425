//! Debounced grouping of keystroke-level text changes.
//!
//! Every change is reduced to a cursor pair: where the edit point was before
//! the change and where it is after. A burst of changes where each one picks
//! up at the cursor the previous one left behind collapses into a single
//! pair spanning the whole burst, which is the shape the reconciler takes.
//!
//! The coalescer never reads a clock; callers pass `now` in.

use std::time::{Duration, Instant};

/// One change to the flat text, in chars: `removed` chars at `position` were
/// replaced by `added`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextChange {
    pub position: usize,
    pub removed: usize,
    pub added: String,
}

impl TextChange {
    pub fn insert(position: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            removed: 0,
            added: text.into(),
        }
    }

    pub fn delete(position: usize, count: usize) -> Self {
        Self {
            position,
            removed: count,
            added: String::new(),
        }
    }

    /// Backspace with the caret at `caret`: removes the char before it.
    pub fn backspace(caret: usize) -> Self {
        Self::delete(caret.saturating_sub(1), 1)
    }

    pub fn added_len(&self) -> usize {
        tools::char_len(&self.added)
    }

    /// Cursor before and after the change. Deletions start at the far end of
    /// the removed run so the pair's difference is the change in length.
    pub fn cursors(&self) -> CoalescedEdit {
        CoalescedEdit {
            last_cursor: self.position + self.removed,
            new_cursor: self.position + self.added_len(),
        }
    }
}

/// A burst of changes as one reconcilable edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoalescedEdit {
    pub last_cursor: usize,
    pub new_cursor: usize,
}

impl CoalescedEdit {
    pub fn delta(&self) -> isize {
        self.new_cursor as isize - self.last_cursor as isize
    }

    /// Whether `next` picks up where this edit left the cursor.
    pub fn continues_with(&self, next: &CoalescedEdit) -> bool {
        next.last_cursor == self.new_cursor
    }
}

#[derive(Clone, Copy, Debug)]
struct Burst {
    edit: CoalescedEdit,
    last_change: Instant,
}

#[derive(Clone, Debug)]
pub struct EditCoalescer {
    debounce: Duration,
    pending: Option<Burst>,
}

impl EditCoalescer {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<CoalescedEdit> {
        self.pending.map(|b| b.edit)
    }

    /// Record a change made at `now`.
    ///
    /// Returns the previous burst when the change does not continue it; that
    /// burst must be reconciled against the text as it was before `change`.
    pub fn push(&mut self, change: &TextChange, now: Instant) -> Option<CoalescedEdit> {
        let next = change.cursors();
        match self.pending.as_mut() {
            Some(burst) if burst.edit.continues_with(&next) => {
                burst.edit.new_cursor = next.new_cursor;
                burst.last_change = now;
                None
            }
            _ => self
                .pending
                .replace(Burst {
                    edit: next,
                    last_change: now,
                })
                .map(|b| b.edit),
        }
    }

    /// Take the pending burst if the text has been quiet for the debounce
    /// window.
    pub fn due(&mut self, now: Instant) -> Option<CoalescedEdit> {
        let burst = self.pending?;
        if now.saturating_duration_since(burst.last_change) < self.debounce {
            return None;
        }
        self.take()
    }

    /// Take the pending burst regardless of timing.
    pub fn take(&mut self) -> Option<CoalescedEdit> {
        self.pending.take().map(|b| b.edit)
    }
}
