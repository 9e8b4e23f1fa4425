//! Offset ledger: where each readable node currently sits in the flat text.
//!
//! Offsets are char offsets into the flat text. Entries keep the order of the
//! flatten pass that produced them; lookups by id go through a side index.

use crate::error::EditError;
use crate::readable::BodySource;
use std::collections::HashMap;
use std::ops::Range;
use tools::slice_chars;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffsetEntry {
    pub header_len: usize,
    pub body_start: usize,
    pub body_end: usize,
    pub source: BodySource,
}

impl OffsetEntry {
    pub fn header_start(&self) -> usize {
        self.body_start - self.header_len
    }

    pub fn header_range(&self) -> Range<usize> {
        self.header_start()..self.body_start
    }

    pub fn body_range(&self) -> Range<usize> {
        self.body_start..self.body_end
    }

    pub fn body_len(&self) -> usize {
        self.body_end - self.body_start
    }

    /// A position belongs to the body it falls inside. An empty body owns
    /// the single position it sits on so insertions can grow it.
    fn owns(&self, position: usize) -> bool {
        if self.body_start == self.body_end {
            return position == self.body_start;
        }
        self.body_start <= position && position < self.body_end
    }

    fn shifted(self, delta: isize) -> Self {
        Self {
            body_start: self.body_start.saturating_add_signed(delta),
            body_end: self.body_end.saturating_add_signed(delta),
            ..self
        }
    }
}

/// The body that absorbed an edit, after the ledger has been updated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShiftedSpan {
    pub node_id: String,
    pub entry: OffsetEntry,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OffsetLedger {
    entries: Vec<(String, OffsetEntry)>,
    positions: HashMap<String, usize>,
}

impl OffsetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Entries must arrive in document order.
    pub fn push(&mut self, node_id: String, entry: OffsetEntry) {
        debug_assert!(
            self.entries
                .last()
                .is_none_or(|(_, prev)| prev.body_end <= entry.header_start()),
            "ledger entries must not overlap"
        );
        let index = self.entries.len();
        if self.positions.contains_key(&node_id) {
            log::warn!(target: "script.flatten", "duplicate id {node_id:?} in ledger, lookups keep the first");
        } else {
            self.positions.insert(node_id.clone(), index);
        }
        self.entries.push((node_id, entry));
    }

    pub fn get(&self, node_id: &str) -> Option<&OffsetEntry> {
        self.positions.get(node_id).map(|&i| &self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OffsetEntry)> {
        self.entries.iter().map(|(id, e)| (id.as_str(), e))
    }

    /// The node whose body owns `position`, first in document order.
    pub fn node_at(&self, position: usize) -> Option<(&str, &OffsetEntry)> {
        self.entries
            .iter()
            .find(|(_, e)| e.owns(position))
            .map(|(id, e)| (id.as_str(), e))
    }

    /// Header ranges in document order, for styling headers apart from bodies.
    pub fn header_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.entries
            .iter()
            .map(|(_, e)| e.header_range())
            .filter(|r| !r.is_empty())
    }

    /// Rebuild the text covered by the ledger's spans from `text`.
    ///
    /// On a ledger fresh out of the flattener this reproduces the flat text.
    pub fn reconstruct(&self, text: &str) -> Option<String> {
        let mut out = String::with_capacity(text.len());
        for (_, e) in &self.entries {
            out.push_str(slice_chars(text, e.header_start(), e.body_end)?);
        }
        Some(out)
    }

    /// Attribute a coalesced edit to one body and shift everything after it.
    ///
    /// `last_cursor` locates the edited body; `new_cursor - last_cursor` is the
    /// net change in length. Edits that start outside every body, or deletions
    /// that reach back into a header, are rejected and leave the ledger as it
    /// was.
    pub fn apply_delta(
        &mut self,
        last_cursor: usize,
        new_cursor: usize,
    ) -> Result<ShiftedSpan, EditError> {
        let index = self.locate(last_cursor, new_cursor)?;
        let delta = new_cursor as isize - last_cursor as isize;

        let (node_id, target) = &mut self.entries[index];
        target.body_end = target.body_end.saturating_add_signed(delta);
        let span = ShiftedSpan {
            node_id: node_id.clone(),
            entry: *target,
        };

        for (_, later) in &mut self.entries[index + 1..] {
            *later = later.shifted(delta);
        }
        log::trace!(
            target: "script.reconcile",
            "edit {last_cursor}->{new_cursor} absorbed by {} ({} later entries shifted)",
            span.node_id,
            self.entries.len() - index - 1
        );
        Ok(span)
    }

    /// Validate an edit without touching the ledger.
    pub(crate) fn locate(&self, last_cursor: usize, new_cursor: usize) -> Result<usize, EditError> {
        let reject = EditError::NoTargetSection {
            position: last_cursor,
        };
        let index = self
            .entries
            .iter()
            .position(|(_, e)| e.owns(last_cursor))
            .ok_or(reject.clone())?;
        let target = &self.entries[index].1;
        let delta = new_cursor as isize - last_cursor as isize;
        // a deletion may not reach back into the header in front of the body
        if new_cursor < target.body_start {
            return Err(reject);
        }
        if (target.body_end as isize + delta) < target.body_start as isize {
            return Err(reject);
        }
        Ok(index)
    }
}
