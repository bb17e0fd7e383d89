//! History module - bounded undo/redo log of game snapshots
//!
//! The log keeps at most [`HISTORY_CAPACITY`] snapshots and a cursor on the
//! active one. Appending from the middle of the log drops everything after the
//! cursor (the redo branch), and appending to a full log evicts the oldest
//! entry. Undo and redo only move the cursor.

use arrayvec::ArrayVec;

use crate::snapshot::GameSnapshot;
use crate::types::HISTORY_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct History {
    /// Valid entries; `entries.len()` is the log size
    entries: ArrayVec<GameSnapshot, HISTORY_CAPACITY>,
    /// Index of the active entry, None while the log is empty
    current: Option<usize>,
}

impl History {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from stored entries and cursor.
    ///
    /// Returns None if the cursor does not point inside `entries` (or is set
    /// for an empty log), or if there are more entries than the capacity.
    pub fn from_parts<I>(entries: I, current: Option<usize>) -> Option<Self>
    where
        I: IntoIterator<Item = GameSnapshot>,
    {
        let mut stored = ArrayVec::new();
        for entry in entries {
            stored.try_push(entry).ok()?;
        }
        match current {
            None if !stored.is_empty() => return None,
            Some(c) if c >= stored.len() => return None,
            _ => {}
        }
        Some(Self {
            entries: stored,
            current,
        })
    }

    /// Append a snapshot after the cursor and make it active.
    ///
    /// Entries after the cursor are discarded first. When the log is full the
    /// oldest entry is evicted and the cursor stays on the last slot.
    pub fn save_state(&mut self, snapshot: GameSnapshot) {
        let keep = self.current.map_or(0, |c| c + 1);
        self.entries.truncate(keep);

        if self.entries.is_full() {
            self.entries.remove(0);
        }

        self.entries.push(snapshot);
        self.current = Some(self.entries.len() - 1);
    }

    /// Step back one entry and return it; None if already at the first entry
    pub fn undo(&mut self) -> Option<GameSnapshot> {
        if !self.can_undo() {
            return None;
        }
        let c = self.current? - 1;
        self.current = Some(c);
        Some(self.entries[c])
    }

    /// Step forward one entry and return it; None if already at the newest entry
    pub fn redo(&mut self) -> Option<GameSnapshot> {
        if !self.can_redo() {
            return None;
        }
        let c = self.current.map_or(0, |c| c + 1);
        self.current = Some(c);
        Some(self.entries[c])
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.current, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        match self.current {
            Some(c) => c + 1 < self.entries.len(),
            None => false,
        }
    }

    /// Number of undo steps available
    pub fn undo_count(&self) -> usize {
        self.current.unwrap_or(0)
    }

    /// Number of redo steps available
    pub fn redo_count(&self) -> usize {
        match self.current {
            Some(c) => self.entries.len() - 1 - c,
            None => 0,
        }
    }

    /// Drop every entry and reset the cursor
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    /// Number of valid entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position, None while empty
    pub fn cursor(&self) -> Option<usize> {
        self.current
    }

    /// The active entry
    pub fn current(&self) -> Option<&GameSnapshot> {
        self.current.map(|c| &self.entries[c])
    }

    pub fn entries(&self) -> &[GameSnapshot] {
        &self.entries
    }
}
