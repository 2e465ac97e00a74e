//! Navigation history.
//!
//! Mirrors the browser session history: an ordered list of entries with a
//! cursor. `push` drops any forward entries, `replace` swaps the current one
//! without growing the list.

use serde::Serialize;
use uuid::Uuid;

/// One visited location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Unique per entry, regenerated on replace.
    pub key: Uuid,
    pub pathname: String,
}

impl HistoryEntry {
    fn new(pathname: impl Into<String>) -> Self {
        Self {
            key: Uuid::new_v4(),
            pathname: pathname.into(),
        }
    }
}

/// Never empty: there is always a current entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    /// Start a history whose only entry is `pathname`.
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry::new(pathname)],
            cursor: 0,
        }
    }

    /// Entry under the cursor.
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    /// Add an entry after the cursor and move onto it.
    pub fn push(&mut self, pathname: impl Into<String>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry::new(pathname));
        self.cursor = self.entries.len() - 1;
    }

    /// Overwrite the current entry with a fresh key.
    pub fn replace(&mut self, pathname: impl Into<String>) {
        self.entries[self.cursor] = HistoryEntry::new(pathname);
    }

    /// Step back one entry. `None` at the oldest entry.
    pub fn back(&mut self) -> Option<&HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Step forward one entry. `None` at the newest entry.
    pub fn forward(&mut self) -> Option<&HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Index of the current entry in [`entries`](Self::entries).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
