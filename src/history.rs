use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::{KeyValueStore, HISTORY_KEY};

/// A submitted command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub text: String,
    pub timestamp: i64,
}

impl Command {
    pub fn new(text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            text: text.into(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Older,
    Newer,
}

/// Position while browsing history with the arrow keys.
///
/// Counts steps up from the bottom: 0 is the empty input line, `n` is the
/// n-th most recent command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryCursor {
    offset: usize,
}

impl HistoryCursor {
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    pub fn is_at_bottom(&self) -> bool {
        self.offset == 0
    }
}

/// Persisted command history with an in-memory mirror.
pub struct HistoryStore {
    store: Box<dyn KeyValueStore>,
    entries: Vec<Command>,
}

impl HistoryStore {
    /// Load the persisted history into the mirror.
    pub fn open(store: Box<dyn KeyValueStore>) -> Self {
        let mut history = Self {
            store,
            entries: Vec::new(),
        };
        history.entries = history.load_all();
        history
    }

    pub fn entries(&self) -> &[Command] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read the full persisted sequence, oldest first.
    pub fn load_all(&self) -> Vec<Command> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read history: {}", e);
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Discarding malformed history: {}", e);
            Vec::new()
        })
    }

    pub fn append(&mut self, command: Command) {
        self.entries.push(command);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            tracing::warn!("Could not remove persisted history: {}", e);
        }
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(HISTORY_KEY, &json));
        if let Err(e) = result {
            tracing::warn!("Could not persist history: {}", e);
        }
    }

    /// Step the cursor and return the command it now points at.
    ///
    /// Stepping past the oldest entry or below the bottom leaves the cursor
    /// where it is. `None` means the cursor is on the empty input line.
    pub fn navigate(&self, direction: Direction, cursor: &mut HistoryCursor) -> Option<&Command> {
        match direction {
            Direction::Older if cursor.offset < self.entries.len() => cursor.offset += 1,
            Direction::Newer if cursor.offset > 0 => cursor.offset -= 1,
            _ => {}
        }

        if cursor.offset == 0 {
            None
        } else {
            self.entries.get(self.entries.len() - cursor.offset)
        }
    }
}
