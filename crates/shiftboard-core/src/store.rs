use crate::error::{Result, ShiftboardError};
use crate::io;
use crate::line::{LineRecord, MONTH_FORMAT};
use crate::paths;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The fixed set of production lines. Records exist for all of these at all
/// times; nothing is ever created or deleted at runtime.
pub const LINE_IDS: [u32; 3] = [1, 2, 3];

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Live counters for every line, keyed by line id. The persisted file is the
/// source of truth across requests; an instance of this type is a working
/// copy between one load and the matching save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateStore {
    lines: BTreeMap<u32, LineRecord>,
}

impl StateStore {
    /// A store with default records for all line ids.
    pub fn new() -> Self {
        let mut store = Self {
            lines: BTreeMap::new(),
        };
        store.heal();
        store
    }

    /// Load from `state.json`, filling in defaults per id and per field. A
    /// missing file yields a default store; an unreadable one is replaced
    /// with defaults rather than taking the line pages down.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::state_path(root);
        let mut store = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<BTreeMap<u32, LineRecord>>(&data) {
                Ok(lines) => Self { lines },
                Err(e) => {
                    tracing::warn!("state file unreadable, reinitializing: {e}");
                    Self {
                        lines: BTreeMap::new(),
                    }
                }
            }
        } else {
            Self {
                lines: BTreeMap::new(),
            }
        };
        store.heal();
        Ok(store)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::state_path(root);
        let data = serde_json::to_string_pretty(&self.lines)?;
        io::atomic_write(&path, data.as_bytes())
    }

    /// Ensure a record exists for every line id, that each record's `id`
    /// matches its key, and that the month tracker is set.
    fn heal(&mut self) {
        let current_month = Local::now().format(MONTH_FORMAT).to_string();
        for id in LINE_IDS {
            let record = self.lines.entry(id).or_insert_with(|| LineRecord::new(id));
            record.id = id;
            if record.month_tracker.is_none() {
                record.month_tracker = Some(current_month.clone());
            }
            // Gaps are derived; a hand-edited file may carry stale ones.
            record.recompute_gaps();
        }
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    pub fn get(&self, id: u32) -> Result<&LineRecord> {
        self.lines.get(&id).ok_or(ShiftboardError::LineNotFound(id))
    }

    pub fn get_mut(&mut self, id: u32) -> Result<&mut LineRecord> {
        self.lines
            .get_mut(&id)
            .ok_or(ShiftboardError::LineNotFound(id))
    }

    /// All records in ascending line-id order.
    pub fn lines(&self) -> impl Iterator<Item = &LineRecord> {
        self.lines.values()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
