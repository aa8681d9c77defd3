//! Bounded undo/redo over full surface snapshots.
//!
//! The undo log always holds at least one entry once initialized: the base
//! state the surface can never be undone past. Its top entry mirrors the
//! live surface. The log is capped; the oldest entries are evicted first.
//! The redo log is never capped and is only cleared by a fresh commit.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::DEFAULT_HISTORY_CAPACITY;
use crate::surface::{RasterSurface, Snapshot};

/// Enablement of the undo/redo controls, derived only from stack depths
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryControls {
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Copies of both logs, as stored per model
#[derive(Debug, Clone, Default)]
pub struct HistoryLogs {
    pub undo: Vec<Snapshot>,
    pub redo: Vec<Snapshot>,
}

#[derive(Debug, Clone)]
pub struct HistoryStack {
    undo_log: VecDeque<Snapshot>,
    redo_log: Vec<Snapshot>,
    capacity: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryStack {
    /// Create an empty stack. A capacity of zero is raised to one so the
    /// base entry always fits.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo_log: VecDeque::with_capacity(capacity),
            redo_log: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Capture the surface as the sole undo entry and drop any redo.
    pub fn init(&mut self, surface: &RasterSurface) {
        self.undo_log.clear();
        self.redo_log.clear();
        self.undo_log.push_back(surface.snapshot());
        debug!("history initialized (capacity {})", self.capacity);
    }

    /// Push the current surface state, clearing redo and evicting the
    /// oldest entry when over capacity.
    pub fn commit(&mut self, surface: &RasterSurface) {
        self.undo_log.push_back(surface.snapshot());
        self.redo_log.clear();

        while self.undo_log.len() > self.capacity {
            self.undo_log.pop_front();
        }

        debug!("history commit: undo depth {}", self.undo_log.len());
    }

    /// Step back one entry. Returns false without touching the surface when
    /// only the base entry remains.
    pub fn undo(&mut self, surface: &mut RasterSurface) -> bool {
        if self.undo_log.len() <= 1 {
            return false;
        }

        let Some(top) = self.undo_log.pop_back() else {
            return false;
        };
        self.redo_log.push(top);

        if let Some(current) = self.undo_log.back() {
            surface.restore(current);
        }

        debug!(
            "history undo: undo depth {}, redo depth {}",
            self.undo_log.len(),
            self.redo_log.len()
        );
        true
    }

    /// Re-apply the most recently undone entry. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self, surface: &mut RasterSurface) -> bool {
        let Some(snapshot) = self.redo_log.pop() else {
            return false;
        };

        surface.restore(&snapshot);
        self.undo_log.push_back(snapshot);

        // Redo never grows the log past capacity: the entry came from undo
        while self.undo_log.len() > self.capacity {
            self.undo_log.pop_front();
        }

        debug!(
            "history redo: undo depth {}, redo depth {}",
            self.undo_log.len(),
            self.redo_log.len()
        );
        true
    }

    /// Drop both logs and start over from the surface's current state.
    pub fn reset(&mut self, surface: &RasterSurface) {
        self.init(surface);
    }

    pub fn can_undo(&self) -> bool {
        self.undo_log.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_log.is_empty()
    }

    pub fn controls(&self) -> HistoryControls {
        HistoryControls {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_log.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_log.len()
    }

    pub fn is_initialized(&self) -> bool {
        !self.undo_log.is_empty()
    }

    /// Latest committed state
    pub fn current(&self) -> Option<&Snapshot> {
        self.undo_log.back()
    }

    /// Copies of both logs, oldest first
    pub fn logs(&self) -> HistoryLogs {
        HistoryLogs {
            undo: self.undo_log.iter().cloned().collect(),
            redo: self.redo_log.clone(),
        }
    }

    /// Replace both logs. Undo entries beyond capacity are dropped from the
    /// old end.
    pub fn restore_logs(&mut self, logs: &HistoryLogs) {
        let skip = logs.undo.len().saturating_sub(self.capacity);
        self.undo_log = logs.undo.iter().skip(skip).cloned().collect();
        self.redo_log = logs.redo.clone();
    }
}
