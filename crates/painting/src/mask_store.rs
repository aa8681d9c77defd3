//! Per-model painting state kept for the lifetime of a session.
//!
//! Each entry holds the surface pixels plus both history logs, so switching
//! between models and back reproduces the exact prior state. Entries are
//! created on first save and never written to disk.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::color::Rgba8;
use crate::history::{HistoryLogs, HistoryStack};
use crate::surface::{RasterSurface, Snapshot};

#[derive(Debug, Clone)]
struct MaskState {
    snapshot: Snapshot,
    logs: HistoryLogs,
}

#[derive(Debug, Clone)]
pub struct MaskStateStore {
    entries: HashMap<String, MaskState>,
    base_color: Rgba8,
}

impl MaskStateStore {
    /// `base_color` is the flat color a model starts from the first time it
    /// is loaded
    pub fn new(base_color: Rgba8) -> Self {
        Self {
            entries: HashMap::new(),
            base_color,
        }
    }

    pub fn base_color(&self) -> Rgba8 {
        self.base_color
    }

    /// Store the surface and both history logs under `model_id`, replacing
    /// any previous entry.
    pub fn save(&mut self, model_id: &str, surface: &RasterSurface, history: &HistoryStack) {
        let state = MaskState {
            snapshot: surface.snapshot(),
            logs: history.logs(),
        };
        let replaced = self.entries.insert(model_id.to_string(), state).is_some();
        debug!(
            "saved mask state '{}' (undo {}, redo {}, replaced: {})",
            model_id,
            history.undo_depth(),
            history.redo_depth(),
            replaced
        );
    }

    /// Restore the state stored for `model_id`.
    ///
    /// Returns false when the model has never been saved; the surface is
    /// then cleared to the base color and the history reduced to a single
    /// base entry.
    pub fn load(&self, model_id: &str, surface: &mut RasterSurface, history: &mut HistoryStack) -> bool {
        match self.entries.get(model_id) {
            Some(state) => {
                surface.restore(&state.snapshot);
                history.restore_logs(&state.logs);
                debug!(
                    "loaded mask state '{}' (undo {}, redo {})",
                    model_id,
                    history.undo_depth(),
                    history.redo_depth()
                );
                true
            }
            None => {
                surface.clear(self.base_color);
                history.restore_logs(&HistoryLogs::default());
                history.commit(surface);
                info!("mask '{}' has no saved state, starting fresh", model_id);
                false
            }
        }
    }

    /// Save the outgoing model, then load the incoming one
    pub fn switch(
        &mut self,
        from: Option<&str>,
        to: &str,
        surface: &mut RasterSurface,
        history: &mut HistoryStack,
    ) -> bool {
        if let Some(from) = from {
            self.save(from, surface, history);
        }
        self.load(to, surface, history)
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.entries.contains_key(model_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remove(&mut self, model_id: &str) -> bool {
        self.entries.remove(model_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushEngine;

    const BASE: Rgba8 = Rgba8 {
        r: 0xdd,
        g: 0xdd,
        b: 0xdd,
        a: 255,
    };

    fn setup() -> (MaskStateStore, RasterSurface, HistoryStack) {
        let surface = RasterSurface::new(64, 64, BASE);
        let mut history = HistoryStack::new(20);
        history.init(&surface);
        (MaskStateStore::new(BASE), surface, history)
    }

    #[test]
    fn test_first_load_starts_fresh() {
        let (store, mut surface, mut history) = setup();
        BrushEngine::default().stamp_at(&mut surface, 10.0, 10.0, Rgba8::opaque(0, 0, 255), 5.0);
        history.commit(&surface);

        assert!(!store.load("mask2", &mut surface, &mut history));
        assert!(surface.pixels().iter().all(|&px| px == BASE.to_array()));
        assert_eq!(history.undo_depth(), 1);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_switch_round_trip() {
        let (mut store, mut surface, mut history) = setup();
        let engine = BrushEngine::default();

        // Paint two strokes on A, undo one so redo is non-empty
        engine.stamp_at(&mut surface, 20.0, 20.0, Rgba8::opaque(255, 0, 0), 6.0);
        history.commit(&surface);
        engine.stamp_at(&mut surface, 40.0, 40.0, Rgba8::opaque(0, 255, 0), 6.0);
        history.commit(&surface);
        history.undo(&mut surface);

        let a_pixels = surface.as_bytes().to_vec();
        let a_depths = (history.undo_depth(), history.redo_depth());

        assert!(!store.switch(Some("a"), "b", &mut surface, &mut history));
        engine.stamp_at(&mut surface, 5.0, 5.0, Rgba8::opaque(0, 0, 255), 6.0);
        history.commit(&surface);

        assert!(store.switch(Some("b"), "a", &mut surface, &mut history));
        assert_eq!(surface.as_bytes(), &a_pixels[..]);
        assert_eq!((history.undo_depth(), history.redo_depth()), a_depths);

        // Redo still brings back A's second stroke
        assert!(history.redo(&mut surface));
        assert_eq!(surface.get_pixel(40, 40), Some(Rgba8::opaque(0, 255, 0)));
    }

    #[test]
    fn test_restored_state_does_not_alias_store() {
        let (mut store, mut surface, mut history) = setup();
        store.save("a", &surface, &history);

        assert!(store.load("a", &mut surface, &mut history));
        BrushEngine::default().stamp_at(&mut surface, 32.0, 32.0, Rgba8::opaque(255, 0, 0), 8.0);
        history.commit(&surface);

        assert!(store.load("a", &mut surface, &mut history));
        assert_eq!(surface.get_pixel(32, 32), Some(BASE));
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_save_overwrites() {
        let (mut store, mut surface, history) = setup();
        store.save("a", &surface, &history);
        surface.clear(Rgba8::WHITE);
        store.save("a", &surface, &history);
        assert_eq!(store.len(), 1);

        let mut other = RasterSurface::new(64, 64, BASE);
        let mut other_history = HistoryStack::new(20);
        assert!(store.load("a", &mut other, &mut other_history));
        assert_eq!(other.get_pixel(0, 0), Some(Rgba8::WHITE));
    }
}
