//! The paint session: all mutable state of one running painter.
//!
//! Input events come in through `handle_*`, the host renders from the
//! accessors and uploads the surface whenever [`PaintSession::take_needs_upload`]
//! reports a change. Model assets are loaded by the host; the session asks for
//! one by entering the loading state and is told about the outcome through
//! [`PaintSession::on_asset_loaded`].

use std::time::{SystemTime, UNIX_EPOCH};

use maskpaint_config::MaskPainterConfig;
use painting::{
    BrushEngine, BrushStroke, HistoryControls, HistoryStack, MaskStateStore, MeshNode, RasterSurface, Rgba8,
    SurfaceProjector,
};
use tracing::{debug, info, warn};

use crate::error::{AssetLoadError, SessionError};
use crate::export::{ViewportFrame, export_data_url};
use crate::input::{InputAction, KeyInput, PointerEvent, PointerFsm, Shortcut, ToolMode};
use crate::progress::UserProgress;
use crate::scene::SceneController;
use crate::storage::{KeyValueStore, load_progress, save_progress};

const UNTITLED_DESIGN: &str = "Untitled";

pub struct PaintSession {
    config: MaskPainterConfig,
    surface: RasterSurface,
    history: HistoryStack,
    masks: MaskStateStore,
    scene: SceneController,
    projector: SurfaceProjector,
    pointer: PointerFsm,
    engine: BrushEngine,
    stroke: Option<BrushStroke>,
    mode: ToolMode,
    color: Rgba8,
    brush_radius: f32,
    active_model: String,
    progress: UserProgress,
    store: Box<dyn KeyValueStore>,
}

impl PaintSession {
    /// Start a session on the first mask. The first model's asset load is
    /// pending when this returns.
    pub fn new(
        config: MaskPainterConfig,
        store: Box<dyn KeyValueStore>,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let base_color = config.base_rgba()?;
        let color = Rgba8::from_hex(&config.paint_color)?;
        let Some(first_model) = config.mask_order.first().cloned() else {
            return Err(SessionError::UnknownModel(String::new()));
        };

        let surface = RasterSurface::new(config.surface_width, config.surface_height, base_color);
        let mut history = HistoryStack::new(config.history_capacity);
        history.init(&surface);

        let mut scene = SceneController::from_config(&config);
        scene.resize(viewport_width, viewport_height);
        scene.begin_load(&first_model);

        let projector = SurfaceProjector::new(
            config.surface_width,
            config.surface_height,
            viewport_width,
            viewport_height,
        );
        let progress = load_progress(store.as_ref(), &config.progress_key);
        let brush_radius = config.clamp_brush_radius(config.brush_radius);

        info!(
            "paint session started on '{}' ({}x{} surface, {} masks unlocked)",
            first_model, config.surface_width, config.surface_height, progress.unlocked_masks
        );

        Ok(Self {
            surface,
            history,
            masks: MaskStateStore::new(base_color),
            scene,
            projector,
            pointer: PointerFsm::new(),
            engine: BrushEngine::default(),
            stroke: None,
            mode: ToolMode::default(),
            color,
            brush_radius,
            active_model: first_model,
            progress,
            store,
            config,
        })
    }

    pub fn config(&self) -> &MaskPainterConfig {
        &self.config
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn scene(&self) -> &SceneController {
        &self.scene
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }

    pub fn brush_radius(&self) -> f32 {
        self.brush_radius
    }

    pub fn active_model(&self) -> &str {
        &self.active_model
    }

    pub fn is_painting(&self) -> bool {
        self.stroke.is_some()
    }

    /// Whether a pointer sample could currently reach the surface
    pub fn can_paint(&self) -> bool {
        self.scene.ray_target().is_some()
    }

    /// Masks in unlock order with their lock state
    pub fn masks(&self) -> Vec<(&str, bool)> {
        self.config
            .mask_order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), self.progress.is_unlocked(i)))
            .collect()
    }

    // ---- input ----

    pub fn handle_pointer(&mut self, event: &PointerEvent) -> InputAction {
        let action = self.pointer.handle(event, self.mode, self.scene.accepts_input());
        self.apply(action);
        action
    }

    pub fn handle_wheel(&mut self, delta_y: f32) {
        self.scene.wheel(delta_y);
    }

    pub fn handle_key(&mut self, input: &KeyInput) -> Option<Shortcut> {
        let shortcut = Shortcut::from_key(input)?;
        match shortcut {
            Shortcut::ToggleMode => {
                self.toggle_mode();
            }
            Shortcut::Undo => {
                self.undo();
            }
            Shortcut::Redo => {
                self.redo();
            }
        }
        Some(shortcut)
    }

    /// Advance per-frame animation
    pub fn tick(&mut self) {
        self.scene.tick();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.scene.resize(width, height);
        self.projector.set_viewport(width, height);
    }

    fn apply(&mut self, action: InputAction) {
        match action {
            InputAction::None => {}
            InputAction::BeginStroke { x, y } => {
                self.stroke = Some(BrushStroke::begin(self.color, self.brush_radius));
                self.paint_sample(x, y);
            }
            InputAction::PaintTo { x, y } => self.paint_sample(x, y),
            InputAction::EndStroke => self.end_stroke(),
            InputAction::Orbit { dx, dy } => self.scene.orbit(dx, dy),
            InputAction::Pan { dx, dy } => self.scene.pan(dx, dy),
            InputAction::Zoom { ratio } => self.scene.pinch(ratio),
        }
    }

    fn paint_sample(&mut self, x: f32, y: f32) {
        let Some(stroke) = self.stroke.as_mut() else {
            return;
        };
        let Some(view) = self.scene.ray_target() else {
            return;
        };
        // A miss keeps the last position so the stroke resumes from it
        if let Some((px, py)) = self.projector.project(&view, x, y) {
            stroke.paint_to(&self.engine, &mut self.surface, px, py);
        }
    }

    fn end_stroke(&mut self) {
        let Some(stroke) = self.stroke.take() else {
            return;
        };
        if stroke.has_painted() {
            self.history.commit(&self.surface);
            debug!("stroke committed ({} stamps)", stroke.stamp_count());
        }
    }

    /// End any gesture, committing a stroke in progress
    fn cancel_gesture(&mut self) {
        let action = self.pointer.cancel();
        self.apply(action);
        // The FSM may already be idle while a stroke is still open
        self.end_stroke();
    }

    // ---- models ----

    /// Switch to another mask.
    ///
    /// Returns true when the mask has never been painted in this session.
    /// Selecting the active mask does nothing.
    pub fn select_model(&mut self, model_id: &str) -> Result<bool, SessionError> {
        let index = self
            .config
            .mask_index(model_id)
            .ok_or_else(|| SessionError::UnknownModel(model_id.to_string()))?;
        if !self.progress.is_unlocked(index) {
            return Err(SessionError::LockedModel(model_id.to_string()));
        }
        if model_id == self.active_model {
            return Ok(false);
        }

        self.cancel_gesture();
        let restored = self.masks.switch(
            Some(self.active_model.as_str()),
            model_id,
            &mut self.surface,
            &mut self.history,
        );
        info!("switched mask '{}' -> '{}'", self.active_model, model_id);
        self.active_model = model_id.to_string();
        self.scene.begin_load(model_id);
        Ok(!restored)
    }

    /// Report the outcome of a model asset load. Returns false for a
    /// completion that no longer matches the model being loaded.
    pub fn on_asset_loaded(&mut self, model_id: &str, result: Result<MeshNode, AssetLoadError>) -> bool {
        self.scene.finish_load(model_id, result)
    }

    // ---- editing ----

    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        self.history.undo(&mut self.surface)
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        self.history.redo(&mut self.surface)
    }

    pub fn history_controls(&self) -> HistoryControls {
        self.history.controls()
    }

    /// Reset the active mask to the base color. History restarts from the
    /// cleared state, so this cannot be undone.
    pub fn clear(&mut self) {
        self.cancel_gesture();
        self.surface.clear(self.masks.base_color());
        self.history.reset(&self.surface);
        info!("cleared mask '{}'", self.active_model);
    }

    pub fn set_color(&mut self, hex: &str) -> Result<(), SessionError> {
        self.color = Rgba8::from_hex(hex)?;
        Ok(())
    }

    /// Set the brush radius, clamped to the slider range. Returns the radius
    /// applied.
    pub fn set_brush_radius(&mut self, radius: f32) -> f32 {
        self.brush_radius = self.config.clamp_brush_radius(radius);
        self.brush_radius
    }

    pub fn toggle_mode(&mut self) -> ToolMode {
        self.cancel_gesture();
        self.mode = self.mode.toggled();
        debug!("tool mode {:?}", self.mode);
        self.mode
    }

    /// Whether the surface changed since the last upload
    pub fn take_needs_upload(&mut self) -> bool {
        self.surface.take_needs_upload()
    }

    // ---- gallery ----

    /// Export the rendered view into the gallery and return the design id.
    ///
    /// Saving on the last unlocked mask unlocks the next one.
    pub fn save_design(&mut self, name: &str, description: &str, frame: ViewportFrame) -> Result<u64, SessionError> {
        let image = export_data_url(frame, self.config.export_size)?;
        let name = match name.trim() {
            "" => UNTITLED_DESIGN,
            trimmed => trimmed,
        };

        let id = self
            .progress
            .record_design(&self.active_model, name, description.trim(), image, timestamp_ms());

        if let Some(index) = self.config.mask_index(&self.active_model) {
            if self.progress.unlock_after(index, self.config.mask_order.len()) {
                info!(
                    "unlocked mask '{}'",
                    self.config.mask_order[self.progress.unlocked_masks - 1]
                );
            }
        }

        self.persist_progress();
        Ok(id)
    }

    pub fn delete_design(&mut self, id: u64) -> bool {
        if !self.progress.delete_design(id) {
            return false;
        }
        self.persist_progress();
        true
    }

    fn persist_progress(&mut self) {
        if let Err(e) = save_progress(self.store.as_mut(), &self.config.progress_key, &self.progress) {
            warn!("failed to save progress: {}", e);
        }
    }
}

fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
