//! The displayed model: loading state, placement and navigation.
//!
//! The model sits under a root node whose transform carries the user's pan
//! and orbit plus the entry animation. Geometry loaded from an asset is
//! normalized once (centered, largest dimension scaled to the fit size) so
//! navigation limits behave the same for every mask.

use std::f32::consts::TAU;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use maskpaint_config::{CameraConfig, InteractionConfig, MaskPainterConfig};
use painting::{MeshNode, PerspectiveCamera, SceneView, uv_sphere};
use tracing::{debug, info, warn};

use crate::error::AssetLoadError;

/// Which model is displayed, and whether it can be painted yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModelSlot {
    #[default]
    Empty,
    Loading {
        model_id: String,
    },
    Ready {
        model_id: String,
        /// The asset failed to load and the fallback sphere is shown
        fallback: bool,
    },
}

#[derive(Debug, Clone)]
pub struct SceneController {
    camera_config: CameraConfig,
    interaction: InteractionConfig,
    camera: PerspectiveCamera,
    slot: ModelSlot,
    /// Root node; its transform is rebuilt from the fields below
    root: MeshNode,
    /// Euler angles (x, y) in radians
    rotation: Vec2,
    /// Pan offset in the XY plane
    position: Vec2,
    /// Entry animation progress in [0, 1), None once finished
    entry: Option<f32>,
}

impl SceneController {
    pub fn new(camera_config: CameraConfig, interaction: InteractionConfig) -> Self {
        let camera = PerspectiveCamera {
            position: Vec3::new(0.0, 0.0, camera_config.distance),
            fov_y_degrees: camera_config.fov_y_degrees,
            near: camera_config.near,
            far: camera_config.far,
            ..Default::default()
        };

        Self {
            camera_config,
            interaction,
            camera,
            slot: ModelSlot::Empty,
            root: MeshNode::default(),
            rotation: Vec2::ZERO,
            position: Vec2::ZERO,
            entry: None,
        }
    }

    pub fn from_config(config: &MaskPainterConfig) -> Self {
        Self::new(config.camera.clone(), config.interaction.clone())
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn slot(&self) -> &ModelSlot {
        &self.slot
    }

    pub fn root(&self) -> &MeshNode {
        &self.root
    }

    /// Id of the model being loaded or displayed
    pub fn model_id(&self) -> Option<&str> {
        match &self.slot {
            ModelSlot::Empty => None,
            ModelSlot::Loading { model_id } | ModelSlot::Ready { model_id, .. } => Some(model_id),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.slot, ModelSlot::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.slot, ModelSlot::Ready { .. })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.slot, ModelSlot::Ready { fallback: true, .. })
    }

    pub fn is_animating(&self) -> bool {
        self.entry.is_some()
    }

    /// Whether new gestures may start
    pub fn accepts_input(&self) -> bool {
        self.is_ready() && !self.is_animating()
    }

    /// Update the camera after a viewport resize
    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.set_aspect(width, height);
    }

    /// Drop the displayed model and wait for `model_id`'s geometry
    pub fn begin_load(&mut self, model_id: &str) {
        self.root = MeshNode::default();
        self.entry = None;
        self.slot = ModelSlot::Loading {
            model_id: model_id.to_string(),
        };
        debug!("loading model '{}'", model_id);
    }

    /// Attach the result of an asset load.
    ///
    /// Returns false when the completion belongs to a model that is no
    /// longer being loaded. A failed load shows the fallback sphere.
    pub fn finish_load(&mut self, model_id: &str, result: Result<MeshNode, AssetLoadError>) -> bool {
        match &self.slot {
            ModelSlot::Loading { model_id: pending } if pending == model_id => {}
            _ => {
                warn!("ignoring stale asset completion for '{}'", model_id);
                return false;
            }
        }

        let (object, fallback) = match result {
            Ok(object) => (fit_to_size(object, self.interaction.fit_size), false),
            Err(e) => {
                warn!("failed to load model '{}': {}, using fallback sphere", model_id, e);
                (self.fallback_object(), true)
            }
        };

        self.root = MeshNode::group(Mat4::IDENTITY, vec![object]);
        self.rotation = Vec2::ZERO;
        self.position = Vec2::ZERO;
        self.entry = Some(0.0);
        self.slot = ModelSlot::Ready {
            model_id: model_id.to_string(),
            fallback,
        };
        self.sync_transform();

        info!("model '{}' ready (fallback: {})", model_id, fallback);
        true
    }

    fn fallback_object(&self) -> MeshNode {
        let segments = self.interaction.fallback_segments;
        MeshNode::from_mesh(uv_sphere(self.interaction.fallback_radius, segments, segments))
    }

    /// Advance the entry animation by one frame
    pub fn tick(&mut self) {
        let Some(progress) = self.entry else {
            return;
        };

        let progress = progress + self.interaction.entry_animation_speed;
        if progress >= 1.0 {
            self.entry = None;
            self.rotation = Vec2::ZERO;
            self.position = Vec2::ZERO;
            debug!("entry animation finished");
        } else {
            self.entry = Some(progress);
        }
        self.sync_transform();
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        if !self.accepts_input() {
            return;
        }
        let s = self.interaction.orbit_sensitivity;
        self.rotation.y += dx * s;
        self.rotation.x += dy * s;
        self.sync_transform();
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        if !self.accepts_input() {
            return;
        }
        let s = self.interaction.pan_sensitivity;
        let (lx, ly) = (self.interaction.pan_limit_x, self.interaction.pan_limit_y);
        self.position.x = (self.position.x + dx * s).clamp(-lx, lx);
        self.position.y = (self.position.y - dy * s).clamp(-ly, ly);
        self.sync_transform();
    }

    /// Wheel zoom: scrolling up moves the camera in by a larger step than
    /// scrolling down moves it out
    pub fn wheel(&mut self, delta_y: f32) {
        let distance = if delta_y < 0.0 {
            self.distance() - self.camera_config.zoom_in_step
        } else {
            self.distance() + self.camera_config.zoom_out_step
        };
        self.set_distance(distance);
    }

    /// Pinch zoom: spreading fingers by `ratio` divides the distance by it
    pub fn pinch(&mut self, ratio: f32) {
        if ratio > 0.0 && ratio.is_finite() {
            self.set_distance(self.distance() / ratio);
        }
    }

    pub fn distance(&self) -> f32 {
        self.camera.position.z
    }

    fn set_distance(&mut self, distance: f32) {
        self.camera.position.z = distance.clamp(self.camera_config.min_distance, self.camera_config.max_distance);
    }

    /// Current root transform: pan, then rotation, then entry scale
    pub fn model_transform(&self) -> Mat4 {
        let (scale, spin) = match self.entry {
            Some(progress) => (progress, progress * self.interaction.entry_turns * TAU),
            None => (1.0, 0.0),
        };
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y + spin, 0.0);
        Mat4::from_scale_rotation_translation(
            Vec3::splat(scale),
            rotation,
            Vec3::new(self.position.x, self.position.y, 0.0),
        )
    }

    fn sync_transform(&mut self) {
        self.root.transform = self.model_transform();
    }

    /// The paintable view, or None while loading or animating in
    pub fn ray_target(&self) -> Option<SceneView<'_>> {
        self.accepts_input().then_some(SceneView {
            camera: &self.camera,
            root: &self.root,
        })
    }
}

/// Center an object on its bounding box and scale it uniformly so its
/// largest dimension equals `size`
pub fn fit_to_size(object: MeshNode, size: f32) -> MeshNode {
    let Some((min, max)) = object.world_bounds(Mat4::IDENTITY) else {
        return object;
    };
    let center = (min + max) * 0.5;
    let max_dim = (max - min).max_element();
    let scale = if max_dim > 0.0 { size / max_dim } else { 1.0 };

    let fit = Mat4::from_scale(Vec3::splat(scale)) * Mat4::from_translation(-center);
    MeshNode::group(fit, vec![object])
}
