//! Shared configuration for the mask painter
//!
//! This crate is the single source of truth for surface dimensions, history
//! capacity, brush defaults, the mask unlock order and the camera/interaction
//! tuning used by the studio. Every field has a default, so a JSON override
//! only needs to name the values it changes.

use painting::{
    BASE_MASK_COLOR, DEFAULT_BRUSH_RADIUS, DEFAULT_HISTORY_CAPACITY, DEFAULT_SURFACE_SIZE,
    MAX_BRUSH_RADIUS, MIN_BRUSH_RADIUS, Rgba8,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default edge length of exported gallery images
pub const DEFAULT_EXPORT_SIZE: u32 = 512;

/// Default key under which user progress is persisted
pub const DEFAULT_PROGRESS_KEY: &str = "maskPainterProgress";

/// Default paint color
pub const DEFAULT_PAINT_COLOR: &str = "#ff0000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Camera placement and navigation limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    /// Initial distance from the origin along +Z
    pub distance: f32,
    pub near: f32,
    pub far: f32,
    /// Distance removed per wheel step towards the model
    pub zoom_in_step: f32,
    /// Distance added per wheel step away from the model
    pub zoom_out_step: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            distance: 5.0,
            near: 0.1,
            far: 1000.0,
            zoom_in_step: 0.3,
            zoom_out_step: 0.1,
            min_distance: 0.5,
            max_distance: 10.0,
        }
    }
}

/// Model manipulation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Radians of rotation per pointer pixel while orbiting
    pub orbit_sensitivity: f32,
    /// World units per pointer pixel while panning
    pub pan_sensitivity: f32,
    /// Pan limit on each side of the origin along X
    pub pan_limit_x: f32,
    /// Pan limit on each side of the origin along Y
    pub pan_limit_y: f32,
    /// Entry animation progress added per frame
    pub entry_animation_speed: f32,
    /// Full turns the model makes while animating in
    pub entry_turns: f32,
    /// Largest dimension a loaded model is scaled to
    pub fit_size: f32,
    pub fallback_radius: f32,
    pub fallback_segments: u32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            orbit_sensitivity: 0.01,
            pan_sensitivity: 0.01,
            pan_limit_x: 3.0,
            pan_limit_y: 2.0,
            entry_animation_speed: 0.02,
            entry_turns: 2.0,
            fit_size: 3.0,
            fallback_radius: 2.0,
            fallback_segments: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskPainterConfig {
    pub surface_width: u32,
    pub surface_height: u32,
    /// Flat color untouched masks start with
    pub base_color: String,
    /// Undo entries kept per model
    pub history_capacity: usize,
    pub paint_color: String,
    pub brush_radius: f32,
    pub min_brush_radius: f32,
    pub max_brush_radius: f32,
    /// Edge length of exported images
    pub export_size: u32,
    /// Model ids in unlock order; the first is always unlocked
    pub mask_order: Vec<String>,
    pub progress_key: String,
    pub camera: CameraConfig,
    pub interaction: InteractionConfig,
}

impl Default for MaskPainterConfig {
    fn default() -> Self {
        Self {
            surface_width: DEFAULT_SURFACE_SIZE,
            surface_height: DEFAULT_SURFACE_SIZE,
            base_color: BASE_MASK_COLOR.to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            paint_color: DEFAULT_PAINT_COLOR.to_string(),
            brush_radius: DEFAULT_BRUSH_RADIUS,
            min_brush_radius: MIN_BRUSH_RADIUS,
            max_brush_radius: MAX_BRUSH_RADIUS,
            export_size: DEFAULT_EXPORT_SIZE,
            mask_order: vec!["mask".to_string(), "mask2".to_string(), "mask3".to_string()],
            progress_key: DEFAULT_PROGRESS_KEY.to_string(),
            camera: CameraConfig::default(),
            interaction: InteractionConfig::default(),
        }
    }
}

impl MaskPainterConfig {
    /// Parse a JSON override on top of the defaults and validate the result
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.surface_width == 0 || self.surface_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "surface must be non-empty, got {}x{}",
                self.surface_width, self.surface_height
            )));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        if self.export_size == 0 {
            return Err(ConfigError::Invalid("export_size must be at least 1".to_string()));
        }
        if self.mask_order.is_empty() {
            return Err(ConfigError::Invalid("mask_order must name at least one model".to_string()));
        }
        if self.min_brush_radius <= 0.0 || self.min_brush_radius > self.max_brush_radius {
            return Err(ConfigError::Invalid(format!(
                "brush radius range {}..={} is empty",
                self.min_brush_radius, self.max_brush_radius
            )));
        }
        if self.camera.min_distance > self.camera.max_distance {
            return Err(ConfigError::Invalid(format!(
                "camera distance range {}..={} is empty",
                self.camera.min_distance, self.camera.max_distance
            )));
        }
        if self.interaction.entry_animation_speed <= 0.0 {
            return Err(ConfigError::Invalid(
                "entry_animation_speed must be positive".to_string(),
            ));
        }

        self.base_rgba()?;
        Rgba8::from_hex(&self.paint_color).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    /// Parsed base color
    pub fn base_rgba(&self) -> Result<Rgba8, ConfigError> {
        Rgba8::from_hex(&self.base_color).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Clamp a requested brush radius to the slider range
    pub fn clamp_brush_radius(&self, radius: f32) -> f32 {
        radius.clamp(self.min_brush_radius, self.max_brush_radius)
    }

    /// Position of a model in the unlock order
    pub fn mask_index(&self, model_id: &str) -> Option<usize> {
        self.mask_order.iter().position(|id| id == model_id)
    }
}
