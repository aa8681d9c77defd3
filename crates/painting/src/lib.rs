//! Texture-space painting core for 3D mask models
//!
//! This crate provides everything needed to paint onto a UV-mapped model:
//! - [`surface`] - RGBA8 raster surface and immutable snapshots
//! - [`color`] - 8-bit colors and hex parsing
//! - [`brush`] - Soft round brush stamps and interpolated stroke segments
//! - [`raycast`] - Ray/triangle intersection and nearest-hit over a mesh tree
//! - [`primitives`] - Fallback geometry
//! - [`obj`] - Wavefront OBJ parsing
//! - [`camera`] - Perspective camera and NDC rays
//! - [`projector`] - Viewport position to surface pixel projection
//! - [`history`] - Bounded undo/redo over surface snapshots
//! - [`mask_store`] - Per-model surface and history state

pub mod brush;
pub mod camera;
pub mod color;
pub mod constants;
pub mod history;
pub mod mask_store;
pub mod obj;
pub mod primitives;
pub mod projector;
pub mod raycast;
pub mod surface;

pub use brush::*;
pub use camera::*;
pub use color::*;
pub use constants::*;
pub use history::*;
pub use mask_store::*;
pub use obj::*;
pub use primitives::*;
pub use projector::*;
pub use raycast::*;
pub use surface::*;
