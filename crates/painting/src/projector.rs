//! Viewport-to-texture projection for painting on the displayed model.
//!
//! A pointer position is converted to normalized device coordinates, a ray
//! is cast from the camera through it, and the nearest hit's UV coordinate
//! is mapped onto the raster surface. Raster rows run top-down while UV `v`
//! runs bottom-up, hence the flip.

use glam::Vec2;
use thiserror::Error;
use tracing::trace;

use crate::camera::PerspectiveCamera;
use crate::raycast::{MeshHit, MeshNode};

/// Why a pointer sample produced no paint
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MissingHit {
    #[error("ray missed the model")]
    NoIntersection,
    #[error("hit face {face_id} has no texture coordinates")]
    NoUv { face_id: u32 },
}

/// Source of camera rays against the currently displayed geometry
pub trait RayProvider {
    /// Nearest hit of the ray through normalized device coordinates
    fn cast_ndc(&self, ndc: Vec2) -> Option<MeshHit>;
}

/// A camera looking at a mesh tree
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub camera: &'a PerspectiveCamera,
    pub root: &'a MeshNode,
}

impl RayProvider for SceneView<'_> {
    fn cast_ndc(&self, ndc: Vec2) -> Option<MeshHit> {
        self.root.raycast(&self.camera.ray_from_ndc(ndc))
    }
}

/// Maps viewport pointer positions to raster surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceProjector {
    surface_width: u32,
    surface_height: u32,
    viewport: Vec2,
}

impl SurfaceProjector {
    pub fn new(surface_width: u32, surface_height: u32, viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            surface_width,
            surface_height,
            viewport: Vec2::new(viewport_width, viewport_height),
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Viewport pixels (origin top-left) to NDC (origin center, +y up)
    pub fn viewport_to_ndc(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(
            (x / self.viewport.x) * 2.0 - 1.0,
            -(y / self.viewport.y) * 2.0 + 1.0,
        )
    }

    /// UV (origin bottom-left) to surface pixels (origin top-left)
    pub fn uv_to_pixel(&self, uv: Vec2) -> (f32, f32) {
        (
            uv.x * self.surface_width as f32,
            (1.0 - uv.y) * self.surface_height as f32,
        )
    }

    /// Project a viewport position onto the surface, reporting why it missed
    pub fn try_project(
        &self,
        provider: &impl RayProvider,
        viewport_x: f32,
        viewport_y: f32,
    ) -> Result<(f32, f32), MissingHit> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return Err(MissingHit::NoIntersection);
        }

        let ndc = self.viewport_to_ndc(viewport_x, viewport_y);
        let hit = provider.cast_ndc(ndc).ok_or(MissingHit::NoIntersection)?;
        let uv = hit.uv.ok_or(MissingHit::NoUv {
            face_id: hit.face_id,
        })?;

        let pixel = self.uv_to_pixel(uv);
        trace!(
            "project ({:.1}, {:.1}) -> uv ({:.3}, {:.3}) -> pixel ({:.1}, {:.1})",
            viewport_x, viewport_y, uv.x, uv.y, pixel.0, pixel.1
        );
        Ok(pixel)
    }

    /// Project a viewport position onto the surface, None on any miss
    pub fn project(&self, provider: &impl RayProvider, viewport_x: f32, viewport_y: f32) -> Option<(f32, f32)> {
        self.try_project(provider, viewport_x, viewport_y).ok()
    }
}
