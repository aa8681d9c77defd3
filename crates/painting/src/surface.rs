//! CPU raster surface for painting - 8-bit RGBA storage mapped onto the mask as a texture

use std::sync::Arc;

use crate::color::Rgba8;

/// An immutable point-in-time copy of a surface's pixels.
///
/// Snapshots are never written after capture, so clones share the same
/// pixel allocation. Restoring one always copies into the live buffer.
#[derive(Clone)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Arc<[[u8; 4]]>,
}

impl Snapshot {
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel data in row-major order
    #[inline]
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Get a pixel at the given coordinates
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        Some(Rgba8::from_array(self.pixels[index]))
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// The paintable texture of the active mask.
///
/// Every mutation raises the `needs_upload` bit; the renderer clears it
/// with [`RasterSurface::take_needs_upload`] after re-uploading the pixels.
pub struct RasterSurface {
    width: u32,
    height: u32,
    /// Pixel data in row-major order, origin at the top-left
    pixels: Vec<[u8; 4]>,
    needs_upload: bool,
}

impl RasterSurface {
    /// Create a new surface with the given dimensions, filled with `color`
    pub fn new(width: u32, height: u32, color: Rgba8) -> Self {
        assert!(width > 0 && height > 0, "surface dimensions must be non-zero");
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![color.to_array(); pixel_count],
            needs_upload: true,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill the whole surface with a flat color
    pub fn clear(&mut self, color: Rgba8) {
        self.pixels.fill(color.to_array());
        self.needs_upload = true;
    }

    /// Capture a deep copy of the current pixels
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            pixels: Arc::from(self.pixels.as_slice()),
        }
    }

    /// Overwrite the live buffer with a snapshot's pixels.
    ///
    /// Panics when the snapshot was taken from a surface of different
    /// dimensions: surfaces are never resized, so this is a caller bug.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        assert!(
            snapshot.width == self.width && snapshot.height == self.height,
            "snapshot dimensions {}x{} do not match surface {}x{}",
            snapshot.width,
            snapshot.height,
            self.width,
            self.height
        );
        self.pixels.copy_from_slice(&snapshot.pixels);
        self.needs_upload = true;
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        Some(Rgba8::from_array(self.pixels[index]))
    }

    /// Composite a color over an existing pixel ("source-over").
    /// Formula: out = src * alpha + dst * (1 - alpha)
    /// `coverage` scales the color's own alpha. Out of bounds does nothing.
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba8, coverage: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let src_alpha = (color.alpha_f32() * coverage).clamp(0.0, 1.0);
        if src_alpha <= 0.0 {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        let dst = self.pixels[index];
        let inv_src_alpha = 1.0 - src_alpha;

        let mix = |s: u8, d: u8| (s as f32 * src_alpha + d as f32 * inv_src_alpha).round() as u8;
        let dst_alpha = dst[3] as f32 / 255.0;
        self.pixels[index] = [
            mix(color.r, dst[0]),
            mix(color.g, dst[1]),
            mix(color.b, dst[2]),
            ((src_alpha + dst_alpha * inv_src_alpha) * 255.0).round() as u8,
        ];
        self.needs_upload = true;
    }

    /// Raw RGBA8 bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Get the total number of pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Whether pixels changed since the last upload
    #[inline]
    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    /// Read and clear the upload bit
    pub fn take_needs_upload(&mut self) -> bool {
        std::mem::take(&mut self.needs_upload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Rgba8 = Rgba8::opaque(0xdd, 0xdd, 0xdd);

    #[test]
    fn test_new_surface() {
        let surface = RasterSurface::new(100, 50, BASE);
        assert_eq!(surface.width(), 100);
        assert_eq!(surface.height(), 50);
        assert_eq!(surface.pixel_count(), 5000);
        assert_eq!(surface.get_pixel(99, 49), Some(BASE));
        assert_eq!(surface.get_pixel(100, 0), None);
    }

    #[test]
    fn test_clear_marks_upload() {
        let mut surface = RasterSurface::new(10, 10, BASE);
        assert!(surface.take_needs_upload());
        assert!(!surface.needs_upload());

        surface.clear(Rgba8::WHITE);
        assert!(surface.needs_upload());
        assert!(surface.pixels().iter().all(|p| *p == [255, 255, 255, 255]));
    }

    #[test]
    fn test_snapshot_does_not_alias() {
        let mut surface = RasterSurface::new(4, 4, BASE);
        let snap = surface.snapshot();

        surface.blend_pixel(1, 1, Rgba8::opaque(255, 0, 0), 1.0);
        assert_eq!(surface.get_pixel(1, 1), Some(Rgba8::opaque(255, 0, 0)));
        assert_eq!(snap.get_pixel(1, 1), Some(BASE));
    }

    #[test]
    fn test_restore_round_trip() {
        let mut surface = RasterSurface::new(4, 4, BASE);
        surface.blend_pixel(2, 3, Rgba8::opaque(0, 0, 255), 1.0);
        let snap = surface.snapshot();

        surface.clear(Rgba8::BLACK);
        surface.take_needs_upload();
        surface.restore(&snap);

        assert!(surface.needs_upload());
        assert_eq!(surface.pixels(), snap.pixels());
    }

    #[test]
    #[should_panic(expected = "do not match")]
    fn test_restore_dimension_mismatch_panics() {
        let mut surface = RasterSurface::new(4, 4, BASE);
        let other = RasterSurface::new(8, 4, BASE).snapshot();
        surface.restore(&other);
    }

    #[test]
    fn test_blend_pixel() {
        let mut surface = RasterSurface::new(10, 10, Rgba8::WHITE);

        // Blend 50% opaque red
        surface.blend_pixel(5, 5, Rgba8::opaque(255, 0, 0), 0.5);

        let result = surface.get_pixel(5, 5).unwrap();
        assert_eq!(result.r, 255);
        assert!((result.g as i32 - 128).abs() <= 1);
        assert!((result.b as i32 - 128).abs() <= 1);
        assert_eq!(result.a, 255);
    }

    #[test]
    fn test_blend_zero_coverage_is_noop() {
        let mut surface = RasterSurface::new(2, 2, BASE);
        surface.take_needs_upload();
        surface.blend_pixel(0, 0, Rgba8::opaque(255, 0, 0), 0.0);
        assert_eq!(surface.get_pixel(0, 0), Some(BASE));
        assert!(!surface.needs_upload());
    }

    #[test]
    fn test_as_bytes() {
        let surface = RasterSurface::new(2, 2, BASE);
        // 4 pixels * 4 bytes
        assert_eq!(surface.as_bytes().len(), 16);
        assert_eq!(&surface.as_bytes()[0..4], &[0xdd, 0xdd, 0xdd, 0xff]);
    }
}
