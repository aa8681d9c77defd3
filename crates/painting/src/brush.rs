//! Brush engine for stamp generation
//!
//! A stamp is one soft circular brush application. Strokes are built by
//! interpolating stamps between consecutive input samples so that fast
//! pointer motion still produces a continuous line.

use tracing::debug;

use crate::color::Rgba8;
use crate::constants::{BRUSH_GRADIENT, MIN_STAMP_RADIUS, STAMP_SPACING};
use crate::surface::RasterSurface;

/// Brush engine that composites stamps onto a surface
#[derive(Debug, Clone)]
pub struct BrushEngine {
    /// Radial gradient stops: (fraction of radius, opacity), sorted by fraction
    gradient: [(f32, f32); 3],
    /// Maximum distance between stamps as a fraction of the radius
    spacing: f32,
}

impl Default for BrushEngine {
    fn default() -> Self {
        Self {
            gradient: BRUSH_GRADIENT,
            spacing: STAMP_SPACING,
        }
    }
}

impl BrushEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opacity of the radial gradient at `t` (0 at center, 1 at the rim)
    pub fn falloff(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        for pair in self.gradient.windows(2) {
            let (t0, a0) = pair[0];
            let (t1, a1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                if span <= f32::EPSILON {
                    return a1;
                }
                return a0 + (a1 - a0) * ((t - t0) / span);
            }
        }
        self.gradient[self.gradient.len() - 1].1
    }

    /// Number of interpolation steps for a segment of length `distance`.
    /// A segment always yields `steps + 1` stamps; the count saturates one
    /// below `usize::MAX` so that total never overflows.
    pub fn segment_steps(&self, distance: f32, radius: f32) -> usize {
        let spacing = radius * self.spacing;
        if spacing <= 0.0 || !spacing.is_finite() || !distance.is_finite() {
            return 1;
        }
        ((distance / spacing).ceil() as usize).clamp(1, usize::MAX - 1)
    }

    /// Composite one soft stamp centered at (x, y).
    ///
    /// Pixels are sampled on the integer lattice, so the pixel under the
    /// center receives the full color. Returns the clipped bounding box
    /// (x, y, width, height) or None if the stamp missed the surface or is
    /// too small to cover any pixel.
    pub fn stamp_at(
        &self,
        surface: &mut RasterSurface,
        x: f32,
        y: f32,
        color: Rgba8,
        radius: f32,
    ) -> Option<(u32, u32, u32, u32)> {
        if radius < MIN_STAMP_RADIUS || !radius.is_finite() || !x.is_finite() || !y.is_finite() {
            return None;
        }

        let width = surface.width() as f32;
        let height = surface.height() as f32;
        let x_min = (x - radius).floor().max(0.0);
        let y_min = (y - radius).floor().max(0.0);
        let x_max = (x + radius).ceil().min(width - 1.0);
        let y_max = (y + radius).ceil().min(height - 1.0);
        if x_min > x_max || y_min > y_max {
            return None;
        }

        let (x_min, y_min, x_max, y_max) = (x_min as u32, y_min as u32, x_max as u32, y_max as u32);
        for py in y_min..=y_max {
            for px in x_min..=x_max {
                let dx = px as f32 - x;
                let dy = py as f32 - y;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance >= radius {
                    continue;
                }
                let coverage = self.falloff(distance / radius);
                surface.blend_pixel(px, py, color, coverage);
            }
        }

        Some((x_min, y_min, x_max - x_min + 1, y_max - y_min + 1))
    }

    /// Fill the segment (x1, y1) -> (x2, y2) with stamps.
    ///
    /// Stamps are placed at `t = i / steps` for every `i` in `0..=steps`,
    /// both endpoints included. Returns the number of stamps placed.
    #[allow(clippy::too_many_arguments)]
    pub fn stroke_segment(
        &self,
        surface: &mut RasterSurface,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgba8,
        radius: f32,
    ) -> usize {
        self.stamp_segment(surface, (x1, y1), (x2, y2), color, radius).stamps
    }

    /// Stamps along a segment, composited only where they can reach the
    /// surface. Stamps whose center lies farther than the radius outside
    /// the surface are counted without being visited, so the loop is bounded
    /// by the part of the segment that crosses the surface.
    fn stamp_segment(
        &self,
        surface: &mut RasterSurface,
        from: (f32, f32),
        to: (f32, f32),
        color: Rgba8,
        radius: f32,
    ) -> SegmentStamps {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let distance = (dx * dx + dy * dy).sqrt();
        let steps = self.segment_steps(distance, radius);
        let stamps = steps + 1;

        let mut touched = 0;
        if let Some((t0, t1)) = reachable_span(surface, from, to, radius) {
            let n = steps as f64;
            let first = (t0 * n).floor() as usize;
            let last = ((t1 * n).ceil() as usize).min(steps);
            for i in first..=last {
                let t = i as f64 / n;
                let x = (from.0 as f64 + dx as f64 * t) as f32;
                let y = (from.1 as f64 + dy as f64 * t) as f32;
                if self.stamp_at(surface, x, y, color, radius).is_some() {
                    touched += 1;
                }
            }
        }

        debug!(
            "BrushEngine::stroke_segment: {} stamps ({} on surface) from ({:.1}, {:.1}) to ({:.1}, {:.1}), radius={:.1}",
            stamps, touched, from.0, from.1, to.0, to.1, radius
        );
        SegmentStamps { stamps, touched }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SegmentStamps {
    stamps: usize,
    /// Stamps that reached at least one surface pixel
    touched: usize,
}

/// Range of `t` in [0, 1] where a stamp centered on the segment can overlap
/// the surface, with one pixel of slack around the radius.
fn reachable_span(surface: &RasterSurface, from: (f32, f32), to: (f32, f32), radius: f32) -> Option<(f64, f64)> {
    if radius < MIN_STAMP_RADIUS || !radius.is_finite() {
        return None;
    }
    let margin = radius as f64 + 1.0;
    let x_range = (-margin, surface.width() as f64 - 1.0 + margin);
    let y_range = (-margin, surface.height() as f64 - 1.0 + margin);

    let (tx0, tx1) = clip_axis(from.0 as f64, to.0 as f64 - from.0 as f64, x_range)?;
    let (ty0, ty1) = clip_axis(from.1 as f64, to.1 as f64 - from.1 as f64, y_range)?;
    let (t0, t1) = (tx0.max(ty0), tx1.min(ty1));
    (t0 <= t1).then_some((t0, t1))
}

/// Parameter interval within [0, 1] where `start + delta * t` stays inside `range`
fn clip_axis(start: f64, delta: f64, range: (f64, f64)) -> Option<(f64, f64)> {
    if !start.is_finite() || !delta.is_finite() {
        return None;
    }
    if delta == 0.0 {
        return (range.0..=range.1).contains(&start).then_some((0.0, 1.0));
    }
    let a = (range.0 - start) / delta;
    let b = (range.1 - start) / delta;
    let (t0, t1) = (a.min(b).max(0.0), a.max(b).min(1.0));
    (t0 <= t1).then_some((t0, t1))
}

/// State of a stroke in progress: parameters plus the last painted position
#[derive(Debug, Clone)]
pub struct BrushStroke {
    color: Rgba8,
    radius: f32,
    last_pos: Option<(f32, f32)>,
    stamps: usize,
    touched: usize,
}

impl BrushStroke {
    /// Start a stroke with fixed color and radius
    pub fn begin(color: Rgba8, radius: f32) -> Self {
        Self {
            color,
            radius,
            last_pos: None,
            stamps: 0,
            touched: 0,
        }
    }

    /// Paint towards (x, y) in surface pixels.
    ///
    /// The first sample of a stroke places a single stamp; later samples
    /// interpolate from the previous one. Returns the stamps placed.
    pub fn paint_to(
        &mut self,
        engine: &BrushEngine,
        surface: &mut RasterSurface,
        x: f32,
        y: f32,
    ) -> usize {
        let placed = match self.last_pos {
            Some(last) => engine.stamp_segment(surface, last, (x, y), self.color, self.radius),
            None => {
                let hit = engine.stamp_at(surface, x, y, self.color, self.radius).is_some();
                SegmentStamps {
                    stamps: 1,
                    touched: usize::from(hit),
                }
            }
        };
        self.last_pos = Some((x, y));
        self.stamps = self.stamps.saturating_add(placed.stamps);
        self.touched += placed.touched;
        placed.stamps
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn last_position(&self) -> Option<(f32, f32)> {
        self.last_pos
    }

    /// Whether any stamp of this stroke reached the surface
    pub fn has_painted(&self) -> bool {
        self.touched > 0
    }

    /// Total stamps placed so far
    pub fn stamp_count(&self) -> usize {
        self.stamps
    }

    /// Forget the last position so the next sample starts fresh
    pub fn end(&mut self) {
        self.last_pos = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Rgba8 = Rgba8::opaque(0xdd, 0xdd, 0xdd);
    const RED: Rgba8 = Rgba8::opaque(255, 0, 0);

    #[test]
    fn test_falloff_stops() {
        let engine = BrushEngine::default();
        assert_eq!(engine.falloff(0.0), 1.0);
        assert!((engine.falloff(0.5) - 221.0 / 255.0).abs() < 1e-6);
        assert_eq!(engine.falloff(1.0), 0.0);

        // Monotonic between stops
        assert!(engine.falloff(0.25) < 1.0 && engine.falloff(0.25) > engine.falloff(0.5));
        assert!(engine.falloff(0.75) > 0.0 && engine.falloff(0.75) < engine.falloff(0.5));
    }

    #[test]
    fn test_stamp_center_and_outside() {
        let mut surface = RasterSurface::new(2048, 2048, BASE);
        let engine = BrushEngine::default();

        engine.stamp_at(&mut surface, 1024.0, 1024.0, RED, 25.0);

        assert_eq!(surface.get_pixel(1024, 1024), Some(RED));
        assert_eq!(surface.get_pixel(1024 + 30, 1024), Some(BASE));
    }

    #[test]
    fn test_stamp_soft_edge() {
        let mut surface = RasterSurface::new(128, 128, BASE);
        let engine = BrushEngine::default();
        engine.stamp_at(&mut surface, 64.0, 64.0, RED, 20.0);

        // Halfway out the red channel is mostly but not fully red
        let mid = surface.get_pixel(74, 64).unwrap();
        assert!(mid.g < 0xdd && mid.g > 0);
        // Near the rim the base color dominates
        let rim = surface.get_pixel(83, 64).unwrap();
        assert!(rim.g > mid.g);
        // Exactly on the rim nothing is painted
        assert_eq!(surface.get_pixel(84, 64), Some(BASE));
    }

    #[test]
    fn test_stamp_paints_over_not_additive() {
        let mut surface = RasterSurface::new(64, 64, BASE);
        let engine = BrushEngine::default();
        let blue = Rgba8::opaque(0, 0, 255);

        engine.stamp_at(&mut surface, 32.0, 32.0, RED, 10.0);
        engine.stamp_at(&mut surface, 32.0, 32.0, blue, 10.0);

        assert_eq!(surface.get_pixel(32, 32), Some(blue));
    }

    #[test]
    fn test_stamp_clipped_at_edges() {
        let mut surface = RasterSurface::new(32, 32, BASE);
        let engine = BrushEngine::default();

        let region = engine.stamp_at(&mut surface, 0.0, 0.0, RED, 8.0).unwrap();
        assert_eq!(region.0, 0);
        assert_eq!(region.1, 0);
        assert_eq!(surface.get_pixel(0, 0), Some(RED));

        assert!(engine.stamp_at(&mut surface, -50.0, -50.0, RED, 8.0).is_none());
        assert!(engine.stamp_at(&mut surface, 10.0, 10.0, RED, 0.0).is_none());
    }

    #[test]
    fn test_segment_stamp_count() {
        let mut surface = RasterSurface::new(256, 256, BASE);
        let engine = BrushEngine::default();

        // D = 100, R = 20 -> spacing 5 -> 20 steps -> 21 stamps
        let n = engine.stroke_segment(&mut surface, 10.0, 10.0, 110.0, 10.0, RED, 20.0);
        assert_eq!(n, 21);

        // D = 7, R = 20 -> ceil(1.4) = 2 steps -> 3 stamps
        let n = engine.stroke_segment(&mut surface, 10.0, 10.0, 17.0, 10.0, RED, 20.0);
        assert_eq!(n, 3);
    }

    #[test]
    fn test_segment_zero_length() {
        let mut surface = RasterSurface::new(64, 64, BASE);
        let engine = BrushEngine::default();

        let n = engine.stroke_segment(&mut surface, 20.0, 20.0, 20.0, 20.0, RED, 5.0);
        assert_eq!(n, 2);
        assert_eq!(surface.get_pixel(20, 20), Some(RED));
    }

    #[test]
    fn test_segment_is_continuous() {
        let mut surface = RasterSurface::new(256, 64, BASE);
        let engine = BrushEngine::default();

        engine.stroke_segment(&mut surface, 10.0, 32.0, 240.0, 32.0, RED, 8.0);

        // Every pixel along the path is fully covered by some stamp center region
        for x in 10..=240 {
            let px = surface.get_pixel(x, 32).unwrap();
            assert!(px.g < 0xdd, "gap at x={}", x);
        }
    }

    #[test]
    fn test_stroke_first_sample_single_stamp() {
        let mut surface = RasterSurface::new(64, 64, BASE);
        let engine = BrushEngine::default();
        let mut stroke = BrushStroke::begin(RED, 4.0);

        assert!(!stroke.has_painted());
        assert_eq!(stroke.paint_to(&engine, &mut surface, 10.0, 10.0), 1);
        assert_eq!(stroke.last_position(), Some((10.0, 10.0)));

        // 10px at radius 4 -> spacing 1 -> 10 steps -> 11 stamps
        assert_eq!(stroke.paint_to(&engine, &mut surface, 20.0, 10.0), 11);
        assert_eq!(stroke.stamp_count(), 12);
        assert!(stroke.has_painted());
    }

    #[test]
    fn test_segment_steps_saturate() {
        let engine = BrushEngine::default();
        assert_eq!(engine.segment_steps(2048e6, 25.0), 327_680_000);
        assert_eq!(engine.segment_steps(10.0, 1e-40), usize::MAX - 1);

        // A vanishing radius reports the full count without visiting stamps
        let mut surface = RasterSurface::new(32, 32, BASE);
        let n = engine.stroke_segment(&mut surface, 0.0, 16.0, 10.0, 16.0, RED, 1e-40);
        assert_eq!(n, usize::MAX);
        assert!(surface.pixels().iter().all(|p| *p == BASE.to_array()));
    }

    #[test]
    fn test_long_segment_only_visits_surface() {
        let mut surface = RasterSurface::new(2048, 2048, BASE);
        let engine = BrushEngine::default();

        let placed = engine.stamp_segment(&mut surface, (0.0, 100.0), (2048e6, 100.0), RED, 25.0);
        assert!(placed.stamps > 300_000_000);
        // Only the stretch crossing the surface is stamped
        assert!(placed.touched > 0 && placed.touched <= (2048 + 52) * 4 / 25 + 2);
        assert_eq!(surface.get_pixel(1000, 100), Some(RED));
        assert_eq!(surface.get_pixel(1000, 200), Some(BASE));
    }

    #[test]
    fn test_stroke_off_surface_has_not_painted() {
        let mut surface = RasterSurface::new(64, 64, BASE);
        let engine = BrushEngine::default();
        let mut stroke = BrushStroke::begin(RED, 4.0);

        stroke.paint_to(&engine, &mut surface, -500.0, -500.0);
        stroke.paint_to(&engine, &mut surface, -400.0, -500.0);
        assert!(stroke.stamp_count() > 1);
        assert!(!stroke.has_painted());

        stroke.paint_to(&engine, &mut surface, 10.0, 10.0);
        assert!(stroke.has_painted());
    }
}
