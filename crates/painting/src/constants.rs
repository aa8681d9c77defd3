/// Default paint surface edge length in pixels.
pub const DEFAULT_SURFACE_SIZE: u32 = 2048;

/// Default maximum number of undo snapshots kept per model.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Flat color an untouched mask starts with.
pub const BASE_MASK_COLOR: &str = "#dddddd";

/// Default brush radius in surface pixels.
pub const DEFAULT_BRUSH_RADIUS: f32 = 25.0;

/// Maximum stamp spacing as a fraction of the brush radius.
pub const STAMP_SPACING: f32 = 0.25;

/// Radial gradient stops for a stamp: (fraction of radius, opacity).
/// The middle stop matches a `DD` alpha suffix (221 / 255).
pub const BRUSH_GRADIENT: [(f32, f32); 3] = [(0.0, 1.0), (0.5, 221.0 / 255.0), (1.0, 0.0)];

/// Brush radius slider range in surface pixels.
pub const MIN_BRUSH_RADIUS: f32 = 1.0;
pub const MAX_BRUSH_RADIUS: f32 = 100.0;

/// Radius below which a stamp covers no pixel and is skipped.
pub const MIN_STAMP_RADIUS: f32 = 1e-3;
