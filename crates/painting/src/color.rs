//! 8-bit RGBA colors and hex parsing

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("Invalid hex color '{0}': expected #rgb, #rrggbb or #rrggbbaa")]
    InvalidHex(String),
}

/// A straight (non-premultiplied) 8-bit RGBA color
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable,
)]
#[repr(C)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse a CSS-style hex color.
    ///
    /// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa`; the leading `#` is optional.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(hex.to_string());
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                // Each short digit expands to a repeated pair, e.g. "d" -> "dd"
                let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self::opaque(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::opaque(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            8 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => Err(invalid()),
        }
    }

    /// Format as lowercase `#rrggbbaa`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Alpha as a 0.0-1.0 fraction
    #[inline]
    pub fn alpha_f32(self) -> f32 {
        self.a as f32 / 255.0
    }

    #[inline]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn from_array(px: [u8; 4]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_hex() {
        assert_eq!(Rgba8::from_hex("#ff0000").unwrap(), Rgba8::opaque(255, 0, 0));
        assert_eq!(Rgba8::from_hex("DDdddd").unwrap(), Rgba8::opaque(221, 221, 221));
    }

    #[test]
    fn test_parse_short_hex() {
        assert_eq!(Rgba8::from_hex("#fa0").unwrap(), Rgba8::opaque(255, 170, 0));
    }

    #[test]
    fn test_parse_hex_with_alpha_suffix() {
        // The brush gradient mid stop is the picked color with a "DD" suffix
        let c = Rgba8::from_hex("#ff0000DD").unwrap();
        assert_eq!(c, Rgba8::new(255, 0, 0, 221));
        assert_eq!(c.to_hex(), "#ff0000dd");
    }

    #[test]
    fn test_reject_bad_hex() {
        assert!(Rgba8::from_hex("#ff00").is_err());
        assert!(Rgba8::from_hex("#gg0000").is_err());
        assert!(Rgba8::from_hex("").is_err());
        assert!(Rgba8::from_hex("#ff00é").is_err());
    }

    #[test]
    fn test_with_alpha() {
        let c = Rgba8::opaque(1, 2, 3).with_alpha(0);
        assert_eq!(c.a, 0);
        assert_eq!(c.alpha_f32(), 0.0);
    }
}
