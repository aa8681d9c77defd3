//! Exporting the current view as a square PNG data URL.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Frame is empty")]
    EmptyFrame,

    #[error("Frame data has {actual} bytes, expected {expected}")]
    BadFrame { expected: usize, actual: usize },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),
}

/// A rendered view in tightly packed RGBA8, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ViewportFrame {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self { width, height, rgba }
    }

    fn into_image(self) -> Result<RgbaImage, ExportError> {
        if self.width == 0 || self.height == 0 {
            return Err(ExportError::EmptyFrame);
        }
        let expected = self.width as usize * self.height as usize * 4;
        let actual = self.rgba.len();
        RgbaImage::from_raw(self.width, self.height, self.rgba)
            .filter(|_| actual == expected)
            .ok_or(ExportError::BadFrame { expected, actual })
    }
}

/// Center-crop the frame to its largest square and resize to `size`
pub fn export_square(frame: ViewportFrame, size: u32) -> Result<RgbaImage, ExportError> {
    let image = frame.into_image()?;
    let side = image.width().min(image.height());
    let x = (image.width() - side) / 2;
    let y = (image.height() - side) / 2;

    let cropped = imageops::crop_imm(&image, x, y, side, side).to_image();
    if side == size {
        return Ok(cropped);
    }
    Ok(imageops::resize(&cropped, size, size, FilterType::Triangle))
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub fn to_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Split a base64 data URL into its mime type and decoded bytes
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), ExportError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ExportError::InvalidDataUrl("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ExportError::InvalidDataUrl("missing ',' separator".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| ExportError::InvalidDataUrl("only base64 payloads are supported".to_string()))?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ExportError::InvalidDataUrl(e.to_string()))?;
    Ok((mime.to_string(), bytes))
}

/// Square PNG data URL of a frame
pub fn export_data_url(frame: ViewportFrame, size: u32) -> Result<String, ExportError> {
    let image = export_square(frame, size)?;
    Ok(to_data_url(&encode_png(&image)?))
}

/// Download file name for a shared design: whitespace runs become `_`
pub fn share_file_name(title: &str) -> String {
    let mut name = String::with_capacity(title.len());
    let mut in_space = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
        } else {
            name.push(c);
            in_space = false;
        }
    }
    format!("mask_{}.png", name)
}
