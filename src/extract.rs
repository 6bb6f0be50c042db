//! Rasterizes the current selection out of the source image.
//!
//! Works in source pixels: the display-space region is divided by the
//! display scale, rounded to whole pixels and copied 1:1. Circles keep only
//! the pixels inside the inscribed circle; everything else becomes fully
//! transparent. The result is always encoded as PNG.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::region::{CropRegion, CropShape};
use crate::transform::DisplayScale;

pub const PNG_MIME: &str = "image/png";

#[derive(Clone, Debug)]
pub struct ExtractedCrop {
    pub image: RgbaImage,
    pub shape: CropShape,
    pub png: Vec<u8>,
}

impl ExtractedCrop {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("Select an area to crop first")]
    InvalidCropState,

    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Crops `image` to `region` (display space) at `scale`.
///
/// Fails with [`CropError::InvalidCropState`] before allocating anything if
/// there is no image or the region is empty.
pub fn extract(
    image: Option<&DynamicImage>,
    region: &CropRegion,
    scale: DisplayScale,
) -> Result<ExtractedCrop, CropError> {
    let image = image.ok_or(CropError::InvalidCropState)?;
    if region.is_empty() {
        return Err(CropError::InvalidCropState);
    }

    let pixels = scale
        .region_to_source(region)
        .to_pixels(image.width(), image.height())
        .ok_or(CropError::InvalidCropState)?;

    let mut cropped = image
        .crop_imm(pixels.x, pixels.y, pixels.width, pixels.height)
        .into_rgba8();

    if region.shape == CropShape::Circle {
        mask_outside_circle(&mut cropped);
    }

    let png = encode_png(&cropped)?;

    log::info!(
        "Extracted {:?} crop {}x{} at {},{} ({} bytes)",
        region.shape,
        pixels.width,
        pixels.height,
        pixels.x,
        pixels.y,
        png.len()
    );

    Ok(ExtractedCrop {
        image: cropped,
        shape: region.shape,
        png,
    })
}

/// Whether pixel `(px, py)` of a `width × height` output lies inside the
/// inscribed circle. Pixels exactly on the radius are inside.
pub fn in_circle(px: u32, py: u32, width: u32, height: u32) -> bool {
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let radius = width.min(height) as f64 / 2.0;
    let dx = px as f64 - cx;
    let dy = py as f64 - cy;
    dx * dx + dy * dy <= radius * radius
}

fn mask_outside_circle(image: &mut RgbaImage) {
    let (width, height) = image.dimensions();
    for (px, py, pixel) in image.enumerate_pixels_mut() {
        if !in_circle(px, py, width, height) {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CropError> {
    let mut png_bytes: Vec<u8> = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| CropError::EncodingFailed(e.to_string()))?;
    Ok(png_bytes)
}
