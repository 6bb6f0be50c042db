//! Mapping between display space (the scaled canvas the pointer reports in)
//! and source space (pixels of the decoded image).

use eframe::egui;

use crate::region::CropRegion;

/// Scale factor such that `display = source * scale`. Never above 1.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayScale(f32);

impl DisplayScale {
    pub const IDENTITY: Self = Self(1.0);

    /// Largest scale that fits `image_size` inside `max_size` without upscaling.
    pub fn fit(image_width: u32, image_height: u32, max_width: f32, max_height: f32) -> Self {
        if image_width == 0 || image_height == 0 {
            return Self::IDENTITY;
        }
        let scale = (max_width / image_width as f32)
            .min(max_height / image_height as f32)
            .min(1.0);
        if scale.is_finite() && scale > 0.0 {
            Self(scale)
        } else {
            Self::IDENTITY
        }
    }

    /// Wraps a raw factor. Non-positive or non-finite factors fall back to 1.0.
    pub fn new(scale: f32) -> Self {
        if scale.is_finite() && scale > 0.0 {
            Self(scale)
        } else {
            Self::IDENTITY
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn to_source(self, point: egui::Pos2) -> egui::Pos2 {
        egui::pos2(point.x / self.0, point.y / self.0)
    }

    pub fn to_display(self, point: egui::Pos2) -> egui::Pos2 {
        egui::pos2(point.x * self.0, point.y * self.0)
    }

    pub fn region_to_source(self, region: &CropRegion) -> SourceRect {
        SourceRect {
            x: region.x / self.0,
            y: region.y / self.0,
            width: region.width / self.0,
            height: region.height / self.0,
        }
    }

    pub fn canvas_size(self, image_width: u32, image_height: u32) -> egui::Vec2 {
        egui::vec2(image_width as f32 * self.0, image_height as f32 * self.0)
    }
}

/// Crop rectangle in source pixels. Fractional until rasterization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SourceRect {
    /// Truncates the origin and rounds the size to whole pixels, clamped
    /// inside an image of `image_width × image_height`. Returns `None` when
    /// nothing is left.
    pub fn to_pixels(self, image_width: u32, image_height: u32) -> Option<PixelRect> {
        if image_width == 0 || image_height == 0 {
            return None;
        }
        // floor(x) + round(w) <= W whenever x + w <= W
        let x = (self.x.floor().max(0.0) as u32).min(image_width - 1);
        let y = (self.y.floor().max(0.0) as u32).min(image_height - 1);
        let width = (self.width.round().max(0.0) as u32).min(image_width - x);
        let height = (self.height.round().max(0.0) as u32).min(image_height - y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(PixelRect {
            x,
            y,
            width,
            height,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
