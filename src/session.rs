use eframe::egui;
use image::DynamicImage;

use crate::extract::{self, CropError, ExtractedCrop};
use crate::gesture::{GestureController, GestureMode, PointerEvent};
use crate::region::{Anchor, CropRegion, Preset};
use crate::source::{self, LoadError};
use crate::transform::DisplayScale;

#[derive(Debug)]
pub struct EditorSession {
    image: Option<DynamicImage>,
    scale: DisplayScale,
    canvas: egui::Vec2,
    region: CropRegion,
    gesture: GestureController,
    crop: Option<ExtractedCrop>,
    show_cropped_result: bool,
    max_display: egui::Vec2,
}

impl EditorSession {
    pub fn new(max_width: f32, max_height: f32) -> Self {
        Self {
            image: None,
            scale: DisplayScale::IDENTITY,
            canvas: egui::Vec2::ZERO,
            region: CropRegion::default(),
            gesture: GestureController::default(),
            crop: None,
            show_cropped_result: false,
            max_display: egui::vec2(max_width, max_height),
        }
    }

    pub fn image(&self) -> Option<&DynamicImage> {
        self.image.as_ref()
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    /// Display-space size of the photo; zero when nothing is loaded.
    pub fn canvas(&self) -> egui::Vec2 {
        self.canvas
    }

    pub fn region(&self) -> &CropRegion {
        &self.region
    }

    pub fn gesture_mode(&self) -> GestureMode {
        self.gesture.mode()
    }

    pub fn crop(&self) -> Option<&ExtractedCrop> {
        self.crop.as_ref()
    }

    pub fn showing_result(&self) -> bool {
        self.show_cropped_result
    }

    /// Replaces the photo, discarding the selection, gesture and crop.
    pub fn load(&mut self, image: DynamicImage) {
        self.scale = DisplayScale::fit(
            image.width(),
            image.height(),
            self.max_display.x,
            self.max_display.y,
        );
        self.canvas = self.scale.canvas_size(image.width(), image.height());
        log::info!(
            "Loaded {}x{} image, display {:.0}x{:.0} (scale {:.3})",
            image.width(),
            image.height(),
            self.canvas.x,
            self.canvas.y,
            self.scale.get()
        );
        self.image = Some(image);
        self.reset();
    }

    /// Decodes and loads. A non-image MIME type changes nothing; a decode
    /// failure drops back to the empty upload prompt.
    pub fn load_bytes(&mut self, bytes: &[u8], mime: &str) -> Result<(), LoadError> {
        match source::decode(bytes, mime) {
            Ok(image) => {
                self.load(image);
                Ok(())
            }
            Err(e @ LoadError::DecodeFailure(_)) => {
                self.clear();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub fn clear(&mut self) {
        self.image = None;
        self.scale = DisplayScale::IDENTITY;
        self.canvas = egui::Vec2::ZERO;
        self.region = CropRegion::default();
        self.gesture.reset();
        self.crop = None;
        self.show_cropped_result = false;
    }

    pub fn reset(&mut self) {
        self.gesture.reset();
        self.crop = None;
        self.show_cropped_result = false;
        self.region = if self.image.is_some() {
            CropRegion::initialize(self.canvas)
        } else {
            CropRegion::default()
        };
    }

    /// Routes a pointer event to the gesture controller. Returns whether the
    /// selection changed.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        if self.image.is_none() || self.show_cropped_result {
            return false;
        }
        self.gesture.handle(event, &mut self.region, self.canvas)
    }

    pub fn set_preset(&mut self, preset: Preset) {
        if self.image.is_none() {
            return;
        }
        self.gesture.reset();
        self.region = self.region.with_preset(self.canvas, preset);
        log::debug!("Preset {} -> {:?}", preset, self.region);
    }

    pub fn set_anchor(&mut self, anchor: Anchor) {
        if self.image.is_none() {
            return;
        }
        self.gesture.reset();
        self.region = self.region.with_anchor(self.canvas, anchor);
        log::debug!("Anchor {} -> {:?}", anchor, self.region);
    }

    pub fn perform_crop(&mut self) -> Result<&ExtractedCrop, CropError> {
        let crop = extract::extract(self.image.as_ref(), &self.region, self.scale)?;
        self.gesture.reset();
        self.show_cropped_result = true;
        Ok(&*self.crop.insert(crop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::CropShape;
    use image::RgbaImage;

    fn session_with(width: u32, height: u32) -> EditorSession {
        let mut session = EditorSession::new(320.0, 320.0);
        session.load(DynamicImage::ImageRgba8(RgbaImage::new(width, height)));
        session
    }

    #[test]
    fn load_scales_and_centers_selection() {
        let session = session_with(800, 400);
        assert_eq!(session.scale().get(), 0.4);
        assert_eq!(session.canvas(), egui::vec2(320.0, 160.0));
        let r = session.region();
        assert_eq!((r.width, r.height), (200.0, 112.0));
        assert_eq!((r.x, r.y), (60.0, 24.0));
    }

    #[test]
    fn crop_without_image_is_rejected() {
        let mut session = EditorSession::new(320.0, 320.0);
        assert!(matches!(
            session.perform_crop(),
            Err(CropError::InvalidCropState)
        ));
        assert!(session.crop().is_none());
    }

    #[test]
    fn crop_shows_result_and_freezes_editing() {
        let mut session = session_with(640, 640);
        let (w, h) = {
            let crop = session.perform_crop().unwrap();
            (crop.width(), crop.height())
        };
        assert_eq!((w, h), (400, 400));
        assert!(session.showing_result());

        let before = *session.region();
        session.pointer(PointerEvent::Down(before.center()));
        session.pointer(PointerEvent::Move(before.center() + egui::vec2(5.0, 5.0)));
        assert_eq!(*session.region(), before);
    }

    #[test]
    fn reset_returns_to_default_rectangle() {
        let mut session = session_with(320, 320);
        session.set_preset(Preset::Circle);
        assert_eq!(session.region().shape, CropShape::Circle);
        session.perform_crop().unwrap();

        session.reset();
        assert!(!session.showing_result());
        assert!(session.crop().is_none());
        assert_eq!(*session.region(), CropRegion::initialize(session.canvas()));
    }

    #[test]
    fn new_image_cancels_gesture() {
        let mut session = session_with(320, 320);
        let center = session.region().center();
        session.pointer(PointerEvent::Down(center));
        assert_eq!(session.gesture_mode(), GestureMode::Dragging);

        session.load(DynamicImage::ImageRgba8(RgbaImage::new(100, 100)));
        assert_eq!(session.gesture_mode(), GestureMode::Idle);
        assert!(!session.pointer(PointerEvent::Move(center + egui::vec2(10.0, 0.0))));
    }

    #[test]
    fn rejected_mime_keeps_current_photo() {
        let mut session = session_with(50, 50);
        assert!(matches!(
            session.load_bytes(b"hello", "text/plain"),
            Err(LoadError::InvalidInput { .. })
        ));
        assert!(session.image().is_some());

        assert!(matches!(
            session.load_bytes(b"hello", "image/png"),
            Err(LoadError::DecodeFailure(_))
        ));
        assert!(session.image().is_none());
        assert!(session.region().is_empty());
    }
}
