//! Crop selection geometry in display space.
//!
//! Every operation returns a fresh region that satisfies the invariants for
//! the canvas it was given: inside the canvas, no side shorter than
//! [`MIN_SIZE`] (or the canvas itself when the canvas is smaller), and
//! square when the shape is a circle.

use std::fmt;

use eframe::egui;

/// Smallest side a selection may be dragged down to, in display pixels.
pub const MIN_SIZE: f32 = 20.0;

/// Pointer distance within which a handle is grabbed.
pub const HANDLE_TOLERANCE: f32 = 10.0;

const DEFAULT_FILL: f32 = 0.7;
const DEFAULT_CAP: f32 = 200.0;
const PRESET_FILL: f32 = 0.8;
const LANDSCAPE_RATIO: f32 = 0.6;
const PORTRAIT_RATIO: f32 = 0.75;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CropShape {
    #[default]
    Rectangle,
    Circle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthWest,
        Corner::SouthEast,
    ];

    /// Unit direction pointing away from the opposite corner.
    fn direction(self) -> egui::Vec2 {
        match self {
            Corner::NorthWest => egui::vec2(-1.0, -1.0),
            Corner::NorthEast => egui::vec2(1.0, -1.0),
            Corner::SouthWest => egui::vec2(-1.0, 1.0),
            Corner::SouthEast => egui::vec2(1.0, 1.0),
        }
    }

    fn opposite(self) -> Corner {
        match self {
            Corner::NorthWest => Corner::SouthEast,
            Corner::NorthEast => Corner::SouthWest,
            Corner::SouthWest => Corner::NorthEast,
            Corner::SouthEast => Corner::NorthWest,
        }
    }

    pub fn of(self, rect: egui::Rect) -> egui::Pos2 {
        match self {
            Corner::NorthWest => rect.left_top(),
            Corner::NorthEast => rect.right_top(),
            Corner::SouthWest => rect.left_bottom(),
            Corner::SouthEast => rect.right_bottom(),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Corner::NorthWest => "nw",
            Corner::NorthEast => "ne",
            Corner::SouthWest => "sw",
            Corner::SouthEast => "se",
        }
    }
}

/// A draggable control on the selection boundary.
///
/// `Corner` and the edge variants belong to rectangles; `Circle` handles sit
/// on the corners of a circle's bounding square and always resize about the
/// diagonally opposite corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeHandle {
    North,
    South,
    East,
    West,
    Corner(Corner),
    Circle(Corner),
}

impl ResizeHandle {
    pub fn is_circle(self) -> bool {
        matches!(self, ResizeHandle::Circle(_))
    }

    /// Which rectangle edges this handle drags: (west, east, north, south).
    fn edges(self) -> (bool, bool, bool, bool) {
        match self {
            ResizeHandle::North => (false, false, true, false),
            ResizeHandle::South => (false, false, false, true),
            ResizeHandle::East => (false, true, false, false),
            ResizeHandle::West => (true, false, false, false),
            ResizeHandle::Corner(corner) | ResizeHandle::Circle(corner) => match corner {
                Corner::NorthWest => (true, false, true, false),
                Corner::NorthEast => (false, true, true, false),
                Corner::SouthWest => (true, false, false, true),
                Corner::SouthEast => (false, true, false, true),
            },
        }
    }
}

impl fmt::Display for ResizeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeHandle::North => write!(f, "n"),
            ResizeHandle::South => write!(f, "s"),
            ResizeHandle::East => write!(f, "e"),
            ResizeHandle::West => write!(f, "w"),
            ResizeHandle::Corner(corner) => write!(f, "{}", corner.suffix()),
            ResizeHandle::Circle(corner) => write!(f, "circle-{}", corner.suffix()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Body,
    Handle(ResizeHandle),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Square,
    Landscape,
    Portrait,
    Circle,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Square,
        Preset::Landscape,
        Preset::Portrait,
        Preset::Circle,
    ];
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Preset::Square => "Square",
            Preset::Landscape => "Landscape",
            Preset::Portrait => "Portrait",
            Preset::Circle => "Circle",
        };
        write!(f, "{}", s)
    }
}

/// Named canvas positions a selection can be snapped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    /// Row-major, matching the 3×3 button grid.
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::CenterLeft,
        Anchor::Center,
        Anchor::CenterRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    /// Fraction of the free space placed before the region on each axis.
    fn fractions(self) -> (f32, f32) {
        match self {
            Anchor::TopLeft => (0.0, 0.0),
            Anchor::TopCenter => (0.5, 0.0),
            Anchor::TopRight => (1.0, 0.0),
            Anchor::CenterLeft => (0.0, 0.5),
            Anchor::Center => (0.5, 0.5),
            Anchor::CenterRight => (1.0, 0.5),
            Anchor::BottomLeft => (0.0, 1.0),
            Anchor::BottomCenter => (0.5, 1.0),
            Anchor::BottomRight => (1.0, 1.0),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Anchor::TopLeft => "top-left",
            Anchor::TopCenter => "top-center",
            Anchor::TopRight => "top-right",
            Anchor::CenterLeft => "center-left",
            Anchor::Center => "center",
            Anchor::CenterRight => "center-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomCenter => "bottom-center",
            Anchor::BottomRight => "bottom-right",
        };
        write!(f, "{}", s)
    }
}

/// Current selection, in display-space pixels. The default value is the
/// empty, never-initialized region.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CropRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub shape: CropShape,
}

fn min_extent(canvas_extent: f32) -> f32 {
    MIN_SIZE.min(canvas_extent.max(0.0))
}

/// Shrinks `len` so that `start + len` fits in `limit`; moves `start` back
/// only when the shrunk length would fall under the minimum.
fn shrink_from(start: f32, len: f32, limit: f32) -> (f32, f32) {
    let min = min_extent(limit);
    let len = len.min(limit - start);
    if len >= min {
        (start, len)
    } else {
        ((limit - min).max(0.0), min)
    }
}

impl CropRegion {
    /// Centered rectangle covering 70% of the canvas, at most 200px a side.
    pub fn initialize(canvas: egui::Vec2) -> Self {
        let width = (canvas.x * DEFAULT_FILL).min(DEFAULT_CAP);
        let height = (canvas.y * DEFAULT_FILL).min(DEFAULT_CAP);
        Self {
            x: (canvas.x - width) / 2.0,
            y: (canvas.y - height) / 2.0,
            width,
            height,
            shape: CropShape::Rectangle,
        }
        .fit_to(canvas)
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn rect(&self) -> egui::Rect {
        egui::Rect::from_min_size(
            egui::pos2(self.x, self.y),
            egui::vec2(self.width, self.height),
        )
    }

    pub fn center(&self) -> egui::Pos2 {
        self.rect().center()
    }

    pub fn radius(&self) -> f32 {
        self.width.min(self.height) / 2.0
    }

    pub fn within(&self, canvas: egui::Vec2) -> bool {
        const EPS: f32 = 1e-3;
        let rect = self.rect();
        rect.min.x >= -EPS
            && rect.min.y >= -EPS
            && rect.max.x <= canvas.x + EPS
            && rect.max.y <= canvas.y + EPS
            && self.width + EPS >= min_extent(canvas.x)
            && self.height + EPS >= min_extent(canvas.y)
            && (self.shape == CropShape::Rectangle || (self.width - self.height).abs() <= EPS)
    }

    /// Clamps size then position into `canvas`, squaring circles.
    pub fn fit_to(mut self, canvas: egui::Vec2) -> Self {
        self.width = self.width.max(min_extent(canvas.x)).min(canvas.x.max(0.0));
        self.height = self.height.max(min_extent(canvas.y)).min(canvas.y.max(0.0));
        if self.shape == CropShape::Circle {
            let side = self.width.min(self.height);
            self.width = side;
            self.height = side;
        }
        self.x = self.x.min(canvas.x - self.width).max(0.0);
        self.y = self.y.min(canvas.y - self.height).max(0.0);
        self
    }

    /// Translates to `(x, y)`, clamped so the size is kept inside `canvas`.
    pub fn move_to(&self, x: f32, y: f32, canvas: egui::Vec2) -> Self {
        Self { x, y, ..*self }.fit_to(canvas)
    }

    /// Resizes by dragging `handle` by `delta` from this region.
    ///
    /// Handles that do not belong to the region's shape leave it untouched.
    pub fn resize(&self, handle: ResizeHandle, delta: egui::Vec2, canvas: egui::Vec2) -> Self {
        let circle = self.shape == CropShape::Circle;
        debug_assert_eq!(handle.is_circle(), circle, "handle {handle} on {:?}", self.shape);
        if handle.is_circle() != circle {
            return *self;
        }
        match handle {
            ResizeHandle::Circle(corner) => self.resize_circle(corner, delta, canvas),
            _ => self.resize_rect(handle, delta, canvas),
        }
    }

    fn resize_rect(&self, handle: ResizeHandle, delta: egui::Vec2, canvas: egui::Vec2) -> Self {
        let (west, east, north, south) = handle.edges();
        let min_w = min_extent(canvas.x);
        let min_h = min_extent(canvas.y);

        let mut left = self.x;
        let mut top = self.y;
        let mut right = self.x + self.width;
        let mut bottom = self.y + self.height;

        if west {
            left = (left + delta.x).min(right - min_w).max(0.0);
        }
        if east {
            right = (right + delta.x).max(left + min_w).min(canvas.x);
        }
        if north {
            top = (top + delta.y).min(bottom - min_h).max(0.0);
        }
        if south {
            bottom = (bottom + delta.y).max(top + min_h).min(canvas.y);
        }

        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
            shape: self.shape,
        }
        .fit_to(canvas)
    }

    fn resize_circle(&self, corner: Corner, delta: egui::Vec2, canvas: egui::Vec2) -> Self {
        let rect = self.rect();
        let anchor = corner.opposite().of(rect);
        let dragged = corner.of(rect) + delta;
        let dir = corner.direction();

        let extent = (dragged - anchor) * dir;
        let room_x = if dir.x > 0.0 { canvas.x - anchor.x } else { anchor.x };
        let room_y = if dir.y > 0.0 { canvas.y - anchor.y } else { anchor.y };

        let side = extent
            .x
            .min(extent.y)
            .max(min_extent(canvas.x.min(canvas.y)))
            .min(room_x)
            .min(room_y);

        Self {
            x: if dir.x > 0.0 { anchor.x } else { anchor.x - side },
            y: if dir.y > 0.0 { anchor.y } else { anchor.y - side },
            width: side,
            height: side,
            shape: CropShape::Circle,
        }
        .fit_to(canvas)
    }

    /// Applies a sizing preset, keeping the top-left corner where it fits.
    pub fn with_preset(&self, canvas: egui::Vec2, preset: Preset) -> Self {
        let max_side = canvas.x.min(canvas.y) * PRESET_FILL;
        let (width, height, shape) = match preset {
            Preset::Square => (max_side, max_side, CropShape::Rectangle),
            Preset::Landscape => {
                let width = canvas.x * PRESET_FILL;
                (width, width * LANDSCAPE_RATIO, CropShape::Rectangle)
            }
            Preset::Portrait => {
                let height = canvas.y * PRESET_FILL;
                (height * PORTRAIT_RATIO, height, CropShape::Rectangle)
            }
            Preset::Circle => (max_side, max_side, CropShape::Circle),
        };

        let (x, width) = shrink_from(self.x, width, canvas.x);
        let (y, height) = shrink_from(self.y, height, canvas.y);
        let mut region = Self {
            x,
            y,
            width,
            height,
            shape,
        };
        if shape == CropShape::Circle {
            let side = width.min(height);
            region.width = side;
            region.height = side;
        }
        region.fit_to(canvas)
    }

    pub fn with_anchor(&self, canvas: egui::Vec2, anchor: Anchor) -> Self {
        let (fx, fy) = anchor.fractions();
        let x = (canvas.x - self.width) * fx;
        let y = (canvas.y - self.height) * fy;
        self.move_to(x, y, canvas)
    }

    pub fn handles(&self) -> Vec<(ResizeHandle, egui::Pos2)> {
        let rect = self.rect();
        match self.shape {
            CropShape::Circle => Corner::ALL
                .iter()
                .map(|&c| (ResizeHandle::Circle(c), c.of(rect)))
                .collect(),
            CropShape::Rectangle => {
                let mut handles: Vec<_> = Corner::ALL
                    .iter()
                    .map(|&c| (ResizeHandle::Corner(c), c.of(rect)))
                    .collect();
                handles.extend([
                    (ResizeHandle::North, rect.center_top()),
                    (ResizeHandle::South, rect.center_bottom()),
                    (ResizeHandle::West, rect.left_center()),
                    (ResizeHandle::East, rect.right_center()),
                ]);
                handles
            }
        }
    }

    /// What a pointer press at `pos` grabs: a handle first, then the body.
    pub fn hit_test(&self, pos: egui::Pos2) -> Option<HitTarget> {
        if self.is_empty() {
            return None;
        }
        let rect = self.rect();

        for corner in Corner::ALL {
            if pos.distance(corner.of(rect)) < HANDLE_TOLERANCE {
                let handle = match self.shape {
                    CropShape::Circle => ResizeHandle::Circle(corner),
                    CropShape::Rectangle => ResizeHandle::Corner(corner),
                };
                return Some(HitTarget::Handle(handle));
            }
        }

        if self.shape == CropShape::Rectangle {
            let (min, max) = (rect.min, rect.max);
            let within_y = pos.y > min.y && pos.y < max.y;
            let within_x = pos.x > min.x && pos.x < max.x;
            if (pos.x - min.x).abs() < HANDLE_TOLERANCE && within_y {
                return Some(HitTarget::Handle(ResizeHandle::West));
            }
            if (pos.x - max.x).abs() < HANDLE_TOLERANCE && within_y {
                return Some(HitTarget::Handle(ResizeHandle::East));
            }
            if (pos.y - min.y).abs() < HANDLE_TOLERANCE && within_x {
                return Some(HitTarget::Handle(ResizeHandle::North));
            }
            if (pos.y - max.y).abs() < HANDLE_TOLERANCE && within_x {
                return Some(HitTarget::Handle(ResizeHandle::South));
            }
        }

        if rect.contains(pos) {
            return Some(HitTarget::Body);
        }

        None
    }
}
