use std::f32::consts::{FRAC_PI_2, PI};

use eframe::egui;

use crate::config::OverlayPolicy;
use crate::gesture::GestureMode;
use crate::region::{CropRegion, CropShape};

pub const OVERLAY_COLOR: egui::Color32 = egui::Color32::from_black_alpha(102);
const HANDLE_RADIUS: f32 = 6.0;
const BORDER_WIDTH: f32 = 2.0;
const ARC_SEGMENTS: usize = 24;

pub fn draw_base(painter: &egui::Painter, texture: &egui::TextureHandle, image_rect: egui::Rect) {
    painter.image(
        texture.id(),
        image_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
}

pub fn overlay_visible(policy: OverlayPolicy, mode: GestureMode) -> bool {
    match policy {
        OverlayPolicy::Always => true,
        OverlayPolicy::HideWhileDragging => mode != GestureMode::Dragging,
    }
}

pub fn to_screen(region: &CropRegion, image_rect: egui::Rect) -> egui::Rect {
    region.rect().translate(image_rect.min.to_vec2())
}

/// The four bands of `canvas` around `hole`: top, bottom, left, right.
pub fn outside_rects(canvas: egui::Rect, hole: egui::Rect) -> [egui::Rect; 4] {
    [
        egui::Rect::from_min_max(canvas.min, egui::pos2(canvas.max.x, hole.min.y)),
        egui::Rect::from_min_max(egui::pos2(canvas.min.x, hole.max.y), canvas.max),
        egui::Rect::from_min_max(
            egui::pos2(canvas.min.x, hole.min.y),
            egui::pos2(hole.min.x, hole.max.y),
        ),
        egui::Rect::from_min_max(
            egui::pos2(hole.max.x, hole.min.y),
            egui::pos2(canvas.max.x, hole.max.y),
        ),
    ]
}

/// Triangles filling the four corners of the circle's bounding square that
/// lie outside the circle, fanned from each square corner.
pub fn corner_fans(center: egui::Pos2, radius: f32, segments: usize) -> Vec<[egui::Pos2; 3]> {
    let segments = segments.max(1);
    let on_circle = |angle: f32| center + radius * egui::vec2(angle.cos(), angle.sin());
    let quadrants = [
        (0.0, egui::vec2(1.0, 1.0)),
        (FRAC_PI_2, egui::vec2(-1.0, 1.0)),
        (PI, egui::vec2(-1.0, -1.0)),
        (PI + FRAC_PI_2, egui::vec2(1.0, -1.0)),
    ];

    let mut triangles = Vec::with_capacity(4 * segments);
    for (start, dir) in quadrants {
        let corner = center + radius * dir;
        for i in 0..segments {
            let a0 = start + FRAC_PI_2 * i as f32 / segments as f32;
            let a1 = start + FRAC_PI_2 * (i + 1) as f32 / segments as f32;
            triangles.push([corner, on_circle(a0), on_circle(a1)]);
        }
    }
    triangles
}

/// Dimming mesh covering `canvas` except the selection.
pub fn overlay_mesh(canvas: egui::Rect, selection: egui::Rect, shape: CropShape) -> egui::Mesh {
    let mut mesh = egui::Mesh::default();
    match shape {
        CropShape::Rectangle => {
            for band in outside_rects(canvas, selection) {
                if band.is_positive() {
                    mesh.add_colored_rect(band, OVERLAY_COLOR);
                }
            }
        }
        CropShape::Circle => {
            let center = selection.center();
            let radius = selection.width().min(selection.height()) / 2.0;
            let square = egui::Rect::from_center_size(center, egui::Vec2::splat(radius * 2.0));
            for band in outside_rects(canvas, square) {
                if band.is_positive() {
                    mesh.add_colored_rect(band, OVERLAY_COLOR);
                }
            }
            for [a, b, c] in corner_fans(center, radius, ARC_SEGMENTS) {
                let base = mesh.vertices.len() as u32;
                mesh.colored_vertex(a, OVERLAY_COLOR);
                mesh.colored_vertex(b, OVERLAY_COLOR);
                mesh.colored_vertex(c, OVERLAY_COLOR);
                mesh.add_triangle(base, base + 1, base + 2);
            }
        }
    }
    mesh
}

pub fn draw_overlay(painter: &egui::Painter, image_rect: egui::Rect, region: &CropRegion) {
    let selection = to_screen(region, image_rect);
    painter.add(egui::Shape::mesh(overlay_mesh(
        image_rect,
        selection,
        region.shape,
    )));
    draw_border(painter, selection, region.shape);
}

/// Outline of the selection; drawn even when the mask is suppressed.
pub fn draw_border(painter: &egui::Painter, selection: egui::Rect, shape: CropShape) {
    let stroke = egui::Stroke::new(BORDER_WIDTH, egui::Color32::WHITE);
    match shape {
        CropShape::Rectangle => {
            painter.rect_stroke(selection, 0.0, stroke);
        }
        CropShape::Circle => {
            let radius = selection.width().min(selection.height()) / 2.0;
            painter.circle_stroke(selection.center(), radius, stroke);
        }
    }
}

pub fn draw_handles(painter: &egui::Painter, image_rect: egui::Rect, region: &CropRegion) {
    let offset = image_rect.min.to_vec2();
    let handle_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
    let handle_fill = egui::Color32::WHITE;
    for (_, pos) in region.handles() {
        painter.circle(pos + offset, HANDLE_RADIUS, handle_fill, handle_stroke);
    }
}

/// Largest rect of `content`'s aspect ratio centered inside `bounds`.
pub fn fit_within(content: egui::Vec2, bounds: egui::Rect) -> egui::Rect {
    if content.x <= 0.0 || content.y <= 0.0 {
        return egui::Rect::from_center_size(bounds.center(), egui::Vec2::ZERO);
    }
    let scale = (bounds.width() / content.x).min(bounds.height() / content.y);
    egui::Rect::from_center_size(bounds.center(), content * scale)
}

pub fn draw_result(
    painter: &egui::Painter,
    texture: &egui::TextureHandle,
    image_rect: egui::Rect,
    content: egui::Vec2,
) {
    painter.image(
        texture.id(),
        fit_within(content, image_rect),
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
}
