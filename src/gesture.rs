//! Pointer-driven drag/resize state machine.
//!
//! Mouse and single-touch input are first normalized into [`PointerEvent`]s
//! in display space, then fed to [`GestureController`]. While a gesture is
//! active every update is computed from the region snapshot taken on press
//! plus the total pointer travel, so per-frame rounding and clamping never
//! accumulate.

use eframe::egui;

use crate::region::{CropRegion, HitTarget, ResizeHandle};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(egui::Pos2),
    Move(egui::Pos2),
    Up,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GestureMode {
    #[default]
    Idle,
    Dragging,
    Resizing(ResizeHandle),
}

#[derive(Debug, Default)]
pub struct GestureController {
    mode: GestureMode,
    pointer_anchor: egui::Pos2,
    region_at_start: Option<CropRegion>,
}

impl GestureController {
    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != GestureMode::Idle
    }

    /// Starts a drag or resize if `pos` lands on the region. A press while a
    /// gesture is already running is ignored.
    pub fn pointer_down(&mut self, pos: egui::Pos2, region: &CropRegion) -> bool {
        if self.is_active() {
            return false;
        }
        let mode = match region.hit_test(pos) {
            Some(HitTarget::Body) => GestureMode::Dragging,
            Some(HitTarget::Handle(handle)) => GestureMode::Resizing(handle),
            None => return false,
        };
        log::debug!("gesture start {:?} at ({:.1}, {:.1})", mode, pos.x, pos.y);
        self.mode = mode;
        self.pointer_anchor = pos;
        self.region_at_start = Some(*region);
        true
    }

    /// Region for the pointer now being at `pos`, or `None` when idle.
    pub fn pointer_move(&self, pos: egui::Pos2, canvas: egui::Vec2) -> Option<CropRegion> {
        let start = self.region_at_start?;
        let delta = pos - self.pointer_anchor;
        match self.mode {
            GestureMode::Idle => None,
            GestureMode::Dragging => Some(start.move_to(start.x + delta.x, start.y + delta.y, canvas)),
            GestureMode::Resizing(handle) => Some(start.resize(handle, delta, canvas)),
        }
    }

    pub fn pointer_up(&mut self) {
        if self.is_active() {
            log::debug!("gesture end {:?}", self.mode);
        }
        self.reset();
    }

    /// Drops any gesture in flight, e.g. when a new image is loaded.
    pub fn reset(&mut self) {
        self.mode = GestureMode::Idle;
        self.region_at_start = None;
    }

    /// Feeds one event, updating `region` in place. Returns whether it changed.
    pub fn handle(&mut self, event: PointerEvent, region: &mut CropRegion, canvas: egui::Vec2) -> bool {
        match event {
            PointerEvent::Down(pos) => {
                self.pointer_down(pos, region);
                false
            }
            PointerEvent::Move(pos) => match self.pointer_move(pos, canvas) {
                Some(next) if next != *region => {
                    *region = next;
                    true
                }
                _ => false,
            },
            PointerEvent::Up | PointerEvent::Cancel => {
                self.pointer_up();
                false
            }
        }
    }
}

/// Collapses runs of consecutive moves into the last one. Moves are absolute
/// positions, so only the latest matters for the next frame.
pub fn coalesce(events: impl IntoIterator<Item = PointerEvent>) -> Vec<PointerEvent> {
    let mut out: Vec<PointerEvent> = Vec::new();
    for event in events {
        match (out.last_mut(), event) {
            (Some(last @ PointerEvent::Move(_)), PointerEvent::Move(_)) => *last = event,
            _ => out.push(event),
        }
    }
    out
}

/// Turns raw egui input into display-space pointer events.
///
/// Only the first touch point of a multi-touch sequence is followed; other
/// fingers are ignored until it lifts.
#[derive(Debug, Default)]
pub struct PointerNormalizer {
    touch: Option<(egui::TouchDeviceId, egui::TouchId)>,
}

impl PointerNormalizer {
    /// `origin` is the screen position of the canvas's top-left corner.
    pub fn normalize(&mut self, event: &egui::Event, origin: egui::Pos2) -> Option<PointerEvent> {
        let local = |pos: egui::Pos2| egui::pos2(pos.x - origin.x, pos.y - origin.y);
        match event {
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                ..
            } => Some(if *pressed {
                PointerEvent::Down(local(*pos))
            } else {
                PointerEvent::Up
            }),
            egui::Event::PointerMoved(pos) => Some(PointerEvent::Move(local(*pos))),
            egui::Event::PointerGone => Some(PointerEvent::Cancel),
            egui::Event::Touch {
                device_id,
                id,
                phase,
                pos,
                ..
            } => {
                let key = (*device_id, *id);
                match phase {
                    egui::TouchPhase::Start if self.touch.is_none() => {
                        self.touch = Some(key);
                        Some(PointerEvent::Down(local(*pos)))
                    }
                    egui::TouchPhase::Move if self.touch == Some(key) => {
                        Some(PointerEvent::Move(local(*pos)))
                    }
                    egui::TouchPhase::End if self.touch == Some(key) => {
                        self.touch = None;
                        Some(PointerEvent::Up)
                    }
                    egui::TouchPhase::Cancel if self.touch == Some(key) => {
                        self.touch = None;
                        Some(PointerEvent::Cancel)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{CropShape, Corner};

    const CANVAS: egui::Vec2 = egui::vec2(300.0, 200.0);

    fn region() -> CropRegion {
        CropRegion {
            x: 50.0,
            y: 50.0,
            width: 100.0,
            height: 80.0,
            shape: CropShape::Rectangle,
        }
    }

    #[test]
    fn press_on_body_drags() {
        let mut g = GestureController::default();
        let mut r = region();
        g.handle(PointerEvent::Down(egui::pos2(100.0, 90.0)), &mut r, CANVAS);
        assert_eq!(g.mode(), GestureMode::Dragging);

        assert!(g.handle(PointerEvent::Move(egui::pos2(130.0, 80.0)), &mut r, CANVAS));
        assert_eq!((r.x, r.y, r.width, r.height), (80.0, 40.0, 100.0, 80.0));

        g.handle(PointerEvent::Up, &mut r, CANVAS);
        assert_eq!(g.mode(), GestureMode::Idle);
        assert_eq!((r.x, r.y), (80.0, 40.0));
    }

    #[test]
    fn press_outside_stays_idle() {
        let mut g = GestureController::default();
        let mut r = region();
        g.handle(PointerEvent::Down(egui::pos2(5.0, 5.0)), &mut r, CANVAS);
        assert_eq!(g.mode(), GestureMode::Idle);
        assert!(!g.handle(PointerEvent::Move(egui::pos2(50.0, 50.0)), &mut r, CANVAS));
        assert_eq!(r, region());
    }

    #[test]
    fn drag_clamps_to_canvas() {
        let mut g = GestureController::default();
        let mut r = region();
        g.handle(PointerEvent::Down(egui::pos2(100.0, 90.0)), &mut r, CANVAS);
        g.handle(PointerEvent::Move(egui::pos2(900.0, -900.0)), &mut r, CANVAS);
        assert_eq!((r.x, r.y), (200.0, 0.0));
    }

    #[test]
    fn resize_derives_from_gesture_start() {
        let mut g = GestureController::default();
        let mut r = region();
        g.handle(PointerEvent::Down(egui::pos2(150.0, 130.0)), &mut r, CANVAS);
        assert_eq!(
            g.mode(),
            GestureMode::Resizing(ResizeHandle::Corner(Corner::SouthEast))
        );

        // Shrinks past the minimum, then comes back: no drift from the clamp.
        g.handle(PointerEvent::Move(egui::pos2(0.0, 0.0)), &mut r, CANVAS);
        assert_eq!((r.width, r.height), (20.0, 20.0));
        g.handle(PointerEvent::Move(egui::pos2(190.0, 150.0)), &mut r, CANVAS);
        assert_eq!((r.x, r.y, r.width, r.height), (50.0, 50.0, 140.0, 100.0));
    }

    #[test]
    fn cancel_keeps_last_applied_region() {
        let mut g = GestureController::default();
        let mut r = region();
        g.handle(PointerEvent::Down(egui::pos2(100.0, 90.0)), &mut r, CANVAS);
        g.handle(PointerEvent::Move(egui::pos2(110.0, 90.0)), &mut r, CANVAS);
        g.handle(PointerEvent::Cancel, &mut r, CANVAS);
        assert_eq!(g.mode(), GestureMode::Idle);
        assert_eq!(r.x, 60.0);
    }

    #[test]
    fn second_press_during_gesture_is_ignored() {
        let mut g = GestureController::default();
        let r = region();
        assert!(g.pointer_down(egui::pos2(100.0, 90.0), &r));
        assert!(!g.pointer_down(egui::pos2(150.0, 130.0), &r));
        assert_eq!(g.mode(), GestureMode::Dragging);
    }

    #[test]
    fn coalesce_keeps_last_move_of_each_run() {
        let events = [
            PointerEvent::Down(egui::pos2(1.0, 1.0)),
            PointerEvent::Move(egui::pos2(2.0, 2.0)),
            PointerEvent::Move(egui::pos2(3.0, 3.0)),
            PointerEvent::Up,
            PointerEvent::Move(egui::pos2(4.0, 4.0)),
        ];
        assert_eq!(
            coalesce(events),
            vec![
                PointerEvent::Down(egui::pos2(1.0, 1.0)),
                PointerEvent::Move(egui::pos2(3.0, 3.0)),
                PointerEvent::Up,
                PointerEvent::Move(egui::pos2(4.0, 4.0)),
            ]
        );
    }

    #[test]
    fn mouse_events_are_made_local() {
        let mut n = PointerNormalizer::default();
        let origin = egui::pos2(100.0, 40.0);
        let down = egui::Event::PointerButton {
            pos: egui::pos2(110.0, 50.0),
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(
            n.normalize(&down, origin),
            Some(PointerEvent::Down(egui::pos2(10.0, 10.0)))
        );
        let secondary = egui::Event::PointerButton {
            pos: egui::pos2(110.0, 50.0),
            button: egui::PointerButton::Secondary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(n.normalize(&secondary, origin), None);
        assert_eq!(
            n.normalize(&egui::Event::PointerGone, origin),
            Some(PointerEvent::Cancel)
        );
    }

    #[test]
    fn only_first_touch_is_followed() {
        let mut n = PointerNormalizer::default();
        let touch = |id: u64, phase, x: f32| egui::Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: egui::TouchId(id),
            phase,
            pos: egui::pos2(x, 0.0),
            force: None,
        };
        let origin = egui::Pos2::ZERO;
        assert_eq!(
            n.normalize(&touch(1, egui::TouchPhase::Start, 5.0), origin),
            Some(PointerEvent::Down(egui::pos2(5.0, 0.0)))
        );
        assert_eq!(n.normalize(&touch(2, egui::TouchPhase::Start, 9.0), origin), None);
        assert_eq!(n.normalize(&touch(2, egui::TouchPhase::Move, 9.0), origin), None);
        assert_eq!(
            n.normalize(&touch(1, egui::TouchPhase::Move, 7.0), origin),
            Some(PointerEvent::Move(egui::pos2(7.0, 0.0)))
        );
        assert_eq!(
            n.normalize(&touch(1, egui::TouchPhase::Cancel, 7.0), origin),
            Some(PointerEvent::Cancel)
        );
        assert_eq!(
            n.normalize(&touch(2, egui::TouchPhase::Start, 9.0), origin),
            Some(PointerEvent::Down(egui::pos2(9.0, 0.0)))
        );
    }
}
