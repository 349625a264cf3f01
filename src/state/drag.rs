//! Element drag gesture state. A press on an element becomes a drag only
//! once the pointer moves past a small threshold; a release below it is a
//! click (zone select / ignore), not a move.

use crate::model::{ElementId, ElementKind};

/// Movement below this (in screen pixels) is treated as a click.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub target: Option<(ElementKind, ElementId)>,
    pub start_x: f64,
    pub start_y: f64,
    pub last_x: f64,
    pub last_y: f64,
    pub moved: bool,
}

impl DragState {
    pub fn begin(&mut self, target: (ElementKind, ElementId), x: f64, y: f64) {
        self.target = Some(target);
        self.start_x = x;
        self.start_y = y;
        self.last_x = x;
        self.last_y = y;
        self.moved = false;
    }

    /// Record pointer movement; returns the dragged target once the
    /// threshold has been exceeded.
    pub fn update(&mut self, x: f64, y: f64) -> Option<(ElementKind, ElementId)> {
        let target = self.target?;
        self.last_x = x;
        self.last_y = y;
        if !self.moved {
            let dx = x - self.start_x;
            let dy = y - self.start_y;
            if (dx * dx + dy * dy).sqrt() < DRAG_THRESHOLD_PX {
                return None;
            }
            self.moved = true;
        }
        Some(target)
    }

    /// End the gesture; returns the target and whether it actually moved.
    pub fn finish(&mut self) -> Option<((ElementKind, ElementId), bool)> {
        let target = self.target.take()?;
        let moved = self.moved;
        self.moved = false;
        Some((target, moved))
    }

    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;

    #[test]
    fn press_and_release_in_place_is_a_click() {
        let mut d = DragState::default();
        d.begin((ElementKind::Zone, 7), 100.0, 100.0);
        assert!(d.update(100.5, 100.5).is_none());
        let (target, moved) = d.finish().unwrap();
        assert_eq!(target, (ElementKind::Zone, 7));
        assert!(!moved);
        assert!(!d.is_active());
    }

    #[test]
    fn movement_past_threshold_becomes_a_drag() {
        let mut d = DragState::default();
        d.begin((ElementKind::Unit, 3), 100.0, 100.0);
        assert!(d.update(101.0, 101.0).is_none());
        assert_eq!(d.update(104.0, 100.0), Some((ElementKind::Unit, 3)));
        // Once past the threshold every update reports the target.
        assert_eq!(d.update(104.1, 100.0), Some((ElementKind::Unit, 3)));
        let (_, moved) = d.finish().unwrap();
        assert!(moved);
    }

    #[test]
    fn update_without_begin_is_inert() {
        let mut d = DragState::default();
        assert!(d.update(50.0, 50.0).is_none());
        assert!(d.finish().is_none());
    }
}
