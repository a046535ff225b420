/// Interaction overlay: detection overlap → dialog toggle → movement lock.
///
/// Rules, evaluated once per tick:
///   - An object is *in range* when its detection rectangle intersects the
///     player's detection rectangle.
///   - With several objects in range, the active one stays active as long as
///     it remains in range; otherwise the nearest (center to center) wins,
///     ties going to the earlier declared object.
///   - Nothing in range: the dialog is forced closed and movement unlocked.
///   - An interact edge while something is in range toggles the dialog.
///
/// Movement is locked exactly while the dialog is visible, and the dialog
/// is only ever visible with an active object.

use super::entity::{Interactable, ObjectId};
use super::geometry::Rect;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
    active: Option<ObjectId>,
    dialog_visible: bool,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, player_detection: &Rect, objects: &[Interactable], interact_pressed: bool) {
        let sticky = self.active.filter(|id| {
            objects
                .iter()
                .any(|o| o.id == *id && o.detection().intersects(player_detection))
        });

        let chosen = sticky.or_else(|| nearest_in_range(player_detection, objects));

        match chosen {
            None => {
                self.active = None;
                self.dialog_visible = false;
            }
            Some(id) => {
                if self.active != Some(id) {
                    self.dialog_visible = false;
                }
                self.active = Some(id);
                if interact_pressed {
                    self.dialog_visible = !self.dialog_visible;
                }
            }
        }
    }

    pub fn active(&self) -> Option<ObjectId> { self.active }
    pub fn dialog_visible(&self) -> bool { self.dialog_visible }
    pub fn movement_locked(&self) -> bool { self.dialog_visible }
    pub fn interaction_available(&self) -> bool { self.active.is_some() }
}

fn nearest_in_range(player_detection: &Rect, objects: &[Interactable]) -> Option<ObjectId> {
    let origin = player_detection.center();
    objects
        .iter()
        .filter(|o| o.detection().intersects(player_detection))
        .map(|o| (o.center().distance(origin), o.id))
        // min_by keeps the first of equal elements → declaration order on ties
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Vec2;

    fn object(id: usize, x: f32, y: f32, size: f32) -> Interactable {
        Interactable {
            id: ObjectId(id),
            name: format!("obj{id}"),
            position: Vec2::new(x, y),
            size: Vec2::new(size, size),
            dialog: String::new(),
        }
    }

    fn probe(x: f32, y: f32) -> Rect {
        Rect::new(x, y, 10.0, 10.0)
    }

    #[test]
    fn out_of_range_nothing_happens() {
        let objs = [object(0, 100.0, 100.0, 20.0)];
        let mut s = InteractionState::new();
        s.update(&probe(0.0, 0.0), &objs, true);
        assert_eq!(s.active(), None);
        assert!(!s.dialog_visible());
        assert!(!s.movement_locked());
    }

    #[test]
    fn in_range_exposes_availability_without_opening() {
        let objs = [object(0, 5.0, 5.0, 20.0)];
        let mut s = InteractionState::new();
        s.update(&probe(0.0, 0.0), &objs, false);
        assert!(s.interaction_available());
        assert_eq!(s.active(), Some(ObjectId(0)));
        assert!(!s.dialog_visible());
    }

    #[test]
    fn interact_toggles_dialog_and_lock() {
        let objs = [object(0, 5.0, 5.0, 20.0)];
        let mut s = InteractionState::new();
        s.update(&probe(0.0, 0.0), &objs, true);
        assert!(s.dialog_visible());
        assert!(s.movement_locked());

        s.update(&probe(0.0, 0.0), &objs, false);
        assert!(s.dialog_visible());

        s.update(&probe(0.0, 0.0), &objs, true);
        assert!(!s.dialog_visible());
        assert!(!s.movement_locked());
    }

    #[test]
    fn leaving_range_forces_dialog_closed() {
        let objs = [object(0, 5.0, 5.0, 20.0)];
        let mut s = InteractionState::new();
        s.update(&probe(0.0, 0.0), &objs, true);
        assert!(s.dialog_visible());

        // interact held on the same tick as leaving does not reopen
        s.update(&probe(500.0, 500.0), &objs, true);
        assert!(!s.dialog_visible());
        assert!(!s.movement_locked());
        assert_eq!(s.active(), None);
    }

    #[test]
    fn nearest_object_wins() {
        let objs = [object(0, 8.0, 0.0, 10.0), object(1, 2.0, 2.0, 10.0)];
        let mut s = InteractionState::new();
        s.update(&probe(0.0, 0.0), &objs, false);
        assert_eq!(s.active(), Some(ObjectId(1)));
    }

    #[test]
    fn equidistant_tie_goes_to_declaration_order() {
        let objs = [object(0, 5.0, 0.0, 10.0), object(1, -5.0, 0.0, 10.0)];
        let mut s = InteractionState::new();
        s.update(&probe(0.0, 0.0), &objs, false);
        assert_eq!(s.active(), Some(ObjectId(0)));
    }

    #[test]
    fn active_object_is_sticky_while_in_range() {
        let objs = [object(0, 8.0, 0.0, 10.0), object(1, -8.0, 0.0, 10.0)];
        let mut s = InteractionState::new();
        s.update(&probe(2.0, 0.0), &objs, true);
        assert_eq!(s.active(), Some(ObjectId(0)));

        // now object 1 is closer, but 0 still overlaps
        s.update(&probe(-1.0, 0.0), &objs, false);
        assert_eq!(s.active(), Some(ObjectId(0)));
        assert!(s.dialog_visible());
    }

    #[test]
    fn switching_objects_closes_dialog() {
        let objs = [object(0, 8.0, 0.0, 5.0), object(1, -8.0, 0.0, 10.0)];
        let mut s = InteractionState::new();
        s.update(&probe(0.0, 0.0), &objs, true);
        assert_eq!(s.active(), Some(ObjectId(0)));
        assert!(s.dialog_visible());

        // 0 no longer overlaps, 1 does
        s.update(&probe(-4.0, 0.0), &objs, false);
        assert_eq!(s.active(), Some(ObjectId(1)));
        assert!(!s.dialog_visible());
    }
}
