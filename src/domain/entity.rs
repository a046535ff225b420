/// Entities: the player and static interactable objects.
///
/// Position (top-left corner) is the only mutable state. Every logic
/// rectangle is derived from it on demand, never stored.

use super::geometry::{Rect, Vec2};
use super::hotbar::HotbarInput;
use super::motion::Animation;

/// Sprite-sheet facing. Discriminant = sheet row.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Facing {
    #[default]
    Down = 0,
    Up = 1,
    Right = 2,
    Left = 3,
}

impl Facing {
    pub fn sheet_row(self) -> usize {
        self as usize
    }
}

/// Directional key states for one tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl KeyState {
    /// A direction is held if either source holds it (keyboard + gamepad).
    pub fn union(self, other: KeyState) -> KeyState {
        KeyState {
            up: self.up || other.up,
            down: self.down || other.down,
            left: self.left || other.left,
            right: self.right || other.right,
        }
    }
}

/// Frame input: continuous movement keys plus edge-triggered actions.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub keys: KeyState,
    /// Interact key went down this frame.
    pub interact: bool,
    pub hotbar: Option<HotbarInput>,
}

/// Fixed per-sprite offsets and sizes, in world units.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BodyMetrics {
    pub sprite_width: f32,
    pub sprite_height: f32,
    /// Horizontal transparent margin on each side of the sprite.
    pub bound_inset: f32,
    pub collision_offset_x: f32,
    /// Distance from the sprite bottom to the top of the feet footprint.
    pub foot_lift: f32,
    pub collision_width: f32,
    pub collision_height: f32,
    pub detection_size: f32,
}

impl Default for BodyMetrics {
    fn default() -> Self {
        // 32px art at 3.2x scale
        BodyMetrics {
            sprite_width: 102.4,
            sprite_height: 102.4,
            bound_inset: 19.2,
            collision_offset_x: 29.6,
            foot_lift: 8.0,
            collision_width: 41.6,
            collision_height: 6.4,
            detection_size: 25.6,
        }
    }
}

impl BodyMetrics {
    /// Visible part of the sprite (transparent margins trimmed).
    pub fn bound_at(&self, pos: Vec2) -> Rect {
        Rect::new(
            pos.x + self.bound_inset,
            pos.y,
            self.sprite_width - 2.0 * self.bound_inset,
            self.sprite_height,
        )
    }

    /// Feet footprint tested against the map.
    pub fn collision_at(&self, pos: Vec2) -> Rect {
        Rect::new(
            pos.x + self.collision_offset_x,
            pos.y + self.sprite_height - self.foot_lift,
            self.collision_width,
            self.collision_height,
        )
    }

    /// Interaction zone centered on the sprite.
    pub fn detection_at(&self, pos: Vec2) -> Rect {
        let half = self.detection_size / 2.0;
        Rect::new(
            pos.x + self.sprite_width / 2.0 - half,
            pos.y + self.sprite_height / 2.0 - half,
            self.detection_size,
            self.detection_size,
        )
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub position: Vec2,
    pub metrics: BodyMetrics,
    pub anim: Animation,
}

impl Player {
    pub fn new(position: Vec2, metrics: BodyMetrics) -> Self {
        Player { position, metrics, anim: Animation::default() }
    }

    pub fn bound(&self) -> Rect { self.metrics.bound_at(self.position) }
    pub fn collision(&self) -> Rect { self.metrics.collision_at(self.position) }
    pub fn detection(&self) -> Rect { self.metrics.detection_at(self.position) }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.position.x + self.metrics.sprite_width / 2.0,
            self.position.y + self.metrics.sprite_height / 2.0,
        )
    }

    /// Source rectangle in the sprite sheet (3 columns x 4 facing rows).
    pub fn frame_rect(&self) -> Rect {
        let w = self.metrics.sprite_width;
        let h = self.metrics.sprite_height;
        Rect::new(
            self.anim.displayed_frame() as f32 * w,
            self.anim.facing.sheet_row() as f32 * h,
            w,
            h,
        )
    }
}

/// Index into the world's object list (declaration order).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// A static object the player can talk to.
#[derive(Clone, Debug)]
pub struct Interactable {
    pub id: ObjectId,
    pub name: String,
    pub position: Vec2,
    pub size: Vec2,
    pub dialog: String,
}

impl Interactable {
    pub fn detection(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.detection().center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rects_follow_position() {
        let m = BodyMetrics::default();
        let p = Player::new(Vec2::new(128.0, 128.0), m);

        let c = p.collision();
        assert!((c.x - (128.0 + 29.6)).abs() < 1e-4);
        assert!((c.y - (128.0 + 102.4 - 8.0)).abs() < 1e-4);
        assert!((c.w - 41.6).abs() < 1e-4);

        let d = p.detection();
        assert!((d.center().x - p.center().x).abs() < 1e-4);
        assert!((d.center().y - p.center().y).abs() < 1e-4);

        let b = p.bound();
        assert!((b.x - (128.0 + 19.2)).abs() < 1e-4);
        assert!((b.w - 64.0).abs() < 1e-3);
    }

    #[test]
    fn collision_sits_inside_bound_at_the_feet() {
        let m = BodyMetrics::default();
        let pos = Vec2::new(3.0, 7.0);
        let b = m.bound_at(pos);
        let c = m.collision_at(pos);
        assert!(c.x >= b.x && c.right() <= b.right());
        assert!(c.bottom() <= b.bottom() && c.y > b.center().y);
    }

    #[test]
    fn frame_rect_uses_facing_row() {
        let mut p = Player::new(Vec2::ZERO, BodyMetrics::default());
        p.anim.facing = Facing::Left;
        let r = p.frame_rect();
        assert_eq!(r.x, 0.0);
        assert!((r.y - 3.0 * 102.4).abs() < 1e-3);
    }

    #[test]
    fn key_union_merges_sources() {
        let kb = KeyState { up: true, ..KeyState::default() };
        let pad = KeyState { left: true, ..KeyState::default() };
        assert_eq!(kb.union(pad), KeyState { up: true, left: true, ..KeyState::default() });
    }

    #[test]
    fn object_detection_is_its_extent() {
        let o = Interactable {
            id: ObjectId(0),
            name: "Penger".into(),
            position: Vec2::new(288.0, 0.0),
            size: Vec2::new(96.0, 96.0),
            dialog: String::new(),
        };
        assert_eq!(o.detection(), Rect::new(288.0, 0.0, 96.0, 96.0));
        assert_eq!(o.center(), Vec2::new(336.0, 48.0));
    }
}
