/// Movement: key states → direction intent → axis-separated position update.
///
/// ## Intent
///   Vertical keys are resolved first (down overrides up when both are held).
///   Horizontal keys only count when no vertical key is held (left overrides
///   right). An intent therefore never has two non-zero components.
///
/// ## Axis separation
///   The X displacement and the Y displacement are two independent trial
///   moves. Each builds the collision footprint at its trial position and is
///   committed only if `collision::blocked` says no. Blocked on one axis,
///   the actor still slides along the other.
///
/// ## Animation
///   Facings Down/Up/Right/Left, three frames each. A counter advances every
///   tick whether or not the actor moves; reaching `ticks_per_frame` steps the
///   frame index (mod 3). The displayed frame is the idle frame 0 while no
///   direction is held.

use super::collision;
use super::entity::{BodyMetrics, Facing, KeyState};
use super::geometry::Vec2;
use super::grid::TileGrid;

pub const FRAMES_PER_FACING: usize = 3;

/// Resolved direction for one tick.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Intent {
    /// Unit direction, at most one non-zero component.
    pub dir: Vec2,
    /// Facing requested by the held key, `None` when idle.
    pub facing: Option<Facing>,
}

impl Intent {
    pub const IDLE: Intent = Intent { dir: Vec2::ZERO, facing: None };

    pub fn is_moving(&self) -> bool {
        self.facing.is_some()
    }
}

pub fn intent(keys: KeyState) -> Intent {
    let mut out = Intent::IDLE;

    if keys.up {
        out = Intent { dir: Vec2::new(0.0, -1.0), facing: Some(Facing::Up) };
    }
    if keys.down {
        out = Intent { dir: Vec2::new(0.0, 1.0), facing: Some(Facing::Down) };
    }

    if out.dir.y == 0.0 {
        if keys.left {
            out = Intent { dir: Vec2::new(-1.0, 0.0), facing: Some(Facing::Left) };
        } else if keys.right {
            out = Intent { dir: Vec2::new(1.0, 0.0), facing: Some(Facing::Right) };
        }
    }

    out
}

/// Advance `position` by `dir * speed`, one axis at a time.
pub fn step(
    position: Vec2,
    dir: Vec2,
    speed: f32,
    grid: &TileGrid,
    metrics: &BodyMetrics,
    tile_size: f32,
) -> Vec2 {
    let mut pos = position;

    if dir.x != 0.0 {
        let trial = Vec2::new(pos.x + dir.x * speed, pos.y);
        if !collision::blocked(&metrics.collision_at(trial), grid, tile_size) {
            pos = trial;
        }
    }

    if dir.y != 0.0 {
        let trial = Vec2::new(pos.x, pos.y + dir.y * speed);
        if !collision::blocked(&metrics.collision_at(trial), grid, tile_size) {
            pos = trial;
        }
    }

    pos
}

/// Sprite animation state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Animation {
    pub facing: Facing,
    pub frame: usize,
    pub counter: u32,
    pub moving: bool,
}

impl Animation {
    pub fn tick(&mut self, intent: Intent, ticks_per_frame: u32) {
        self.counter += 1;
        if self.counter >= ticks_per_frame {
            self.counter = 0;
            self.frame = (self.frame + 1) % FRAMES_PER_FACING;
        }

        if let Some(facing) = intent.facing {
            self.facing = facing;
        }
        self.moving = intent.is_moving();
    }

    pub fn displayed_frame(&self) -> usize {
        if self.moving { self.frame } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: f32 = 10.0;

    /// 8x8 sprite with a 4x4 footprint at (+2, +4).
    fn small_body() -> BodyMetrics {
        BodyMetrics {
            sprite_width: 8.0,
            sprite_height: 8.0,
            bound_inset: 1.0,
            collision_offset_x: 2.0,
            foot_lift: 4.0,
            collision_width: 4.0,
            collision_height: 4.0,
            detection_size: 4.0,
        }
    }

    fn keys(up: bool, down: bool, left: bool, right: bool) -> KeyState {
        KeyState { up, down, left, right }
    }

    // ── intent ──

    #[test]
    fn no_keys_is_idle() {
        assert_eq!(intent(KeyState::default()), Intent::IDLE);
    }

    #[test]
    fn vertical_wins_over_horizontal() {
        let i = intent(keys(true, false, true, false));
        assert_eq!(i.dir, Vec2::new(0.0, -1.0));
        assert_eq!(i.facing, Some(Facing::Up));

        let i = intent(keys(false, true, false, true));
        assert_eq!(i.dir, Vec2::new(0.0, 1.0));
        assert_eq!(i.facing, Some(Facing::Down));
    }

    #[test]
    fn never_diagonal() {
        for bits in 0..16u8 {
            let k = keys(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0);
            let d = intent(k).dir;
            assert!(d.x == 0.0 || d.y == 0.0, "diagonal from {k:?}");
        }
    }

    #[test]
    fn down_overrides_up_and_left_overrides_right() {
        assert_eq!(intent(keys(true, true, false, false)).facing, Some(Facing::Down));
        assert_eq!(intent(keys(false, false, true, true)).facing, Some(Facing::Left));
    }

    // ── step ──

    #[test]
    fn free_move_on_platform() {
        let g = TileGrid::parse("3 1 1 1 1").unwrap();
        let p = step(Vec2::new(2.0, 2.0), Vec2::new(1.0, 0.0), 5.0, &g, &small_body(), TS);
        assert_eq!(p, Vec2::new(7.0, 2.0));
    }

    #[test]
    fn slides_along_blocked_axis() {
        // (1,0) open: moving right from tile (0,0) is blocked, down is not.
        let g = TileGrid::parse("2 2  1 0  1 1").unwrap();
        let body = small_body();
        let start = Vec2::new(2.0, 2.0);

        let p = step(start, Vec2::new(1.0, 1.0), 5.0, &g, &body, TS);
        assert_eq!(p, Vec2::new(2.0, 7.0));

        // A single combined trial would have accepted (7, 7).
        let combined = body.collision_at(Vec2::new(7.0, 7.0));
        assert!(!collision::blocked(&combined, &g, TS));
        assert_ne!(p, Vec2::new(7.0, 7.0));
    }

    #[test]
    fn blocked_on_both_axes_stays_put() {
        let g = TileGrid::parse("1 1 1").unwrap();
        let start = Vec2::new(2.0, 2.0);
        let p = step(start, Vec2::new(1.0, 1.0), 10.0, &g, &small_body(), TS);
        assert_eq!(p, start);
    }

    #[test]
    fn map_border_stops_movement() {
        let g = TileGrid::parse("1 1 1").unwrap();
        let start = Vec2::new(0.0, 0.0);
        let p = step(start, Vec2::new(-1.0, 0.0), 3.0, &g, &small_body(), TS);
        assert_eq!(p, start);
        let p = step(start, Vec2::new(0.0, -1.0), 5.0, &g, &small_body(), TS);
        assert_eq!(p, start);
    }

    // ── animation ──

    #[test]
    fn frame_advances_on_cadence_regardless_of_movement() {
        let mut a = Animation::default();
        for _ in 0..9 {
            a.tick(Intent::IDLE, 10);
        }
        assert_eq!(a.frame, 0);
        a.tick(Intent::IDLE, 10);
        assert_eq!(a.frame, 1);
        assert_eq!(a.counter, 0);
        // idle → displayed frame is the first one
        assert_eq!(a.displayed_frame(), 0);
    }

    #[test]
    fn frame_wraps_after_three() {
        let walk = intent(keys(false, false, false, true));
        let mut a = Animation::default();
        for _ in 0..3 {
            a.tick(walk, 1);
        }
        assert_eq!(a.frame, 0);
        a.tick(walk, 1);
        assert_eq!(a.displayed_frame(), 1);
        assert_eq!(a.facing, Facing::Right);
    }

    #[test]
    fn facing_kept_when_released() {
        let mut a = Animation::default();
        a.tick(intent(keys(true, false, false, false)), 10);
        a.tick(Intent::IDLE, 10);
        assert_eq!(a.facing, Facing::Up);
        assert!(!a.moving);
    }
}
