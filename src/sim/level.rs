/// World loader: reads the tile map named by the config and builds the
/// initial `WorldState`.
///
/// ## Map format (`.txt`):
///   ```
///   # comment lines are ignored
///   7 4
///   1 0 1 0 1 0 0
///   1 1 1 1 1 0 1
///   ...
///   ```
///   First two integers are `width height`, followed by exactly
///   `width * height` cells in row-major order: `1` = solid ground
///   (walkable), `0` = open (blocks the feet footprint).
///
/// A load failure is fatal to the session: callers must not start the
/// simulation loop without a grid.

use crate::config::GameConfig;
use crate::domain::collision;
use crate::domain::grid::{LoadError, TileGrid};
use crate::domain::hotbar::Hotbar;
use crate::sim::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

pub fn load_world(config: &GameConfig) -> Result<WorldState, LoadError> {
    let grid = TileGrid::load(&config.map_path)?;
    let walkable = grid.iter().filter(|&(_, _, t)| t.is_solid()).count();
    tracing::info!(
        path = %config.map_path.display(),
        width = grid.width(),
        height = grid.height(),
        walkable,
        "map loaded"
    );
    Ok(build_world(config, grid))
}

/// Assemble a world around an already-parsed grid.
pub fn build_world(config: &GameConfig, grid: TileGrid) -> WorldState {
    let hotbar = Hotbar::new(config.hotbar.slots, &config.hotbar.items);
    let world = WorldState::new(config.sim.clone(), grid, hotbar);
    sanity_check(&world);
    world
}

// ══════════════════════════════════════════════════════════════
// Startup diagnostics
// ══════════════════════════════════════════════════════════════

/// Warn about layouts that load fine but will play badly.
fn sanity_check(world: &WorldState) {
    let ts = world.config.tile_size;

    if collision::blocked(&world.player.collision(), &world.grid, ts) {
        tracing::warn!(
            spawn = ?world.config.spawn_tile,
            "player spawns on a blocked footprint and cannot move"
        );
    }

    let map_w = world.grid.width() as f32 * ts;
    let map_h = world.grid.height() as f32 * ts;
    for obj in &world.objects {
        let r = obj.detection();
        if r.right() <= 0.0 || r.bottom() <= 0.0 || r.x >= map_w || r.y >= map_h {
            tracing::warn!(object = %obj.name, "object lies outside the map");
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
