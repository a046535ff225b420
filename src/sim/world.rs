/// WorldState: the complete state of a running session.
///
/// The tile grid is immutable after load. The player's position is the only
/// value movement mutates; every rectangle the presentation layer draws is
/// derived from it on demand (`Player::collision`, `detection`, `bound`,
/// `frame_rect`).
///
/// Configuration is owned by the world (`config`), never read from globals.

use crate::config::SimConfig;
use crate::domain::acoustics;
use crate::domain::entity::{Interactable, ObjectId, Player};
use crate::domain::geometry::Vec2;
use crate::domain::grid::TileGrid;
use crate::domain::hotbar::Hotbar;
use crate::domain::interaction::InteractionState;

pub struct WorldState {
    pub config: SimConfig,
    pub grid: TileGrid,
    pub player: Player,
    pub objects: Vec<Interactable>,
    pub interaction: InteractionState,
    pub hotbar: Hotbar,
    pub tick: u64,
}

impl WorldState {
    pub fn new(config: SimConfig, grid: TileGrid, hotbar: Hotbar) -> Self {
        let ts = config.tile_size;
        let spawn = Vec2::new(
            config.spawn_tile.0 as f32 * ts,
            config.spawn_tile.1 as f32 * ts,
        );
        let player = Player::new(spawn, config.body);

        let objects = config
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| Interactable {
                id: ObjectId(i),
                name: o.name.clone(),
                position: Vec2::new(o.tile.x * ts, o.tile.y * ts),
                size: o.size,
                dialog: o.dialog.clone(),
            })
            .collect();

        WorldState {
            config,
            grid,
            player,
            objects,
            interaction: InteractionState::new(),
            hotbar,
            tick: 0,
        }
    }

    pub fn object(&self, id: ObjectId) -> Option<&Interactable> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Object currently in range, if any.
    pub fn active_object(&self) -> Option<&Interactable> {
        self.interaction.active().and_then(|id| self.object(id))
    }

    /// Object whose dialog is on screen.
    pub fn dialog(&self) -> Option<&Interactable> {
        if self.interaction.dialog_visible() {
            self.active_object()
        } else {
            None
        }
    }

    /// Ambient level for the open dialog's object, 0.0 when no dialog.
    pub fn ambient_level(&self, radius: f32) -> f32 {
        match self.dialog() {
            Some(obj) => acoustics::attenuation(self.player.center(), obj.center(), radius),
            None => 0.0,
        }
    }

    /// Tile coordinate under the player's feet footprint (top-left corner).
    pub fn player_tile(&self) -> (i64, i64) {
        let c = self.player.collision();
        let ts = self.config.tile_size;
        ((c.x / ts).floor() as i64, (c.y / ts).floor() as i64)
    }
}
