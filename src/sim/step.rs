/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Tick counter
///   2. Movement (skipped while the dialog locks it) + animation
///   3. Interaction overlap / dialog toggle
///   4. Hotbar selection
///
/// Events are derived from the interaction state before and after step 3,
/// so the presentation layer never has to diff state itself.

use crate::domain::entity::{FrameInput, KeyState};
use crate::domain::hotbar::HotbarInput;
use crate::domain::motion::{self, Intent};
use super::event::GameEvent;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_movement(world, input.keys);
    resolve_interaction(world, input.interact, &mut events);
    resolve_hotbar(world, input.hotbar, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_movement(world: &mut WorldState, keys: KeyState) {
    let intent = if world.interaction.movement_locked() {
        Intent::IDLE
    } else {
        motion::intent(keys)
    };

    let ticks_per_frame = world.config.ticks_per_frame();
    world.player.anim.tick(intent, ticks_per_frame);

    if !intent.is_moving() {
        return;
    }

    world.player.position = motion::step(
        world.player.position,
        intent.dir,
        world.config.player_speed,
        &world.grid,
        &world.player.metrics,
        world.config.tile_size,
    );
}

// ══════════════════════════════════════════════════════════════
// Interaction
// ══════════════════════════════════════════════════════════════

fn resolve_interaction(world: &mut WorldState, interact: bool, events: &mut Vec<GameEvent>) {
    let was_active = world.interaction.active();
    let was_open = world.interaction.dialog_visible();

    let detection = world.player.detection();
    world.interaction.update(&detection, &world.objects, interact);

    let now_active = world.interaction.active();
    let now_open = world.interaction.dialog_visible();
    let switched = was_active != now_active;

    if was_open && (!now_open || switched) {
        if let Some(id) = was_active {
            tracing::debug!(object = ?id, "dialog closed");
            events.push(GameEvent::DialogClosed { id });
        }
    }

    if switched {
        if let Some(id) = was_active {
            events.push(GameEvent::InteractionLost { id });
        }
        if let Some(id) = now_active {
            tracing::debug!(object = ?id, "interaction available");
            events.push(GameEvent::InteractionAvailable { id });
        }
    }

    if now_open && (!was_open || switched) {
        if let Some(id) = now_active {
            tracing::debug!(object = ?id, "dialog opened");
            events.push(GameEvent::DialogOpened { id });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Hotbar
// ══════════════════════════════════════════════════════════════

fn resolve_hotbar(world: &mut WorldState, input: Option<HotbarInput>, events: &mut Vec<GameEvent>) {
    let Some(input) = input else { return };
    if let Some(slot) = world.hotbar.apply(input) {
        tracing::debug!(slot, item = ?world.hotbar.selected_item().map(|i| &i.name), "hotbar selected");
        events.push(GameEvent::HotbarSelected { slot });
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
