/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::level::load_world;
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    // Config warnings go to stderr: the log file path is not known yet.
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, GameConfig::load);

    init_logging(&config.log_file);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), map = %config.map_path.display(), "starting");

    let mut world = match load_world(&config) {
        Ok(w) => w,
        Err(e) => {
            tracing::error!(error = %e, "map load failed, refusing to start");
            eprintln!("callie: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        tracing::error!(error = %e, "terminal init failed");
        eprintln!("Terminal init failed: {e}");
        let _ = renderer.cleanup();
        return;
    }

    let mut sound = SoundEngine::new(config.audio.master_volume);
    let result = game_loop(&mut world, &mut renderer, &mut sound, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        tracing::error!(error = %e, "game loop aborted");
        eprintln!("Game error: {e}");
    }

    tracing::info!(ticks = world.tick, "shutdown");
    println!("Thanks for playing Callie!");
}

/// Route `tracing` to the configured log file. The terminal is in raw mode
/// for the whole session, so nothing is ever logged to stdout.
fn init_logging(path: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match File::create(path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .compact()
            .init(),
        Err(e) => eprintln!("callie: cannot open log file {}: {e}", path.display()),
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: &mut Option<SoundEngine>,
    config: &GameConfig,
) -> std::io::Result<()> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.enable_key_release();
    let mut gp = GamepadState::new(&config.gamepad);
    let mut show_debug = config.debug_overlay;

    let tick_rate = Duration::from_millis(world.config.tick_rate_ms);
    let mut last_tick = Instant::now();
    // Edge events seen between ticks, consumed by the next step.
    let mut pending = FrameInput::default();

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_requested() || gp.quit_pressed() {
            break;
        }
        if kb.debug_toggled() {
            show_debug = !show_debug;
            tracing::debug!(overlay = show_debug, "debug overlay toggled");
        }

        pending.interact |= kb.interact_pressed() || gp.interact_pressed();
        pending.hotbar = pending.hotbar.or(kb.hotbar_input()).or(gp.hotbar_input());

        if last_tick.elapsed() >= tick_rate {
            let input = FrameInput {
                keys: kb.keys().union(gp.keys()),
                ..std::mem::take(&mut pending)
            };
            let events = step::step(world, input);

            if let Some(sfx) = sound.as_mut() {
                process_sound_events(sfx, &events);
                sfx.set_ambient(world.ambient_level(config.audio.ambient_radius));
            }
            last_tick = Instant::now();
        }

        renderer.render(world, show_debug)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sfx: &SoundEngine, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::DialogOpened { .. } => sfx.play_dialog_open(),
            GameEvent::HotbarSelected { .. } => sfx.play_select(),
            _ => {}
        }
    }
}
