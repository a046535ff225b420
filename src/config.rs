/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Every key is optional; missing file, unreadable file, or parse errors
/// fall back to the built-in defaults with a logged warning.

use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::entity::BodyMetrics;
use crate::domain::geometry::Vec2;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub hotbar: HotbarConfig,
    pub audio: AudioConfig,
    pub gamepad: GamepadConfig,
    pub map_path: PathBuf,
    pub log_file: PathBuf,
    pub debug_overlay: bool,
}

/// Everything the simulation core needs, passed in at world construction.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub tick_rate_ms: u64,
    pub target_fps: u32,
    pub anim_fps: u32,
    pub tile_size: f32,
    pub player_speed: f32,
    pub spawn_tile: (i64, i64),
    pub body: BodyMetrics,
    pub objects: Vec<ObjectConfig>,
}

impl SimConfig {
    /// Ticks between animation frame advances (never zero).
    pub fn ticks_per_frame(&self) -> u32 {
        (self.target_fps / self.anim_fps.max(1)).max(1)
    }
}

#[derive(Clone, Debug)]
pub struct ObjectConfig {
    pub name: String,
    /// Fractional tile coordinate of the top-left corner.
    pub tile: Vec2,
    pub size: Vec2,
    pub dialog: String,
}

#[derive(Clone, Debug)]
pub struct HotbarConfig {
    pub slots: usize,
    pub items: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct AudioConfig {
    pub master_volume: f32,
    pub ambient_radius: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub interact: Vec<String>,
    pub hotbar_next: Vec<String>,
    pub hotbar_prev: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    simulation: TomlSimulation,
    #[serde(default)]
    body: TomlBody,
    #[serde(default = "default_objects")]
    objects: Vec<TomlObject>,
    #[serde(default)]
    hotbar: TomlHotbar,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_map")]
    map: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_true")]
    debug_overlay: bool,
}

#[derive(Deserialize, Debug)]
struct TomlSimulation {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_target_fps")]
    target_fps: u32,
    #[serde(default = "default_anim_fps")]
    anim_fps: u32,
    #[serde(default = "default_tile_size")]
    tile_size: f32,
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_spawn_tile")]
    spawn_tile: [i64; 2],
}

#[derive(Deserialize, Debug)]
struct TomlBody {
    #[serde(default = "default_sprite_size")]
    sprite_width: f32,
    #[serde(default = "default_sprite_size")]
    sprite_height: f32,
    #[serde(default = "default_bound_inset")]
    bound_inset: f32,
    #[serde(default = "default_collision_offset_x")]
    collision_offset_x: f32,
    #[serde(default = "default_foot_lift")]
    foot_lift: f32,
    #[serde(default = "default_collision_width")]
    collision_width: f32,
    #[serde(default = "default_collision_height")]
    collision_height: f32,
    #[serde(default = "default_detection_size")]
    detection_size: f32,
}

#[derive(Deserialize, Debug)]
struct TomlObject {
    name: String,
    tile: [f32; 2],
    #[serde(default = "default_object_size")]
    size: [f32; 2],
    #[serde(default)]
    dialog: String,
}

#[derive(Deserialize, Debug)]
struct TomlHotbar {
    #[serde(default = "default_hotbar_slots")]
    slots: usize,
    #[serde(default = "default_hotbar_items")]
    items: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_master_volume")]
    master_volume: f32,
    #[serde(default = "default_ambient_radius")]
    ambient_radius: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_interact")]
    interact: Vec<String>,
    #[serde(default = "default_hotbar_next")]
    hotbar_next: Vec<String>,
    #[serde(default = "default_hotbar_prev")]
    hotbar_prev: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_map() -> String { "maps/callie.txt".into() }
fn default_log_file() -> String { "callie.log".into() }
fn default_true() -> bool { true }

fn default_tick_rate() -> u64 { 16 }     // ~60 ticks per second
fn default_target_fps() -> u32 { 60 }
fn default_anim_fps() -> u32 { 6 }
fn default_tile_size() -> f32 { 128.0 }
fn default_player_speed() -> f32 { 4.0 }
fn default_spawn_tile() -> [i64; 2] { [1, 1] }

fn default_sprite_size() -> f32 { BodyMetrics::default().sprite_width }
fn default_bound_inset() -> f32 { BodyMetrics::default().bound_inset }
fn default_collision_offset_x() -> f32 { BodyMetrics::default().collision_offset_x }
fn default_foot_lift() -> f32 { BodyMetrics::default().foot_lift }
fn default_collision_width() -> f32 { BodyMetrics::default().collision_width }
fn default_collision_height() -> f32 { BodyMetrics::default().collision_height }
fn default_detection_size() -> f32 { BodyMetrics::default().detection_size }

/// Sizes must be strictly positive; anything else collapses the projection.
fn positive_or_default(field: &str, value: f32, default: f32) -> f32 {
    if value > 0.0 {
        value
    } else {
        tracing::warn!(key = field, value, default, "non-positive size in config, using default");
        default
    }
}

fn default_object_size() -> [f32; 2] { [96.0, 96.0] }
fn default_objects() -> Vec<TomlObject> {
    vec![TomlObject {
        name: "Penger".into(),
        tile: [2.25, 0.0],
        size: default_object_size(),
        dialog: "Penger: I'm Penger. Nice to meet you!".into(),
    }]
}

fn default_hotbar_slots() -> usize { 9 }
fn default_hotbar_items() -> Vec<String> {
    vec!["Torch".into(), "Rope".into(), String::new(), "Key".into()]
}

fn default_master_volume() -> f32 { 0.6 }
fn default_ambient_radius() -> f32 { 384.0 } // three tiles

fn default_interact() -> Vec<String> { vec!["A".into()] }
fn default_hotbar_next() -> Vec<String> { vec!["R1".into()] }
fn default_hotbar_prev() -> Vec<String> { vec!["L1".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlConfig {
    fn default() -> Self {
        TomlConfig {
            general: TomlGeneral::default(),
            simulation: TomlSimulation::default(),
            body: TomlBody::default(),
            objects: default_objects(),
            hotbar: TomlHotbar::default(),
            audio: TomlAudio::default(),
            gamepad: TomlGamepad::default(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            map: default_map(),
            log_file: default_log_file(),
            debug_overlay: default_true(),
        }
    }
}

impl Default for TomlSimulation {
    fn default() -> Self {
        TomlSimulation {
            tick_rate_ms: default_tick_rate(),
            target_fps: default_target_fps(),
            anim_fps: default_anim_fps(),
            tile_size: default_tile_size(),
            player_speed: default_player_speed(),
            spawn_tile: default_spawn_tile(),
        }
    }
}

impl Default for TomlBody {
    fn default() -> Self {
        TomlBody {
            sprite_width: default_sprite_size(),
            sprite_height: default_sprite_size(),
            bound_inset: default_bound_inset(),
            collision_offset_x: default_collision_offset_x(),
            foot_lift: default_foot_lift(),
            collision_width: default_collision_width(),
            collision_height: default_collision_height(),
            detection_size: default_detection_size(),
        }
    }
}

impl Default for TomlHotbar {
    fn default() -> Self {
        TomlHotbar { slots: default_hotbar_slots(), items: default_hotbar_items() }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio {
            master_volume: default_master_volume(),
            ambient_radius: default_ambient_radius(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            interact: default_interact(),
            hotbar_next: default_hotbar_next(),
            hotbar_prev: default_hotbar_prev(),
            quit: default_quit(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        for dir in &search_dirs {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    return Self::parse(&text, &search_dirs).unwrap_or_else(|e| {
                        tracing::warn!(path = %path.display(), error = %e, "config parse error, using defaults");
                        Self::from_toml(TomlConfig::default(), &search_dirs)
                    });
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not read config");
                }
            }
        }
        Self::from_toml(TomlConfig::default(), &search_dirs)
    }

    /// Parse a config document; relative paths resolve against `search_dirs`.
    fn parse(text: &str, search_dirs: &[PathBuf]) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(toml_cfg, search_dirs))
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let TomlConfig { general, simulation, body, objects, hotbar, audio, gamepad } = cfg;

        GameConfig {
            sim: SimConfig {
                tick_rate_ms: simulation.tick_rate_ms.max(1),
                target_fps: simulation.target_fps,
                anim_fps: simulation.anim_fps,
                tile_size: positive_or_default("tile_size", simulation.tile_size, default_tile_size()),
                player_speed: simulation.player_speed,
                spawn_tile: (simulation.spawn_tile[0], simulation.spawn_tile[1]),
                body: BodyMetrics {
                    sprite_width: positive_or_default("sprite_width", body.sprite_width, default_sprite_size()),
                    sprite_height: positive_or_default("sprite_height", body.sprite_height, default_sprite_size()),
                    bound_inset: body.bound_inset,
                    collision_offset_x: body.collision_offset_x,
                    foot_lift: body.foot_lift,
                    collision_width: positive_or_default("collision_width", body.collision_width, default_collision_width()),
                    collision_height: positive_or_default("collision_height", body.collision_height, default_collision_height()),
                    detection_size: positive_or_default("detection_size", body.detection_size, default_detection_size()),
                },
                objects: objects
                    .into_iter()
                    .map(|o| ObjectConfig {
                        name: o.name,
                        tile: Vec2::new(o.tile[0], o.tile[1]),
                        size: Vec2::new(o.size[0], o.size[1]),
                        dialog: o.dialog,
                    })
                    .collect(),
            },
            hotbar: HotbarConfig { slots: hotbar.slots, items: hotbar.items },
            audio: AudioConfig {
                master_volume: audio.master_volume.clamp(0.0, 1.0),
                ambient_radius: audio.ambient_radius,
            },
            gamepad: GamepadConfig {
                interact: gamepad.interact,
                hotbar_next: gamepad.hotbar_next,
                hotbar_prev: gamepad.hotbar_prev,
                quit: gamepad.quit,
            },
            map_path: resolve_path(&general.map, search_dirs),
            log_file: resolve_log_path(&general.log_file, search_dirs),
            debug_overlay: general.debug_overlay,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &[PathBuf::from(".")])
    }
}

/// Absolute paths are kept; relative ones resolve to the first candidate
/// directory where they exist, else relative to CWD.
fn resolve_path(raw: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return path;
    }
    search_dirs
        .iter()
        .map(|d| d.join(&path))
        .find(|p| p.exists())
        .unwrap_or(path)
}

/// The log file need not exist yet: place it next to the first candidate dir.
fn resolve_log_path(raw: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return path;
    }
    match search_dirs.first() {
        Some(dir) => dir.join(path),
        None => path,
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn from_toml_str(text: &str, dir: &Path) -> Result<GameConfig, toml::de::Error> {
        GameConfig::parse(text, &[dir.to_path_buf()])
    }

    #[test]
    fn empty_document_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = from_toml_str("", dir.path()).unwrap();
        assert_eq!(cfg.sim.tick_rate_ms, 16);
        assert_eq!(cfg.sim.tile_size, 128.0);
        assert_eq!(cfg.sim.spawn_tile, (1, 1));
        assert_eq!(cfg.sim.ticks_per_frame(), 10);
        assert_eq!(cfg.sim.body, BodyMetrics::default());
        assert_eq!(cfg.sim.objects.len(), 1);
        assert_eq!(cfg.sim.objects[0].name, "Penger");
        assert_eq!(cfg.hotbar.slots, 9);
        assert_eq!(cfg.gamepad.interact, vec!["A".to_string()]);
        assert!(cfg.debug_overlay);
        assert_eq!(cfg.log_file, dir.path().join("callie.log"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"
            [simulation]
            player_speed = 8.0
            anim_fps = 12

            [body]
            foot_lift = 10.0
        "#;
        let cfg = from_toml_str(text, dir.path()).unwrap();
        assert_eq!(cfg.sim.player_speed, 8.0);
        assert_eq!(cfg.sim.target_fps, 60);
        assert_eq!(cfg.sim.ticks_per_frame(), 5);
        assert_eq!(cfg.sim.body.foot_lift, 10.0);
        assert_eq!(cfg.sim.body.collision_width, 41.6);
    }

    #[test]
    fn objects_override_default_list() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"
            [[objects]]
            name = "Sign"
            tile = [0.5, 1.0]
            dialog = "Keep off the void."

            [[objects]]
            name = "Lamp"
            tile = [3.0, 2.0]
            size = [32.0, 64.0]
        "#;
        let cfg = from_toml_str(text, dir.path()).unwrap();
        assert_eq!(cfg.sim.objects.len(), 2);
        assert_eq!(cfg.sim.objects[0].tile, Vec2::new(0.5, 1.0));
        assert_eq!(cfg.sim.objects[0].size, Vec2::new(96.0, 96.0));
        assert_eq!(cfg.sim.objects[1].size, Vec2::new(32.0, 64.0));
        assert_eq!(cfg.sim.objects[1].dialog, "");
    }

    #[test]
    fn relative_map_resolves_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("maps")).unwrap();
        std::fs::write(dir.path().join("maps/room.txt"), "1 1 1").unwrap();
        let cfg = from_toml_str("[general]\nmap = \"maps/room.txt\"", dir.path()).unwrap();
        assert_eq!(cfg.map_path, dir.path().join("maps/room.txt"));
    }

    #[test]
    fn degenerate_rates_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let text = "[simulation]\ntick_rate_ms = 0\ntarget_fps = 4\nanim_fps = 0\n[audio]\nmaster_volume = 3.0";
        let cfg = from_toml_str(text, dir.path()).unwrap();
        assert_eq!(cfg.sim.tick_rate_ms, 1);
        assert_eq!(cfg.sim.ticks_per_frame(), 4);
        assert_eq!(cfg.audio.master_volume, 1.0);

        let text = "[simulation]\ntile_size = 0.0\n[body]\nsprite_width = -5.0\ncollision_height = 0.0";
        let cfg = from_toml_str(text, dir.path()).unwrap();
        assert_eq!(cfg.sim.tile_size, 128.0);
        assert_eq!(cfg.sim.body.sprite_width, BodyMetrics::default().sprite_width);
        assert_eq!(cfg.sim.body.collision_height, BodyMetrics::default().collision_height);
    }

    #[test]
    fn bad_types_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(from_toml_str("[simulation]\ntile_size = \"big\"", dir.path()).is_err());
    }
}
