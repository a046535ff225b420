/// Gamepad input via gilrs (feature `gamepad`).
///
/// D-pad and left stick walk; the remaining actions are bound by name in
/// the `[gamepad]` section of config.toml:
///   interact     →  A
///   hotbar_next  →  R1
///   hotbar_prev  →  L1
///   quit         →  Select
///
/// Without the feature every query reports "not pressed".

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::KeyState;
use crate::domain::hotbar::HotbarInput;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Face, shoulder and menu buttons that can carry an action.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.trim().to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "L2" | "LT" => Some(Btn::L2),
            "R2" | "RT" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action → buttons, resolved from config names.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ActionMap {
    interact: Vec<Btn>,
    hotbar_next: Vec<Btn>,
    hotbar_prev: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            interact: vec![Btn::A],
            hotbar_next: vec![Btn::R1],
            hotbar_prev: vec![Btn::L1],
            quit: vec![Btn::Select],
        }
    }
}

impl ActionMap {
    /// Unknown names are skipped; an action left with no valid button keeps
    /// its default binding.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn resolve(action: &str, names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let mut btns = Vec::with_capacity(names.len());
            for name in names {
                match Btn::from_name(name) {
                    Some(b) => btns.push(b),
                    None => tracing::warn!(action, button = %name, "unknown gamepad button"),
                }
            }
            if btns.is_empty() { fallback } else { btns }
        }

        let d = ActionMap::default();
        ActionMap {
            interact: resolve("interact", &cfg.interact, d.interact),
            hotbar_next: resolve("hotbar_next", &cfg.hotbar_next, d.hotbar_next),
            hotbar_prev: resolve("hotbar_prev", &cfg.hotbar_prev, d.hotbar_prev),
            quit: resolve("quit", &cfg.quit, d.quit),
        }
    }
}

/// Held (continuous) and just-pressed (edge) flags for one input.
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Directional inputs, indexed Up / Down / Left / Right.
#[derive(Clone, Copy, Debug, Default)]
struct Dirs([BtnState; 4]);

impl Dirs {
    fn held(&self) -> [bool; 4] {
        self.0.map(|s| s.held)
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
    buttons: [BtnState; BTN_COUNT],
    dpad: Dirs,
    stick: Dirs,
    stick_x: f32,
    stick_y: f32,
    actions: ActionMap,
    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                tracing::warn!(error = %e, "gamepad support unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: Dirs::default(),
            stick: Dirs::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            actions: ActionMap::from_config(cfg),
            connected,
        }
    }

    /// Poll pending events. Once per frame, before reading any action.
    pub fn update(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        for d in self.dpad.0.iter_mut().chain(self.stick.0.iter_mut()) {
            d.just_pressed = false;
        }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.stick_x = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.stick_y = v,
                EventType::Connected => {
                    tracing::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    tracing::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        // gilrs reports stick Y positive-up
        self.stick.0[0].set(self.stick_y > STICK_DEADZONE);
        self.stick.0[1].set(self.stick_y < -STICK_DEADZONE);
        self.stick.0[2].set(self.stick_x < -STICK_DEADZONE);
        self.stick.0[3].set(self.stick_x > STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, held: bool) {
        let dpad_slot = match btn {
            Button::DPadUp => Some(0),
            Button::DPadDown => Some(1),
            Button::DPadLeft => Some(2),
            Button::DPadRight => Some(3),
            _ => None,
        };
        if let Some(i) = dpad_slot {
            self.dpad.0[i].set(held);
        } else if let Some(b) = Btn::from_gilrs(btn) {
            self.buttons[b as usize].set(held);
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = Dirs::default();
        self.stick = Dirs::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }

    // ── Action queries ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    pub fn keys(&self) -> KeyState {
        let d = self.dpad.held();
        let s = self.stick.held();
        KeyState {
            up: d[0] || s[0],
            down: d[1] || s[1],
            left: d[2] || s[2],
            right: d[3] || s[3],
        }
    }

    pub fn interact_pressed(&self) -> bool {
        self.any_just_pressed(&self.actions.interact)
    }

    pub fn hotbar_input(&self) -> Option<HotbarInput> {
        if self.any_just_pressed(&self.actions.hotbar_next) {
            Some(HotbarInput::Next)
        } else if self.any_just_pressed(&self.actions.hotbar_prev) {
            Some(HotbarInput::Prev)
        } else {
            None
        }
    }

    pub fn quit_pressed(&self) -> bool {
        self.any_just_pressed(&self.actions.quit)
    }
}
