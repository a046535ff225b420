/// Keyboard state tracker.
///
/// Movement keys are *held* (continuous walking); interact, hotbar and
/// meta keys are *edge-triggered* (fire once on the initial press).
///
/// Release events are only reported by terminals with keyboard enhancement.
/// Everywhere else a key counts as released once no Press/Repeat has arrived
/// for `HOLD_TIMEOUT`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::KeyState;
use crate::domain::hotbar::HotbarInput;

/// Must exceed the terminal's key-repeat interval.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key bindings ──

const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_INTERACT: &[KeyCode] = &[KeyCode::Char('e'), KeyCode::Char('E')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_DEBUG: &[KeyCode] = &[KeyCode::F(3)];

pub struct InputState {
    /// Last Press/Repeat per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,
    raw_events: Vec<KeyEvent>,
    /// Trust Release events (keyboard enhancement confirmed).
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Read every pending terminal event without blocking. Once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        let now = Instant::now();
        codes.iter().any(|c| self.is_held_at(*c, now))
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    // ── Game actions ──

    /// Directional snapshot. A fresh press counts as held so a quick tap
    /// still moves one step.
    pub fn keys(&self) -> KeyState {
        let active = |codes: &[KeyCode]| self.any_held(codes) || self.any_pressed(codes);
        KeyState {
            up: active(KEYS_UP),
            down: active(KEYS_DOWN),
            left: active(KEYS_LEFT),
            right: active(KEYS_RIGHT),
        }
    }

    pub fn interact_pressed(&self) -> bool {
        self.any_pressed(KEYS_INTERACT)
    }

    /// First hotbar request among this frame's fresh presses.
    pub fn hotbar_input(&self) -> Option<HotbarInput> {
        self.raw_events
            .iter()
            .filter(|k| k.kind != KeyEventKind::Release && self.fresh_presses.contains(&k.code))
            .find_map(|k| hotbar_key(k.code, k.modifiers))
    }

    pub fn debug_toggled(&self) -> bool {
        self.any_pressed(KEYS_DEBUG)
    }

    pub fn quit_requested(&self) -> bool {
        self.any_pressed(KEYS_QUIT) || self.ctrl_c_pressed()
    }

    fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| now.duration_since(*t) < HOLD_TIMEOUT)
    }
}

/// `1`..`9` select a slot, Tab / Shift+Tab cycle.
fn hotbar_key(code: KeyCode, modifiers: KeyModifiers) -> Option<HotbarInput> {
    match code {
        KeyCode::Char(c @ '1'..='9') => Some(HotbarInput::Select(c as usize - '1' as usize)),
        KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => Some(HotbarInput::Prev),
        KeyCode::Tab => Some(HotbarInput::Next),
        KeyCode::BackTab => Some(HotbarInput::Prev),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        let mut k = KeyEvent::new(code, KeyModifiers::NONE);
        k.kind = KeyEventKind::Release;
        k
    }

    #[test]
    fn digits_map_to_zero_based_slots() {
        assert_eq!(hotbar_key(KeyCode::Char('1'), KeyModifiers::NONE), Some(HotbarInput::Select(0)));
        assert_eq!(hotbar_key(KeyCode::Char('9'), KeyModifiers::NONE), Some(HotbarInput::Select(8)));
        assert_eq!(hotbar_key(KeyCode::Char('0'), KeyModifiers::NONE), None);
        assert_eq!(hotbar_key(KeyCode::Tab, KeyModifiers::NONE), Some(HotbarInput::Next));
        assert_eq!(hotbar_key(KeyCode::Tab, KeyModifiers::SHIFT), Some(HotbarInput::Prev));
        assert_eq!(hotbar_key(KeyCode::BackTab, KeyModifiers::SHIFT), Some(HotbarInput::Prev));
    }

    #[test]
    fn press_is_fresh_once_then_held() {
        let mut s = InputState::new();
        let now = Instant::now();
        s.record(press(KeyCode::Char('e')), now);
        assert!(s.interact_pressed());

        s.fresh_presses.clear();
        s.record(press(KeyCode::Char('e')), now);
        assert!(!s.interact_pressed());
        assert!(s.any_held(KEYS_INTERACT));
    }

    #[test]
    fn release_ignored_without_enhancement() {
        let mut s = InputState::new();
        let now = Instant::now();
        s.record(press(KeyCode::Left), now);
        s.record(release(KeyCode::Left), now);
        assert!(s.keys().left);

        s.honor_release = true;
        s.record(release(KeyCode::Left), now);
        assert!(!s.any_held(KEYS_LEFT));
    }

    #[test]
    fn keyboard_actions_from_one_frame() {
        let mut s = InputState::new();
        let now = Instant::now();
        s.record(press(KeyCode::Char('w')), now);
        s.record(press(KeyCode::Char('3')), now);
        assert!(s.keys().up);
        assert!(!s.keys().down);
        assert!(!s.interact_pressed());
        assert_eq!(s.hotbar_input(), Some(HotbarInput::Select(2)));
    }

    #[test]
    fn ctrl_c_quits() {
        let mut s = InputState::new();
        s.record(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert!(s.quit_requested());
    }
}
