/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Move
///   Start                 →  Start race
///   Select                →  Reset
///
/// Like the keyboard, every action is edge-triggered.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::{debug, warn};

use crate::config::GamepadConfig;
use crate::domain::entity::Direction;
use super::input::InputEvent;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    /// Level-triggered input (stick) fed in; edge derived.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set_level(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    start: Vec<Btn>,
    reset: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            start: vec![Btn::Start],
            reset: vec![Btn::Select],
        }
    }
}

fn parse_list(names: &[String]) -> Vec<Btn> {
    names.iter().filter_map(|s| Btn::from_name(s)).collect()
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; 8],

    /// D-pad, indexed by `Direction::id() - 1`.
    dpad: [BtnState; 4],
    /// Left stick as four digital directions, same indexing.
    stick: [BtnState; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn dir_index(dir: Direction) -> usize {
    dir.id() as usize - 1
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    debug!(connected = has_pad, "gamepad subsystem ready");
                    (Some(g), has_pad)
                }
                Err(e) => {
                    warn!(error = %e, "gamepad subsystem unavailable");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); 8],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Unknown names are skipped; an
    /// empty result keeps the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        let start = parse_list(&cfg.start);
        if !start.is_empty() { self.action_map.start = start; }
        let reset = parse_list(&cfg.reset);
        if !reset.is_empty() { self.action_map.reset = reset; }
    }

    /// Poll the pad and return this frame's edge-triggered events.
    pub fn update(&mut self) -> Vec<InputEvent> {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();

        self.events()
    }

    fn events(&self) -> Vec<InputEvent> {
        let mut out = Vec::new();
        for dir in Direction::ALL {
            let i = dir_index(dir);
            if self.dpad[i].just_pressed || self.stick[i].just_pressed {
                out.push(InputEvent::Move(dir));
            }
        }
        if self.any_just_pressed(&self.action_map.start) {
            out.push(InputEvent::StartRace);
        }
        if self.any_just_pressed(&self.action_map.reset) {
            out.push(InputEvent::Reset);
        }
        out
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.update_axis(axis, value);
                }
                EventType::Connected => {
                    self.connected = true;
                    debug!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                    debug!("gamepad disconnected");
                }
                _ => {}
            }
        }

        let (x, y) = (self.stick_x, self.stick_y);
        self.stick[dir_index(Direction::Left)].set_level(x < -STICK_DEADZONE);
        self.stick[dir_index(Direction::Right)].set_level(x > STICK_DEADZONE);
        self.stick[dir_index(Direction::Up)].set_level(y > STICK_DEADZONE);
        self.stick[dir_index(Direction::Down)].set_level(y < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let dpad = match gilrs_btn {
            Button::DPadUp    => Some(Direction::Up),
            Button::DPadDown  => Some(Direction::Down),
            Button::DPadLeft  => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        let state = match (dpad, Btn::from_gilrs(gilrs_btn)) {
            (Some(dir), _) => &mut self.dpad[dir_index(dir)],
            (None, Some(btn)) => &mut self.buttons[btn as usize],
            (None, None) => return,
        };
        state.held = held;
        if held {
            state.just_pressed = true;
        }
    }

    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::LeftStickX => self.stick_x = value,
            Axis::LeftStickY => self.stick_y = value,
            _ => {}
        }
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            *b = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> GamepadState {
        let mut gp = GamepadState::new();
        gp.release_all();
        gp
    }

    #[test]
    fn button_names() {
        assert_eq!(Btn::from_name("start"), Some(Btn::Start));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn default_mapping() {
        let mut gp = pad();
        gp.buttons[Btn::Start as usize].just_pressed = true;
        gp.dpad[dir_index(Direction::Left)].just_pressed = true;
        assert_eq!(gp.events(), vec![InputEvent::Move(Direction::Left), InputEvent::StartRace]);
    }

    #[test]
    fn config_remaps_and_ignores_unknown() {
        let mut gp = pad();
        gp.load_button_config(&GamepadConfig {
            start: vec!["A".into(), "bogus".into()],
            reset: vec!["nothing".into()],
        });
        gp.buttons[Btn::A as usize].just_pressed = true;
        gp.buttons[Btn::Select as usize].just_pressed = true;
        assert_eq!(gp.events(), vec![InputEvent::StartRace, InputEvent::Reset]);
    }

    #[test]
    fn stick_is_edge_triggered() {
        let mut s = BtnState::default();
        s.set_level(true);
        assert!(s.just_pressed);
        s.just_pressed = false;
        s.set_level(true);
        assert!(!s.just_pressed);
        s.set_level(false);
        s.set_level(true);
        assert!(s.just_pressed);
    }
}
