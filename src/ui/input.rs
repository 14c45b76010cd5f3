/// Keyboard input tracker.
///
/// Turns raw terminal key events into edge-triggered `InputEvent`s: a key
/// fires once when it goes from "not held" to "held", and holding it down
/// never auto-repeats a move.
///
///   Arrows / WASD      →  Move
///   Enter              →  Start race
///   R                  →  Reset
///   Q / Esc / Ctrl-C   →  Quit
///
/// crossterm reads from /dev/tty when stdin is not a terminal, so the
/// keyboard keeps working while stdin carries the race protocol.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::domain::entity::Direction;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputEvent {
    Move(Direction),
    StartRace,
    Reset,
    Quit,
}

/// Map one freshly pressed key to its event.
pub fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<InputEvent> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(InputEvent::Quit),
            _ => None,
        };
    }
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(InputEvent::Move(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(InputEvent::Move(Direction::Down)),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(InputEvent::Move(Direction::Left)),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(InputEvent::Move(Direction::Right)),
        KeyCode::Enter => Some(InputEvent::StartRace),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(InputEvent::Reset),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(InputEvent::Quit),
        _ => None,
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Events produced by the most recent drain, in arrival order.
    events: Vec<InputEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) -> &[InputEvent] {
        self.events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                match key.kind {
                    KeyEventKind::Release if self.honor_release => {
                        self.last_active.remove(&key.code);
                    }
                    KeyEventKind::Release => {
                        // Rely on timeout-based expiry instead
                    }
                    _ => {
                        let was_held = self.is_held(key.code);
                        self.last_active.insert(key.code, Instant::now());
                        if !was_held {
                            if let Some(ev) = map_key(key.code, key.modifiers) {
                                self.events.push(ev);
                            }
                        }
                    }
                }
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        &self.events
    }

    fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}
