/// WorldState: the simulation context of a running game.
///
/// Owns the RNG, the current level's Grid and the Session. The only way the
/// grid or the session changes is `tick()` committing a whole step outcome,
/// or a regeneration replacing the level wholesale.
///
/// Presentation gets read-only access through `grid()`, `session()`, `phase()`.

use tracing::{debug, info};

use crate::domain::entity::Direction;
use crate::domain::grid::Grid;
use crate::domain::rng::Rng;
use crate::domain::session::Session;
use super::event::GameEvent;
use super::level::{self, LevelError};
use super::step;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    /// Race ended (timeout or peer's end message). Board hidden, stats shown.
    GameOver,
}

/// What one committed turn produced.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub finished: bool,
    pub events: Vec<GameEvent>,
}

pub struct WorldState {
    rng: Rng,
    grid: Grid,
    session: Session,
    width: usize,
    height: usize,
    phase: Phase,
    /// Monotonic host-loop tick counter (deadlines compare against it).
    tick: u64,
    /// Turns taken on the current level.
    turns: u64,
}

// ── Construction ──

impl WorldState {
    /// Build the context and generate the first level.
    pub fn new(width: usize, height: usize, mut rng: Rng) -> Result<Self, LevelError> {
        let grid = level::generate(width, height, &mut rng)?;
        Ok(WorldState {
            rng,
            grid,
            session: Session::new(),
            width,
            height,
            phase: Phase::Playing,
            tick: 0,
            turns: 0,
        })
    }

    /// Start from a hand-built level. Later regenerations use its size.
    #[cfg(test)]
    pub(crate) fn with_grid(grid: Grid, rng: Rng) -> Self {
        WorldState {
            rng,
            width: grid.width(),
            height: grid.height(),
            grid,
            session: Session::new(),
            phase: Phase::Playing,
            tick: 0,
            turns: 0,
        }
    }
}

// ── Read-only views ──

impl WorldState {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }
}

// ── Mutation ──

impl WorldState {
    /// Advance the monotonic clock by one host-loop tick.
    pub fn advance_clock(&mut self) {
        self.tick += 1;
    }

    /// Run one simulation turn for `intent` and commit it.
    /// Nothing happens once the game is over.
    pub fn step(&mut self, intent: Option<Direction>) -> TickReport {
        if self.phase != Phase::Playing {
            return TickReport::default();
        }
        let outcome = step::apply(&self.grid, &self.session, intent, &mut self.rng);
        self.grid = outcome.grid;
        self.session = outcome.session;
        self.turns += 1;
        TickReport { finished: outcome.finished, events: outcome.events }
    }

    /// Both racers are through: book the clear and deal a new level.
    pub fn complete_level(&mut self) {
        self.session.record_level_clear();
        info!(levels_cleared = self.session.levels_cleared(), score = self.session.score(), "level complete");
        self.regenerate();
    }

    /// Explicit restart: fresh session, fresh level, back to playing.
    pub fn restart(&mut self) {
        self.session = Session::new();
        self.phase = Phase::Playing;
        info!("session restarted");
        self.regenerate();
    }

    pub fn game_over(&mut self) {
        if self.phase != Phase::GameOver {
            info!(score = self.session.score(), levels_cleared = self.session.levels_cleared(), "game over");
        }
        self.phase = Phase::GameOver;
    }

    fn regenerate(&mut self) {
        // Size was validated in `new`, so generation cannot fail here
        if let Ok(grid) = level::generate(self.width, self.height, &mut self.rng) {
            self.grid = grid;
        }
        self.turns = 0;
        debug!(width = self.width, height = self.height, "level regenerated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Occupant;

    fn world() -> WorldState {
        WorldState::new(16, 16, Rng::seeded(1, 1)).unwrap()
    }

    #[test]
    fn new_rejects_tiny_level() {
        assert!(WorldState::new(2, 2, Rng::seeded(1, 1)).is_err());
    }

    #[test]
    fn starts_playing_with_fresh_session() {
        let w = world();
        assert_eq!(w.phase(), Phase::Playing);
        assert_eq!(w.session().health(), 10);
        assert_eq!(w.grid().count_occupant(Occupant::Player), 1);
        assert_eq!(w.tick(), 0);
    }

    #[test]
    fn step_commits_outcome() {
        let mut w = world();
        w.step(None);
        assert_eq!(w.turns(), 1);
    }

    #[test]
    fn complete_level_books_clear_and_regenerates() {
        let mut w = world();
        w.session.key_found = true;
        let before = w.grid().clone();
        w.complete_level();
        assert_eq!(w.session().levels_cleared(), 1);
        assert!(!w.session().key_found());
        assert_ne!(w.grid(), &before);
        assert_eq!(w.turns(), 0);
    }

    #[test]
    fn game_over_freezes_steps() {
        let mut w = world();
        w.game_over();
        let before = w.grid().clone();
        let report = w.step(Some(Direction::Up));
        assert!(!report.finished);
        assert_eq!(w.grid(), &before);
        assert_eq!(w.turns(), 0);
    }

    #[test]
    fn restart_resets_everything() {
        let mut w = world();
        w.session.score = 40;
        w.session.health = 3;
        w.game_over();
        w.restart();
        assert_eq!(w.phase(), Phase::Playing);
        assert_eq!(w.session(), &Session::new());
    }

    #[test]
    fn clock_is_monotonic() {
        let mut w = world();
        w.advance_clock();
        w.advance_clock();
        assert_eq!(w.tick(), 2);
    }
}
