/// Game driver: glues input, the peer link, the race machine and the world.
///
/// The host loop calls, once per frame and in this order:
///   `pump_link()`      — take at most one message off the link
///   `handle_input(ev)` — for each local input event
///   `tick()`           — when the tick interval elapsed
///
/// Local directions are never applied directly. They go to the peer, and
/// only directions coming back through the link become intents. In solo
/// mode the link is a loopback, so the same path drives a single player.

use tracing::{debug, warn};

use crate::domain::entity::Direction;
use crate::race::link::PeerLink;
use crate::race::message::RaceMessage;
use crate::race::protocol::{Race, RaceAction};
use crate::sim::event::GameEvent;
use crate::sim::world::WorldState;
use crate::ui::input::InputEvent;

/// Something the presentation may want to react to (sound, mostly).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cue {
    Game(GameEvent),
    LevelComplete,
    GameOver,
}

pub struct App<L: PeerLink> {
    world: WorldState,
    race: Race,
    link: L,
    quit: bool,
}

impl<L: PeerLink> App<L> {
    pub fn new(world: WorldState, race: Race, link: L) -> Self {
        App { world, race, link, quit: false }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn race(&self) -> &Race {
        &self.race
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    // ── Per-frame entry points ──

    pub fn handle_input(&mut self, event: InputEvent) -> Vec<Cue> {
        let mut cues = Vec::new();
        match event {
            InputEvent::Move(dir) => {
                let actions = self.race.forward_move(dir);
                self.carry_out(actions, &mut cues);
            }
            InputEvent::StartRace => {
                let actions = self.race.start_local(self.world.tick());
                self.carry_out(actions, &mut cues);
            }
            InputEvent::Reset => {
                self.race.reset();
                self.world.restart();
            }
            InputEvent::Quit => self.quit = true,
        }
        cues
    }

    pub fn pump_link(&mut self) -> Vec<Cue> {
        let mut cues = Vec::new();
        if let Some(msg) = self.link.poll() {
            let actions = self.race.receive(msg, self.world.tick());
            self.carry_out(actions, &mut cues);
        }
        cues
    }

    /// One simulation tick: consume the pending intent (if any), then check
    /// the countdown. Turns only happen when a direction arrived.
    pub fn tick(&mut self) -> Vec<Cue> {
        let mut cues = Vec::new();
        self.world.advance_clock();

        if let Some(dir) = self.race.take_intent() {
            self.take_turn(dir, &mut cues);
        }

        let actions = self.race.check_deadline(self.world.tick());
        self.carry_out(actions, &mut cues);
        cues
    }

    // ── Internal ──

    fn take_turn(&mut self, dir: Direction, cues: &mut Vec<Cue>) {
        let report = self.world.step(Some(dir));
        for ev in &report.events {
            debug!(?ev, "game event");
        }
        cues.extend(report.events.into_iter().map(Cue::Game));
        if report.finished {
            let actions = self.race.local_finished();
            self.carry_out(actions, cues);
        }
    }

    fn carry_out(&mut self, actions: Vec<RaceAction>, cues: &mut Vec<Cue>) {
        for action in actions {
            match action {
                RaceAction::Send(msg) => self.send(msg),
                RaceAction::CompleteLevel => {
                    self.world.complete_level();
                    cues.push(Cue::LevelComplete);
                }
                RaceAction::GameOver => {
                    self.world.game_over();
                    cues.push(Cue::GameOver);
                }
            }
        }
    }

    fn send(&mut self, msg: RaceMessage) {
        // A vanished peer is not fatal; the race simply never hears back
        if let Err(e) = self.link.send(msg) {
            warn!(error = %e, %msg, "race message not delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::grid_from;
    use crate::domain::rng::Rng;
    use crate::domain::tile::Occupant;
    use crate::race::link::Loopback;
    use crate::race::protocol::RaceState;
    use crate::sim::world::Phase;

    const COUNTDOWN: u64 = 100;

    fn solo(rows: &[&str]) -> App<Loopback> {
        let world = WorldState::with_grid(grid_from(rows), Rng::seeded(1, 1));
        App::new(world, Race::new(COUNTDOWN), Loopback::new())
    }

    /// One host-loop frame with at most one local input.
    fn frame(app: &mut App<Loopback>, input: Option<InputEvent>) -> Vec<Cue> {
        let mut cues = app.pump_link();
        if let Some(ev) = input {
            cues.extend(app.handle_input(ev));
        }
        cues.extend(app.tick());
        cues
    }

    fn player(app: &App<Loopback>) -> Option<(usize, usize)> {
        app.world().grid().find_occupant(Occupant::Player)
    }

    #[test]
    fn moves_wait_for_the_race_to_start() {
        let mut app = solo(&["#####", "#@..#", "#####"]);
        frame(&mut app, Some(InputEvent::Move(Direction::Right)));
        frame(&mut app, None);
        assert_eq!(player(&app), Some((1, 1)));
        assert_eq!(app.race().state(), RaceState::Idle);
    }

    #[test]
    fn directions_take_effect_after_the_round_trip() {
        let mut app = solo(&["#####", "#@..#", "#####"]);
        frame(&mut app, Some(InputEvent::StartRace));
        assert_eq!(app.race().state(), RaceState::Racing);

        frame(&mut app, Some(InputEvent::Move(Direction::Right)));
        assert_eq!(player(&app), Some((1, 1)));
        frame(&mut app, None);
        assert_eq!(player(&app), Some((2, 1)));
        assert_eq!(app.world().turns(), 1);
    }

    #[test]
    fn solo_race_clears_a_level() {
        let mut app = solo(&["#####", "#@kE#", "#####"]);
        frame(&mut app, Some(InputEvent::StartRace));

        // Pick up the key
        frame(&mut app, Some(InputEvent::Move(Direction::Right)));
        let cues = frame(&mut app, None);
        assert!(cues.iter().any(|c| matches!(c, Cue::Game(GameEvent::KeyPicked { .. }))));
        assert!(app.world().session().key_found());

        // Walk through the now-open exit: finished goes out and comes back
        frame(&mut app, Some(InputEvent::Move(Direction::Right)));
        frame(&mut app, None);
        assert_eq!(app.race().state(), RaceState::WaitingForOpponent);
        let cues = frame(&mut app, None);
        assert!(cues.contains(&Cue::LevelComplete));
        assert_eq!(app.race().state(), RaceState::Racing);
        assert_eq!(app.world().session().levels_cleared(), 1);
        assert!(!app.world().session().key_found());
        assert_eq!(app.world().grid().count_occupant(Occupant::Player), 1);
    }

    #[test]
    fn countdown_ends_the_game() {
        let mut app = solo(&["#####", "#@..#", "#####"]);
        frame(&mut app, Some(InputEvent::StartRace));
        let mut over = false;
        for _ in 0..COUNTDOWN + 2 {
            if frame(&mut app, None).contains(&Cue::GameOver) {
                over = true;
                break;
            }
        }
        assert!(over);
        assert_eq!(app.world().phase(), Phase::GameOver);
        assert_eq!(app.race().state(), RaceState::Idle);

        // Our own end message comes back; still over, still idle
        frame(&mut app, None);
        assert_eq!(app.world().phase(), Phase::GameOver);
        assert_eq!(app.race().state(), RaceState::Idle);

        // A finished race cannot be restarted without a reset
        frame(&mut app, Some(InputEvent::StartRace));
        assert_eq!(app.race().state(), RaceState::Idle);
    }

    #[test]
    fn reset_restores_play() {
        let mut app = solo(&["#####", "#@..#", "#####"]);
        frame(&mut app, Some(InputEvent::StartRace));
        app.world.game_over();
        app.handle_input(InputEvent::Reset);
        assert_eq!(app.world().phase(), Phase::Playing);
        assert_eq!(app.race().state(), RaceState::Idle);
        assert_eq!(app.race().deadline(), None);
        assert_eq!(app.world().session().health(), 10);
    }

    #[test]
    fn quit_is_local() {
        let mut app = solo(&["#####", "#@..#", "#####"]);
        app.handle_input(InputEvent::Quit);
        assert!(app.should_quit());
    }
}
