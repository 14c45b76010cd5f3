/// Race: the two-player synchronization state machine.
///
/// Pure bookkeeping. It never touches the world or the wire itself; every
/// transition hands back `RaceAction`s for the driver to carry out, and
/// every clock comparison takes the caller's tick counter.
///
///   Idle ──s──▶ Racing ──local finish──▶ WaitingForOpponent
///                 ▲  │                          │
///                 │  └──f (opponent first)      │ f
///                 └─────────────────────────────┘
///   any ──e / deadline──▶ Idle (+ GameOver)

use tracing::{debug, info, trace};

use crate::domain::entity::Direction;
use super::message::RaceMessage;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum RaceState {
    #[default]
    Idle,
    Racing,
    WaitingForOpponent,
}

impl RaceState {
    pub fn label(self) -> &'static str {
        match self {
            RaceState::Idle => "IDLE",
            RaceState::Racing => "RACING",
            RaceState::WaitingForOpponent => "WAITING",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RaceAction {
    Send(RaceMessage),
    /// Both players reached the exit: book the clear, deal a new level.
    CompleteLevel,
    /// Race is over: show the final stats.
    GameOver,
}

#[derive(Clone, Debug)]
pub struct Race {
    state: RaceState,
    countdown_ticks: u64,
    /// Tick at which the race times out. Stays set after a game over, so
    /// the local start key cannot re-arm a finished race until `reset`.
    deadline: Option<u64>,
    opponent_finished: bool,
    pending: Option<Direction>,
}

/// Convert a countdown in seconds to host-loop ticks.
pub fn countdown_in_ticks(countdown_secs: u64, tick_rate_ms: u64) -> u64 {
    countdown_secs.saturating_mul(1000) / tick_rate_ms.max(1)
}

impl Race {
    pub fn new(countdown_ticks: u64) -> Self {
        Race {
            state: RaceState::Idle,
            countdown_ticks,
            deadline: None,
            opponent_finished: false,
            pending: None,
        }
    }

    pub fn state(&self) -> RaceState {
        self.state
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn opponent_finished(&self) -> bool {
        self.opponent_finished
    }

    /// Ticks left before the deadline, if a race is running.
    pub fn remaining(&self, now: u64) -> Option<u64> {
        match self.state {
            RaceState::Idle => None,
            _ => self.deadline.map(|d| d.saturating_sub(now)),
        }
    }

    fn arm(&mut self, now: u64) {
        let deadline = now.saturating_add(self.countdown_ticks);
        self.deadline = Some(deadline);
        self.state = RaceState::Racing;
        self.opponent_finished = false;
        self.pending = None;
        info!(now, deadline, "race started");
    }

    fn end(&mut self) {
        self.state = RaceState::Idle;
        self.opponent_finished = false;
        self.pending = None;
    }
}

// ══════════════════════════════════════════════════════════════
// Remote events
// ══════════════════════════════════════════════════════════════

impl Race {
    /// Feed one message taken from the link.
    pub fn receive(&mut self, msg: RaceMessage, now: u64) -> Vec<RaceAction> {
        debug!(%msg, state = ?self.state, "race message received");
        match (msg, self.state) {
            (RaceMessage::Start, RaceState::Idle) => {
                self.arm(now);
                Vec::new()
            }
            (RaceMessage::Move(dir), RaceState::Racing) => {
                self.pending = Some(dir);
                Vec::new()
            }
            (RaceMessage::Finished, RaceState::Racing) => {
                self.opponent_finished = true;
                Vec::new()
            }
            (RaceMessage::Finished, RaceState::WaitingForOpponent) => {
                self.state = RaceState::Racing;
                self.opponent_finished = false;
                info!("opponent finished, level complete");
                vec![RaceAction::CompleteLevel]
            }
            (RaceMessage::End, _) => {
                info!("race ended by peer");
                self.end();
                vec![RaceAction::GameOver]
            }
            (msg, state) => {
                trace!(%msg, ?state, "message ignored");
                Vec::new()
            }
        }
    }

    /// Compare the deadline against the monotonic tick counter.
    pub fn check_deadline(&mut self, now: u64) -> Vec<RaceAction> {
        match (self.state, self.deadline) {
            (RaceState::Racing | RaceState::WaitingForOpponent, Some(deadline)) if now > deadline => {
                info!(now, deadline, "race timed out");
                self.end();
                vec![RaceAction::Send(RaceMessage::End), RaceAction::GameOver]
            }
            _ => Vec::new(),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Local events
// ══════════════════════════════════════════════════════════════

impl Race {
    /// Start key. Only a race that has never been armed can be started.
    pub fn start_local(&mut self, now: u64) -> Vec<RaceAction> {
        if self.deadline.is_some() {
            trace!("start ignored, countdown already armed");
            return Vec::new();
        }
        self.arm(now);
        vec![RaceAction::Send(RaceMessage::Start)]
    }

    /// Local direction key. Directions always go to the peer; they only
    /// become intents when they come back through `receive`.
    pub fn forward_move(&self, dir: Direction) -> Vec<RaceAction> {
        vec![RaceAction::Send(RaceMessage::Move(dir))]
    }

    /// The local step reported reaching the exit.
    pub fn local_finished(&mut self) -> Vec<RaceAction> {
        let mut actions = vec![RaceAction::Send(RaceMessage::Finished)];
        if self.opponent_finished {
            self.opponent_finished = false;
            info!("finished after opponent, level complete");
            actions.push(RaceAction::CompleteLevel);
        } else if self.state == RaceState::Racing {
            self.state = RaceState::WaitingForOpponent;
            debug!("waiting for opponent");
        }
        actions
    }

    pub fn take_intent(&mut self) -> Option<Direction> {
        self.pending.take()
    }

    /// Explicit restart: forget the countdown so a new race can begin.
    pub fn reset(&mut self) {
        self.end();
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTDOWN: u64 = 1875; // 30 s at 16 ms

    fn racing(now: u64) -> Race {
        let mut race = Race::new(COUNTDOWN);
        race.receive(RaceMessage::Start, now);
        race
    }

    #[test]
    fn countdown_conversion() {
        assert_eq!(countdown_in_ticks(30, 16), COUNTDOWN);
        assert_eq!(countdown_in_ticks(30, 1000), 30);
        assert_eq!(countdown_in_ticks(1, 0), 1000);
        // Absurd config values clamp instead of overflowing
        assert_eq!(countdown_in_ticks(u64::MAX / 10, 16), u64::MAX / 16);
    }

    #[test]
    fn huge_countdown_never_fires() {
        let mut race = Race::new(countdown_in_ticks(u64::MAX, 1));
        assert_eq!(race.start_local(5), vec![RaceAction::Send(RaceMessage::Start)]);
        assert_eq!(race.deadline(), Some(u64::MAX));
        assert!(race.check_deadline(u64::MAX).is_empty());
        assert_eq!(race.state(), RaceState::Racing);
    }

    #[test]
    fn start_while_idle_arms_countdown() {
        let race = racing(100);
        assert_eq!(race.state(), RaceState::Racing);
        assert_eq!(race.deadline(), Some(100 + COUNTDOWN));
        assert_eq!(race.remaining(100), Some(COUNTDOWN));
    }

    #[test]
    fn start_again_is_noop() {
        let mut race = racing(100);
        let actions = race.receive(RaceMessage::Start, 500);
        assert!(actions.is_empty());
        assert_eq!(race.state(), RaceState::Racing);
        assert_eq!(race.deadline(), Some(100 + COUNTDOWN));
    }

    #[test]
    fn moves_only_count_while_racing() {
        let mut race = Race::new(COUNTDOWN);
        race.receive(RaceMessage::Move(Direction::Up), 0);
        assert_eq!(race.take_intent(), None);

        race.receive(RaceMessage::Start, 0);
        race.receive(RaceMessage::Move(Direction::Up), 1);
        race.receive(RaceMessage::Move(Direction::Left), 2);
        assert_eq!(race.take_intent(), Some(Direction::Left));
        assert_eq!(race.take_intent(), None);
    }

    #[test]
    fn finishing_first_waits_for_opponent() {
        let mut race = racing(0);
        let actions = race.local_finished();
        assert_eq!(actions, vec![RaceAction::Send(RaceMessage::Finished)]);
        assert_eq!(race.state(), RaceState::WaitingForOpponent);

        // Moves are ignored while waiting
        race.receive(RaceMessage::Move(Direction::Down), 5);
        assert_eq!(race.take_intent(), None);

        let actions = race.receive(RaceMessage::Finished, 10);
        assert_eq!(actions, vec![RaceAction::CompleteLevel]);
        assert_eq!(race.state(), RaceState::Racing);
        assert_eq!(race.deadline(), Some(COUNTDOWN));
    }

    #[test]
    fn finishing_second_completes_at_once() {
        let mut race = racing(0);
        race.receive(RaceMessage::Finished, 3);
        assert!(race.opponent_finished());
        let actions = race.local_finished();
        assert_eq!(
            actions,
            vec![RaceAction::Send(RaceMessage::Finished), RaceAction::CompleteLevel]
        );
        assert_eq!(race.state(), RaceState::Racing);
        assert!(!race.opponent_finished());
    }

    #[test]
    fn deadline_sends_end_once() {
        let mut race = racing(0);
        assert!(race.check_deadline(COUNTDOWN).is_empty());
        let actions = race.check_deadline(COUNTDOWN + 1);
        assert_eq!(actions, vec![RaceAction::Send(RaceMessage::End), RaceAction::GameOver]);
        assert_eq!(race.state(), RaceState::Idle);
        assert!(race.check_deadline(COUNTDOWN + 2).is_empty());
    }

    #[test]
    fn deadline_also_applies_while_waiting() {
        let mut race = racing(0);
        race.local_finished();
        let actions = race.check_deadline(COUNTDOWN + 1);
        assert!(actions.contains(&RaceAction::GameOver));
    }

    #[test]
    fn end_from_peer_in_any_state() {
        for setup in [0, 1, 2] {
            let mut race = Race::new(COUNTDOWN);
            if setup >= 1 {
                race.receive(RaceMessage::Start, 0);
            }
            if setup == 2 {
                race.local_finished();
            }
            assert_eq!(race.receive(RaceMessage::End, 9), vec![RaceAction::GameOver]);
            assert_eq!(race.state(), RaceState::Idle);
        }
    }

    #[test]
    fn local_start_only_once() {
        let mut race = Race::new(COUNTDOWN);
        assert_eq!(race.start_local(7), vec![RaceAction::Send(RaceMessage::Start)]);
        assert_eq!(race.state(), RaceState::Racing);
        assert!(race.start_local(8).is_empty());

        // Still armed after the race ends
        race.receive(RaceMessage::End, 9);
        assert!(race.start_local(10).is_empty());

        race.reset();
        assert_eq!(race.deadline(), None);
        assert_eq!(race.start_local(11), vec![RaceAction::Send(RaceMessage::Start)]);
    }

    #[test]
    fn forward_move_sends_direction() {
        let race = Race::new(COUNTDOWN);
        assert_eq!(
            race.forward_move(Direction::Right),
            vec![RaceAction::Send(RaceMessage::Move(Direction::Right))]
        );
    }

    #[test]
    fn remaining_hidden_when_idle() {
        let race = Race::new(COUNTDOWN);
        assert_eq!(race.remaining(0), None);
    }
}
