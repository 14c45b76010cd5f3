/// The step function: advances a level by one turn.
///
/// `apply` is a pure transformation `old grid → new grid`. Every decision
/// reads the pre-step `old` grid; writes go to a fresh buffer that the caller
/// commits as a whole. A mover is also refused a cell that the buffer already
/// hands to someone else, so nothing is overwritten mid-turn.
///
/// Processing order:
///   1. Locks — each Exit carries a Lock iff the key was still missing before the turn
///   2. Player — move, pickups, spikes; reaching the Exit ends the turn early
///   3. Spiders — one uniformly random direction each, row-major order
///
/// The player's Exit check sees the locks of pass 1, i.e. the pre-step key state.

use crate::domain::entity::Direction;
use crate::domain::grid::Grid;
use crate::domain::rng::Rng;
use crate::domain::session::Session;
use crate::domain::tile::{Occupant, Terrain};
use super::event::GameEvent;

/// Result of one turn. Nothing is committed until the caller takes it.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    pub grid: Grid,
    pub session: Session,
    /// The player walked onto an unlocked Exit this turn.
    pub finished: bool,
    pub events: Vec<GameEvent>,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn apply(old: &Grid, session: &Session, intent: Option<Direction>, rng: &mut Rng) -> StepOutcome {
    let mut next = old.clone();
    let mut session = session.clone();
    let mut events = Vec::new();

    let opened = resolve_locks(old, &mut next, session.key_found);

    if resolve_player(old, &mut next, &mut session, intent, &mut events) {
        // Exit reached: the turn stops here, the board stays as it was
        return StepOutcome { grid: old.clone(), session, finished: true, events };
    }

    // Lock events only count once `next` is the board handed back
    events.splice(0..0, opened);
    resolve_spiders(old, &mut next, rng);

    StepOutcome { grid: next, session, finished: false, events }
}

// ══════════════════════════════════════════════════════════════
// Locks
// ══════════════════════════════════════════════════════════════

/// Returns the locks opened in `next`.
fn resolve_locks(old: &Grid, next: &mut Grid, key_found: bool) -> Vec<GameEvent> {
    let mut opened = Vec::new();
    for (x, y, tile) in old.cells() {
        if tile.terrain != Terrain::Exit { continue; }
        if key_found {
            if tile.occupant == Occupant::Lock {
                next.set_occupant(x, y, Occupant::None);
                opened.push(GameEvent::LockOpened { x, y });
            }
        } else {
            next.set_occupant(x, y, Occupant::Lock);
        }
    }
    opened
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// Returns true when the player reached the Exit.
fn resolve_player(
    old: &Grid,
    next: &mut Grid,
    session: &mut Session,
    intent: Option<Direction>,
    events: &mut Vec<GameEvent>,
) -> bool {
    let dir = match intent { Some(d) => d, None => return false };
    let (px, py) = match old.find_occupant(Occupant::Player) { Some(p) => p, None => return false };

    let target = old.neighbor(px, py, dir).filter(|&(tx, ty)| next.get(tx, ty).admits_player());
    let (tx, ty) = match target {
        Some(t) => t,
        None => {
            events.push(GameEvent::PlayerBlocked { x: px, y: py });
            return false;
        }
    };

    let dest = next.get(tx, ty);
    match dest.terrain {
        Terrain::Spikes => {
            session.health -= 1;
            events.push(GameEvent::SpikesHit { x: tx, y: ty });
        }
        Terrain::Exit => {
            events.push(GameEvent::ExitReached { x: tx, y: ty });
            return true;
        }
        _ => {}
    }

    match dest.occupant {
        Occupant::GoldSmall | Occupant::GoldLarge => {
            let value = dest.occupant.gold_value();
            session.score += value;
            events.push(GameEvent::GoldPicked { x: tx, y: ty, value });
        }
        Occupant::Key => {
            session.key_found = true;
            events.push(GameEvent::KeyPicked { x: tx, y: ty });
        }
        Occupant::Spider => {
            session.enemies_defeated += 1;
            events.push(GameEvent::SpiderDefeated { x: tx, y: ty });
        }
        _ => {}
    }

    next.set_occupant(tx, ty, Occupant::Player);
    next.set_occupant(px, py, Occupant::None);
    events.push(GameEvent::PlayerMoved { x: tx, y: ty });
    false
}

// ══════════════════════════════════════════════════════════════
// Spiders — uniform random walk, no pathfinding
// ══════════════════════════════════════════════════════════════

fn resolve_spiders(old: &Grid, next: &mut Grid, rng: &mut Rng) {
    let spiders: Vec<(usize, usize)> = old.cells()
        .filter(|&(_, _, t)| t.occupant == Occupant::Spider)
        .map(|(x, y, _)| (x, y))
        .collect();

    for (sx, sy) in spiders {
        // Defeated by the player this turn
        if next.get(sx, sy).occupant != Occupant::Spider { continue; }

        let dir = match Direction::from_id(rng.uniform_int_range(1, 4)) {
            Some(d) => d,
            None => continue,
        };
        let target = old.neighbor(sx, sy, dir).filter(|&(tx, ty)| {
            old.get(tx, ty).admits_spider() && next.get(tx, ty).admits_spider()
        });
        if let Some((tx, ty)) = target {
            next.set_occupant(tx, ty, Occupant::Spider);
            next.set_occupant(sx, sy, Occupant::None);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
