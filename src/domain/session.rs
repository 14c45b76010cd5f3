/// Session: the scoreboard for one life.
///
/// Only the simulation step changes it (through a committed outcome);
/// the renderer reads it through the accessors.

pub const STARTING_HEALTH: i32 = 10;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Session {
    pub(crate) score: u32,
    pub(crate) levels_cleared: u32,
    pub(crate) enemies_defeated: u32,
    pub(crate) health: i32,
    pub(crate) key_found: bool,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            score: 0,
            levels_cleared: 0,
            enemies_defeated: 0,
            health: STARTING_HEALTH,
            key_found: false,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn levels_cleared(&self) -> u32 {
        self.levels_cleared
    }

    pub fn enemies_defeated(&self) -> u32 {
        self.enemies_defeated
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn key_found(&self) -> bool {
        self.key_found
    }

    /// Out of health. Shown on the HUD; the game keeps running.
    pub fn is_depleted(&self) -> bool {
        self.health <= 0
    }

    /// Book a cleared level: the key belongs to the old level.
    pub(crate) fn record_level_clear(&mut self) {
        self.levels_cleared += 1;
        self.key_found = false;
    }
}
