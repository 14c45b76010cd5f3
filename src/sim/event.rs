/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound; the driver logs them.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PlayerMoved { x: usize, y: usize },
    PlayerBlocked { x: usize, y: usize },
    GoldPicked { x: usize, y: usize, value: u32 },
    KeyPicked { x: usize, y: usize },
    SpikesHit { x: usize, y: usize },
    SpiderDefeated { x: usize, y: usize },
    LockOpened { x: usize, y: usize },
    ExitReached { x: usize, y: usize },
}
