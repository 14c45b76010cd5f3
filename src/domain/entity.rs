/// Directions shared by the player's intent and the spiders' random walk.
///
/// The wire id (1..=4) is the order the spiders sample from,
/// so changing it changes every seeded level's spider paths.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn id(self) -> u8 {
        match self {
            Direction::Up => 1,
            Direction::Down => 2,
            Direction::Left => 3,
            Direction::Right => 4,
        }
    }

    pub fn from_id(id: i64) -> Option<Direction> {
        match id {
            1 => Some(Direction::Up),
            2 => Some(Direction::Down),
            3 => Some(Direction::Left),
            4 => Some(Direction::Right),
            _ => None,
        }
    }

    /// Grid delta, origin top-left (Up decreases y).
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_cover_one_to_four() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_id(d.id() as i64), Some(d));
        }
        assert_eq!(Direction::from_id(0), None);
        assert_eq!(Direction::from_id(5), None);
    }

    #[test]
    fn up_is_negative_y() {
        assert_eq!(Direction::Up.offset(), (0, -1));
        assert_eq!(Direction::Right.offset(), (1, 0));
    }
}
