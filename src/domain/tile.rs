/// Tile types: terrain and occupant are two orthogonal axes.
/// A cell IS its terrain and HOLDS at most one occupant.
/// Properties are queried via methods so tile semantics stay centralized here.
///
/// Ids are small integers in two separate id spaces, one per axis.
/// The renderer keys its sprite lookup on them.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Terrain {
    #[default]
    None,
    Floor,
    Spikes,
    Wall,
    Exit,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Occupant {
    #[default]
    None,
    Player,
    Spider,
    Lock,
    Key,
    GoldSmall,
    GoldLarge,
}

impl Terrain {
    pub const ALL: [Terrain; 5] = [
        Terrain::None,
        Terrain::Floor,
        Terrain::Spikes,
        Terrain::Wall,
        Terrain::Exit,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Terrain> {
        Terrain::ALL.get(id as usize).copied()
    }

    /// Does this terrain stop every mover?
    pub fn is_solid(self) -> bool {
        matches!(self, Terrain::Wall)
    }
}

impl Occupant {
    pub const ALL: [Occupant; 7] = [
        Occupant::None,
        Occupant::Player,
        Occupant::Spider,
        Occupant::Lock,
        Occupant::Key,
        Occupant::GoldSmall,
        Occupant::GoldLarge,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Occupant> {
        Occupant::ALL.get(id as usize).copied()
    }

    /// Score awarded when the player walks onto this occupant.
    pub fn gold_value(self) -> u32 {
        match self {
            Occupant::GoldSmall => 3,
            Occupant::GoldLarge => 20,
            _ => 0,
        }
    }

    /// Occupants a spider refuses to step onto.
    pub fn blocks_spider(self) -> bool {
        matches!(
            self,
            Occupant::Lock | Occupant::Player | Occupant::Key | Occupant::Spider
        )
    }
}

/// One grid cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Tile {
    pub terrain: Terrain,
    pub occupant: Occupant,
}

impl Tile {
    pub const WALL: Tile = Tile { terrain: Terrain::Wall, occupant: Occupant::None };
    pub const FLOOR: Tile = Tile { terrain: Terrain::Floor, occupant: Occupant::None };

    pub fn new(terrain: Terrain, occupant: Occupant) -> Self {
        Tile { terrain, occupant }
    }

    /// Can the player enter this cell? Walls and locks stop it.
    pub fn admits_player(self) -> bool {
        !self.terrain.is_solid() && self.occupant != Occupant::Lock
    }

    /// Can a spider enter this cell?
    pub fn admits_spider(self) -> bool {
        !self.terrain.is_solid() && !self.occupant.blocks_spider()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_per_axis() {
        for (i, t) in Terrain::ALL.iter().enumerate() {
            assert_eq!(t.id() as usize, i);
            assert_eq!(Terrain::from_id(i as u8), Some(*t));
        }
        for (i, o) in Occupant::ALL.iter().enumerate() {
            assert_eq!(o.id() as usize, i);
            assert_eq!(Occupant::from_id(i as u8), Some(*o));
        }
        assert_eq!(Terrain::from_id(5), None);
        assert_eq!(Occupant::from_id(7), None);
    }

    #[test]
    fn player_blocked_by_wall_and_lock_only() {
        assert!(!Tile::WALL.admits_player());
        assert!(!Tile::new(Terrain::Exit, Occupant::Lock).admits_player());
        assert!(Tile::new(Terrain::Exit, Occupant::None).admits_player());
        assert!(Tile::new(Terrain::Spikes, Occupant::None).admits_player());
        assert!(Tile::new(Terrain::Floor, Occupant::Spider).admits_player());
        assert!(Tile::new(Terrain::Floor, Occupant::Key).admits_player());
    }

    #[test]
    fn spider_avoids_key_player_lock() {
        assert!(!Tile::new(Terrain::Floor, Occupant::Key).admits_spider());
        assert!(!Tile::new(Terrain::Floor, Occupant::Player).admits_spider());
        assert!(!Tile::new(Terrain::Exit, Occupant::Lock).admits_spider());
        assert!(!Tile::new(Terrain::Floor, Occupant::Spider).admits_spider());
        assert!(Tile::new(Terrain::Floor, Occupant::GoldSmall).admits_spider());
        assert!(Tile::new(Terrain::Spikes, Occupant::None).admits_spider());
    }

    #[test]
    fn gold_values() {
        assert_eq!(Occupant::GoldSmall.gold_value(), 3);
        assert_eq!(Occupant::GoldLarge.gold_value(), 20);
        assert_eq!(Occupant::Key.gold_value(), 0);
    }
}
