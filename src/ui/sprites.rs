/// Sprite table: one entry per terrain id and per occupant id.
///
/// `region` is the (column, row) of the 16×16 cell in the sprite sheet the
/// graphics were drawn for; the terminal renderer uses `glyph` and `tint`.
/// Id 0 on either axis draws nothing.

use crate::domain::tile::{Occupant, Terrain};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Sprite {
    pub region: (u8, u8),
    pub tint: (u8, u8, u8),
    /// Two terminal columns per grid cell.
    pub glyph: [char; 2],
}

const fn sprite(region: (u8, u8), tint: (u8, u8, u8), glyph: [char; 2]) -> Sprite {
    Sprite { region, tint, glyph }
}

const BLUE: (u8, u8, u8) = (124, 175, 194);
const STONE: (u8, u8, u8) = (216, 216, 216);
const GOLD: (u8, u8, u8) = (247, 202, 136);

pub fn terrain_sprite(terrain: Terrain) -> Option<Sprite> {
    match terrain {
        Terrain::None => None,
        Terrain::Floor => Some(sprite((10, 7), BLUE, ['·', ' '])),
        Terrain::Spikes => Some(sprite((11, 6), BLUE, ['^', '^'])),
        Terrain::Wall => Some(sprite((2, 8), STONE, ['█', '█'])),
        Terrain::Exit => Some(sprite((5, 7), STONE, ['[', ']'])),
    }
}

pub fn occupant_sprite(occupant: Occupant) -> Option<Sprite> {
    match occupant {
        Occupant::None => None,
        Occupant::Player => Some(sprite((3, 0), (161, 181, 108), ['@', ' '])),
        Occupant::Spider => Some(sprite((3, 3), (186, 139, 175), ['ж', ' '])),
        Occupant::Lock => Some(sprite((4, 7), STONE, ['▒', '▒'])),
        Occupant::Key => Some(sprite((2, 11), GOLD, ['-', 'o'])),
        Occupant::GoldSmall => Some(sprite((0, 9), GOLD, ['$', ' '])),
        Occupant::GoldLarge => Some(sprite((0, 10), GOLD, ['$', '$'])),
    }
}

/// Lookup by the ids `Grid::ids` hands out. Unknown ids draw nothing.
pub fn sprites_for_ids(terrain_id: u8, occupant_id: u8) -> (Option<Sprite>, Option<Sprite>) {
    (
        Terrain::from_id(terrain_id).and_then(terrain_sprite),
        Occupant::from_id(occupant_id).and_then(occupant_sprite),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_id_has_an_entry() {
        for t in Terrain::ALL {
            assert_eq!(terrain_sprite(t).is_some(), t != Terrain::None, "{t:?}");
        }
        for o in Occupant::ALL {
            assert_eq!(occupant_sprite(o).is_some(), o != Occupant::None, "{o:?}");
        }
    }

    #[test]
    fn tints_match_sheet() {
        assert_eq!(terrain_sprite(Terrain::Floor).map(|s| s.tint), Some((124, 175, 194)));
        assert_eq!(occupant_sprite(Occupant::Player).map(|s| s.region), Some((3, 0)));
        assert_eq!(occupant_sprite(Occupant::Key).map(|s| s.tint), Some((247, 202, 136)));
    }

    #[test]
    fn ids_resolve_through_both_axes() {
        let (t, o) = sprites_for_ids(Terrain::Exit.id(), Occupant::Lock.id());
        assert_eq!(t.map(|s| s.region), Some((5, 7)));
        assert_eq!(o.map(|s| s.region), Some((4, 7)));
        assert_eq!(sprites_for_ids(200, 200), (None, None));
    }
}
