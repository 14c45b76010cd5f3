/// Grid: one level's cells, row-major, origin top-left.
///
/// Reads outside the grid answer a Wall tile, so movers never need
/// their own bounds checks.

use super::entity::Direction;
use super::tile::{Occupant, Terrain, Tile};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl Grid {
    /// A grid of default (None/None) cells.
    pub fn new(width: usize, height: usize) -> Self {
        Grid { width, height, cells: vec![Tile::default(); width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Is (x, y) on the outermost ring?
    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Tile {
        if self.in_bounds(x, y) {
            self.cells[y * self.width + x]
        } else {
            Tile::WALL
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if self.in_bounds(x, y) {
            self.cells[y * self.width + x] = tile;
        }
    }

    pub fn set_terrain(&mut self, x: usize, y: usize, terrain: Terrain) {
        if self.in_bounds(x, y) {
            self.cells[y * self.width + x].terrain = terrain;
        }
    }

    pub fn set_occupant(&mut self, x: usize, y: usize, occupant: Occupant) {
        if self.in_bounds(x, y) {
            self.cells[y * self.width + x].occupant = occupant;
        }
    }

    /// The cell one step from (x, y), or None when that would leave the grid.
    pub fn neighbor(&self, x: usize, y: usize, dir: Direction) -> Option<(usize, usize)> {
        let (dx, dy) = dir.offset();
        let nx = x.checked_add_signed(dx as isize)?;
        let ny = y.checked_add_signed(dy as isize)?;
        self.in_bounds(nx, ny).then_some((nx, ny))
    }

    /// Every cell with its coordinates, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        let w = self.width;
        self.cells.iter().enumerate().map(move |(i, t)| (i % w, i / w, *t))
    }

    /// First cell (row-major) holding `occupant`.
    pub fn find_occupant(&self, occupant: Occupant) -> Option<(usize, usize)> {
        self.cells().find(|&(_, _, t)| t.occupant == occupant).map(|(x, y, _)| (x, y))
    }

    pub fn count_occupant(&self, occupant: Occupant) -> usize {
        self.cells.iter().filter(|t| t.occupant == occupant).count()
    }

    /// Render interface: (terrain id, occupant id) of one cell.
    pub fn ids(&self, x: usize, y: usize) -> (u8, u8) {
        let t = self.get(x, y);
        (t.terrain.id(), t.occupant.id())
    }
}
