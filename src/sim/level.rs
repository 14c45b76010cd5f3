/// Procedural level generator.
///
/// ## Passes (in order):
///   1. Outer ring → Wall
///   2. Interior: Wall (p=0.20) else Floor; Floor then rolls, first hit wins:
///        GoldSmall 0.05 → GoldLarge 0.01 → Spider 0.03 → Spikes 0.02
///   3. Exit + Lock on a random interior cell
///   4. Floor + Key on a random interior cell
///   5. Floor + Player on a random interior cell
///
/// Passes 3–5 overwrite whatever pass 2 left on their cell. Among themselves
/// they re-roll onto a fresh cell while the interior has room for all three,
/// so the exit, the key and the player always coexist. A re-roll costs two
/// extra RNG draws, so a seeded level can consume more draws than a plain
/// three-placement generator and later rolls shift accordingly.
///
/// No solvability check: walls may cut the player off from the key or exit.

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::grid::Grid;
use crate::domain::rng::Rng;
use crate::domain::tile::{Occupant, Terrain, Tile};

/// Smallest side that still has an interior cell.
pub const MIN_SIDE: usize = 3;
/// Below this the interior is too cramped to be much of a maze.
pub const COMFORTABLE_SIDE: usize = 5;
/// Largest side accepted from config or flags; keeps `width * height` small.
pub const MAX_SIDE: usize = 1024;

const WALL_CHANCE: f64 = 0.2;
const GOLD_SMALL_CHANCE: f64 = 0.05;
const GOLD_LARGE_CHANCE: f64 = 0.01;
const SPIDER_CHANCE: f64 = 0.03;
const SPIKES_CHANCE: f64 = 0.02;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("level {width}x{height} is too small (each side needs at least 3 cells)")]
    TooSmall { width: usize, height: usize },
    #[error("level {width}x{height} is too large (each side may be at most {} cells)", MAX_SIDE)]
    TooLarge { width: usize, height: usize },
}

/// Check level dimensions without generating anything.
pub fn validate_size(width: usize, height: usize) -> Result<(), LevelError> {
    if width < MIN_SIDE || height < MIN_SIDE {
        return Err(LevelError::TooSmall { width, height });
    }
    if width > MAX_SIDE || height > MAX_SIDE {
        return Err(LevelError::TooLarge { width, height });
    }
    Ok(())
}

/// Generate a fresh level.
pub fn generate(width: usize, height: usize, rng: &mut Rng) -> Result<Grid, LevelError> {
    validate_size(width, height)?;
    if width < COMFORTABLE_SIDE || height < COMFORTABLE_SIDE {
        warn!(width, height, "degenerate level size, special placements may overlap");
    }

    let mut grid = Grid::new(width, height);
    stamp_border(&mut grid);
    fill_interior(&mut grid, rng);

    let interior_cells = (width - 2) * (height - 2);
    let mut taken: Vec<(usize, usize)> = Vec::with_capacity(3);
    let specials = [
        Tile::new(Terrain::Exit, Occupant::Lock),
        Tile::new(Terrain::Floor, Occupant::Key),
        Tile::new(Terrain::Floor, Occupant::Player),
    ];
    for tile in specials {
        let (x, y) = pick_cell(&grid, rng, &taken, interior_cells >= specials.len());
        grid.set(x, y, tile);
        taken.push((x, y));
    }

    debug!(
        width,
        height,
        exit = ?taken[0],
        key = ?taken[1],
        player = ?taken[2],
        spiders = grid.count_occupant(Occupant::Spider),
        "level generated"
    );
    Ok(grid)
}

// ══════════════════════════════════════════════════════════════
// Passes
// ══════════════════════════════════════════════════════════════

fn stamp_border(grid: &mut Grid) {
    let (w, h) = (grid.width(), grid.height());
    for x in 0..w {
        grid.set(x, 0, Tile::WALL);
        grid.set(x, h - 1, Tile::WALL);
    }
    for y in 0..h {
        grid.set(0, y, Tile::WALL);
        grid.set(w - 1, y, Tile::WALL);
    }
}

fn fill_interior(grid: &mut Grid, rng: &mut Rng) {
    for y in 1..grid.height() - 1 {
        for x in 1..grid.width() - 1 {
            grid.set(x, y, roll_tile(rng));
        }
    }
}

/// One interior cell. The item rolls short-circuit in priority order.
fn roll_tile(rng: &mut Rng) -> Tile {
    if rng.chance(WALL_CHANCE) {
        return Tile::WALL;
    }
    let mut tile = Tile::FLOOR;
    if rng.chance(GOLD_SMALL_CHANCE) {
        tile.occupant = Occupant::GoldSmall;
    } else if rng.chance(GOLD_LARGE_CHANCE) {
        tile.occupant = Occupant::GoldLarge;
    } else if rng.chance(SPIDER_CHANCE) {
        tile.occupant = Occupant::Spider;
    } else if rng.chance(SPIKES_CHANCE) {
        tile.terrain = Terrain::Spikes;
    }
    tile
}

/// Uniform interior cell; with `distinct`, re-roll cells already in `taken`.
fn pick_cell(grid: &Grid, rng: &mut Rng, taken: &[(usize, usize)], distinct: bool) -> (usize, usize) {
    loop {
        let x = rng.uniform_index(1, grid.width() - 2);
        let y = rng.uniform_index(1, grid.height() - 2);
        if !distinct || !taken.contains(&(x, y)) {
            return (x, y);
        }
    }
}
