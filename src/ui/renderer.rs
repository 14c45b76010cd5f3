/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Draws to stderr: stdout belongs to the race protocol.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::tile::{Occupant, Terrain};
use crate::race::protocol::{Race, RaceState};
use crate::sim::world::{Phase, WorldState};
use super::sprites::{self, Sprite};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every "empty" terminal cell, so the
    /// gaps between rows match the cells on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 29, g: 32, b: 33 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }
}

// ── Renderer ──

/// Each grid cell = 2 terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const RACE_ROW: usize = 1;
const MAP_ROW: usize = 3;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb { r, g, b }
}

/// Darkened tint, used as the background under an occupant.
fn shade((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb { r: r / 5, g: g / 5, b: b / 5 }
}

pub struct Renderer {
    writer: BufWriter<io::Stderr>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    tick_rate_ms: u64,
}

impl Renderer {
    pub fn new(tick_rate_ms: u64) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stderr()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            tick_rate_ms: tick_rate_ms.max(1),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState, race: &Race) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for clean transition
        if self.last_phase != Some(world.phase()) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase());
        }

        self.front.clear();
        self.compose_hud(world);
        self.compose_race(world, race);
        match world.phase() {
            Phase::Playing => self.compose_board(world),
            Phase::GameOver => self.compose_game_over(world),
        }
        self.compose_help(world);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    /// Stats row: health, score, levels cleared, spiders defeated, key.
    fn compose_hud(&mut self, w: &WorldState) {
        let s = w.session();
        for x in 0..self.front.width {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, HUD_BG));
        }

        let health_fg = if s.is_depleted() { Color::Rgb { r: 255, g: 60, b: 60 } } else { Color::White };
        let stats: [(Occupant, Option<Terrain>, String, Color); 4] = [
            (Occupant::Player, None, s.health().to_string(), health_fg),
            (Occupant::GoldSmall, None, s.score().to_string(), Color::White),
            (Occupant::None, Some(Terrain::Exit), s.levels_cleared().to_string(), Color::White),
            (Occupant::Spider, None, s.enemies_defeated().to_string(), Color::White),
        ];
        let mut col = 1;
        for (occupant, terrain, value, fg) in stats {
            let icon = terrain
                .and_then(sprites::terrain_sprite)
                .or_else(|| sprites::occupant_sprite(occupant));
            if let Some(icon) = icon {
                self.put_sprite(col, HUD_ROW, icon, HUD_BG);
            }
            self.front.put_str(col + CELL_W + 1, HUD_ROW, &value, fg, HUD_BG);
            col += 10;
        }
        if s.key_found() {
            if let Some(key) = sprites::occupant_sprite(Occupant::Key) {
                self.put_sprite(col, HUD_ROW, key, HUD_BG);
            }
        }
    }

    fn compose_race(&mut self, w: &WorldState, race: &Race) {
        let state = race.state();
        let fg = match state {
            RaceState::Idle => Color::DarkGrey,
            RaceState::Racing => Color::Rgb { r: 80, g: 255, b: 80 },
            RaceState::WaitingForOpponent => Color::Rgb { r: 255, g: 220, b: 50 },
        };
        let mut line = format!(" {}", state.label());
        if let Some(ticks) = race.remaining(w.tick()) {
            let secs = (ticks * self.tick_rate_ms).div_ceil(1000);
            line.push_str(&format!("  {secs:>3}s"));
        }
        if race.opponent_finished() {
            line.push_str("  opponent finished");
        }
        self.front.put_str(0, RACE_ROW, &line, fg, Color::Reset);
    }

    fn compose_board(&mut self, w: &WorldState) {
        let grid = w.grid();
        for y in 0..grid.height() {
            let row = MAP_ROW + y;
            if row >= self.front.height { break; }
            for x in 0..grid.width() {
                let col = x * CELL_W;
                if col + 1 >= self.front.width { break; }
                let (terrain_id, occupant_id) = grid.ids(x, y);
                self.compose_cell(terrain_id, occupant_id, col, row);
            }
        }
    }

    /// Terrain first, occupant on top over a darkened terrain background.
    fn compose_cell(&mut self, terrain_id: u8, occupant_id: u8, col: usize, row: usize) {
        match sprites::sprites_for_ids(terrain_id, occupant_id) {
            (terrain, Some(occupant)) => {
                let bg = terrain.map(|t| shade(t.tint)).unwrap_or(Cell::BASE_BG);
                self.put_sprite(col, row, occupant, bg);
            }
            (Some(terrain), None) => {
                let solid = Terrain::from_id(terrain_id).is_some_and(Terrain::is_solid);
                let bg = if solid { shade(terrain.tint) } else { Cell::BASE_BG };
                self.put_sprite(col, row, terrain, bg);
            }
            (None, None) => {}
        }
    }

    fn put_sprite(&mut self, col: usize, row: usize, sprite: Sprite, bg: Color) {
        let fg = rgb(sprite.tint);
        self.front.set(col, row, Cell::new(sprite.glyph[0], fg, bg));
        self.front.set(col + 1, row, Cell::new(sprite.glyph[1], fg, bg));
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        let red = Color::Rgb { r: 255, g: 60, b: 60 };
        let box_art = [
            "╔════════════════════════╗",
            "║       GAME  OVER       ║",
            "╚════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(4, MAP_ROW + 1 + i, l, red, Color::Reset);
        }
        let s = w.session();
        let lines = [
            format!("Score:            {}", s.score()),
            format!("Levels cleared:   {}", s.levels_cleared()),
            format!("Spiders defeated: {}", s.enemies_defeated()),
        ];
        for (i, l) in lines.iter().enumerate() {
            self.front.put_str(6, MAP_ROW + 5 + i, l, Color::White, Color::Reset);
        }
        self.front.put_str(6, MAP_ROW + 9, "R: play again", Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
    }

    fn compose_help(&mut self, w: &WorldState) {
        let row = MAP_ROW + w.grid().height() + 1;
        if row < self.front.height {
            let help = " Arrows/WASD:Move  Enter:Start  R:Reset  Q:Quit  │  Pad: Start/Select";
            self.front.put_str(0, row, help, Color::DarkGrey, Color::Reset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_buffer_clips() {
        let mut fb = FrameBuffer::new(4, 2);
        fb.put_str(2, 1, "abc", Color::White, Color::Reset);
        assert_eq!(fb.get(2, 1).ch, 'a');
        assert_eq!(fb.get(3, 1).ch, 'b');
        assert!(fb.get(4, 1) == Cell::BLANK);
        fb.set(9, 9, Cell::INVALID);
        fb.clear();
        assert!(fb.cells.iter().all(|c| *c == Cell::BLANK));
    }

    #[test]
    fn reset_background_is_base() {
        let c = Cell::new('x', Color::White, Color::Reset);
        assert_eq!(c.bg, Cell::BASE_BG);
    }
}
