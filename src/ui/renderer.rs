/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer
///   2. Compare each cell with `back` (the previous frame)
///   3. Queue terminal commands only for changed cells, flush once
///   4. Swap front/back
///
/// World coordinates are projected through a `Viewport`: one tile is
/// `CELL_W` columns by `CELL_H` rows, and the view follows the player.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Facing;
use crate::domain::geometry::{Rect, Vec2};
use crate::sim::world::WorldState;

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
const GROUND_BG: Color = Color::Rgb { r: 46, g: 74, b: 52 };
const OPEN_BG: Color = Color::Rgb { r: 18, g: 30, b: 70 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Never equal to a composed cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
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
            *self = FrameBuffer::new(w, h);
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Draw a glyph over an existing cell, keeping its background.
    fn tint(&mut self, x: i32, y: i32, ch: char, fg: Color) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            let bg = self.get(x as usize, y as usize).bg;
            self.set(x, y, Cell::new(ch, fg, bg));
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set((x + i) as i32, y as i32, Cell::new(ch, fg, bg));
        }
    }
}

// ── Viewport: world units → terminal cells ──

/// Terminal columns per tile.
const CELL_W: usize = 4;
/// Terminal rows per tile.
const CELL_H: usize = 2;

/// Rows above the map: HUD line, hint line.
const MAP_ROW: usize = 2;
/// Rows below the map: hotbar strip, help line.
const FOOTER_ROWS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Viewport {
    /// World coordinate shown at the top-left map cell.
    origin: Vec2,
    cols: usize,
    rows: usize,
    /// World units per terminal column / row.
    unit_x: f32,
    unit_y: f32,
}

impl Viewport {
    fn new(tile_size: f32, cols: usize, rows: usize) -> Self {
        Viewport {
            origin: Vec2::ZERO,
            cols,
            rows,
            unit_x: tile_size / CELL_W as f32,
            unit_y: tile_size / CELL_H as f32,
        }
    }

    /// Center on `focus`, clamped so the map edge never scrolls inward.
    /// A map smaller than the view is centered instead.
    fn follow(&mut self, focus: Vec2, map_w: f32, map_h: f32) {
        fn axis(focus: f32, view: f32, map: f32) -> f32 {
            if map <= view {
                -(view - map) / 2.0
            } else {
                (focus - view / 2.0).clamp(0.0, map - view)
            }
        }
        let view_w = self.cols as f32 * self.unit_x;
        let view_h = self.rows as f32 * self.unit_y;
        self.origin = Vec2::new(axis(focus.x, view_w, map_w), axis(focus.y, view_h, map_h));
    }

    fn to_cell(&self, p: Vec2) -> (i32, i32) {
        (
            ((p.x - self.origin.x) / self.unit_x).floor() as i32,
            ((p.y - self.origin.y) / self.unit_y).floor() as i32,
        )
    }

    /// Inclusive cell span of a rectangle; never empty.
    fn span(&self, r: &Rect) -> (i32, i32, i32, i32) {
        let (c0, r0) = self.to_cell(Vec2::new(r.x, r.y));
        let c1 = (((r.right() - self.origin.x) / self.unit_x).ceil() as i32 - 1).max(c0);
        let r1 = (((r.bottom() - self.origin.y) / self.unit_y).ceil() as i32 - 1).max(r0);
        (c0, r0, c1, r1)
    }

    /// World point at the center of a terminal cell.
    fn cell_center(&self, col: i32, row: i32) -> Vec2 {
        Vec2::new(
            self.origin.x + (col as f32 + 0.5) * self.unit_x,
            self.origin.y + (row as f32 + 0.5) * self.unit_y,
        )
    }
}

fn facing_glyph(facing: Facing) -> char {
    match facing {
        Facing::Down => '▼',
        Facing::Up => '▲',
        Facing::Right => '▶',
        Facing::Left => '◀',
    }
}

/// Feet glyph for walk frames 0..3.
const STRIDE: [char; 3] = ['┴', '╱', '╲'];

/// Greedy word wrap to `width` columns.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() { word.chars().count() } else { line.chars().count() + 1 + word.chars().count() };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    key_release: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            key_release: false,
        }
    }

    /// Ask the terminal for key Release events. Returns whether it agreed.
    pub fn enable_key_release(&mut self) -> bool {
        if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            return false;
        }
        self.key_release = execute!(
            self.writer,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();
        self.key_release
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        self.sync_size()?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_release {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Pick up terminal resizes; a changed size forces a full repaint.
    fn sync_size(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h || self.front.cells.is_empty() {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    pub fn render(&mut self, world: &WorldState, debug: bool) -> io::Result<()> {
        self.sync_size()?;

        let ts = world.config.tile_size;
        let map_rows = self.term_h.saturating_sub(MAP_ROW + FOOTER_ROWS).max(1);
        let mut view = Viewport::new(ts, self.term_w, map_rows);
        view.follow(
            world.player.center(),
            world.grid.width() as f32 * ts,
            world.grid.height() as f32 * ts,
        );

        self.front.clear();
        self.compose_map(world, &view);
        self.compose_objects(world, &view);
        self.compose_player(world, &view);
        if debug {
            self.compose_debug(world, &view);
        }
        self.compose_hud(world, debug);
        self.compose_dialog(world);
        self.compose_hotbar(world);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors, never ResetColor (terminal default may differ from BASE_BG)
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

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

    fn compose_map(&mut self, w: &WorldState, view: &Viewport) {
        let ts = w.config.tile_size;
        for row in 0..view.rows as i32 {
            for col in 0..view.cols as i32 {
                let p = view.cell_center(col, row);
                let (tx, ty) = ((p.x / ts).floor() as i64, (p.y / ts).floor() as i64);
                let cell = if !w.grid.contains(tx, ty) {
                    Cell::BLANK
                } else if w.grid.is_solid(tx, ty) {
                    Cell::new(' ', Color::White, GROUND_BG)
                } else {
                    let ripple = if (col + row) % 3 == 0 { '~' } else { ' ' };
                    Cell::new(ripple, Color::Rgb { r: 70, g: 100, b: 170 }, OPEN_BG)
                };
                self.front.set(col, row + MAP_ROW as i32, cell);
            }
        }
    }

    fn compose_objects(&mut self, w: &WorldState, view: &Viewport) {
        for obj in &w.objects {
            let (c0, r0, c1, r1) = view.span(&obj.detection());
            let talking = w.dialog().is_some_and(|d| d.id == obj.id);
            let fg = if talking { Color::Yellow } else { Color::Rgb { r: 230, g: 230, b: 240 } };
            for row in r0..=r1 {
                for col in c0..=c1 {
                    self.front.tint(col, row + MAP_ROW as i32, '▓', fg);
                }
            }
            let label: Vec<char> = obj.name.chars().collect();
            for (i, ch) in label.iter().enumerate() {
                let col = c0 + i as i32;
                if col > c1 { break; }
                self.front.tint(col, r0 + MAP_ROW as i32, *ch, Color::Black);
            }
        }
    }

    fn compose_player(&mut self, w: &WorldState, view: &Viewport) {
        let p = &w.player;
        let (c0, r0, c1, r1) = view.span(&p.bound());
        let fg = Color::Rgb { r: 255, g: 150, b: 200 };
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.front.tint(col, row + MAP_ROW as i32, '█', fg);
            }
        }
        let (cc, cr) = view.to_cell(p.center());
        self.front.tint(cc, cr + MAP_ROW as i32, facing_glyph(p.anim.facing), Color::Black);
        if r1 > cr {
            self.front.tint(cc, r1 + MAP_ROW as i32, STRIDE[p.anim.displayed_frame()], Color::Black);
        }
    }

    /// Collision footprint in red, detection zone in blue.
    fn compose_debug(&mut self, w: &WorldState, view: &Viewport) {
        let outline = |buf: &mut FrameBuffer, r: &Rect, ch: char, fg: Color| {
            let (c0, r0, c1, r1) = view.span(r);
            for row in r0..=r1 {
                for col in c0..=c1 {
                    if row == r0 || row == r1 || col == c0 || col == c1 {
                        buf.tint(col, row + MAP_ROW as i32, ch, fg);
                    }
                }
            }
        };
        for obj in &w.objects {
            outline(&mut self.front, &obj.detection(), '+', Color::Blue);
        }
        outline(&mut self.front, &w.player.detection(), '+', Color::Blue);
        outline(&mut self.front, &w.player.collision(), '▬', Color::Red);
    }

    fn compose_hud(&mut self, w: &WorldState, debug: bool) {
        let mut hud = String::from(" CALLIE");
        if debug {
            let pos = w.player.position;
            let (col, row) = w.player_tile();
            let frame = w.player.frame_rect();
            hud.push_str(&format!(
                "   pos ({:.1}, {:.1})   tile ({col}, {row})   sheet ({}, {})   tick {}",
                pos.x,
                pos.y,
                (frame.x / frame.w).round(),
                (frame.y / frame.h).round(),
                w.tick
            ));
        }
        self.front.put_str(0, 0, &hud, Color::Rgb { r: 180, g: 180, b: 200 }, BASE_BG);

        if w.interaction.interaction_available() {
            self.front.put_str(1, 1, "Object Detected!", Color::Green, BASE_BG);
        }
    }

    fn compose_dialog(&mut self, w: &WorldState) {
        let Some(obj) = w.dialog() else { return };

        let box_w = (self.term_w * 6 / 10).max(12).min(self.term_w);
        let inner = box_w.saturating_sub(4).max(1);
        let lines = wrap(&obj.dialog, inner);
        let box_h = lines.len() + 2;
        let x0 = (self.term_w - box_w) / 2;
        let y0 = self.term_h.saturating_sub(FOOTER_ROWS + box_h + 1);

        let fg = Color::White;
        let bg = Color::Black;
        for dy in 0..box_h {
            let row: String = (0..box_w)
                .map(|dx| match (dy, dx) {
                    (0, 0) => '┌',
                    (0, x) if x == box_w - 1 => '┐',
                    (y, 0) if y == box_h - 1 => '└',
                    (y, x) if y == box_h - 1 && x == box_w - 1 => '┘',
                    (0, _) => '─',
                    (y, _) if y == box_h - 1 => '─',
                    (_, 0) => '│',
                    (_, x) if x == box_w - 1 => '│',
                    _ => ' ',
                })
                .collect();
            self.front.put_str(x0, y0 + dy, &row, fg, bg);
        }
        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(x0 + 2, y0 + 1 + i, line, fg, bg);
        }
    }

    fn compose_hotbar(&mut self, w: &WorldState) {
        let y = self.term_h.saturating_sub(FOOTER_ROWS);
        let mut x = 1;
        for (i, slot) in w.hotbar.slots().iter().enumerate() {
            let name = slot.as_ref().map_or("---", |item| item.name.as_str());
            let label = format!("[{} {}]", i + 1, name);
            let (fg, bg) = if i == w.hotbar.selected() {
                (Color::Black, Color::Rgb { r: 240, g: 200, b: 90 })
            } else {
                (Color::Rgb { r: 200, g: 200, b: 210 }, BASE_BG)
            };
            self.front.put_str(x, y, &label, fg, bg);
            x += label.chars().count() + 1;
        }

        let help = " WASD/Arrows move  E talk  1-9/Tab hotbar  F3 debug  Esc quit";
        self.front.put_str(0, y + 1, help, Color::DarkGrey, BASE_BG);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_clamps_to_map_edges() {
        // 40 cols x 10 rows of a 128 tile → 1280 x 640 world units visible
        let mut v = Viewport::new(128.0, 40, 10);
        v.follow(Vec2::new(100.0, 100.0), 4000.0, 4000.0);
        assert_eq!(v.origin, Vec2::ZERO);

        v.follow(Vec2::new(3990.0, 3990.0), 4000.0, 4000.0);
        assert_eq!(v.origin, Vec2::new(4000.0 - 1280.0, 4000.0 - 640.0));

        v.follow(Vec2::new(2000.0, 2000.0), 4000.0, 4000.0);
        assert_eq!(v.origin, Vec2::new(2000.0 - 640.0, 2000.0 - 320.0));
    }

    #[test]
    fn small_map_is_centered() {
        let mut v = Viewport::new(128.0, 40, 10);
        v.follow(Vec2::new(10.0, 10.0), 896.0, 512.0);
        assert_eq!(v.origin, Vec2::new(-(1280.0 - 896.0) / 2.0, -(640.0 - 512.0) / 2.0));
    }

    #[test]
    fn tile_projects_to_cell_block() {
        let v = Viewport::new(128.0, 40, 10);
        assert_eq!(v.to_cell(Vec2::new(128.0, 128.0)), (4, 2));
        assert_eq!(v.span(&Rect::new(128.0, 128.0, 128.0, 128.0)), (4, 2, 7, 3));
        // thin rect still covers one cell
        assert_eq!(v.span(&Rect::new(130.0, 130.0, 2.0, 2.0)), (4, 2, 4, 2));
    }

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(wrap("Penger: I'm Penger. Nice to meet you!", 16), vec![
            "Penger: I'm".to_string(),
            "Penger. Nice to".to_string(),
            "meet you!".to_string(),
        ]);
        assert!(wrap("", 10).is_empty());
    }

    #[test]
    fn diff_buffer_ignores_out_of_range_writes() {
        let mut b = FrameBuffer::new(3, 2);
        b.set(-1, 0, Cell::new('x', Color::Red, BASE_BG));
        b.set(3, 1, Cell::new('x', Color::Red, BASE_BG));
        assert!(b.cells.iter().all(|c| *c == Cell::BLANK));
        b.tint(1, 1, 'o', Color::Green);
        assert_eq!(b.get(1, 1), Cell::new('o', Color::Green, BASE_BG));
    }
}
