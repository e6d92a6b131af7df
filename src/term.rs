use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::event::{poll, read, Event, KeyEvent, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, terminal};
use tracing::error;

use crate::canvas::{quadratic_points, Canvas, Rgb, ScoreSink};

/// Each board tile takes this many terminal columns, one row high, so tiles
/// come out roughly square.
const COLS_PER_TILE: u16 = 2;
const PARTICLE_CHAR: char = '*';
const CURVE_CHAR: char = '·';
const CURVE_SAMPLES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Rgb,
    bg: Rgb,
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Rgb::WHITE,
        bg: Rgb::BLACK,
    };
}

/// Character-cell raster of the canvas. Kept apart from the terminal so the
/// rasterising can be tested without a tty.
struct Raster {
    cols: u16,
    rows: u16,
    unit_w: f64,
    unit_h: f64,
    alpha: f64,
    cells: Vec<Cell>,
}

impl Raster {
    /// `tiles` must come from `fit_board`, which keeps the column count
    /// within `u16`.
    fn new(tiles: u16, cell_size: f64) -> Self {
        let cols = tiles * COLS_PER_TILE;
        let rows = tiles;
        Raster {
            cols,
            rows,
            unit_w: cell_size / f64::from(COLS_PER_TILE),
            unit_h: cell_size,
            alpha: 1.0,
            cells: vec![Cell::BLANK; cols as usize * rows as usize],
        }
    }

    fn center(&self, col: u16, row: u16) -> (f64, f64) {
        (
            (f64::from(col) + 0.5) * self.unit_w,
            (f64::from(row) + 0.5) * self.unit_h,
        )
    }

    /// Cell under a point, if the point is on the canvas.
    fn cell_at(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / self.unit_w) as u16;
        let row = (y / self.unit_h) as u16;
        (col < self.cols && row < self.rows).then_some((col, row))
    }

    fn cell_mut(&mut self, col: u16, row: u16) -> &mut Cell {
        &mut self.cells[row as usize * self.cols as usize + col as usize]
    }

    fn get(&self, col: u16, row: u16) -> Cell {
        self.cells[row as usize * self.cols as usize + col as usize]
    }

    /// Paints every cell whose centre passes `inside`. Returns how many
    /// cells were covered.
    fn paint_area(&mut self, color: Rgb, inside: impl Fn(f64, f64) -> bool) -> usize {
        let alpha = self.alpha;
        let mut covered = 0;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let (x, y) = self.center(col, row);
                if !inside(x, y) {
                    continue;
                }
                let cell = self.cell_mut(col, row);
                cell.bg = color.blend(cell.bg, alpha);
                if alpha >= 1.0 {
                    cell.ch = ' ';
                } else {
                    cell.fg = color.blend(cell.fg, alpha);
                }
                covered += 1;
            }
        }
        covered
    }

    fn plot(&mut self, x: f64, y: f64, ch: char, color: Rgb) {
        let alpha = self.alpha;
        if let Some((col, row)) = self.cell_at(x, y) {
            let cell = self.cell_mut(col, row);
            cell.ch = ch;
            cell.fg = color.blend(cell.bg, alpha);
        }
    }
}

impl Canvas for Raster {
    fn width(&self) -> f64 {
        f64::from(self.cols) * self.unit_w
    }

    fn height(&self) -> f64 {
        f64::from(self.rows) * self.unit_h
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        self.paint_area(color, |cx, cy| {
            cx >= x && cx < x + w && cy >= y && cy < y + h
        });
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb) {
        let covered = self.paint_area(color, |x, y| {
            (x - cx).powi(2) + (y - cy).powi(2) <= radius * radius
        });
        // Smaller than a character cell: mark the cell it sits in
        if covered == 0 {
            self.plot(cx, cy, PARTICLE_CHAR, color);
        }
    }

    fn stroke_quadratic(&mut self, from: (f64, f64), ctrl: (f64, f64), to: (f64, f64), color: Rgb) {
        for (x, y) in quadratic_points(from, ctrl, to, CURVE_SAMPLES) {
            self.plot(x, y, CURVE_CHAR, color);
        }
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Rgb) {
        let Some((center_col, row)) = self.cell_at(x, y) else {
            return;
        };
        let len = text.chars().count() as i32;
        let start = i32::from(center_col) - len / 2;
        let alpha = self.alpha;

        for (i, ch) in text.chars().enumerate() {
            let col = start + i as i32;
            if col < 0 || col >= i32::from(self.cols) {
                continue;
            }
            let cell = self.cell_mut(col as u16, row);
            cell.ch = ch;
            cell.fg = color.blend(cell.bg, alpha);
        }
    }
}

/// Board side in tiles. Fails unless the board, its border and the status
/// line fit in a terminal of `size` columns by rows.
fn fit_board(canvas_size: f64, cell_size: f64, size: (u16, u16)) -> Result<u16> {
    let (width, height) = size;
    // Saturating float cast: a huge board just fails the size check
    let tiles = (canvas_size / cell_size).floor() as u64;
    let need_w = tiles
        .saturating_mul(u64::from(COLS_PER_TILE))
        .saturating_add(2);
    let need_h = tiles.saturating_add(3);
    if u64::from(width) < need_w || u64::from(height) < need_h {
        bail!(
            "terminal is {}x{}, the board needs at least {}x{}",
            width,
            height,
            need_w,
            need_h
        );
    }
    Ok(u16::try_from(tiles)?)
}

/// Raw mode and the alternate screen. Whatever is still switched on when
/// the session drops is switched back off, so an early error or a panic
/// does not leave the shell unusable.
struct Session<W: Write> {
    out: W,
    active: bool,
}

impl<W: Write> Session<W> {
    fn new(out: W) -> Self {
        Session { out, active: false }
    }

    fn enter(&mut self) -> Result<()> {
        self.active = true;
        execute!(self.out, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(self.out, cursor::Hide, cursor::DisableBlinking)
            .context("Failed to hide cursor")?;
        Ok(())
    }

    /// Runs every restore step even if an earlier one fails and reports the
    /// first failure.
    fn leave(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let raw = terminal::disable_raw_mode().context("Failed to disable raw mode");
        let screen = execute!(
            self.out,
            ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            LeaveAlternateScreen
        )
        .context("Failed to leave alternate screen");
        raw.and(screen)
    }
}

impl<W: Write> Drop for Session<W> {
    fn drop(&mut self) {
        if let Err(err) = self.leave() {
            error!("failed to restore terminal: {:#}", err);
        }
    }
}

/// Terminal front end: a bordered character raster plus a status line.
pub struct TermCanvas {
    session: Session<Stdout>,
    raster: Raster,
    shown: Vec<Option<Cell>>,
    origin: (u16, u16),
}

impl TermCanvas {
    pub fn new(canvas_size: f64, cell_size: f64) -> Result<Self> {
        let size = terminal::size().context("Failed to read terminal size")?;
        let raster = Raster::new(fit_board(canvas_size, cell_size, size)?, cell_size);

        let shown = vec![None; raster.cells.len()];
        Ok(TermCanvas {
            session: Session::new(stdout()),
            raster,
            shown,
            origin: (1, 1),
        })
    }

    pub fn setup(&mut self) -> Result<()> {
        self.session.enter()?;
        execute!(self.session.out, terminal::Clear(ClearType::All))
            .context("Failed to clear terminal")?;
        self.draw_borders()
    }

    /// Undoes `setup`. Also happens on drop, but calling it reports errors.
    pub fn restore(&mut self) -> Result<()> {
        self.session.leave()
    }

    /// Waits up to `timeout` for input, then drains whatever else is queued.
    pub fn read_key_events(&self, timeout: Duration) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];
        let mut wait = timeout;

        while poll(wait).context("Failed to poll terminal events")? {
            if let Event::Key(ev) = read().context("Failed to read terminal event")? {
                if ev.kind == KeyEventKind::Press {
                    events.push(ev);
                }
            }
            wait = Duration::ZERO;
        }

        Ok(events)
    }

    /// Writes the cells that changed since the last frame.
    pub fn present(&mut self) -> Result<()> {
        for row in 0..self.raster.rows {
            for col in 0..self.raster.cols {
                let idx = row as usize * self.raster.cols as usize + col as usize;
                let cell = self.raster.get(col, row);
                if self.shown[idx] == Some(cell) {
                    continue;
                }
                queue!(
                    self.session.out,
                    cursor::MoveTo(self.origin.0 + col, self.origin.1 + row),
                    SetBackgroundColor(to_color(cell.bg)),
                    SetForegroundColor(to_color(cell.fg)),
                    Print(cell.ch)
                )
                .context("Failed to queue frame")?;
                self.shown[idx] = Some(cell);
            }
        }
        queue!(self.session.out, ResetColor).context("Failed to queue frame")?;
        self.flush()
    }

    fn draw_borders(&mut self) -> Result<()> {
        let width = self.raster.cols + 2;
        let end_y = self.raster.rows + 1;
        let end_x = width - 1;

        for x in 0..width {
            let ch = if x == 0 || x == end_x { '+' } else { '-' };
            queue!(self.session.out, cursor::MoveTo(x, 0), Print(ch))?;
            queue!(self.session.out, cursor::MoveTo(x, end_y), Print(ch))?;
        }
        for y in 1..end_y {
            queue!(self.session.out, cursor::MoveTo(0, y), Print('|'))?;
            queue!(self.session.out, cursor::MoveTo(end_x, y), Print('|'))?;
        }

        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.session.out.flush().context("Failed to flush stdout")
    }
}

impl Canvas for TermCanvas {
    fn width(&self) -> f64 {
        self.raster.width()
    }

    fn height(&self) -> f64 {
        self.raster.height()
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.raster.set_global_alpha(alpha);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        self.raster.fill_rect(x, y, w, h, color);
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb) {
        self.raster.fill_circle(cx, cy, radius, color);
    }

    fn stroke_quadratic(&mut self, from: (f64, f64), ctrl: (f64, f64), to: (f64, f64), color: Rgb) {
        self.raster.stroke_quadratic(from, ctrl, to, color);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Rgb) {
        self.raster.fill_text(text, x, y, color);
    }
}

impl ScoreSink for TermCanvas {
    fn show_score(&mut self, score: u32) -> Result<()> {
        let line = format!("Score: {:<10} arrows/WASD move, P pause, R restart, Q quit", score);
        queue!(
            self.session.out,
            cursor::MoveTo(0, self.raster.rows + 2),
            terminal::Clear(ClearType::CurrentLine),
            Print(line)
        )
        .context("Failed to queue status line")
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.0,
        g: rgb.1,
        b: rgb.2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster() -> Raster {
        // 4x4 tiles of 40 units: 8 columns by 4 rows
        Raster::new(4, 40.0)
    }

    #[test]
    fn test_raster_geometry() {
        let r = raster();
        assert_eq!((r.cols, r.rows), (8, 4));
        assert_eq!((r.width(), r.height()), (160.0, 160.0));
        assert_eq!(r.cell_at(25.0, 50.0), Some((1, 1)));
        assert_eq!(r.cell_at(-1.0, 0.0), None);
        assert_eq!(r.cell_at(160.0, 0.0), None);
    }

    #[test]
    fn test_tile_circle_covers_both_columns() {
        let mut r = raster();
        r.fill_circle(60.0, 60.0, 19.0, Rgb(0, 255, 0));

        assert_eq!(r.get(2, 1).bg, Rgb(0, 255, 0));
        assert_eq!(r.get(3, 1).bg, Rgb(0, 255, 0));
        assert_eq!(r.get(1, 1).bg, Rgb::BLACK);
        assert_eq!(r.get(2, 0).bg, Rgb::BLACK);
    }

    #[test]
    fn test_small_circle_plots_glyph() {
        let mut r = raster();
        r.set_global_alpha(0.5);
        r.fill_circle(45.0, 85.0, 3.0, Rgb(200, 200, 200));

        let cell = r.get(2, 2);
        assert_eq!(cell.ch, PARTICLE_CHAR);
        assert_eq!(cell.fg, Rgb(100, 100, 100));
        assert_eq!(cell.bg, Rgb::BLACK);
    }

    #[test]
    fn test_offscreen_shapes_are_clipped() {
        let mut r = raster();
        r.fill_circle(-100.0, 20.0, 3.0, Rgb::WHITE);
        r.stroke_quadratic((-50.0, -50.0), (-40.0, -40.0), (-30.0, -30.0), Rgb::WHITE);
        assert!(r.cells.iter().all(|c| *c == Cell::BLANK));
    }

    #[test]
    fn test_opaque_fill_clears_glyphs() {
        let mut r = raster();
        r.fill_text("HI", 80.0, 20.0, Rgb::WHITE);
        assert_eq!(r.get(3, 0).ch, 'H');
        assert_eq!(r.get(4, 0).ch, 'I');

        r.fill_rect(0.0, 0.0, 160.0, 160.0, Rgb::BLACK);
        assert!(r.cells.iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn test_fit_board_checks_terminal_size() {
        assert_eq!(fit_board(800.0, 40.0, (80, 24)).unwrap(), 20);
        assert_eq!(fit_board(800.0, 40.0, (42, 23)).unwrap(), 20);

        let err = fit_board(800.0, 40.0, (41, 23)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "terminal is 41x23, the board needs at least 42x23"
        );
    }

    #[test]
    fn test_huge_board_is_rejected_without_overflow() {
        let err = fit_board(40.0 * 40_000.0, 40.0, (u16::MAX, u16::MAX)).unwrap_err();
        assert!(err.to_string().contains("needs at least 80002x40003"));

        let err = fit_board(f64::MAX, 1e-300, (80, 24)).unwrap_err();
        assert!(err.to_string().starts_with("terminal is 80x24"));
    }

    const LEAVE_ALTERNATE_SCREEN: &str = "\x1b[?1049l";

    #[test]
    fn test_dropped_session_leaves_alternate_screen() {
        let mut out = Vec::new();
        {
            let mut session = Session::new(&mut out);
            // Raw mode needs a tty; the session must be undone either way
            let _ = session.enter();
        }
        let written = String::from_utf8_lossy(&out);
        assert!(written.contains("\x1b[?1049h"));
        assert!(written.ends_with(LEAVE_ALTERNATE_SCREEN));
    }

    #[test]
    fn test_session_is_left_only_once() {
        let mut out = Vec::new();
        {
            let mut session = Session::new(&mut out);
            let _ = session.enter();
            let _ = session.leave();
            assert!(!session.active);
        }
        let written = String::from_utf8_lossy(&out);
        assert_eq!(written.matches(LEAVE_ALTERNATE_SCREEN).count(), 1);
    }

    #[test]
    fn test_unused_session_writes_nothing() {
        let mut out = Vec::new();
        drop(Session::new(&mut out));
        assert!(out.is_empty());
    }
}
