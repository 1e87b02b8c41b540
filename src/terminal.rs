// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;
use crate::geometry::Vec2;
use crate::glyph::TextStyle;

/// Cell size assumed when the terminal does not report its pixel dimensions.
pub const FALLBACK_CELL_PX: Vec2 = Vec2::new(9.0, 18.0);

/// Terminal size in cells together with the pixel size of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub cell: Vec2,
}

impl Viewport {
    pub fn from_pixels(cols: u16, rows: u16, width_px: u16, height_px: u16) -> Self {
        let cell = if cols > 0 && rows > 0 && width_px > 0 && height_px > 0 {
            Vec2::new(
                width_px as f32 / cols as f32,
                height_px as f32 / rows as f32,
            )
        } else {
            FALLBACK_CELL_PX
        };
        Self { cols, rows, cell }
    }

    /// Window size in pixels.
    pub fn window(&self) -> Vec2 {
        Vec2::new(
            self.cols as f32 * self.cell.x,
            self.rows as f32 * self.cell.y,
        )
    }
}

/// Emits the attribute changes needed to go from `cur` to `next`.
fn queue_style(out: &mut Stdout, cur: &mut TextStyle, next: TextStyle) -> Result<()> {
    if *cur == next {
        return Ok(());
    }
    if *cur != TextStyle::REGULAR {
        out.queue(SetAttribute(Attribute::NormalIntensity))?;
        out.queue(SetAttribute(Attribute::NoItalic))?;
        out.queue(SetAttribute(Attribute::NoUnderline))?;
    }
    if next.contains(TextStyle::BOLD) {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if next.contains(TextStyle::ITALIC) {
        out.queue(SetAttribute(Attribute::Italic))?;
    }
    if next.contains(TextStyle::UNDERLINED) {
        out.queue(SetAttribute(Attribute::Underlined))?;
    }
    *cur = next;
    Ok(())
}

fn queue_colors(
    out: &mut Stdout,
    cur_fg: &mut Option<Color>,
    cur_bg: &mut Option<Color>,
    cell: &Cell,
) -> Result<()> {
    if cell.fg != *cur_fg {
        out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
        *cur_fg = cell.fg;
    }
    if cell.bg != *cur_bg {
        out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
        *cur_bg = cell.bg;
    }
    Ok(())
}

struct LastFrame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl LastFrame {
    fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::blank_with_bg(None); len],
        }
    }
}

pub struct Terminal {
    stdout: Stdout,
    last: Option<LastFrame>,
    run_buf: String,
    row_dirty: Vec<Vec<usize>>,
    touched_rows: Vec<u16>,
}

fn restore(out: &mut Stdout) {
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore(&mut out);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last: None,
            run_buf: String::with_capacity(64),
            row_dirty: Vec::new(),
            touched_rows: Vec::new(),
        })
    }

    /// Current size, with pixel geometry when the terminal reports it.
    pub fn viewport(&self) -> Result<Viewport> {
        match terminal::window_size() {
            Ok(ws) if ws.columns > 0 && ws.rows > 0 => Ok(Viewport::from_pixels(
                ws.columns, ws.rows, ws.width, ws.height,
            )),
            _ => {
                let (cols, rows) = terminal::size()?;
                Ok(Viewport::from_pixels(cols, rows, 0, 0))
            }
        }
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Writes `frame` out, re-emitting only the cells that differ from what
    /// is already on screen unless a full repaint is cheaper or required.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size_changed = self
            .last
            .as_ref()
            .map(|l| l.width != frame.width || l.height != frame.height)
            .unwrap_or(true);

        let total_cells = frame.width as usize * frame.height as usize;
        let dirty_is_large = total_cells > 0 && frame.dirty_indices().len() >= (total_cells / 3);

        match self.last.take() {
            Some(last) if !size_changed && !frame.is_dirty_all() && !dirty_is_large => {
                let mut last = last;
                let res = self.draw_dirty(frame, &mut last);
                self.last = Some(last);
                res?;
            }
            prev => {
                let mut last = match prev {
                    Some(l) if !size_changed => l,
                    _ => {
                        self.stdout
                            .queue(terminal::Clear(terminal::ClearType::All))?;
                        LastFrame::new(frame.width, frame.height)
                    }
                };
                let res = self.draw_full(frame, &mut last);
                self.last = Some(last);
                res?;
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn draw_full(&mut self, frame: &Frame, last: &mut LastFrame) -> Result<()> {
        let mut cur_fg: Option<Color> = None;
        let mut cur_bg: Option<Color> = None;
        let mut cur_style = TextStyle::REGULAR;

        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                queue_colors(&mut self.stdout, &mut cur_fg, &mut cur_bg, &cell)?;
                queue_style(&mut self.stdout, &mut cur_style, cell.style)?;
                self.stdout.queue(Print(cell.ch))?;
                last.cells[idx] = cell;
            }
        }
        Ok(())
    }

    fn draw_dirty(&mut self, frame: &Frame, last: &mut LastFrame) -> Result<()> {
        let mut cur_fg: Option<Color> = None;
        let mut cur_bg: Option<Color> = None;
        let mut cur_style = TextStyle::REGULAR;
        let mut cur_pos: Option<(u16, u16)> = None;
        let width = frame.width as usize;

        if self.row_dirty.len() != frame.height as usize {
            self.row_dirty = vec![Vec::new(); frame.height as usize];
        }
        for r in &mut self.row_dirty {
            r.clear();
        }
        self.touched_rows.clear();

        for &idx in frame.dirty_indices() {
            let y = (idx / width) as u16;
            if y >= frame.height {
                continue;
            }
            let row = &mut self.row_dirty[y as usize];
            if row.is_empty() {
                self.touched_rows.push(y);
            }
            row.push(idx);
        }
        self.touched_rows.sort_unstable();

        for &y0 in &self.touched_rows {
            let row = &mut self.row_dirty[y0 as usize];
            row.sort_unstable();

            let mut i = 0usize;
            while i < row.len() {
                let idx0 = row[i];
                let cell0 = frame.cell_at_index(idx0);
                if last.cells.get(idx0) == Some(&cell0) {
                    i += 1;
                    continue;
                }
                last.cells[idx0] = cell0;

                // Extend into a run of adjacent changed cells sharing attributes.
                self.run_buf.clear();
                self.run_buf.push(cell0.ch);
                let mut run_end = idx0;
                let mut j = i + 1;
                while j < row.len() && row[j] == run_end + 1 {
                    let cell1 = frame.cell_at_index(row[j]);
                    if last.cells.get(row[j]) == Some(&cell1)
                        || cell1.fg != cell0.fg
                        || cell1.bg != cell0.bg
                        || cell1.style != cell0.style
                    {
                        break;
                    }
                    self.run_buf.push(cell1.ch);
                    last.cells[row[j]] = cell1;
                    run_end = row[j];
                    j += 1;
                }

                let x0 = (idx0 % width) as u16;
                if cur_pos != Some((x0, y0)) {
                    self.stdout.queue(cursor::MoveTo(x0, y0))?;
                }
                queue_colors(&mut self.stdout, &mut cur_fg, &mut cur_bg, &cell0)?;
                queue_style(&mut self.stdout, &mut cur_style, cell0.style)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;

                let next_x = x0.saturating_add((run_end - idx0 + 1) as u16);
                cur_pos = (next_x < frame.width).then_some((next_x, y0));
                i = j;
            }
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore(&mut self.stdout);
    }
}

pub fn restore_terminal_best_effort() {
    restore(&mut stdout());
}
