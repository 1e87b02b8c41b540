// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;
use crate::geometry::Vec2;
use crate::glyph::GlyphCell;
use crate::render::{RenderStates, RenderTarget};
use crate::runtime::ColorMode;
use crate::shader::Fragment;

/// Terminal-sized cell buffer. Glyphs arrive in pixels and land in the cell
/// that contains them; `cell_px` is the pixel size of one terminal cell.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cell_px: Vec2,
    color_mode: ColorMode,
    cells: Vec<Cell>,
    gen: u32,
    cell_gen: Vec<u32>,
    blank: Cell,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
    live: Vec<usize>,
}

impl Frame {
    pub fn new(
        width: u16,
        height: u16,
        cell_px: Vec2,
        bg: Option<Color>,
        color_mode: ColorMode,
    ) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        let gen = 1u32;
        Self {
            width,
            height,
            cell_px,
            color_mode,
            cells: vec![blank; len],
            gen,
            cell_gen: vec![gen; len],
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
            live: Vec::new(),
        }
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn background(&self) -> Option<Color> {
        self.blank.bg
    }

    /// Size of the whole frame in pixels.
    #[cfg(test)]
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * self.cell_px.x,
            self.height as f32 * self.cell_px.y,
        )
    }

    fn bump_gen(&mut self) {
        self.gen = self.gen.wrapping_add(1);
        if self.gen == 0 {
            self.cell_gen.fill(0);
            self.gen = 1;
        }
    }

    /// Blanks everything and forces a full redraw.
    pub fn clear_with_bg(&mut self, bg: Option<Color>) {
        self.blank = Cell::blank_with_bg(bg);
        self.bump_gen();
        self.dirty_all = true;
        self.dirty.clear();
        self.live.clear();
    }

    /// Starts a new frame: every cell written during the previous one goes
    /// back to blank and is queued for redraw, the rest stay untouched.
    pub fn begin_frame(&mut self) {
        self.bump_gen();
        let live = std::mem::take(&mut self.live);
        for &i in &live {
            self.mark_dirty(i);
        }
        self.live = live;
        self.live.clear();
    }

    fn mark_dirty(&mut self, i: usize) {
        if !self.dirty_all && self.dirty_map.get(i).copied() == Some(false) {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| {
            if self.cell_gen.get(i).copied() == Some(self.gen) {
                &self.cells[i]
            } else {
                &self.blank
            }
        })
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        if self.cell_gen.get(i).copied() == Some(self.gen) {
            self.cells[i]
        } else {
            self.blank
        }
    }

    /// Terminal cell containing pixel `p`, if it is on screen.
    pub fn cell_at(&self, p: Vec2) -> Option<(u16, u16)> {
        if !(self.cell_px.x > 0.0 && self.cell_px.y > 0.0) || p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let x = (p.x / self.cell_px.x).floor();
        let y = (p.y / self.cell_px.y).floor();
        if x >= self.width as f32 || y >= self.height as f32 {
            return None;
        }
        Some((x as u16, y as u16))
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let fresh = self.cell_gen.get(i).copied() != Some(self.gen);
        let cur = if fresh { self.blank } else { self.cells[i] };
        if cur == cell {
            return;
        }

        self.cells[i] = cell;
        self.cell_gen[i] = self.gen;
        if fresh {
            self.live.push(i);
        }
        self.mark_dirty(i);
    }
}

impl RenderTarget for Frame {
    fn draw_glyph(&mut self, glyph: &GlyphCell, states: &RenderStates<'_>) {
        let Some((x, y)) = self.cell_at(states.transform.apply(glyph.position)) else {
            return;
        };
        let frag = match states.shader {
            Some(shader) => shader.shade(glyph.fill),
            None => Fragment {
                fg: glyph.fill,
                bg: None,
            },
        };
        let mode = self.color_mode;
        let cell = Cell {
            ch: glyph.ch,
            fg: frag.fg.to_terminal(mode),
            bg: frag.bg.and_then(|c| c.to_terminal(mode)).or(self.blank.bg),
            style: glyph.style,
        };
        self.set(x, y, cell);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::color::Rgb;
    use crate::geometry::Transform;
    use crate::glyph::TextStyle;
    use crate::shader::{OutlineShader, Uniform, OUTLINE_COLOUR, OUTLINE_THICKNESS};

    const CELL: Vec2 = Vec2::new(10.0, 20.0);

    fn frame() -> Frame {
        Frame::new(4, 3, CELL, None, ColorMode::TrueColor)
    }

    fn glyph(ch: char, x: f32, y: f32) -> GlyphCell {
        GlyphCell {
            ch,
            fill: Rgb::GREEN,
            size: 20,
            style: TextStyle::BOLD,
            position: Vec2::new(x, y),
        }
    }

    fn cell(ch: char) -> Cell {
        Cell {
            ch,
            fg: None,
            bg: None,
            style: TextStyle::REGULAR,
        }
    }

    #[test]
    fn clear_with_bg_makes_cells_effectively_blank() {
        let mut f = frame();
        f.set(0, 0, cell('x'));
        assert_eq!(f.get(0, 0).unwrap().ch, 'x');
        f.clear_with_bg(None);
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn glyphs_land_in_containing_cell() {
        let mut f = frame();
        let states = RenderStates {
            transform: Transform::from_translation(Vec2::new(10.0, 0.0)),
            shader: None,
        };
        f.draw_glyph(&glyph('q', 15.0, 45.0), &states);
        let c = f.get(2, 2).unwrap();
        assert_eq!(c.ch, 'q');
        assert_eq!(c.fg, Some(Color::Rgb { r: 0, g: 255, b: 0 }));
        assert!(c.style.contains(TextStyle::BOLD));
    }

    #[test]
    fn offscreen_glyphs_are_clipped() {
        let mut f = frame();
        f.clear_dirty();
        let states = RenderStates::default();
        f.draw_glyph(&glyph('a', -1.0, 0.0), &states);
        f.draw_glyph(&glyph('b', 0.0, -20.0), &states);
        f.draw_glyph(&glyph('c', 40.0, 0.0), &states);
        f.draw_glyph(&glyph('d', 0.0, 60.0), &states);
        assert!(f.dirty_indices().is_empty());
    }

    #[test]
    fn shader_outline_becomes_background() {
        let mut shader = OutlineShader::from_source(
            Path::new("outline.frag"),
            "uniform float outline_thickness;\nuniform vec3 outline_colour;\n",
        )
        .unwrap();
        shader.set_uniform(OUTLINE_THICKNESS, Uniform::Float(0.2));
        shader.set_uniform(OUTLINE_COLOUR, Uniform::Vec3([100.0, 100.0, 100.0]));

        let mut f = frame();
        f.draw_glyph(&glyph('z', 0.0, 0.0), &RenderStates::with_shader(&shader));
        assert_eq!(
            f.get(0, 0).unwrap().bg,
            Some(Color::Rgb {
                r: 20,
                g: 20,
                b: 20
            })
        );
    }

    #[test]
    fn begin_frame_blanks_and_redraws_previous_cells() {
        let mut f = frame();
        f.clear_dirty();
        f.set(1, 1, cell('x'));
        f.set(2, 1, cell('y'));
        f.clear_dirty();

        f.begin_frame();
        assert_eq!(f.get(1, 1).unwrap().ch, ' ');
        let mut dirty = f.dirty_indices().to_vec();
        dirty.sort_unstable();
        assert_eq!(dirty, vec![5, 6]);

        f.clear_dirty();
        f.begin_frame();
        assert!(f.dirty_indices().is_empty());
    }

    #[test]
    fn pixel_size_spans_all_cells() {
        assert_eq!(frame().pixel_size(), Vec2::new(40.0, 60.0));
    }
}
