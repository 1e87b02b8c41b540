// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::warn;

use crate::color::Rgb;
use crate::geometry::{Bounds, Transform, Vec2};
use crate::glyph::{FontSource, GlyphCell, TextStyle};
use crate::render::{Drawable, RenderStates, RenderTarget, Transformable};

/// Glyph used to size the column.
const SAMPLE_GLYPH: char = 'a';

fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    rng.random_range('a'..='z')
}

/// Appearance shared by every column a field spawns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnStyle {
    pub body: Rgb,
    pub head: Rgb,
    pub delay: f32,
    pub character_size: u32,
    pub style: TextStyle,
}

impl Default for ColumnStyle {
    fn default() -> Self {
        Self {
            body: Rgb::GREEN,
            head: Rgb::WHITE,
            delay: 0.05,
            character_size: 20,
            style: TextStyle::BOLD,
        }
    }
}

impl ColumnStyle {
    pub fn build(&self) -> RainColumn {
        let mut col = RainColumn::new();
        col.set_fill_color(self.body, self.head);
        col.set_delay(self.delay);
        col.set_character_size(self.character_size);
        col.set_style(self.style);
        col
    }
}

/// One falling column of glyphs.
///
/// Index 0 is the oldest cell at the top, the last cell is the head. Colors
/// passed to [`RainColumn::set_fill_color`] are only applied on the next
/// recycle tick; cells already on screen keep their color until then.
#[derive(Clone, Debug)]
pub struct RainColumn {
    cells: Vec<GlyphCell>,
    count: usize,
    body: Rgb,
    head: Rgb,
    delay: f32,
    character_size: u32,
    style: TextStyle,
    bounds: Bounds,
    stale: bool,
    last_tick: Instant,
    transform: Transform,
}

impl Default for RainColumn {
    fn default() -> Self {
        Self::new()
    }
}

impl RainColumn {
    pub fn new() -> Self {
        let style = ColumnStyle::default();
        Self {
            cells: Vec::new(),
            count: 1,
            body: style.body,
            head: style.head,
            delay: style.delay,
            character_size: style.character_size,
            style: style.style,
            bounds: Bounds::ZERO,
            stale: true,
            last_tick: Instant::now(),
            transform: Transform::IDENTITY,
        }
    }

    /// Sets the target length and restarts the column empty. Zero is ignored.
    pub fn set_count(&mut self, count: usize) {
        if count > 0 {
            self.count = count;
            self.cells.clear();
        }
        self.stale = true;
    }

    pub fn set_fill_color(&mut self, body: Rgb, head: Rgb) {
        self.body = body;
        self.head = head;
        self.stale = true;
    }

    /// Seconds between recycle ticks; only values strictly inside (0, 1) are
    /// accepted.
    pub fn set_delay(&mut self, delay: f32) {
        if delay > 0.0 && delay < 1.0 {
            self.delay = delay;
        }
        self.stale = true;
    }

    pub fn set_character_size(&mut self, size: u32) {
        self.character_size = size;
        self.stale = true;
    }

    pub fn set_style(&mut self, style: TextStyle) {
        self.style = style;
        self.stale = true;
    }

    pub fn cells(&self) -> &[GlyphCell] {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn body_color(&self) -> Rgb {
        self.body
    }

    pub fn head_color(&self) -> Rgb {
        self.head
    }

    pub fn character_bounds(&self) -> Bounds {
        self.bounds
    }

    #[cfg(test)]
    pub fn metrics_stale(&self) -> bool {
        self.stale
    }

    /// Re-measures the sample glyph. A font failure leaves zero-sized metrics;
    /// it is not retried until a setter marks the metrics stale again.
    pub fn refresh_metrics(&mut self, font: &dyn FontSource) {
        self.bounds = match font.measure(SAMPLE_GLYPH, self.character_size, self.style) {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "glyph metrics unavailable, using zero-sized glyphs");
                Bounds::ZERO
            }
        };
        self.stale = false;
    }

    pub fn update<R: Rng + ?Sized>(&mut self, font: &dyn FontSource, rng: &mut R, delta_time: f32) {
        self.update_at(font, rng, delta_time, Instant::now());
    }

    /// [`RainColumn::update`] against an explicit clock reading. Ticks follow
    /// the wall clock; the frame delta does not drive them.
    pub fn update_at<R: Rng + ?Sized>(
        &mut self,
        font: &dyn FontSource,
        rng: &mut R,
        _delta_time: f32,
        now: Instant,
    ) {
        if self.stale {
            self.refresh_metrics(font);
        }

        let elapsed = now.saturating_duration_since(self.last_tick);
        if elapsed > Duration::from_secs_f32(self.delay) {
            self.tick(rng);
            self.last_tick = now;
        }
    }

    fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.cells.len() < self.count {
            let position = match self.cells.last() {
                Some(last) => last.position + Vec2::new(0.0, self.bounds.height),
                None => Vec2::ZERO,
            };
            self.cells.push(GlyphCell {
                ch: random_letter(rng),
                fill: self.body,
                size: self.character_size,
                style: self.style,
                position,
            });
        }

        for cell in &mut self.cells {
            cell.ch = random_letter(rng);
            cell.fill = self.body;
        }

        if let Some(head) = self.cells.last_mut() {
            head.fill = self.head;
        }
    }
}

impl Transformable for RainColumn {
    fn transform(&self) -> Transform {
        self.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }
}

impl Drawable for RainColumn {
    fn draw(&self, target: &mut dyn RenderTarget, states: &RenderStates<'_>) {
        let states = states.transformed(&self.transform);
        for cell in &self.cells {
            target.draw_glyph(cell, &states);
        }
    }
}
