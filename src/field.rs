// Copyright (c) 2026 rezky_nightky

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, warn};

use crate::geometry::{Bounds, Vec2};
use crate::glyph::FontSource;
use crate::rain::{ColumnStyle, RainColumn};
use crate::render::{Drawable, RenderStates, RenderTarget, Transformable};

/// Columns spawned per horizontal grid cell.
const COLUMNS_PER_SLOT: f32 = 1.5;

/// Window space divided into glyph-sized cells. Only used to pick spawn
/// coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Grid {
    pub columns: u32,
    pub rows: u32,
}

impl Grid {
    #[cfg(test)]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// How many whole glyphs fit in `window`. Degenerate glyphs fit nowhere.
    pub fn fit(window: Vec2, glyph: Bounds) -> Self {
        if glyph.is_degenerate() || !(window.x > 0.0 && window.y > 0.0) {
            return Self::default();
        }
        Self {
            columns: (window.x / glyph.width).floor() as u32,
            rows: (window.y / glyph.height).floor() as u32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns == 0 || self.rows == 0
    }

    /// Pixel size of one grid cell once stretched over `window`.
    pub fn cell_size(&self, window: Vec2) -> Vec2 {
        if self.is_empty() {
            return Vec2::ZERO;
        }
        Vec2::new(
            window.x / self.columns as f32,
            window.y / self.rows as f32,
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    pub style: ColumnStyle,
    pub min_count: usize,
    pub max_count: usize,
    /// Pixels every column falls per frame, independent of frame time.
    pub step: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            style: ColumnStyle::default(),
            min_count: 2,
            max_count: 30,
            step: 2.0,
        }
    }
}

impl FieldConfig {
    fn count_bounds(&self) -> (usize, usize) {
        let lo = self.min_count.max(1);
        (lo, self.max_count.max(lo))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Start {
    Above,
    Inside,
    Recycled,
}

fn spawn<R: Rng + ?Sized>(
    col: &mut RainColumn,
    rng: &mut R,
    grid: Grid,
    window: Vec2,
    config: &FieldConfig,
    start: Start,
) {
    let (lo, hi) = config.count_bounds();
    let count = rng.random_range(lo..=hi);
    col.set_count(count);

    let cell = grid.cell_size(window);
    let x = rng.random_range(0..grid.columns.max(1)) as f32 * cell.x;
    let rows = grid.rows.max(1);
    let y = match start {
        Start::Above => -(rng.random_range(1..=rows) as f32) * cell.y,
        Start::Inside => rng.random_range(0..rows) as f32 * cell.y,
        Start::Recycled => {
            let above = count as f32 + rng.random_range(1..=rows) as f32;
            (-above * cell.y).min(-1.0)
        }
    };
    col.set_position(Vec2::new(x, y));
}

/// Seeds a generator from the wall clock; runs are not meant to repeat.
pub fn clock_seeded_rng() -> StdRng {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x1234567);
    StdRng::seed_from_u64(seed)
}

/// All rain columns on screen, plus the generator and font they share.
pub struct Field {
    columns: Vec<RainColumn>,
    grid: Grid,
    window: Vec2,
    config: FieldConfig,
    rng: StdRng,
    font: Box<dyn FontSource>,
}

impl Field {
    pub fn new(config: FieldConfig, font: Box<dyn FontSource>, rng: StdRng) -> Self {
        Self {
            columns: Vec::new(),
            grid: Grid::default(),
            window: Vec2::ZERO,
            config,
            rng,
            font,
        }
    }

    pub fn columns(&self) -> &[RainColumn] {
        &self.columns
    }

    #[cfg(test)]
    pub fn columns_mut(&mut self) -> &mut [RainColumn] {
        &mut self.columns
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn window(&self) -> Vec2 {
        self.window
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn set_font(&mut self, font: Box<dyn FontSource>) {
        self.font = font;
    }

    /// Measures one glyph in the column style and derives the grid for
    /// `window`.
    pub fn measure_grid(&self, window: Vec2) -> Grid {
        let mut sample = self.config.style.build();
        sample.refresh_metrics(self.font.as_ref());
        let glyph = sample.character_bounds();
        let grid = Grid::fit(window, glyph);
        debug!(?window, ?glyph, ?grid, "measured layout grid");
        grid
    }

    /// Replaces every column with a fresh spawn over `grid`. Even columns
    /// start above the window so they enter staggered, odd ones start inside
    /// it so the first frame is not empty.
    pub fn populate(&mut self, grid: Grid, window: Vec2) {
        self.columns.clear();
        self.grid = grid;
        self.window = window;

        if grid.is_empty() {
            warn!(?window, "layout grid is empty, no rain columns spawned");
            return;
        }

        let n = (grid.columns as f32 * COLUMNS_PER_SLOT).floor() as usize;
        self.columns.reserve(n);
        for i in 0..n {
            let mut col = self.config.style.build();
            let start = if i % 2 == 0 { Start::Above } else { Start::Inside };
            spawn(&mut col, &mut self.rng, grid, window, &self.config, start);
            self.columns.push(col);
        }
        debug!(columns = n, ?grid, "field populated");
    }

    /// Moves every column down one step, runs its recycle tick and respawns it
    /// above the window once it has fallen past the bottom edge.
    pub fn advance(&mut self, delta_time: f32) {
        let Self {
            columns,
            grid,
            window,
            config,
            rng,
            font,
        } = self;

        for col in columns.iter_mut() {
            col.move_by(Vec2::new(0.0, config.step));
            col.update(&**font, rng, delta_time);
            if col.position().y > window.y {
                spawn(col, rng, *grid, *window, config, Start::Recycled);
            }
        }
    }
}

impl Drawable for Field {
    fn draw(&self, target: &mut dyn RenderTarget, states: &RenderStates<'_>) {
        for col in &self.columns {
            col.draw(target, states);
        }
    }
}
