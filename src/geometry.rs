// Copyright (c) 2026 rezky_nightky

use std::ops::{Add, AddAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Width and height of a measured glyph, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const ZERO: Bounds = Bounds {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero, negative or not a number.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Accumulated 2-D transform. Only translation is needed by the rain, so the
/// matrix collapses to an offset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    offset: Vec2,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { offset: Vec2::ZERO };

    pub fn from_translation(offset: Vec2) -> Self {
        Self { offset }
    }

    pub fn translation(&self) -> Vec2 {
        self.offset
    }

    pub fn translate(&mut self, by: Vec2) {
        self.offset += by;
    }

    /// Applies `self` after `inner` (parent * child).
    pub fn combine(&self, inner: &Transform) -> Transform {
        Transform {
            offset: self.offset + inner.offset,
        }
    }

    pub fn apply(&self, point: Vec2) -> Vec2 {
        point + self.offset
    }
}
