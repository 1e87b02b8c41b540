// Copyright (c) 2026 rezky_nightky

use crate::geometry::{Transform, Vec2};
use crate::glyph::GlyphCell;
use crate::shader::OutlineShader;

/// State carried down a draw call: the accumulated transform and the shader
/// applied to every primitive drawn with it.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderStates<'a> {
    pub transform: Transform,
    pub shader: Option<&'a OutlineShader>,
}

impl<'a> RenderStates<'a> {
    pub fn with_shader(shader: &'a OutlineShader) -> Self {
        Self {
            transform: Transform::IDENTITY,
            shader: Some(shader),
        }
    }

    /// States for a child whose own transform is `local`.
    pub fn transformed(&self, local: &Transform) -> RenderStates<'a> {
        RenderStates {
            transform: self.transform.combine(local),
            shader: self.shader,
        }
    }
}

pub trait RenderTarget {
    fn draw_glyph(&mut self, glyph: &GlyphCell, states: &RenderStates<'_>);
}

pub trait Drawable {
    fn draw(&self, target: &mut dyn RenderTarget, states: &RenderStates<'_>);
}

pub trait Transformable {
    fn transform(&self) -> Transform;
    fn set_transform(&mut self, transform: Transform);

    fn position(&self) -> Vec2 {
        self.transform().translation()
    }

    fn set_position(&mut self, position: Vec2) {
        self.set_transform(Transform::from_translation(position));
    }

    fn move_by(&mut self, delta: Vec2) {
        let mut t = self.transform();
        t.translate(delta);
        self.set_transform(t);
    }
}
