// Copyright (c) 2026 rezky_nightky

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::color::Rgb;
use crate::error::AssetError;

pub const OUTLINE_THICKNESS: &str = "outline_thickness";
pub const OUTLINE_COLOUR: &str = "outline_colour";
pub const TEXTURE: &str = "texture";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Uniform {
    Float(f32),
    Vec3([f32; 3]),
    /// The texture of the primitive currently being drawn.
    CurrentTexture,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UniformKind {
    Float,
    Vec3,
    Sampler2D,
}

impl UniformKind {
    fn parse(ty: &str) -> Option<Self> {
        match ty {
            "float" => Some(UniformKind::Float),
            "vec3" => Some(UniformKind::Vec3),
            "sampler2D" => Some(UniformKind::Sampler2D),
            _ => None,
        }
    }

    fn accepts(self, value: &Uniform) -> bool {
        matches!(
            (self, value),
            (UniformKind::Float, Uniform::Float(_))
                | (UniformKind::Vec3, Uniform::Vec3(_))
                | (UniformKind::Sampler2D, Uniform::CurrentTexture)
        )
    }
}

/// Colors produced for one drawn glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fragment {
    pub fg: Rgb,
    pub bg: Option<Rgb>,
}

/// Outline post-process. The source file is only inspected for its uniform
/// declarations; the terminal cannot run GLSL, so the outline is rendered as a
/// background halo behind each glyph.
#[derive(Clone, Debug, Default)]
pub struct OutlineShader {
    declared: HashMap<String, UniformKind>,
    values: HashMap<String, Uniform>,
}

impl OutlineShader {
    /// Shader that leaves every fragment untouched.
    pub fn inert() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let src = std::fs::read_to_string(path).map_err(|source| AssetError::ShaderUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(path, &src)
    }

    pub fn from_source(path: &Path, src: &str) -> Result<Self, AssetError> {
        let declared = parse_uniforms(src);
        if declared.is_empty() {
            return Err(AssetError::ShaderEmpty {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), uniforms = declared.len(), "shader loaded");
        Ok(Self {
            declared,
            values: HashMap::new(),
        })
    }

    pub fn is_inert(&self) -> bool {
        self.declared.is_empty()
    }

    /// Stores `value` if the shader declares `name` with a matching type.
    /// Anything else is dropped, like setting a uniform a GL program lacks.
    pub fn set_uniform(&mut self, name: &str, value: Uniform) -> bool {
        match self.declared.get(name) {
            Some(kind) if kind.accepts(&value) => {
                self.values.insert(name.to_string(), value);
                true
            }
            Some(kind) => {
                debug!(name, ?kind, ?value, "uniform type mismatch, ignored");
                false
            }
            None => {
                debug!(name, "uniform not declared by shader, ignored");
                false
            }
        }
    }

    pub fn uniform(&self, name: &str) -> Option<Uniform> {
        self.values.get(name).copied()
    }

    pub fn shade(&self, fill: Rgb) -> Fragment {
        let thickness = match self.uniform(OUTLINE_THICKNESS) {
            Some(Uniform::Float(t)) if t > 0.0 => t,
            _ => return Fragment { fg: fill, bg: None },
        };
        let bg = match self.uniform(OUTLINE_COLOUR) {
            Some(Uniform::Vec3([r, g, b])) => {
                Some(Rgb::from_f32(r * thickness, g * thickness, b * thickness))
            }
            _ => None,
        };
        Fragment { fg: fill, bg }
    }
}

fn parse_uniforms(src: &str) -> HashMap<String, UniformKind> {
    let mut out = HashMap::new();
    for line in src.lines() {
        let code = line.split("//").next().unwrap_or("");
        for stmt in code.split(';') {
            let mut words = stmt.split_whitespace();
            if words.next() != Some("uniform") {
                continue;
            }
            let mut ty = words.next();
            if matches!(ty, Some("lowp" | "mediump" | "highp")) {
                ty = words.next();
            }
            let (Some(ty), Some(name)) = (ty, words.next()) else {
                continue;
            };
            let name = name.split('[').next().unwrap_or(name);
            if let Some(kind) = UniformKind::parse(ty) {
                out.insert(name.to_string(), kind);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "\
uniform sampler2D texture;
uniform float outline_thickness; // in texels
uniform mediump vec3 outline_colour;
void main() { gl_FragColor = vec4(1.0); }
";

    fn shader() -> OutlineShader {
        OutlineShader::from_source(Path::new("outline.frag"), SRC).unwrap()
    }

    #[test]
    fn finds_declared_uniforms() {
        let s = shader();
        assert!(!s.is_inert());
        assert_eq!(s.declared.len(), 3);
        assert_eq!(s.declared.get("outline_colour"), Some(&UniformKind::Vec3));
    }

    #[test]
    fn undeclared_or_mistyped_uniforms_are_ignored() {
        let mut s = shader();
        assert!(!s.set_uniform("glow", Uniform::Float(1.0)));
        assert!(!s.set_uniform(OUTLINE_THICKNESS, Uniform::Vec3([1.0, 1.0, 1.0])));
        assert!(s.set_uniform(TEXTURE, Uniform::CurrentTexture));
        assert_eq!(s.uniform("glow"), None);
        assert_eq!(s.uniform(OUTLINE_THICKNESS), None);
    }

    #[test]
    fn outline_scales_colour_by_thickness() {
        let mut s = shader();
        s.set_uniform(OUTLINE_THICKNESS, Uniform::Float(0.2));
        s.set_uniform(OUTLINE_COLOUR, Uniform::Vec3([100.0, 100.0, 100.0]));
        let f = s.shade(Rgb::GREEN);
        assert_eq!(f.fg, Rgb::GREEN);
        assert_eq!(f.bg, Some(Rgb::new(20, 20, 20)));
    }

    #[test]
    fn inert_shader_is_identity() {
        let mut s = OutlineShader::inert();
        assert!(!s.set_uniform(OUTLINE_THICKNESS, Uniform::Float(0.2)));
        assert_eq!(
            s.shade(Rgb::WHITE),
            Fragment {
                fg: Rgb::WHITE,
                bg: None
            }
        );
    }

    #[test]
    fn missing_file_and_empty_source_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outline.frag");
        assert!(matches!(
            OutlineShader::load(&path),
            Err(AssetError::ShaderUnreadable { .. })
        ));
        std::fs::write(&path, "void main() {}\n").unwrap();
        assert!(matches!(
            OutlineShader::load(&path),
            Err(AssetError::ShaderEmpty { .. })
        ));
    }
}
