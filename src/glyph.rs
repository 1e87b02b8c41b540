// Copyright (c) 2026 rezky_nightky

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::color::Rgb;
use crate::error::AssetError;
use crate::geometry::{Bounds, Vec2};

/// Character size at which one glyph covers exactly one terminal cell.
pub const BASE_CHARACTER_SIZE: u32 = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextStyle(u8);

impl TextStyle {
    pub const REGULAR: TextStyle = TextStyle(0);
    pub const BOLD: TextStyle = TextStyle(0x1);
    pub const ITALIC: TextStyle = TextStyle(0x2);
    pub const UNDERLINED: TextStyle = TextStyle(0x4);

    pub fn contains(self, other: TextStyle) -> bool {
        (self.0 & other.0) != 0
    }

    #[cfg(test)]
    pub fn with(self, other: TextStyle) -> TextStyle {
        TextStyle(self.0 | other.0)
    }
}

/// One animated character of a rain column. `position` is local to the
/// owning column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphCell {
    pub ch: char,
    pub fill: Rgb,
    pub size: u32,
    pub style: TextStyle,
    pub position: Vec2,
}

/// Text-layout collaborator: measures a single styled glyph.
pub trait FontSource {
    fn measure(&self, ch: char, size: u32, style: TextStyle) -> Result<Bounds, AssetError>;
}

/// Glyph metrics of a monospace terminal. The terminal draws the glyphs with
/// its own font, so an asset file only has to be present and readable. The
/// asset is checked once, when the font is built; measuring never touches the
/// disk.
#[derive(Clone, Debug)]
pub struct TerminalFont {
    cell: Vec2,
    broken: Option<(PathBuf, io::ErrorKind)>,
}

impl TerminalFont {
    pub fn new(asset: Option<PathBuf>, cell: Vec2) -> Self {
        let broken = asset.and_then(|path| match Self::check(&path) {
            Ok(()) => None,
            Err(kind) => Some((path, kind)),
        });
        if let Some((path, kind)) = &broken {
            warn!(path = %path.display(), ?kind, "font asset unavailable");
        }
        Self { cell, broken }
    }

    fn check(path: &Path) -> Result<(), io::ErrorKind> {
        let meta = std::fs::metadata(path).map_err(|e| e.kind())?;
        if !meta.is_file() {
            return Err(io::ErrorKind::NotFound);
        }
        File::open(path).map(drop).map_err(|e| e.kind())
    }

    fn asset_error(&self) -> Option<AssetError> {
        let (path, kind) = self.broken.as_ref()?;
        Some(match kind {
            io::ErrorKind::NotFound => AssetError::FontNotFound { path: path.clone() },
            kind => AssetError::FontUnreadable {
                path: path.clone(),
                source: io::Error::from(*kind),
            },
        })
    }
}

impl FontSource for TerminalFont {
    fn measure(&self, _ch: char, size: u32, _style: TextStyle) -> Result<Bounds, AssetError> {
        if let Some(e) = self.asset_error() {
            return Err(e);
        }
        let scale = size as f32 / BASE_CHARACTER_SIZE as f32;
        Ok(Bounds::new(self.cell.x * scale, self.cell.y * scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_flags_combine() {
        let s = TextStyle::BOLD.with(TextStyle::UNDERLINED);
        assert!(s.contains(TextStyle::BOLD));
        assert!(s.contains(TextStyle::UNDERLINED));
        assert!(!s.contains(TextStyle::ITALIC));
        assert!(!TextStyle::REGULAR.contains(TextStyle::BOLD));
    }

    #[test]
    fn base_size_fills_one_cell() {
        let font = TerminalFont::new(None, Vec2::new(9.0, 18.0));
        let b = font.measure('a', BASE_CHARACTER_SIZE, TextStyle::BOLD).unwrap();
        assert_eq!(b, Bounds::new(9.0, 18.0));
        let b = font.measure('a', 40, TextStyle::REGULAR).unwrap();
        assert_eq!(b, Bounds::new(18.0, 36.0));
    }

    #[test]
    fn missing_asset_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix-code.ttf");
        let font = TerminalFont::new(Some(path.clone()), Vec2::new(9.0, 18.0));
        assert!(matches!(
            font.measure('a', 20, TextStyle::BOLD),
            Err(AssetError::FontNotFound { .. })
        ));

        // Checked at construction only; a file appearing later is not seen.
        std::fs::write(&path, b"\x00\x01\x00\x00").unwrap();
        assert!(font.measure('a', 20, TextStyle::BOLD).is_err());
        let font = TerminalFont::new(Some(path), Vec2::new(9.0, 18.0));
        assert!(font.measure('a', 20, TextStyle::BOLD).is_ok());
    }

    #[test]
    fn measuring_does_not_reread_the_asset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix-code.ttf");
        std::fs::write(&path, b"\x00\x01\x00\x00").unwrap();
        let font = TerminalFont::new(Some(path.clone()), Vec2::new(9.0, 18.0));

        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            font.measure('a', 20, TextStyle::BOLD).unwrap(),
            Bounds::new(9.0, 18.0)
        );
    }

    #[test]
    fn directory_is_not_a_font() {
        let dir = tempfile::tempdir().unwrap();
        let font = TerminalFont::new(Some(dir.path().to_path_buf()), Vec2::new(9.0, 18.0));
        assert!(matches!(
            font.measure('a', 20, TextStyle::BOLD),
            Err(AssetError::FontNotFound { .. })
        ));
    }
}
