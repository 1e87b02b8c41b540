// Copyright (c) 2026 rezky_nightky

use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }

    /// Maps a `--colormode` value; `None` for anything not in 0,16,8/256,24/32.
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0 => Some(ColorMode::Mono),
            16 => Some(ColorMode::Color16),
            8 | 256 => Some(ColorMode::Color256),
            24 | 32 => Some(ColorMode::TrueColor),
            _ => None,
        }
    }

    pub fn detect() -> Self {
        Self::detect_from(
            &env::var("COLORTERM").unwrap_or_default(),
            &env::var("TERM").unwrap_or_default(),
        )
    }

    fn detect_from(colorterm: &str, term: &str) -> Self {
        let colorterm = colorterm.to_ascii_lowercase();
        if colorterm.contains("truecolor") || colorterm.contains("24bit") {
            return ColorMode::TrueColor;
        }
        let term = term.to_ascii_lowercase();
        if term == "dumb" {
            return ColorMode::Mono;
        }
        if term.contains("256color") {
            return ColorMode::Color256;
        }
        ColorMode::Color16
    }
}

#[cfg(test)]
mod tests {
    use super::ColorMode;

    #[test]
    fn detection_prefers_colorterm() {
        assert_eq!(
            ColorMode::detect_from("truecolor", "xterm"),
            ColorMode::TrueColor
        );
        assert_eq!(
            ColorMode::detect_from("", "xterm-256color"),
            ColorMode::Color256
        );
        assert_eq!(ColorMode::detect_from("", "dumb"), ColorMode::Mono);
        assert_eq!(ColorMode::detect_from("", "vt100"), ColorMode::Color16);
    }

    #[test]
    fn colormode_values() {
        assert_eq!(ColorMode::from_bits(256), Some(ColorMode::Color256));
        assert_eq!(ColorMode::from_bits(32), Some(ColorMode::TrueColor));
        assert_eq!(ColorMode::from_bits(7), None);
    }
}
