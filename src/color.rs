// Copyright (c) 2026 rezky_nightky

use std::fmt;
use std::str::FromStr;

use crossterm::style::Color;

use crate::runtime::ColorMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from float channels on the 0..=255 scale, clamping.
    pub fn from_f32(r: f32, g: f32, b: f32) -> Self {
        let q = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        Self::new(q(r), q(g), q(b))
    }

    /// Terminal color for `mode`; mono terminals get no explicit color.
    pub fn to_terminal(self, mode: ColorMode) -> Option<Color> {
        match mode {
            ColorMode::Mono => None,
            ColorMode::TrueColor => Some(Color::Rgb {
                r: self.r,
                g: self.g,
                b: self.b,
            }),
            ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(self.r, self.g, self.b))),
            ColorMode::Color16 => Some(rgb_to_color16(self.r, self.g, self.b)),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

const NAMED: &[(&str, Rgb)] = &[
    ("black", Rgb::BLACK),
    ("white", Rgb::WHITE),
    ("green", Rgb::GREEN),
    ("red", Rgb::new(255, 0, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("gray", Rgb::new(100, 100, 100)),
    ("matrix", Rgb::new(0, 143, 17)),
    ("amber", Rgb::new(255, 176, 0)),
];

pub fn named_colors() -> impl Iterator<Item = (&'static str, Rgb)> {
    NAMED.iter().copied()
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(format!("invalid hex color: #{} (expected #rrggbb)", hex));
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            let parsed = (channel(0), channel(2), channel(4));
            return match parsed {
                (Ok(r), Ok(g), Ok(b)) => Ok(Rgb::new(r, g, b)),
                _ => Err(format!("invalid hex color: #{}", hex)),
            };
        }
        let alias = if s == "grey" { "gray" } else { s.as_str() };
        named_colors()
            .find(|(name, _)| *name == alias)
            .map(|(_, c)| c)
            .ok_or_else(|| format!("invalid color: {} (see --list-colors)", s))
    }
}

fn dist2(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let dr = (a.0 as i32) - (b.0 as i32);
    let dg = (a.1 as i32) - (b.1 as i32);
    let db = (a.2 as i32) - (b.2 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| (((v as u16 * 5) + 127) / 255) as u8;
    let (r6, g6, b6) = (level(r), level(g), level(b));
    let cube = (
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + (36 * r6) + (6 * g6) + b6;
    let cube_dist = dist2((r, g, b), cube);

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, 0),
        239..=255 => (231, 255),
        _ => {
            let idx = 232 + ((avg - 8) / 10);
            (idx, 8 + 10 * (idx - 232))
        }
    };
    let gray_dist = dist2((r, g, b), (gray, gray, gray));

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, rgb)| dist2((r, g, b), *rgb))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_hex() {
        assert_eq!("Green".parse::<Rgb>().unwrap(), Rgb::GREEN);
        assert_eq!("grey".parse::<Rgb>().unwrap(), Rgb::new(100, 100, 100));
        assert_eq!("#0a0B0c".parse::<Rgb>().unwrap(), Rgb::new(10, 11, 12));
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("chartreuse".parse::<Rgb>().is_err());
    }

    #[test]
    fn terminal_color_follows_mode() {
        assert_eq!(Rgb::GREEN.to_terminal(ColorMode::Mono), None);
        assert_eq!(
            Rgb::GREEN.to_terminal(ColorMode::TrueColor),
            Some(Color::Rgb { r: 0, g: 255, b: 0 })
        );
        assert_eq!(
            Rgb::GREEN.to_terminal(ColorMode::Color256),
            Some(Color::AnsiValue(46))
        );
        assert_eq!(
            Rgb::new(250, 10, 10).to_terminal(ColorMode::Color16),
            Some(Color::Red)
        );
    }

    #[test]
    fn from_f32_clamps() {
        assert_eq!(Rgb::from_f32(-3.0, 20.4, 999.0), Rgb::new(0, 20, 255));
    }
}
