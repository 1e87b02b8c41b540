// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::glyph::TextStyle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub style: TextStyle,
}

impl Cell {
    pub fn blank_with_bg(bg: Option<Color>) -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg,
            style: TextStyle::REGULAR,
        }
    }
}
