// Copyright (c) 2026 rezky_nightky

use crate::cell::Cell;
use crate::color::Rgb;
use crate::frame::Frame;
use crate::glyph::TextStyle;

const PAD_X: u16 = 2;
const PAD_Y: u16 = 1;
const CURSOR: char = '_';
const MASK: char = '*';

/// What the overlay types out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginScript {
    pub title: String,
    pub user: String,
    pub password: String,
}

#[derive(Clone, Debug)]
struct Line {
    chars: Vec<char>,
}

/// Typewriter login prompt drawn in a box in the middle of the screen.
///
/// Characters appear at a fixed rate driven by frame time; the cursor sits
/// after the last revealed character and keeps blinking once the script is
/// done.
#[derive(Clone, Debug)]
pub struct LoginOverlay {
    lines: Vec<Line>,
    total: usize,
    chars_per_sec: f32,
    blink_half_period: f32,
    elapsed: f32,
    color: Rgb,
    border: bool,
}

impl LoginOverlay {
    pub fn new(script: &LoginScript, color: Rgb) -> Self {
        let masked: String = script.password.chars().map(|_| MASK).collect();
        let lines: Vec<Line> = [
            script.title.clone(),
            String::new(),
            format!("login: {}", script.user),
            format!("password: {}", masked),
        ]
        .into_iter()
        .map(|s| Line {
            chars: s.chars().collect(),
        })
        .collect();
        let total = lines.iter().map(|l| l.chars.len()).sum();
        Self {
            lines,
            total,
            chars_per_sec: 12.0,
            blink_half_period: 0.5,
            elapsed: 0.0,
            color,
            border: true,
        }
    }

    pub fn set_chars_per_sec(&mut self, cps: f32) {
        if cps > 0.0 && cps.is_finite() {
            self.chars_per_sec = cps;
        }
    }

    pub fn set_border(&mut self, on: bool) {
        self.border = on;
    }

    pub fn advance(&mut self, delta_time: f32) {
        if delta_time.is_finite() && delta_time > 0.0 {
            self.elapsed += delta_time;
        }
    }

    pub fn revealed(&self) -> usize {
        ((self.elapsed * self.chars_per_sec).floor() as usize).min(self.total)
    }

    pub fn is_complete(&self) -> bool {
        self.revealed() == self.total
    }

    pub fn cursor_visible(&self) -> bool {
        ((self.elapsed / self.blink_half_period) as u64) % 2 == 0
    }

    /// Revealed text per line plus the cursor location as (line, column).
    fn reveal(&self) -> (Vec<&[char]>, (usize, usize)) {
        let mut budget = self.revealed();
        let mut out = Vec::with_capacity(self.lines.len());
        let mut cursor = None;
        for (i, line) in self.lines.iter().enumerate() {
            let n = budget.min(line.chars.len());
            budget -= n;
            out.push(&line.chars[..n]);
            if cursor.is_none() && n < line.chars.len() {
                cursor = Some((i, n));
            }
        }
        let last = self.lines.len().saturating_sub(1);
        let cursor = cursor.unwrap_or_else(|| (last, out.get(last).map_or(0, |l| l.len())));
        (out, cursor)
    }

    #[cfg(test)]
    pub fn visible_text(&self) -> Vec<String> {
        self.reveal().0.iter().map(|l| l.iter().collect()).collect()
    }

    pub fn draw(&self, frame: &mut Frame) {
        let border = u16::from(self.border);
        let content_w = self
            .lines
            .iter()
            .map(|l| l.chars.len())
            .max()
            .unwrap_or(0)
            .saturating_add(1)
            .min(u16::MAX as usize) as u16;
        let content_h = self.lines.len() as u16;

        let box_w = content_w + 2 * border + 2 * PAD_X;
        let box_h = content_h + 2 * border + 2 * PAD_Y;
        if frame.width < box_w || frame.height < box_h {
            return;
        }
        let start_col = frame.width / 2 - box_w / 2;
        let start_line = frame.height / 2 - box_h / 2;

        let (text, (cur_line, cur_col)) = self.reveal();
        let show_cursor = self.cursor_visible();
        let fg = self.color.to_terminal(frame.color_mode());
        let bg = frame.background();

        for y in 0..box_h {
            for x in 0..box_w {
                let mut ch = ' ';
                if border == 1 {
                    let edge_y = y == 0 || y + 1 == box_h;
                    let edge_x = x == 0 || x + 1 == box_w;
                    ch = match (edge_y, edge_x) {
                        (true, true) => '+',
                        (true, false) => '-',
                        (false, true) => '|',
                        (false, false) => ' ',
                    };
                }

                let inner_y = y.checked_sub(border + PAD_Y).map(usize::from);
                let inner_x = x.checked_sub(border + PAD_X).map(usize::from);
                if let (Some(ly), Some(lx)) = (inner_y, inner_x) {
                    if let Some(line) = text.get(ly) {
                        if let Some(&c) = line.get(lx) {
                            ch = c;
                        } else if show_cursor && ly == cur_line && lx == cur_col {
                            ch = CURSOR;
                        }
                    }
                }

                frame.set(
                    start_col + x,
                    start_line + y,
                    Cell {
                        ch,
                        fg: if ch == ' ' { None } else { fg },
                        bg,
                        style: if ch == ' ' {
                            TextStyle::REGULAR
                        } else {
                            TextStyle::BOLD
                        },
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;
    use crate::runtime::ColorMode;

    fn overlay() -> LoginOverlay {
        LoginOverlay::new(
            &LoginScript {
                title: "Wake up".to_string(),
                user: "neo".to_string(),
                password: "zion".to_string(),
            },
            Rgb::GREEN,
        )
    }

    #[test]
    fn reveals_one_char_at_a_time() {
        let mut o = overlay();
        assert_eq!(o.revealed(), 0);
        let mut prev = 0;
        for _ in 0..100 {
            o.advance(0.05);
            assert!(o.revealed() >= prev);
            prev = o.revealed();
        }
        assert!(o.is_complete());
        assert_eq!(
            o.visible_text(),
            vec!["Wake up", "", "login: neo", "password: ****"]
        );
    }

    #[test]
    fn partial_reveal_spans_lines() {
        let mut o = overlay();
        o.set_chars_per_sec(10.0);
        o.advance(1.0);
        assert_eq!(o.visible_text(), vec!["Wake up", "", "log", ""]);
        assert_eq!(o.reveal().1, (2, 3));
    }

    #[test]
    fn cursor_blinks_with_half_period() {
        let mut o = overlay();
        assert!(o.cursor_visible());
        o.advance(0.6);
        assert!(!o.cursor_visible());
        o.advance(0.5);
        assert!(o.cursor_visible());
    }

    #[test]
    fn ignores_bad_deltas_and_rates() {
        let mut o = overlay();
        o.advance(-1.0);
        o.advance(f32::NAN);
        assert_eq!(o.revealed(), 0);
        o.set_chars_per_sec(0.0);
        o.advance(1.0);
        assert_eq!(o.revealed(), 12);
    }

    #[test]
    fn draws_box_in_the_middle() {
        let mut o = overlay();
        o.advance(100.0);
        let mut frame = Frame::new(40, 12, Vec2::new(9.0, 18.0), None, ColorMode::Mono);
        o.draw(&mut frame);

        // content 15 wide + padding and border = 21 x 8 box at (10, 2)
        assert_eq!(frame.get(10, 2).unwrap().ch, '+');
        assert_eq!(frame.get(30, 9).unwrap().ch, '+');
        assert_eq!(frame.get(11, 2).unwrap().ch, '-');
        assert_eq!(frame.get(10, 4).unwrap().ch, '|');
        let row: String = (13..20).map(|x| frame.get(x, 4).unwrap().ch).collect();
        assert_eq!(row, "Wake up");
        assert_eq!(frame.get(27, 7).unwrap().ch, CURSOR);
    }

    #[test]
    fn skips_drawing_when_screen_is_too_small() {
        let o = overlay();
        let mut frame = Frame::new(10, 4, Vec2::new(9.0, 18.0), None, ColorMode::Mono);
        frame.clear_dirty();
        o.draw(&mut frame);
        assert!(frame.dirty_indices().is_empty());
    }
}
