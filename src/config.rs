// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::style::Color;

use crate::color::{named_colors, Rgb};
use crate::field::FieldConfig;
use crate::glyph::TextStyle;
use crate::rain::ColumnStyle;
use crate::runtime::ColorMode;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphrain --fps 60 --size 20 --delay 0.05 --step 2 --min-count 2 --max-count 30 --body-color green --head-color white --color-bg black --user neo";

pub const DEFAULT_TITLE: &str = "Brute Force weManhattan.06.30";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_usage(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        if !line.starts_with(' ') && line.ends_with(':') {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("  glyphrain") {
            out.push_str("  \x1b[1;34mglyphrain\x1b[0m");
            out.push_str(rest);
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_usage(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
}

impl ColorBg {
    pub fn to_terminal(self, mode: ColorMode) -> Option<Color> {
        match self {
            ColorBg::Black => Rgb::BLACK.to_terminal(mode),
            ColorBg::DefaultBackground => None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphrain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "GENERAL",
        help = "Frame rate cap (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write diagnostics here (default: <tmp>/glyphrain.log)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "font",
        help_heading = "ASSETS",
        help = "Font file required for glyph metrics (default: none, use cell metrics)"
    )]
    pub font: Option<PathBuf>,

    #[arg(
        long = "shader",
        default_value = "shaders/outline.frag",
        help_heading = "ASSETS",
        help = "Outline fragment shader source"
    )]
    pub shader: PathBuf,

    #[arg(
        long = "size",
        default_value_t = 20,
        help_heading = "RAIN",
        help = "Character size; 20 fills one terminal cell (min 1 max 200)"
    )]
    pub size: u32,

    #[arg(
        long = "delay",
        default_value_t = 0.05,
        help_heading = "RAIN",
        help = "Seconds between column ticks (greater than 0, less than 1)"
    )]
    pub delay: f32,

    #[arg(
        long = "step",
        default_value_t = 2.0,
        help_heading = "RAIN",
        help = "Pixels every column falls per frame (min 0.1 max 500)"
    )]
    pub step: f32,

    #[arg(
        long = "min-count",
        default_value_t = 2,
        help_heading = "RAIN",
        help = "Shortest column length in cells (min 1 max 500)"
    )]
    pub min_count: usize,

    #[arg(
        long = "max-count",
        default_value_t = 30,
        help_heading = "RAIN",
        help = "Longest column length in cells (min 1 max 500)"
    )]
    pub max_count: usize,

    #[arg(
        long = "body-color",
        default_value = "green",
        help_heading = "APPEARANCE",
        help = "Body color name or #rrggbb (see --list-colors)"
    )]
    pub body_color: Rgb,

    #[arg(
        long = "head-color",
        default_value = "white",
        help_heading = "APPEARANCE",
        help = "Head color name or #rrggbb (see --list-colors)"
    )]
    pub head_color: Rgb,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit (TERM=...256color), else 16-color"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "title",
        default_value = DEFAULT_TITLE,
        help_heading = "LOGIN",
        help = "First line typed by the login overlay"
    )]
    pub title: String,

    #[arg(
        long = "user",
        default_value = "neo",
        help_heading = "LOGIN",
        help = "User name typed at the login prompt"
    )]
    pub user: String,

    #[arg(
        long = "password",
        default_value = "weManhattan",
        help_heading = "LOGIN",
        help = "Password typed at the login prompt (shown masked)"
    )]
    pub password: String,

    #[arg(long = "no-login", help_heading = "LOGIN", help = "Hide the login overlay")]
    pub no_login: bool,

    #[arg(
        long = "login-no-border",
        help_heading = "LOGIN",
        help = "Draw the login box without border characters"
    )]
    pub login_no_border: bool,

    #[arg(
        long = "type-speed",
        default_value_t = 12.0,
        help_heading = "LOGIN",
        help = "Characters typed per second (min 0.5 max 200)"
    )]
    pub type_speed: f32,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color names and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> Result<f64, String> {
    if !v.is_finite() {
        return Err(format!("failed to apply {} {} (must be a finite number)", name, v));
    }
    if v < min || v > max {
        return Err(format!("failed to apply {} {} (min {} max {})", name, v, min, max));
    }
    Ok(v)
}

pub fn require_f32_range(name: &str, v: f32, min: f32, max: f32) -> Result<f32, String> {
    require_f64_range(name, v as f64, min as f64, max as f64).map(|_| v)
}

pub fn require_usize_range(name: &str, v: usize, min: usize, max: usize) -> Result<usize, String> {
    if v < min || v > max {
        return Err(format!("failed to apply {} {} (min {} max {})", name, v, min, max));
    }
    Ok(v)
}

impl Args {
    pub fn color_mode(&self) -> Result<ColorMode, String> {
        match self.colormode {
            Some(bits) => ColorMode::from_bits(bits).ok_or_else(|| {
                format!("invalid --colormode: {} (allowed: 0,16,8/256,24/32)", bits)
            }),
            None => Ok(ColorMode::detect()),
        }
    }

    pub fn frame_period(&self) -> Result<Duration, String> {
        let fps = require_f64_range("--fps", self.fps, 1.0, 240.0)?;
        Ok(Duration::from_secs_f64(1.0 / fps))
    }

    /// `None` when no limit applies.
    pub fn run_duration(&self) -> Result<Option<Duration>, String> {
        match self.duration {
            None => Ok(None),
            Some(s) if s.is_finite() && s <= 0.0 => Ok(None),
            Some(s) => {
                let s = require_f64_range("--duration", s, 0.1, 86400.0)?;
                Ok(Some(Duration::from_secs_f64(s)))
            }
        }
    }

    pub fn type_speed(&self) -> Result<f32, String> {
        require_f32_range("--type-speed", self.type_speed, 0.5, 200.0)
    }

    pub fn field_config(&self) -> Result<FieldConfig, String> {
        if !(self.delay > 0.0 && self.delay < 1.0) {
            return Err(format!(
                "failed to apply --delay {} (must be greater than 0 and less than 1)",
                self.delay
            ));
        }
        let size = require_usize_range("--size", self.size as usize, 1, 200)?;
        let step = require_f32_range("--step", self.step, 0.1, 500.0)?;
        let min_count = require_usize_range("--min-count", self.min_count, 1, 500)?;
        let max_count = require_usize_range("--max-count", self.max_count, 1, 500)?;
        if min_count > max_count {
            return Err(format!(
                "--min-count {} is larger than --max-count {}",
                min_count, max_count
            ));
        }

        Ok(FieldConfig {
            style: ColumnStyle {
                body: self.body_color,
                head: self.head_color,
                delay: self.delay,
                character_size: size as u32,
                style: TextStyle::BOLD,
            },
            min_count,
            max_count,
            step,
        })
    }
}

pub fn print_list_colors() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE COLORS:\x1b[0m");
        println!("\x1b[2mNOTE: Any #rrggbb value works too.\x1b[0m");
    } else {
        println!("AVAILABLE COLORS:");
        println!("NOTE: Any #rrggbb value works too.");
    }
    println!();
    println!("VALUE        RGB");
    for (name, rgb) in named_colors() {
        println!("{:<12} {}", name, rgb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["glyphrain"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_field_defaults() {
        let args = parse(&[]);
        assert_eq!(args.field_config().unwrap(), FieldConfig::default());
        assert_eq!(args.shader, PathBuf::from("shaders/outline.frag"));
        assert_eq!(args.title, DEFAULT_TITLE);
        assert_eq!(args.user, "neo");
        assert!(args.font.is_none());
        assert_eq!(args.run_duration().unwrap(), None);
    }

    #[test]
    fn colors_accept_names_and_hex() {
        let args = parse(&["--body-color", "#102030", "--head-color", "red"]);
        let cfg = args.field_config().unwrap();
        assert_eq!(cfg.style.body, Rgb::new(0x10, 0x20, 0x30));
        assert_eq!(cfg.style.head, Rgb::new(255, 0, 0));
        assert!(Args::try_parse_from(["glyphrain", "--body-color", "chartreuse"]).is_err());
    }

    #[test]
    fn delay_must_be_inside_unit_interval() {
        assert!(parse(&["--delay", "0"]).field_config().is_err());
        assert!(parse(&["--delay", "1"]).field_config().is_err());
        assert!(parse(&["--delay", "0.5"]).field_config().is_ok());
    }

    #[test]
    fn count_range_is_checked() {
        assert!(parse(&["--min-count", "10", "--max-count", "5"])
            .field_config()
            .is_err());
        assert!(parse(&["--min-count", "0"]).field_config().is_err());
    }

    #[test]
    fn duration_and_fps_limits() {
        assert_eq!(parse(&["--duration", "0"]).run_duration().unwrap(), None);
        assert_eq!(
            parse(&["--duration", "2"]).run_duration().unwrap(),
            Some(Duration::from_secs(2))
        );
        assert!(parse(&["--duration", "0.01"]).run_duration().is_err());
        assert!(parse(&["--fps", "500"]).frame_period().is_err());
        assert_eq!(parse(&[]).type_speed().unwrap(), 12.0);
        assert!(parse(&["--type-speed", "0"]).type_speed().is_err());
    }

    #[test]
    fn forced_colormode() {
        assert_eq!(
            parse(&["--colormode", "16"]).color_mode().unwrap(),
            ColorMode::Color16
        );
        assert!(parse(&["--colormode", "3"]).color_mode().is_err());
    }

    #[test]
    fn default_background_is_transparent() {
        assert_eq!(ColorBg::DefaultBackground.to_terminal(ColorMode::TrueColor), None);
        assert_eq!(
            ColorBg::Black.to_terminal(ColorMode::TrueColor),
            Some(Color::Rgb { r: 0, g: 0, b: 0 })
        );
    }
}
