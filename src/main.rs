// Copyright (c) 2026 rezky_nightky

mod cell;
mod color;
mod config;
mod error;
mod field;
mod frame;
mod geometry;
mod glyph;
mod logging;
mod login;
mod rain;
mod render;
mod runtime;
mod shader;
mod terminal;

use std::env;
use std::path::Path;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use anyhow::{Context, Result};
use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info, warn};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_colors, Args,
};
use crate::field::{clock_seeded_rng, Field};
use crate::frame::Frame;
use crate::glyph::TerminalFont;
use crate::logging::{default_log_path, init_file_logging};
use crate::login::{LoginOverlay, LoginScript};
use crate::render::{Drawable, RenderStates};
use crate::runtime::ColorMode;
use crate::shader::{OutlineShader, Uniform, OUTLINE_COLOUR, OUTLINE_THICKNESS, TEXTURE};
use crate::terminal::{restore_terminal_best_effort, Terminal, Viewport};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> &'static str {
    env!("GLYPHRAIN_BUILD")
}

fn git_sha() -> &'static str {
    env!("GLYPHRAIN_GIT_SHA")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn exit_invalid(msg: String) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

fn load_shader(path: &Path) -> OutlineShader {
    let mut shader = match OutlineShader::load(path) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "outline shader unavailable, drawing plain glyphs");
            return OutlineShader::inert();
        }
    };
    shader.set_uniform(OUTLINE_THICKNESS, Uniform::Float(0.2));
    shader.set_uniform(OUTLINE_COLOUR, Uniform::Vec3([100.0, 100.0, 100.0]));
    shader.set_uniform(TEXTURE, Uniform::CurrentTexture);
    shader
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeyAction {
    Quit,
    /// Throw away every column and spawn a fresh field on the same grid.
    Respawn,
}

/// Esc, `q` and Ctrl-C quit, Space respawns the rain. In screensaver mode
/// any key quits.
fn key_action(k: &KeyEvent, screensaver: bool) -> Option<KeyAction> {
    if k.kind != KeyEventKind::Press {
        return None;
    }
    if screensaver {
        return Some(KeyAction::Quit);
    }
    match (k.code, k.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => Some(KeyAction::Quit),
        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
        (KeyCode::Char(' '), _) => Some(KeyAction::Respawn),
        _ => None,
    }
}

/// Fits the grid to `vp` and respawns every column.
fn layout(field: &mut Field, vp: Viewport) {
    let window = vp.window();
    let grid = field.measure_grid(window);
    field.populate(grid, window);
    info!(
        cols = vp.cols,
        rows = vp.rows,
        columns = field.columns().len(),
        "layout"
    );
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches_from(env::args_os());
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let effective = args.color_mode().unwrap_or_else(|e| exit_invalid(e));

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", ColorMode::detect().label());
        if args.colormode.is_some() {
            println!("  forced: {}", effective.label());
        }
        println!("  effective: {}", effective.label());
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        if git_sha().is_empty() {
            println!("Build: {}", build_info());
        } else {
            println!("Build: {} ({})", build_info(), git_sha());
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return Ok(());
    }

    let color_mode = args.color_mode().unwrap_or_else(|e| exit_invalid(e));
    let field_config = args.field_config().unwrap_or_else(|e| exit_invalid(e));
    let target_period = args.frame_period().unwrap_or_else(|e| exit_invalid(e));
    let run_for = args.run_duration().unwrap_or_else(|e| exit_invalid(e));
    let type_speed = args.type_speed().unwrap_or_else(|e| exit_invalid(e));

    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    let _log_guard = match init_file_logging(&log_path) {
        Ok(g) => Some(g),
        Err(e) => {
            eprintln!("logging disabled: {:#}", e);
            None
        }
    };
    info!(
        version = env!("CARGO_PKG_VERSION"),
        color_mode = color_mode.label(),
        "starting"
    );

    let shader = load_shader(&args.shader);
    info!(outline = !shader.is_inert(), "shader ready");

    let mut term = Terminal::new().context("failed to set up terminal")?;
    let mut vp = term.viewport().context("failed to query terminal size")?;
    let bg = args.color_bg.to_terminal(color_mode);

    let font = TerminalFont::new(args.font.clone(), vp.cell);
    let mut field = Field::new(field_config, Box::new(font), clock_seeded_rng());
    layout(&mut field, vp);

    let mut frame = Frame::new(vp.cols, vp.rows, vp.cell, bg, color_mode);

    let mut overlay = (!args.no_login).then(|| {
        let mut o = LoginOverlay::new(
            &LoginScript {
                title: args.title.clone(),
                user: args.user.clone(),
                password: args.password.clone(),
            },
            field.config().style.body,
        );
        o.set_chars_per_sec(type_speed);
        o.set_border(!args.login_no_border);
        o
    });
    let mut typed_out = false;

    let start_time = Instant::now();
    let end_time = run_for.map(|d| start_time + d);
    let mut next_frame = start_time;
    let mut last_frame = start_time;
    let mut frames: u64 = 0;
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize = false;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(_, _) => pending_resize = true,
                    Event::Key(k) => match key_action(&k, args.screensaver) {
                        Some(KeyAction::Quit) => {
                            running = false;
                            break;
                        }
                        Some(KeyAction::Respawn) => {
                            field.populate(field.grid(), field.window());
                            frame.clear_with_bg(bg);
                        }
                        None => {}
                    },
                    _ => {}
                }
            }

            if !running || pending_resize {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if pending_resize {
            vp = term.viewport().context("failed to query terminal size")?;
            debug!(?vp, "resized");
            field.set_font(Box::new(TerminalFont::new(args.font.clone(), vp.cell)));
            layout(&mut field, vp);
            frame = Frame::new(vp.cols, vp.rows, vp.cell, bg, color_mode);
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        field.advance(dt);
        frame.begin_frame();
        field.draw(&mut frame, &RenderStates::with_shader(&shader));
        if let Some(overlay) = overlay.as_mut() {
            overlay.advance(dt);
            overlay.draw(&mut frame);
            if !typed_out && overlay.is_complete() {
                debug!("login script typed out");
                typed_out = true;
            }
        }
        if frame.is_dirty_all() || !frame.dirty_indices().is_empty() {
            term.draw(&mut frame)?;
        }
        frames = frames.saturating_add(1);

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    drop(term);
    info!(
        frames,
        elapsed_s = start_time.elapsed().as_secs_f64(),
        "stopped"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn quit_and_respawn_keys() {
        let none = KeyModifiers::NONE;
        assert_eq!(
            key_action(&press(KeyCode::Esc, none), false),
            Some(KeyAction::Quit)
        );
        assert_eq!(
            key_action(&press(KeyCode::Char('q'), none), false),
            Some(KeyAction::Quit)
        );
        assert_eq!(
            key_action(&press(KeyCode::Char('c'), KeyModifiers::CONTROL), false),
            Some(KeyAction::Quit)
        );
        assert_eq!(
            key_action(&press(KeyCode::Char(' '), none), false),
            Some(KeyAction::Respawn)
        );
        assert_eq!(key_action(&press(KeyCode::Char('c'), none), false), None);
    }

    #[test]
    fn screensaver_quits_on_any_key() {
        assert_eq!(
            key_action(&press(KeyCode::Char(' '), KeyModifiers::NONE), true),
            Some(KeyAction::Quit)
        );
    }

    #[test]
    fn releases_are_ignored() {
        let mut k = press(KeyCode::Esc, KeyModifiers::NONE);
        k.kind = KeyEventKind::Release;
        assert_eq!(key_action(&k, false), None);
    }
}
