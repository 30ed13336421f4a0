//! Terminal front-end — the interactive hall.
//!
//! Polls crossterm for mouse and keyboard state, feeds it to the
//! `Auditorium` once per frame, and writes the rasterized draw list back to
//! the terminal. The hall itself never touches the terminal.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags, MouseButton, MouseEvent,
    MouseEventKind,
};
use crossterm::{cursor, event, execute, queue, style, terminal};
use tracing::{debug, info};

use crate::auditorium::Auditorium;
use crate::config::{HallConfig, matches_binding};
use crate::input::{DIGIT_KEYS, InputSnapshot};
use crate::menubar::print_hints;
use crate::renderer::{Cell, Frame, Renderer};
use crate::seats::COLS;
use crate::session::Phase;
use crate::types::{Rgb, SeatStatus};

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;

/// Smallest usable terminal: menu bar, canvas, status bar. The 40x22 canvas
/// keeps every seat over at least one cell center, so each one is clickable.
const MIN_WIDTH: u16 = 40;
const MIN_HEIGHT: u16 = 24;

/// Without release events, a key counts as held until no press (original or
/// auto-repeat) has arrived for this long. Covers the usual initial repeat
/// delay of 250-600ms.
const REPEAT_WINDOW: Duration = Duration::from_millis(650);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Device state accumulated between ticks.
///
/// Presses are latched so that a press and release landing in the same frame
/// still reach the hall as one held frame.
#[derive(Debug, Default)]
struct DeviceState {
    mouse_held: bool,
    mouse_latched: bool,
    cursor: (u16, u16),
    digits_held: [bool; DIGIT_KEYS],
    digits_latched: [bool; DIGIT_KEYS],
    digits_last: [Option<Instant>; DIGIT_KEYS],
    start_held: bool,
    start_latched: bool,
    start_last: Option<Instant>,
}

impl DeviceState {
    fn snapshot(&self, canvas: (u16, u16)) -> InputSnapshot {
        let mut digits = [false; DIGIT_KEYS];
        for (i, d) in digits.iter_mut().enumerate() {
            *d = self.digits_held[i] || self.digits_latched[i];
        }
        InputSnapshot {
            mouse_left: self.mouse_held || self.mouse_latched,
            // Cell centers, relative to the canvas origin.
            cursor: (
                self.cursor.0 as f32 + 0.5,
                self.cursor.1 as f32 - CANVAS_OFFSET as f32 + 0.5,
            ),
            screen: (canvas.0 as f32, canvas.1 as f32),
            digits,
            start: self.start_held || self.start_latched,
        }
    }

    /// Forget latched presses. Without release events, a key is released once
    /// it has gone `REPEAT_WINDOW` without a press.
    fn end_frame(&mut self, key_releases: bool, now: Instant) {
        self.mouse_latched = false;
        self.digits_latched = [false; DIGIT_KEYS];
        self.start_latched = false;
        if key_releases {
            return;
        }
        for (held, last) in self.digits_held.iter_mut().zip(&mut self.digits_last) {
            if expired(*last, now) {
                *held = false;
                *last = None;
            }
        }
        if expired(self.start_last, now) {
            self.start_held = false;
            self.start_last = None;
        }
    }

    fn mouse(&mut self, m: MouseEvent) {
        self.cursor = (m.column, m.row);
        match m.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.mouse_held = true;
                self.mouse_latched = true;
            }
            MouseEventKind::Up(MouseButton::Left) => self.mouse_held = false,
            _ => {}
        }
    }

    fn key(&mut self, key: &KeyEvent, start_binding: &str, now: Instant) {
        let down = key.kind != KeyEventKind::Release;
        let last = down.then_some(now);
        if let KeyCode::Char(c @ '1'..='9') = key.code {
            let i = c as usize - '1' as usize;
            self.digits_held[i] = down;
            self.digits_latched[i] |= down;
            self.digits_last[i] = last;
        } else if matches_binding(start_binding, key) {
            self.start_held = down;
            self.start_latched |= down;
            self.start_last = last;
        }
    }
}

fn expired(last: Option<Instant>, now: Instant) -> bool {
    last.is_none_or(|t| now.saturating_duration_since(t) >= REPEAT_WINDOW)
}

pub struct TerminalHall {
    hall: Auditorium,
    config: HallConfig,
    renderer: Renderer,
    device: DeviceState,
    key_releases: bool,
    last_phase: Phase,
}

impl TerminalHall {
    pub fn new(hall: Auditorium, config: HallConfig) -> Self {
        let last_phase = hall.phase();
        Self {
            hall,
            config,
            renderer: Renderer::new(0, 0),
            device: DeviceState::default(),
            key_releases: false,
            last_phase,
        }
    }

    /// Run the hall in the terminal until the user quits.
    ///
    /// Sets up the terminal, enters the frame loop, and restores the terminal
    /// on exit (even on error).
    pub fn run(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        if term_w < MIN_WIDTH || term_h < MIN_HEIGHT {
            bail!(
                "Terminal too small: need {}x{}, have {}x{}",
                MIN_WIDTH,
                MIN_HEIGHT,
                term_w,
                term_h,
            );
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        self.key_releases = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.key_releases {
            execute!(
                stdout,
                event::PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        info!(key_releases = self.key_releases, "terminal ready");

        let result = self.run_loop(&mut stdout, term_w, term_h);

        // Always restore terminal state.
        if self.key_releases {
            let _ = execute!(stdout, event::PopKeyboardEnhancementFlags);
        }
        let _ = execute!(
            stdout,
            event::DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout, term_w: u16, term_h: u16) -> Result<()> {
        self.resize(stdout, term_w, term_h)?;

        let frame_budget = Duration::from_secs_f64(1.0 / self.config.target_fps);
        let mut last = Instant::now();

        loop {
            let deadline = last + frame_budget;
            loop {
                let timeout = deadline.saturating_duration_since(Instant::now());
                if !event::poll(timeout)? {
                    break;
                }
                if self.handle_event(stdout, event::read()?)? == Flow::Quit {
                    return Ok(());
                }
            }

            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;

            let snapshot = self.device.snapshot(self.renderer.size());
            self.hall.tick(dt, &snapshot);
            self.device.end_frame(self.key_releases, Instant::now());

            if self.hall.phase() != self.last_phase {
                debug!(
                    from = self.last_phase.label(),
                    to = self.hall.phase().label(),
                    "phase change"
                );
                self.last_phase = self.hall.phase();
                self.render_menubar(stdout)?;
            }

            let ops = self.hall.draw_list(&self.config.signature);
            let frame = self.renderer.render(&ops);
            self.render_frame(stdout, &frame)?;
            self.render_status(stdout)?;
            stdout.flush()?;
        }
    }

    fn handle_event(&mut self, stdout: &mut io::Stdout, ev: Event) -> Result<Flow> {
        match ev {
            Event::Key(key) => {
                let bindings = &self.config.key_bindings;
                let quit = matches_binding(&bindings.quit, &key)
                    || matches_binding(&bindings.quit_alt, &key);
                if key.kind != KeyEventKind::Release && quit {
                    return Ok(Flow::Quit);
                }
                self.device.key(&key, &bindings.start, Instant::now());
            }
            Event::Mouse(m) => self.device.mouse(m),
            Event::Resize(w, h) => self.resize(stdout, w, h)?,
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn resize(&mut self, stdout: &mut io::Stdout, w: u16, h: u16) -> Result<()> {
        // One row for the menu bar, one for the status bar.
        self.renderer.resize(w, h.saturating_sub(CANVAS_OFFSET + 1));
        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
        self.render_menubar(stdout)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn render_menubar(&self, stdout: &mut io::Stdout) -> Result<()> {
        let start = format!("[{}] start", self.config.key_bindings.start);
        let quit = format!(
            "[{}][{}] quit",
            self.config.key_bindings.quit, self.config.key_bindings.quit_alt
        );
        let buy = format!("[1-{COLS}] buy block");
        let items: Vec<&str> = if self.hall.phase() == Phase::Idle {
            vec!["[click] reserve", buy.as_str(), start.as_str(), quit.as_str()]
        } else {
            vec!["screening in progress", quit.as_str()]
        };

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
        )?;
        print_hints(stdout, &items)?;
        Ok(())
    }

    fn render_frame(&self, stdout: &mut io::Stdout, frame: &Frame) -> Result<()> {
        match frame {
            Frame::Full { cells } => {
                for (y, row) in cells.iter().enumerate() {
                    queue!(stdout, cursor::MoveTo(0, y as u16 + CANVAS_OFFSET))?;
                    for cell in row {
                        print_cell(stdout, cell)?;
                    }
                }
            }
            Frame::Diff { changes } => {
                for change in changes {
                    queue!(stdout, cursor::MoveTo(change.x, change.y + CANVAS_OFFSET))?;
                    print_cell(stdout, &change.cell)?;
                }
            }
        }
        Ok(())
    }

    fn render_status(&self, stdout: &mut io::Stdout) -> Result<()> {
        let (_, canvas_h) = self.renderer.size();
        let status_y = canvas_h + CANVAS_OFFSET;

        let seats = self.hall.seats();
        let mut status = format!(
            " {} | free {} | reserved {} | sold {}",
            self.hall.phase().label().to_uppercase(),
            seats.count(SeatStatus::Free),
            seats.count(SeatStatus::Reserved),
            seats.count(SeatStatus::Sold),
        );
        if let Some(left) = self.hall.session().remaining() {
            status.push_str(&format!(" | {left:.1}s left"));
        }
        if self.hall.phase() != Phase::Idle {
            status.push_str(&format!(" | audience {}", self.hall.occupants().visible().count()));
        }
        status.push(' ');

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);

        queue!(
            stdout,
            cursor::MoveTo(0, status_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

fn print_cell(stdout: &mut io::Stdout, cell: &Cell) -> Result<()> {
    let cs = style::ContentStyle {
        foreground_color: Some(to_ct_color(cell.fg)),
        background_color: Some(to_ct_color(cell.bg)),
        ..Default::default()
    };
    queue!(
        stdout,
        style::PrintStyledContent(style::StyledContent::new(cs, cell.ch))
    )?;
    Ok(())
}

pub fn to_ct_color(c: Rgb) -> style::Color {
    let (r, g, b) = c.to_bytes();
    style::Color::Rgb { r, g, b }
}
