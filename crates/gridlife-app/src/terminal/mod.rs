//! Terminal front-end: crossterm events in, ratatui frames out.

use std::{
    io::{self, Stdout},
    time::Instant,
};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gridlife_core::{Automaton, Grid};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tracing::info;

use crate::{
    command::CommandQueue,
    control::{ControlLoop, LoopState},
    input::{InputTranslator, Key, KeyBindings, PointerButton, RawEvent},
    renderer::{Renderer, RendererContext},
};

/// Switches the session to a TestBackend run that never touches the real
/// terminal; the binary smoke test sets it.
pub const HEADLESS_ENV: &str = "GRIDLIFE_HEADLESS";

const DEFAULT_HEADLESS_FRAMES: usize = 12;
const MAX_HEADLESS_FRAMES: usize = 360;
const LIVE_CELL: char = '█';
const DEAD_CELL: char = '·';

pub struct TerminalRenderer {
    headless_frames: usize,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self {
            headless_frames: DEFAULT_HEADLESS_FRAMES,
        }
    }
}

impl TerminalRenderer {
    /// `headless_frames` bounds the headless run; interactive sessions run
    /// until the loop terminates.
    #[must_use]
    pub fn new(headless_frames: usize) -> Self {
        Self {
            headless_frames: headless_frames.clamp(1, MAX_HEADLESS_FRAMES),
        }
    }
}

impl Renderer for TerminalRenderer {
    fn name(&self) -> &'static str {
        "terminal"
    }

    fn run(&self, ctx: RendererContext<'_>) -> Result<()> {
        if std::env::var_os(HEADLESS_ENV).is_some() {
            let summary = self.run_headless(ctx)?;
            info!(
                frames = summary.frames,
                final_generation = summary.final_generation,
                live_cells = summary.live_cells,
                "terminal headless run completed",
            );
            return Ok(());
        }

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to build terminal backend")?;
        terminal.hide_cursor().ok();

        let result = run_event_loop(&mut terminal, ctx);

        terminal.show_cursor().ok();
        if let Err(err) = disable_raw_mode() {
            tracing::error!(?err, "failed to disable raw mode");
        }
        if let Err(err) = execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        ) {
            tracing::error!(?err, "failed to restore terminal");
        }

        result
    }
}

impl TerminalRenderer {
    fn run_headless(&self, ctx: RendererContext<'_>) -> Result<HeadlessSummary> {
        let RendererContext {
            world,
            catalog,
            commands,
            control,
        } = ctx;
        let backend = ratatui::backend::TestBackend::new(80, 36);
        let mut terminal = Terminal::new(backend).context("failed to build test backend")?;
        let mut session = TerminalSession::new();

        let mut frames = 0;
        for _ in 0..self.headless_frames {
            let alive = control.tick(commands, world, catalog);
            terminal.draw(|frame| session.draw(frame, &*world, control))?;
            frames += 1;
            if !alive {
                break;
            }
        }

        Ok(HeadlessSummary {
            frames,
            final_generation: world.generation().0,
            live_cells: world.grid().count_live(),
        })
    }
}

struct HeadlessSummary {
    frames: usize,
    final_generation: u64,
    live_cells: usize,
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ctx: RendererContext<'_>,
) -> Result<()> {
    let RendererContext {
        world,
        catalog,
        commands,
        control,
    } = ctx;
    let mut session = TerminalSession::new();

    loop {
        let deadline = Instant::now() + control.tick_interval();
        let alive = control.tick(commands, world, catalog);
        terminal.draw(|frame| session.draw(frame, &*world, control))?;
        if !alive {
            break;
        }

        // The inter-tick delay doubles as the input poll window, so the
        // cadence stays at max(tick interval, render cost) while input is
        // picked up as it arrives.
        loop {
            let budget = deadline.saturating_duration_since(Instant::now());
            if !event::poll(budget).context("failed to poll terminal events")? {
                break;
            }
            let event = event::read().context("failed to read terminal event")?;
            if let Some(raw) = session.raw_event(event)
                && let Some(command) = session.translator.translate(&raw)
            {
                commands.submit(command);
            }
            if budget.is_zero() {
                break;
            }
        }
    }

    Ok(())
}

struct TerminalSession {
    translator: InputTranslator,
    grid_area: Rect,
}

impl TerminalSession {
    fn new() -> Self {
        Self {
            // One terminal cell per grid cell, so the pointer scale is 1.
            translator: InputTranslator::new(1, KeyBindings::default()),
            grid_area: Rect::default(),
        }
    }

    fn raw_event(&self, event: Event) -> Option<RawEvent> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => key_event(key),
            Event::Mouse(mouse) => self.mouse_event(mouse),
            _ => None,
        }
    }

    /// Pointer coordinates are reported relative to the grid panel. Clicks
    /// past its right or bottom edge translate to out-of-range cells, which
    /// the engine ignores.
    fn mouse_event(&self, mouse: MouseEvent) -> Option<RawEvent> {
        let area = self.grid_area;
        if mouse.column < area.x || mouse.row < area.y {
            return None;
        }
        let x = u32::from(mouse.column - area.x);
        let y = u32::from(mouse.row - area.y);
        match mouse.kind {
            MouseEventKind::Down(button) => Some(RawEvent::PointerButtonDown {
                button: pointer_button(button),
                x,
                y,
            }),
            MouseEventKind::Up(button) => Some(RawEvent::PointerButtonUp {
                button: pointer_button(button),
                x,
                y,
            }),
            MouseEventKind::Moved => Some(RawEvent::PointerMoved { x, y }),
            _ => None,
        }
    }

    fn draw(&mut self, frame: &mut Frame<'_>, world: &dyn Automaton, control: &ControlLoop) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.draw_header(frame, outer[0], world, control);
        self.draw_grid(frame, outer[1], world.grid());
        self.draw_help(frame, outer[2]);
    }

    fn draw_header(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        world: &dyn Automaton,
        control: &ControlLoop,
    ) {
        let (label, style) = match control.state() {
            LoopState::Running => ("running", Style::default().fg(Color::Green)),
            LoopState::Paused => ("paused", Style::default().fg(Color::Yellow)),
            LoopState::Terminated => ("quitting", Style::default().fg(Color::Red)),
        };
        let line = Line::from(vec![
            Span::styled("gridlife", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  gen {}", world.generation().0)),
            Span::raw(format!("  |  {} alive", world.grid().count_live())),
            Span::raw(format!("  |  {} ms/tick  |  ", control.tick_interval_ms())),
            Span::styled(label, style),
        ]);
        frame.render_widget(
            Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
            area,
        );
    }

    fn draw_grid(&mut self, frame: &mut Frame<'_>, area: Rect, grid: &Grid) {
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        self.grid_area = inner;

        let visible_rows = grid.rows().min(inner.height as usize);
        let visible_cols = grid.cols().min(inner.width as usize);
        let mut lines = Vec::with_capacity(visible_rows);
        for row in 0..visible_rows {
            let mut text = String::with_capacity(visible_cols);
            for col in 0..visible_cols {
                text.push(if grid.get(row, col) {
                    LIVE_CELL
                } else {
                    DEAD_CELL
                });
            }
            lines.push(Line::from(text));
        }
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_help(&self, frame: &mut Frame<'_>, area: Rect) {
        frame.render_widget(
            Paragraph::new(
                "space pause | r randomize | c clear | +/- speed | g pattern | click toggle | esc quit",
            )
            .style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }
}

fn key_event(key: KeyEvent) -> Option<RawEvent> {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(RawEvent::WindowClose)
        }
        KeyCode::Esc => Some(RawEvent::KeyDown {
            key: Key::Escape,
            shift,
        }),
        KeyCode::Char(c) => Some(RawEvent::KeyDown {
            key: Key::Char(c),
            shift,
        }),
        _ => None,
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlife_core::ControlCommand;

    #[test]
    fn clicks_are_reported_relative_to_the_grid_panel() {
        let mut session = TerminalSession::new();
        session.grid_area = Rect::new(1, 4, 40, 20);

        let raw = session.raw_event(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 13,
            row: 9,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(
            raw,
            Some(RawEvent::PointerButtonDown {
                button: PointerButton::Primary,
                x: 12,
                y: 5,
            }),
        );
        assert_eq!(
            session.translator.translate(&raw.expect("raw event")),
            Some(ControlCommand::ToggleCell { row: 5, col: 12 }),
        );
    }

    #[test]
    fn clicks_above_the_grid_panel_are_dropped() {
        let mut session = TerminalSession::new();
        session.grid_area = Rect::new(1, 4, 40, 20);

        let raw = session.raw_event(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row: 1,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(raw, None);
    }

    #[test]
    fn ctrl_c_is_a_close_request() {
        let raw = key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(raw, Some(RawEvent::WindowClose));
    }

    #[test]
    fn plain_keys_carry_the_shift_flag() {
        let raw = key_event(KeyEvent::new(KeyCode::Char('='), KeyModifiers::SHIFT));
        assert_eq!(
            raw,
            Some(RawEvent::KeyDown {
                key: Key::Char('='),
                shift: true,
            }),
        );
    }
}
