//! Terminal desktop.
//!
//! Renders a [`MemoryDesktop`] in the terminal and turns terminal mouse input
//! into desktop pointer state, so the simulation can run (and be played with)
//! without a native window system. One terminal cell stands for
//! [`CELL_WIDTH_PX`] × [`CELL_HEIGHT_PX`] desktop pixels; the bottom row is a
//! status bar.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect as CellRect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::memory::{MemoryDesktop, MemoryWindowId};
use crate::constants::{HIGHLIGHT_RGB, WHITELIST_TITLES};
use crate::debug_log::DebugLogHandle;
use crate::event_loop::ControlFlow;
use crate::geometry::Rect;
use crate::scanner::title_matches;

pub const CELL_WIDTH_PX: i32 = 8;
pub const CELL_HEIGHT_PX: i32 = 16;

const STATUS_HINT: &str = "drag to throw · double-click to select · q to quit";

/// Map a desktop rectangle onto the terminal cells it covers, clipped to
/// `area`. Returns `None` when nothing is visible.
pub fn to_cells(rect: Rect, area: CellRect) -> Option<CellRect> {
    let left = rect.left.div_euclid(CELL_WIDTH_PX);
    let top = rect.top.div_euclid(CELL_HEIGHT_PX);
    let right = (rect.right + CELL_WIDTH_PX - 1).div_euclid(CELL_WIDTH_PX);
    let bottom = (rect.bottom + CELL_HEIGHT_PX - 1).div_euclid(CELL_HEIGHT_PX);

    let left = left.max(i32::from(area.x));
    let top = top.max(i32::from(area.y));
    let right = right.min(i32::from(area.x) + i32::from(area.width));
    let bottom = bottom.min(i32::from(area.y) + i32::from(area.height));
    if right <= left || bottom <= top {
        return None;
    }
    Some(CellRect {
        x: left as u16,
        y: top as u16,
        width: (right - left) as u16,
        height: (bottom - top) as u16,
    })
}

/// Desktop pixel at the centre of a terminal cell.
pub fn cell_center(column: u16, row: u16) -> (i32, i32) {
    (
        i32::from(column) * CELL_WIDTH_PX + CELL_WIDTH_PX / 2,
        i32::from(row) * CELL_HEIGHT_PX + CELL_HEIGHT_PX / 2,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Grab {
    id: MemoryWindowId,
    dx: i32,
    dy: i32,
}

/// Translates terminal mouse events into desktop pointer state.
///
/// Pressing on a window focuses and raises it, and dragging moves it with the
/// pointer, which is what a window manager does for a title-bar drag.
#[derive(Debug, Default)]
pub struct PointerBridge {
    grab: Option<Grab>,
}

impl PointerBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grabbed(&self) -> Option<MemoryWindowId> {
        self.grab.map(|g| g.id)
    }

    pub fn apply(&mut self, desktop: &MemoryDesktop, mouse: MouseEvent) {
        let (px, py) = cell_center(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.grab = None;
                match desktop.window_at(px, py) {
                    Some(id) => {
                        desktop.press(id);
                        if let Some(rect) = desktop.window_rect(id) {
                            self.grab = Some(Grab {
                                id,
                                dx: px - rect.left,
                                dy: py - rect.top,
                            });
                        }
                    }
                    None => {
                        desktop.set_foreground(None);
                        desktop.set_button_down(true);
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(grab) = self.grab {
                    desktop.drag_to(grab.id, px - grab.dx, py - grab.dy);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                desktop.release();
                self.grab = None;
            }
            _ => {}
        }
    }
}

pub struct ConsoleDesktop {
    desktop: MemoryDesktop,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pointer: PointerBridge,
    log: DebugLogHandle,
    entered: bool,
}

impl ConsoleDesktop {
    /// Create a desktop sized to the current terminal and open a few demo
    /// windows on it.
    pub fn new(log: DebugLogHandle) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        let bounds = Rect::new(
            0,
            0,
            i32::from(columns) * CELL_WIDTH_PX,
            i32::from(rows.saturating_sub(1)) * CELL_HEIGHT_PX,
        );
        let desktop = MemoryDesktop::new(bounds);
        seed_windows(&desktop);
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self {
            desktop,
            terminal,
            pointer: PointerBridge::new(),
            log,
            entered: false,
        })
    }

    /// A handle onto the rendered desktop, for the session to drive.
    pub fn desktop(&self) -> MemoryDesktop {
        self.desktop.clone()
    }

    pub fn enter(&mut self) -> io::Result<()> {
        if self.entered {
            return Ok(());
        }
        execute!(
            self.terminal.backend_mut(),
            EnterAlternateScreen,
            EnableMouseCapture
        )?;
        terminal::enable_raw_mode()?;
        self.terminal.hide_cursor()?;
        self.entered = true;
        Ok(())
    }

    pub fn exit(&mut self) -> io::Result<()> {
        if !self.entered {
            return Ok(());
        }
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        self.entered = false;
        Ok(())
    }

    /// Drain pending terminal input without blocking.
    pub fn pump_events(&mut self) -> io::Result<ControlFlow> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let ctrl_c = key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL);
                    if ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        return Ok(ControlFlow::Quit);
                    }
                }
                Event::Mouse(mouse) => self.pointer.apply(&self.desktop, mouse),
                _ => {}
            }
        }
        Ok(ControlFlow::Continue)
    }

    pub fn draw(&mut self) -> io::Result<()> {
        let windows = self.desktop.snapshot();
        let overlay = self.desktop.overlay();
        let status = match self.log.latest() {
            Some(line) => format!(" {STATUS_HINT} │ {line}"),
            None => format!(" {STATUS_HINT}"),
        };
        let (r, g, b) = HIGHLIGHT_RGB;
        let highlight = Color::Rgb(r, g, b);

        self.terminal
            .draw(|frame| {
                let full = frame.area();
                let desk = CellRect {
                    height: full.height.saturating_sub(1),
                    ..full
                };
                for window in windows.iter().filter(|w| w.visible) {
                    let Some(area) = to_cells(window.rect, desk) else {
                        continue;
                    };
                    let simulated = title_matches(&window.title, WHITELIST_TITLES);
                    let border = if simulated {
                        Style::default().fg(Color::White)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    let block = Block::default()
                        .borders(Borders::ALL)
                        .border_style(border)
                        .title(window.title.as_str());
                    frame.render_widget(Clear, area);
                    frame.render_widget(block, area);
                }
                let outlined = overlay
                    .rect
                    .filter(|_| overlay.visible)
                    .and_then(|rect| to_cells(rect, desk));
                if let Some(area) = outlined {
                    let outline = Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(highlight).add_modifier(Modifier::BOLD));
                    frame.render_widget(outline, area);
                }
                if full.height > 0 {
                    let bar = CellRect {
                        y: full.y + full.height - 1,
                        height: 1,
                        ..full
                    };
                    frame.render_widget(
                        Paragraph::new(status.as_str())
                            .style(Style::default().fg(Color::Black).bg(Color::Gray)),
                        bar,
                    );
                }
            })
            .map(|_| ())
            .map_err(|err| io::Error::other(err.to_string()))
    }
}

impl Drop for ConsoleDesktop {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}

/// Three simulated windows plus one that is not on the whitelist and stays
/// where it is.
fn seed_windows(desktop: &MemoryDesktop) {
    let bounds = desktop.bounds();
    let w = bounds.width();
    desktop.add_window(
        "Untitled - Notepad",
        Rect::from_origin_size(w / 10, 0, 30 * CELL_WIDTH_PX, 8 * CELL_HEIGHT_PX),
    );
    desktop.add_window(
        "Paint",
        Rect::from_origin_size(w / 3, CELL_HEIGHT_PX * 2, 40 * CELL_WIDTH_PX, 10 * CELL_HEIGHT_PX),
    );
    desktop.add_window(
        "Calculator",
        Rect::from_origin_size(w / 2, CELL_HEIGHT_PX, 18 * CELL_WIDTH_PX, 12 * CELL_HEIGHT_PX),
    );
    desktop.add_window(
        "Task Manager",
        Rect::from_origin_size(
            w * 2 / 3,
            bounds.height() / 3,
            26 * CELL_WIDTH_PX,
            6 * CELL_HEIGHT_PX,
        ),
    );
}
