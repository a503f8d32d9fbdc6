//! In-memory desktop.
//!
//! `MemoryDesktop` is a cheap, cloneable handle onto shared desktop state, so a
//! test (or the terminal desktop) can keep one clone to script input and
//! inspect window positions while the session owns another.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Overlay, WindowSystem};
use crate::error::WindowError;
use crate::geometry::Rect;

/// `ERROR_INVALID_WINDOW_HANDLE`, reported for injected OS failures.
const INVALID_HANDLE_CODE: u32 = 1400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoryWindowId(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub id: MemoryWindowId,
    pub title: String,
    pub rect: Rect,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlaySnapshot {
    pub rect: Option<Rect>,
    pub visible: bool,
}

#[derive(Debug)]
struct MemoryWindow {
    id: MemoryWindowId,
    title: String,
    rect: Rect,
    visible: bool,
    rect_fails: bool,
    move_fails: bool,
}

#[derive(Debug)]
struct DesktopState {
    bounds: Rect,
    // Stacking order, topmost last.
    windows: Vec<MemoryWindow>,
    next_id: u32,
    foreground: Option<MemoryWindowId>,
    button_down: bool,
    overlay: OverlaySnapshot,
    overlay_fails: bool,
    overlay_updates_fail: bool,
    enumerate_fails: bool,
    moves: usize,
}

impl DesktopState {
    fn window(&self, id: MemoryWindowId) -> Option<&MemoryWindow> {
        self.windows.iter().find(|w| w.id == id)
    }

    fn window_mut(&mut self, id: MemoryWindowId) -> Option<&mut MemoryWindow> {
        self.windows.iter_mut().find(|w| w.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct MemoryDesktop {
    state: Rc<RefCell<DesktopState>>,
}

impl MemoryDesktop {
    pub fn new(bounds: Rect) -> Self {
        Self {
            state: Rc::new(RefCell::new(DesktopState {
                bounds,
                windows: Vec::new(),
                next_id: 1,
                foreground: None,
                button_down: false,
                overlay: OverlaySnapshot::default(),
                overlay_fails: false,
                overlay_updates_fail: false,
                enumerate_fails: false,
                moves: 0,
            })),
        }
    }

    /// Open a visible window on top of the stack.
    pub fn add_window(&self, title: impl Into<String>, rect: Rect) -> MemoryWindowId {
        let mut state = self.state.borrow_mut();
        let id = MemoryWindowId(state.next_id);
        state.next_id += 1;
        state.windows.push(MemoryWindow {
            id,
            title: title.into(),
            rect,
            visible: true,
            rect_fails: false,
            move_fails: false,
        });
        id
    }

    pub fn close_window(&self, id: MemoryWindowId) {
        let mut state = self.state.borrow_mut();
        state.windows.retain(|w| w.id != id);
        if state.foreground == Some(id) {
            state.foreground = None;
        }
    }

    pub fn set_visible(&self, id: MemoryWindowId, visible: bool) {
        if let Some(window) = self.state.borrow_mut().window_mut(id) {
            window.visible = visible;
        }
    }

    pub fn set_foreground(&self, id: Option<MemoryWindowId>) {
        self.state.borrow_mut().foreground = id;
    }

    pub fn set_button_down(&self, down: bool) {
        self.state.borrow_mut().button_down = down;
    }

    /// Press the primary button on `id`: it becomes the foreground window and
    /// is raised to the top of the stack.
    pub fn press(&self, id: MemoryWindowId) {
        let mut state = self.state.borrow_mut();
        if let Some(index) = state.windows.iter().position(|w| w.id == id) {
            let window = state.windows.remove(index);
            state.windows.push(window);
            state.foreground = Some(id);
        }
        state.button_down = true;
    }

    pub fn release(&self) {
        self.state.borrow_mut().button_down = false;
    }

    /// Move a window the way a user dragging its title bar would. Injected
    /// move failures do not apply.
    pub fn drag_to(&self, id: MemoryWindowId, x: i32, y: i32) {
        if let Some(window) = self.state.borrow_mut().window_mut(id) {
            window.rect = window.rect.moved_to(x, y);
        }
    }

    pub fn window_rect(&self, id: MemoryWindowId) -> Option<Rect> {
        self.state.borrow().window(id).map(|w| w.rect)
    }

    /// Topmost visible window containing the point.
    pub fn window_at(&self, x: i32, y: i32) -> Option<MemoryWindowId> {
        self.state
            .borrow()
            .windows
            .iter()
            .rev()
            .find(|w| w.visible && w.rect.contains(x, y))
            .map(|w| w.id)
    }

    /// Visible and hidden windows in stacking order, topmost last.
    pub fn snapshot(&self) -> Vec<WindowSnapshot> {
        self.state
            .borrow()
            .windows
            .iter()
            .map(|w| WindowSnapshot {
                id: w.id,
                title: w.title.clone(),
                rect: w.rect,
                visible: w.visible,
            })
            .collect()
    }

    pub fn overlay(&self) -> OverlaySnapshot {
        self.state.borrow().overlay
    }

    pub fn bounds(&self) -> Rect {
        self.state.borrow().bounds
    }

    /// Number of successful `set_position` calls so far.
    pub fn move_count(&self) -> usize {
        self.state.borrow().moves
    }

    pub fn set_rect_fails(&self, id: MemoryWindowId, fails: bool) {
        if let Some(window) = self.state.borrow_mut().window_mut(id) {
            window.rect_fails = fails;
        }
    }

    pub fn set_move_fails(&self, id: MemoryWindowId, fails: bool) {
        if let Some(window) = self.state.borrow_mut().window_mut(id) {
            window.move_fails = fails;
        }
    }

    pub fn set_enumerate_fails(&self, fails: bool) {
        self.state.borrow_mut().enumerate_fails = fails;
    }

    pub fn set_overlay_fails(&self, fails: bool) {
        self.state.borrow_mut().overlay_fails = fails;
    }

    /// Make overlay move/show/hide fail without touching the overlay state.
    pub fn set_overlay_updates_fail(&self, fails: bool) {
        self.state.borrow_mut().overlay_updates_fail = fails;
    }
}

impl WindowSystem for MemoryDesktop {
    type Handle = MemoryWindowId;
    type Overlay = MemoryOverlay;

    fn enumerate_windows(&mut self) -> Result<Vec<MemoryWindowId>, WindowError> {
        let state = self.state.borrow();
        if state.enumerate_fails {
            return Err(WindowError::Os {
                op: "enumerate windows",
                code: INVALID_HANDLE_CODE,
            });
        }
        Ok(state.windows.iter().map(|w| w.id).collect())
    }

    fn is_visible(&mut self, handle: MemoryWindowId) -> bool {
        self.state
            .borrow()
            .window(handle)
            .is_some_and(|w| w.visible)
    }

    fn title(&mut self, handle: MemoryWindowId) -> String {
        self.state
            .borrow()
            .window(handle)
            .map(|w| w.title.clone())
            .unwrap_or_default()
    }

    fn rect(&mut self, handle: MemoryWindowId) -> Result<Rect, WindowError> {
        let state = self.state.borrow();
        let window = state
            .window(handle)
            .ok_or(WindowError::Unavailable { op: "query rect" })?;
        if window.rect_fails {
            return Err(WindowError::Os {
                op: "query rect",
                code: INVALID_HANDLE_CODE,
            });
        }
        Ok(window.rect)
    }

    fn set_position(&mut self, handle: MemoryWindowId, x: i32, y: i32) -> Result<(), WindowError> {
        let mut state = self.state.borrow_mut();
        let window = state
            .window_mut(handle)
            .ok_or(WindowError::Unavailable { op: "move window" })?;
        if window.move_fails {
            return Err(WindowError::Os {
                op: "move window",
                code: INVALID_HANDLE_CODE,
            });
        }
        window.rect = window.rect.moved_to(x, y);
        state.moves += 1;
        Ok(())
    }

    fn foreground_window(&mut self) -> Option<MemoryWindowId> {
        self.state.borrow().foreground
    }

    fn primary_button_down(&mut self) -> bool {
        self.state.borrow().button_down
    }

    fn virtual_bounds(&mut self) -> Rect {
        self.state.borrow().bounds
    }

    fn create_overlay(&mut self) -> Result<MemoryOverlay, WindowError> {
        if self.state.borrow().overlay_fails {
            return Err(WindowError::Overlay("overlay creation disabled".into()));
        }
        Ok(MemoryOverlay {
            state: Rc::clone(&self.state),
        })
    }
}

#[derive(Debug)]
pub struct MemoryOverlay {
    state: Rc<RefCell<DesktopState>>,
}

impl MemoryOverlay {
    fn update(&mut self, apply: impl FnOnce(&mut OverlaySnapshot)) -> Result<(), WindowError> {
        let mut state = self.state.borrow_mut();
        if state.overlay_updates_fail {
            return Err(WindowError::Overlay("overlay update failed".into()));
        }
        apply(&mut state.overlay);
        Ok(())
    }
}

impl Overlay for MemoryOverlay {
    fn move_to(&mut self, rect: Rect) -> Result<(), WindowError> {
        self.update(|overlay| overlay.rect = Some(rect))
    }

    fn show(&mut self) -> Result<(), WindowError> {
        self.update(|overlay| overlay.visible = true)
    }

    fn hide(&mut self) -> Result<(), WindowError> {
        self.update(|overlay| overlay.visible = false)
    }
}
