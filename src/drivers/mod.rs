//! Window-system backends.
//!
//! The simulation never talks to the operating system directly; it polls a
//! [`WindowSystem`] once per tick. Backends:
//!
//! - [`memory::MemoryDesktop`]: an in-memory desktop used by tests, the
//!   benchmark and the terminal desktop.
//! - [`console::ConsoleDesktop`]: renders a memory desktop in the terminal and
//!   feeds it terminal mouse input.
//! - `win32::Win32Desktop` (Windows only): real top-level windows.

pub mod console;
pub mod memory;
#[cfg(windows)]
pub mod win32;

use std::fmt;

use crate::error::WindowError;
use crate::geometry::Rect;

/// Borderless, always-on-top outline drawn around the selected window.
pub trait Overlay {
    /// Place the outline so it covers `rect` (outer edge).
    fn move_to(&mut self, rect: Rect) -> Result<(), WindowError>;
    fn show(&mut self) -> Result<(), WindowError>;
    fn hide(&mut self) -> Result<(), WindowError>;
}

/// Polled access to the platform's top-level windows and pointer state.
///
/// Every call is synchronous. Handles are opaque and may be invalidated by the
/// platform at any time, in which case rectangle queries and moves fail with
/// [`WindowError::Unavailable`] or [`WindowError::Os`].
pub trait WindowSystem {
    type Handle: Copy + Eq + fmt::Debug;
    type Overlay: Overlay;

    /// All top-level windows, in no particular order.
    fn enumerate_windows(&mut self) -> Result<Vec<Self::Handle>, WindowError>;
    fn is_visible(&mut self, handle: Self::Handle) -> bool;
    fn title(&mut self, handle: Self::Handle) -> String;
    fn rect(&mut self, handle: Self::Handle) -> Result<Rect, WindowError>;
    /// Move without resizing or changing stacking order.
    fn set_position(&mut self, handle: Self::Handle, x: i32, y: i32) -> Result<(), WindowError>;
    fn foreground_window(&mut self) -> Option<Self::Handle>;
    fn primary_button_down(&mut self) -> bool;
    /// Extents of the whole virtual screen (all monitors).
    fn virtual_bounds(&mut self) -> Rect;
    fn create_overlay(&mut self) -> Result<Self::Overlay, WindowError>;
}

impl<T: WindowSystem + ?Sized> WindowSystem for &mut T {
    type Handle = T::Handle;
    type Overlay = T::Overlay;

    fn enumerate_windows(&mut self) -> Result<Vec<Self::Handle>, WindowError> {
        (**self).enumerate_windows()
    }

    fn is_visible(&mut self, handle: Self::Handle) -> bool {
        (**self).is_visible(handle)
    }

    fn title(&mut self, handle: Self::Handle) -> String {
        (**self).title(handle)
    }

    fn rect(&mut self, handle: Self::Handle) -> Result<Rect, WindowError> {
        (**self).rect(handle)
    }

    fn set_position(&mut self, handle: Self::Handle, x: i32, y: i32) -> Result<(), WindowError> {
        (**self).set_position(handle, x, y)
    }

    fn foreground_window(&mut self) -> Option<Self::Handle> {
        (**self).foreground_window()
    }

    fn primary_button_down(&mut self) -> bool {
        (**self).primary_button_down()
    }

    fn virtual_bounds(&mut self) -> Rect {
        (**self).virtual_bounds()
    }

    fn create_overlay(&mut self) -> Result<Self::Overlay, WindowError> {
        (**self).create_overlay()
    }
}

/// Pointer state sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerState<H> {
    pub button_down: bool,
    pub foreground: Option<H>,
}

impl<H: Copy + Eq + fmt::Debug> PointerState<H> {
    pub fn poll<S>(system: &mut S) -> Self
    where
        S: WindowSystem<Handle = H> + ?Sized,
    {
        Self {
            button_down: system.primary_button_down(),
            foreground: system.foreground_window(),
        }
    }
}
