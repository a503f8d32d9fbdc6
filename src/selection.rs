//! Double-click selection and the highlight outline that follows it.

use std::fmt;
use std::time::Instant;

use crate::constants::{DOUBLE_CLICK, HIGHLIGHT_PADDING};
use crate::drivers::{Overlay, PointerState, WindowSystem};

/// Tracks primary-button releases and the currently selected window.
///
/// A release on the same foreground window as the previous release, within
/// [`DOUBLE_CLICK`], selects that window. Any other release becomes the new
/// reference point. Selection does not depend on the window being simulated.
#[derive(Debug)]
pub struct SelectionController<H> {
    selected: Option<H>,
    button_was_down: bool,
    last_release: Option<(H, Instant)>,
}

impl<H> Default for SelectionController<H> {
    fn default() -> Self {
        Self {
            selected: None,
            button_was_down: false,
            last_release: None,
        }
    }
}

impl<H: Copy + Eq + fmt::Debug> SelectionController<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<H> {
        self.selected
    }

    /// Feed one pointer sample. Returns the window that became selected on
    /// this sample, if any.
    pub fn observe(&mut self, pointer: PointerState<H>, now: Instant) -> Option<H> {
        let released = self.button_was_down && !pointer.button_down;
        self.button_was_down = pointer.button_down;
        if !released {
            return None;
        }
        let Some(window) = pointer.foreground else {
            self.last_release = None;
            return None;
        };
        if let Some((prev, at)) = self.last_release
            && prev == window
            && now.saturating_duration_since(at) <= DOUBLE_CLICK
        {
            self.selected = Some(window);
            return Some(window);
        }
        self.last_release = Some((window, now));
        None
    }

    /// Keep the overlay wrapped around the selected window, dropping the
    /// selection once the window can no longer be queried. Overlay failures
    /// are logged and never stop the tick.
    pub fn update_highlight<S>(&mut self, system: &mut S, overlay: &mut S::Overlay)
    where
        S: WindowSystem<Handle = H> + ?Sized,
    {
        let Some(window) = self.selected else {
            return;
        };
        let result = match system.rect(window) {
            Ok(rect) => overlay
                .move_to(rect.padded(HIGHLIGHT_PADDING))
                .and_then(|()| overlay.show()),
            Err(err) => {
                tracing::info!(window = ?window, %err, "selection lost");
                self.selected = None;
                overlay.hide()
            }
        };
        if let Err(err) = result {
            tracing::warn!(window = ?window, %err, "highlight overlay update failed");
        }
    }
}
