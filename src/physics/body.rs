use std::collections::VecDeque;
use std::time::Instant;

use crate::constants::{HISTORY_CAPACITY, MASS_AREA_DIVISOR, MAX_MASS, MIN_MASS};
use crate::geometry::Rect;

/// Mass of a window of the given size, proportional to its area.
pub fn body_mass(width: f64, height: f64) -> f64 {
    (width * height / MASS_AREA_DIVISOR).clamp(MIN_MASS, MAX_MASS)
}

/// One position sample taken while a body is being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub at: Instant,
    pub x: f64,
    pub y: f64,
}

/// Physics proxy for one on-screen window.
///
/// Bodies live for a single scan epoch. `(x, y)` is the last position the
/// window system confirmed, kept with sub-pixel precision while the window
/// stays where it was last put; `(nx, ny)` is the candidate position being
/// resolved during the current tick.
#[derive(Debug, Clone)]
pub struct Body<H> {
    pub handle: H,
    pub title: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub nx: f64,
    pub ny: f64,
    pub vx: f64,
    pub vy: f64,
    pub dragging: bool,
    pub history: VecDeque<Sample>,
    /// Whole-pixel position of the last successful move.
    pub committed: Option<(i32, i32)>,
    /// Set when this tick's rectangle refresh failed; the body sits the tick
    /// out.
    pub stale: bool,
}

impl<H> Body<H> {
    pub fn new(handle: H, title: impl Into<String>, rect: Rect) -> Self {
        let x = rect.left as f64;
        let y = rect.top as f64;
        Self {
            handle,
            title: title.into(),
            x,
            y,
            width: rect.width().max(1) as f64,
            height: rect.height().max(1) as f64,
            nx: x,
            ny: y,
            vx: 0.0,
            vy: 0.0,
            dragging: false,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            committed: None,
            stale: false,
        }
    }

    pub fn mass(&self) -> f64 {
        body_mass(self.width, self.height)
    }

    /// Adopt the window system's view of the window.
    ///
    /// A window still sitting on the pixel it was last moved to keeps its
    /// fractional position; anything else (a user drag, the window manager
    /// moving it) replaces it.
    pub fn refresh(&mut self, rect: Rect) {
        if self.committed != Some((rect.left, rect.top)) {
            self.x = rect.left as f64;
            self.y = rect.top as f64;
            self.committed = None;
        }
        self.width = rect.width().max(1) as f64;
        self.height = rect.height().max(1) as f64;
        self.stale = false;
    }

    /// Record a successful move to `(x, y)`, the whole-pixel snap of the
    /// candidate position.
    pub fn confirm(&mut self, x: i32, y: i32) {
        self.x = self.nx;
        self.y = self.ny;
        self.committed = Some((x, y));
    }

    /// Record a drag sample, dropping the oldest beyond capacity.
    pub fn record_sample(&mut self, at: Instant) {
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(Sample {
            at,
            x: self.x,
            y: self.y,
        });
    }

    /// Free bodies move under gravity and take part in collisions.
    pub fn is_free(&self) -> bool {
        !self.dragging && !self.stale
    }

    pub fn bottom(&self) -> f64 {
        self.ny + self.height
    }
}
