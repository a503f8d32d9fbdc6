//! The simulation session: all mutable state of a running simulation and the
//! single-tick driver.

use std::time::Instant;

use crate::constants::{SCAN_INTERVAL, WHITELIST_TITLES};
use crate::drivers::{Overlay, PointerState, WindowSystem};
use crate::error::WindowError;
use crate::geometry::Rect;
use crate::physics::{
    Body, COLLISION_PASSES, clamp_to_floor, detect_drag, hold, integrate,
    resolve_collisions, settle_contacts, step_dt,
};
use crate::scanner;
use crate::selection::SelectionController;

pub struct Session<S: WindowSystem> {
    system: S,
    overlay: S::Overlay,
    bounds: Rect,
    bodies: Vec<Body<S::Handle>>,
    last_scan: Option<Instant>,
    last_tick: Instant,
    selection: SelectionController<S::Handle>,
}

impl<S: WindowSystem> Session<S> {
    /// Create a session over `system`. The world bounds are read once here,
    /// and the highlight overlay is created hidden; failing to create it is
    /// fatal.
    pub fn new(mut system: S, started: Instant) -> Result<Self, WindowError> {
        let bounds = system.virtual_bounds();
        let mut overlay = system.create_overlay()?;
        overlay.hide()?;
        tracing::debug!(?bounds, "session started");
        Ok(Self {
            system,
            overlay,
            bounds,
            bodies: Vec::new(),
            last_scan: None,
            last_tick: started,
            selection: SelectionController::new(),
        })
    }

    pub fn bodies(&self) -> &[Body<S::Handle>] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body<S::Handle>] {
        &mut self.bodies
    }

    pub fn body(&self, handle: S::Handle) -> Option<&Body<S::Handle>> {
        self.bodies.iter().find(|b| b.handle == handle)
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn selected(&self) -> Option<S::Handle> {
        self.selection.selected()
    }

    /// Replace the body registry with fresh bodies at rest.
    pub fn rescan(&mut self, now: Instant) -> Result<(), WindowError> {
        self.bodies = scanner::scan(&mut self.system, WHITELIST_TITLES)?;
        self.last_scan = Some(now);
        Ok(())
    }

    fn scan_due(&self, now: Instant) -> bool {
        self.last_scan
            .is_none_or(|at| now.saturating_duration_since(at) > SCAN_INTERVAL)
    }

    /// Advance the simulation by one tick ending at `now`.
    pub fn step(&mut self, now: Instant) -> Result<(), WindowError> {
        let dt = step_dt(now.saturating_duration_since(self.last_tick));
        self.last_tick = now;

        if self.scan_due(now) {
            self.rescan(now)?;
        }

        let pointer = PointerState::poll(&mut self.system);
        self.update_selection(pointer, now);

        self.refresh_bodies();
        for body in self.bodies.iter_mut().filter(|b| !b.stale) {
            detect_drag(body, pointer, now);
            if body.dragging {
                hold(body);
            } else {
                integrate(body, dt);
            }
        }

        let contacts = resolve_collisions(&mut self.bodies, COLLISION_PASSES);
        let floor_y = self.bounds.bottom as f64;
        for body in self.bodies.iter_mut().filter(|b| !b.stale) {
            clamp_to_floor(body, floor_y);
        }
        settle_contacts(&mut self.bodies, &contacts);
        self.commit();
        Ok(())
    }

    fn update_selection(&mut self, pointer: PointerState<S::Handle>, now: Instant) {
        if let Some(window) = self.selection.observe(pointer, now) {
            let title = self.system.title(window);
            tracing::info!(window = ?window, title = %title, "selected");
        }
        self.selection
            .update_highlight(&mut self.system, &mut self.overlay);
    }

    /// Adopt the window system's rectangles. Bodies whose window cannot be
    /// queried sit this tick out.
    fn refresh_bodies(&mut self) {
        for body in &mut self.bodies {
            match self.system.rect(body.handle) {
                Ok(rect) => body.refresh(rect),
                Err(err) if err.is_transient() => {
                    tracing::debug!(window = ?body.handle, %err, "refresh skipped");
                    body.stale = true;
                }
                Err(err) => {
                    tracing::warn!(window = ?body.handle, title = %body.title, %err, "refresh failed");
                    body.stale = true;
                }
            }
        }
    }

    /// Push resolved positions to the window system, snapped to whole pixels.
    /// The fractional position survives as long as the window stays on the
    /// pixel it was moved to.
    fn commit(&mut self) {
        for body in self.bodies.iter_mut().filter(|b| !b.stale) {
            let x = body.nx.floor() as i32;
            let y = body.ny.floor() as i32;
            match self.system.set_position(body.handle, x, y) {
                Ok(()) => body.confirm(x, y),
                Err(err) => {
                    tracing::warn!(window = ?body.handle, title = %body.title, %err, "failed to move window");
                }
            }
        }
    }
}

impl<S: WindowSystem> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("bounds", &self.bounds)
            .field("bodies", &self.bodies.len())
            .field("selected", &self.selection.selected())
            .finish()
    }
}

/// Total kinetic energy of the free bodies, in mass·px²/s².
pub fn kinetic_energy<H>(bodies: &[Body<H>]) -> f64 {
    bodies
        .iter()
        .filter(|b| b.is_free())
        .map(|b| 0.5 * b.mass() * (b.vx * b.vx + b.vy * b.vy))
        .sum()
}
