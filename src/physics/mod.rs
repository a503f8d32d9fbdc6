//! Rigid-body simulation of window rectangles.
//!
//! Per tick, in order: [`throw::detect_drag`], [`integrator::integrate`] (or
//! [`integrator::hold`] while dragged), two passes of
//! [`collision::resolve_collisions`], then [`surface::clamp_to_floor`] and
//! [`surface::settle_contacts`].

pub mod body;
pub mod collision;
pub mod integrator;
pub mod surface;
pub mod throw;

pub use body::{Body, Sample, body_mass};
pub use collision::{Contact, Separation, resolve_collisions};
pub use integrator::{hold, integrate, step_dt};
pub use surface::{apply_friction, clamp_to_floor, settle_contacts};
pub use throw::{detect_drag, estimate_throw};

/// Relaxation passes over all body pairs per tick.
pub const COLLISION_PASSES: usize = 2;
