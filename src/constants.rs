//! Simulation tunables.
//!
//! Everything the simulation can be tuned by lives here as a compile-time
//! constant. Units are screen pixels and seconds unless stated otherwise.

use std::time::Duration;

/// Case-insensitive title substrings that make a window eligible for the
/// simulation. Windows whose title contains none of these are left alone.
pub const WHITELIST_TITLES: &[&str] = &["Notepad", "Paint", "Calculator"];

/// Downward acceleration applied to every free body.
///
/// Units: px/s². Screen y grows downwards, so a positive value pulls
/// windows towards the bottom of the virtual screen.
pub const GRAVITY: f64 = 2500.0;

/// Multiplicative per-tick damping applied to both velocity components of a
/// free body after gravity.
pub const AIR_DRAG: f64 = 0.998;

/// Fraction of velocity retained after a window/window collision or a bounce
/// off the floor.
pub const RESTITUTION: f64 = 0.25;

/// Per-tick horizontal decay of a body sliding along the floor.
pub const FRICTION_GROUND: f64 = 0.90;

/// Per-tick horizontal decay of a body resting on top of another body.
pub const FRICTION_SURFACE: f64 = 0.88;

/// Vertical speed below which a landing body stops instead of bouncing.
pub const VEL_FLOOR_STOP: f64 = 20.0;

/// Horizontal speed below which friction snaps a sliding body to rest.
pub const VEL_DRIFT_STOP: f64 = 15.0;

/// Horizontal throw speed cap (px/s), applied symmetrically.
pub const MAX_THROW_VX: f64 = 2200.0;

/// Vertical throw speed cap (px/s), applied symmetrically.
pub const MAX_THROW_VY: f64 = 2600.0;

/// Trailing window of drag samples considered when estimating a throw.
pub const HISTORY_WINDOW: Duration = Duration::from_millis(200);

/// Maximum number of drag samples kept per body.
pub const HISTORY_CAPACITY: usize = 10;

/// Smallest elapsed time used when dividing drag displacement, so two samples
/// taken in the same instant cannot produce an unbounded velocity.
pub const MIN_THROW_ELAPSED: f64 = 0.01;

/// Ticks per second the step loop aims for.
pub const TARGET_HZ: u32 = 60;

/// Lower bound of the integration step (s).
pub const MIN_DT: f64 = 1.0 / 240.0;

/// Upper bound of the integration step (s). Long stalls are integrated as a
/// single step of this length instead of teleporting bodies.
pub const MAX_DT: f64 = 1.0 / 20.0;

/// Period between full rebuilds of the body registry.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(3);

/// Maximum gap between two releases on the same window for them to count as
/// a double click.
pub const DOUBLE_CLICK: Duration = Duration::from_millis(400);

/// Outward padding (px) between a selected window and its highlight outline.
pub const HIGHLIGHT_PADDING: i32 = 2;

/// Thickness (px) of the highlight outline.
pub const HIGHLIGHT_BORDER: i32 = 3;

/// Highlight outline colour as `(r, g, b)`.
pub const HIGHLIGHT_RGB: (u8, u8, u8) = (0, 120, 215);

/// Highlight opacity, 0 (invisible) to 255 (opaque).
pub const HIGHLIGHT_ALPHA: u8 = 200;

/// Pause after a failed tick before the loop resumes.
pub const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Window area (px²) that corresponds to a mass of 1.
pub const MASS_AREA_DIVISOR: f64 = 1e5;

pub const MIN_MASS: f64 = 0.25;
pub const MAX_MASS: f64 = 8.0;
