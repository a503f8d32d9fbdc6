use std::time::Duration;

use super::Body;
use crate::constants::{AIR_DRAG, GRAVITY, MAX_DT, MIN_DT};

/// Integration step for a tick that took `elapsed` of wall clock.
pub fn step_dt(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64().clamp(MIN_DT, MAX_DT)
}

/// Explicit Euler step for a free body: gravity, air drag, then the
/// candidate position.
pub fn integrate<H>(body: &mut Body<H>, dt: f64) {
    body.vy += GRAVITY * dt;
    body.vx *= AIR_DRAG;
    body.vy *= AIR_DRAG;
    body.nx = body.x + body.vx * dt;
    body.ny = body.y + body.vy * dt;
}

/// A dragged body follows the pointer and carries no momentum of its own.
pub fn hold<H>(body: &mut Body<H>) {
    body.vx = 0.0;
    body.vy = 0.0;
    body.nx = body.x;
    body.ny = body.y;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[test]
    fn dt_is_clamped_to_bounds() {
        assert_eq!(step_dt(Duration::ZERO), MIN_DT);
        assert_eq!(step_dt(Duration::from_secs(5)), MAX_DT);
        assert_eq!(step_dt(Duration::from_millis(10)), 0.01);
    }

    #[test]
    fn euler_step_applies_gravity_then_drag() {
        let mut body = Body::new(0u8, "b", Rect::from_origin_size(100, 100, 50, 50));
        body.vx = 100.0;
        integrate(&mut body, 0.01);
        let vy = GRAVITY * 0.01 * AIR_DRAG;
        assert_eq!(body.vy, vy);
        assert_eq!(body.vx, 100.0 * AIR_DRAG);
        assert_eq!(body.nx, 100.0 + 100.0 * AIR_DRAG * 0.01);
        assert_eq!(body.ny, 100.0 + vy * 0.01);
        // confirmed position is untouched until commit
        assert_eq!((body.x, body.y), (100.0, 100.0));
    }

    #[test]
    fn hold_pins_candidate_to_confirmed_position() {
        let mut body = Body::new(0u8, "b", Rect::from_origin_size(10, 20, 50, 50));
        body.vx = 30.0;
        body.vy = -40.0;
        body.nx = 99.0;
        hold(&mut body);
        assert_eq!((body.vx, body.vy), (0.0, 0.0));
        assert_eq!((body.nx, body.ny), (10.0, 20.0));
    }
}
