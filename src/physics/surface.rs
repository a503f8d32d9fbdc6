use super::{Body, Contact};
use crate::constants::{
    FRICTION_GROUND, FRICTION_SURFACE, RESTITUTION, VEL_DRIFT_STOP, VEL_FLOOR_STOP,
};

/// Decay a sliding velocity, snapping it to exactly zero once it is slow
/// enough.
pub fn apply_friction(v: f64, coefficient: f64) -> f64 {
    if v.abs() < VEL_DRIFT_STOP {
        0.0
    } else {
        v * coefficient
    }
}

/// Rest each top body on its support and apply surface friction.
///
/// Lower supports are settled first, so a body resting on another resting
/// body lands on its support's final position.
pub fn settle_contacts<H>(bodies: &mut [Body<H>], contacts: &[Contact]) {
    let mut ordered = contacts.to_vec();
    ordered.sort_by(|a, b| bodies[b.bottom].ny.total_cmp(&bodies[a.bottom].ny));
    for contact in &ordered {
        let support_ny = bodies[contact.bottom].ny;
        let top = &mut bodies[contact.top];
        if top.vy.abs() < VEL_FLOOR_STOP {
            top.vy = 0.0;
        }
        top.ny = support_ny - top.height;
        top.vx = apply_friction(top.vx, FRICTION_SURFACE);
    }
}

/// Keep a body above the floor at `floor_y` (the world's bottom edge),
/// bouncing or stopping it and applying ground friction on contact.
pub fn clamp_to_floor<H>(body: &mut Body<H>, floor_y: f64) {
    let rest_y = floor_y - body.height;
    if body.ny < rest_y {
        return;
    }
    body.ny = rest_y;
    body.vy = if body.vy.abs() < VEL_FLOOR_STOP {
        0.0
    } else {
        -body.vy.abs() * RESTITUTION
    };
    body.vx = apply_friction(body.vx, FRICTION_GROUND);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn body(x: i32, y: i32, w: i32, h: i32) -> Body<u8> {
        Body::new(0, "b", Rect::from_origin_size(x, y, w, h))
    }

    #[test]
    fn slow_landing_rests_exactly_on_floor() {
        let mut b = body(0, 0, 100, 100);
        b.ny = 985.3;
        b.vy = VEL_FLOOR_STOP - 0.5;
        clamp_to_floor(&mut b, 1080.0);
        assert_eq!(b.vy, 0.0);
        assert_eq!(b.ny, 980.0);
    }

    #[test]
    fn fast_landing_bounces() {
        let mut b = body(0, 0, 100, 100);
        b.ny = 1000.0;
        b.vy = 800.0;
        clamp_to_floor(&mut b, 1080.0);
        assert_eq!(b.ny, 980.0);
        assert_eq!(b.vy, -800.0 * RESTITUTION);
    }

    #[test]
    fn airborne_body_is_untouched() {
        let mut b = body(0, 0, 100, 100);
        b.ny = 979.5;
        b.vx = 100.0;
        b.vy = 300.0;
        clamp_to_floor(&mut b, 1080.0);
        assert_eq!((b.ny, b.vx, b.vy), (979.5, 100.0, 300.0));
    }

    #[test]
    fn ground_friction_reaches_exact_zero() {
        let mut b = body(0, 980, 100, 100);
        b.vx = 20.0;
        let mut expected = 20.0_f64;
        let mut decays = 0;
        while expected.abs() >= VEL_DRIFT_STOP {
            clamp_to_floor(&mut b, 1080.0);
            expected *= FRICTION_GROUND;
            decays += 1;
            assert_eq!(b.vx, expected);
        }
        assert_eq!(decays, 3);
        clamp_to_floor(&mut b, 1080.0);
        assert_eq!(b.vx, 0.0);
    }

    #[test]
    fn friction_sign_is_preserved() {
        assert_eq!(apply_friction(-40.0, 0.5), -20.0);
        assert_eq!(apply_friction(-14.9, 0.5), 0.0);
    }

    #[test]
    fn top_body_rests_on_support() {
        let mut bodies = vec![body(0, 0, 100, 100), body(0, 95, 200, 50)];
        bodies[0].ny = 3.0;
        bodies[0].vy = 5.0;
        bodies[0].vx = 30.0;
        bodies[1].ny = 97.5;
        settle_contacts(&mut bodies, &[Contact { top: 0, bottom: 1 }]);
        assert_eq!(bodies[0].ny, -2.5);
        assert_eq!(bodies[0].vy, 0.0);
        assert_eq!(bodies[0].vx, 30.0 * FRICTION_SURFACE);
        // support is left alone
        assert_eq!(bodies[1].ny, 97.5);
    }

    #[test]
    fn fast_top_body_keeps_vertical_speed() {
        let mut bodies = vec![body(0, 0, 100, 100), body(0, 100, 200, 50)];
        bodies[0].vy = -120.0;
        bodies[0].vx = 10.0;
        settle_contacts(&mut bodies, &[Contact { top: 0, bottom: 1 }]);
        assert_eq!(bodies[0].vy, -120.0);
        assert_eq!(bodies[0].vx, 0.0);
        assert_eq!(bodies[0].ny, 0.0);
    }

    #[test]
    fn stacked_contacts_settle_from_the_bottom_up() {
        let mut bodies = vec![
            body(850, 0, 100, 100),
            body(820, 0, 150, 80),
            body(800, 0, 200, 50),
        ];
        bodies[0].ny = 851.7;
        bodies[1].ny = 951.4;
        bodies[2].ny = 1030.0;
        let contacts = [Contact { top: 0, bottom: 1 }, Contact { top: 1, bottom: 2 }];
        settle_contacts(&mut bodies, &contacts);
        assert_eq!(bodies[1].ny, 950.0);
        assert_eq!(bodies[0].ny, 850.0);
    }
}
