//! Drag detection and throw-velocity estimation.

use std::collections::VecDeque;
use std::time::Instant;

use super::{Body, Sample};
use crate::constants::{HISTORY_WINDOW, MAX_THROW_VX, MAX_THROW_VY, MIN_THROW_ELAPSED};
use crate::drivers::PointerState;

/// Update a body's drag state from this tick's pointer sample.
///
/// A body is dragged while the primary button is held and its window is the
/// foreground window. Releasing the button ends the drag and launches the
/// body with the velocity implied by its recent drag samples.
pub fn detect_drag<H: Copy + Eq>(body: &mut Body<H>, pointer: PointerState<H>, now: Instant) {
    if pointer.button_down && pointer.foreground == Some(body.handle) {
        body.dragging = true;
        body.record_sample(now);
        return;
    }
    if body.dragging && !pointer.button_down {
        let (vx, vy) = estimate_throw(&body.history).unwrap_or((0.0, 0.0));
        body.vx = vx;
        body.vy = vy;
    }
    if body.dragging {
        body.history.clear();
    }
    body.dragging = false;
}

/// Launch velocity implied by a drag history, clamped per axis.
///
/// Displacement is measured from the oldest sample still inside
/// [`HISTORY_WINDOW`] of the newest one; when every earlier sample is older
/// than that, the oldest sample is used instead. Returns `None` with fewer
/// than two samples.
pub fn estimate_throw(history: &VecDeque<Sample>) -> Option<(f64, f64)> {
    if history.len() < 2 {
        return None;
    }
    let latest = history.back()?;
    let window = HISTORY_WINDOW.as_secs_f64();
    let start = history
        .iter()
        .take(history.len() - 1)
        .find(|s| latest.at.saturating_duration_since(s.at).as_secs_f64() <= window)
        .or_else(|| history.front())?;
    let elapsed = latest
        .at
        .saturating_duration_since(start.at)
        .as_secs_f64()
        .max(MIN_THROW_ELAPSED);
    let vx = (latest.x - start.x) / elapsed;
    let vy = (latest.y - start.y) / elapsed;
    Some((
        vx.clamp(-MAX_THROW_VX, MAX_THROW_VX),
        vy.clamp(-MAX_THROW_VY, MAX_THROW_VY),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use std::time::Duration;

    fn sample(start: Instant, ms: u64, x: f64, y: f64) -> Sample {
        Sample {
            at: start + Duration::from_millis(ms),
            x,
            y,
        }
    }

    #[test]
    fn fast_throw_is_clamped_preserving_sign() {
        let t0 = Instant::now();
        // 500 px in 0.1 s = 5000 px/s
        let right: VecDeque<_> = [sample(t0, 0, 0.0, 0.0), sample(t0, 100, 500.0, 0.0)].into();
        assert_eq!(estimate_throw(&right), Some((MAX_THROW_VX, 0.0)));
        let left: VecDeque<_> = [sample(t0, 0, 500.0, 0.0), sample(t0, 100, 0.0, 0.0)].into();
        assert_eq!(estimate_throw(&left), Some((-MAX_THROW_VX, 0.0)));
        let up: VecDeque<_> = [sample(t0, 0, 0.0, 900.0), sample(t0, 100, 0.0, 0.0)].into();
        assert_eq!(estimate_throw(&up), Some((0.0, -MAX_THROW_VY)));
    }

    #[test]
    fn uses_oldest_sample_inside_window() {
        let t0 = Instant::now();
        let history: VecDeque<_> = [
            sample(t0, 0, -1000.0, 0.0),
            sample(t0, 100, 0.0, 0.0),
            sample(t0, 200, 50.0, 10.0),
            sample(t0, 300, 100.0, 20.0),
        ]
        .into();
        // the sample at 0ms is 300ms old and ignored; 100ms..300ms is used
        let (vx, vy) = estimate_throw(&history).unwrap();
        assert!((vx - 500.0).abs() < 1e-9, "vx = {vx}");
        assert!((vy - 100.0).abs() < 1e-9, "vy = {vy}");
    }

    #[test]
    fn falls_back_to_oldest_sample_when_window_is_empty() {
        let t0 = Instant::now();
        let history: VecDeque<_> = [sample(t0, 0, 0.0, 0.0), sample(t0, 500, 100.0, 0.0)].into();
        let (vx, _) = estimate_throw(&history).unwrap();
        assert!((vx - 200.0).abs() < 1e-9, "vx = {vx}");
    }

    #[test]
    fn simultaneous_samples_use_minimum_elapsed() {
        let t0 = Instant::now();
        let history: VecDeque<_> = [sample(t0, 0, 0.0, 0.0), sample(t0, 0, 5.0, -3.0)].into();
        let (vx, vy) = estimate_throw(&history).unwrap();
        assert!((vx - 500.0).abs() < 1e-9);
        assert!((vy + 300.0).abs() < 1e-9);
    }

    #[test]
    fn single_sample_is_not_a_throw() {
        let t0 = Instant::now();
        let history: VecDeque<_> = [sample(t0, 0, 0.0, 0.0)].into();
        assert_eq!(estimate_throw(&history), None);
        assert_eq!(estimate_throw(&VecDeque::new()), None);
    }

    #[test]
    fn drag_then_release_launches_body() {
        let t0 = Instant::now();
        let mut body = Body::new(3u32, "Paint", Rect::from_origin_size(0, 0, 100, 100));
        let held = PointerState {
            button_down: true,
            foreground: Some(3),
        };
        detect_drag(&mut body, held, t0);
        assert!(body.dragging);
        body.x = 40.0;
        body.y = -20.0;
        detect_drag(&mut body, held, t0 + Duration::from_millis(100));
        assert_eq!(body.history.len(), 2);

        let released = PointerState {
            button_down: false,
            foreground: Some(3),
        };
        detect_drag(&mut body, released, t0 + Duration::from_millis(116));
        assert!(!body.dragging);
        assert!(body.history.is_empty());
        assert!((body.vx - 400.0).abs() < 1e-9);
        assert!((body.vy + 200.0).abs() < 1e-9);
    }

    #[test]
    fn other_foreground_window_does_not_drag() {
        let t0 = Instant::now();
        let mut body = Body::new(3u32, "Paint", Rect::from_origin_size(0, 0, 100, 100));
        let pointer = PointerState {
            button_down: true,
            foreground: Some(4),
        };
        detect_drag(&mut body, pointer, t0);
        assert!(!body.dragging);
        assert!(body.history.is_empty());
    }

    #[test]
    fn focus_loss_while_held_ends_drag_without_throw() {
        let t0 = Instant::now();
        let mut body = Body::new(3u32, "Paint", Rect::from_origin_size(0, 0, 100, 100));
        let held = PointerState {
            button_down: true,
            foreground: Some(3),
        };
        detect_drag(&mut body, held, t0);
        body.x = 300.0;
        detect_drag(&mut body, held, t0 + Duration::from_millis(50));
        let elsewhere = PointerState {
            button_down: true,
            foreground: None,
        };
        detect_drag(&mut body, elsewhere, t0 + Duration::from_millis(60));
        assert!(!body.dragging);
        assert_eq!((body.vx, body.vy), (0.0, 0.0));
    }
}
