use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::{ERROR_BACKOFF, TARGET_HZ};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// Fixed-rate driver for the simulation.
///
/// This is the only loop in the process. Each iteration:
/// 1. Checks the interrupt flag; a set flag ends the loop before the tick.
/// 2. Runs one tick, handing it the tick's start time.
/// 3. Sleeps whatever is left of the period.
///
/// A tick that fails (returns `Err` or panics) is logged and followed by a
/// pause of `backoff` instead of the normal pacing; the loop then carries on.
/// Only the interrupt flag or a tick returning [`ControlFlow::Quit`] stops it.
#[derive(Debug, Clone)]
pub struct StepLoop {
    period: Duration,
    backoff: Duration,
}

impl Default for StepLoop {
    fn default() -> Self {
        Self::new(
            Duration::from_secs_f64(1.0 / f64::from(TARGET_HZ)),
            ERROR_BACKOFF,
        )
    }
}

impl StepLoop {
    pub fn new(period: Duration, backoff: Duration) -> Self {
        Self { period, backoff }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn run<F, E>(&mut self, interrupted: &AtomicBool, mut tick: F)
    where
        F: FnMut(Instant) -> Result<ControlFlow, E>,
        E: fmt::Display,
    {
        let mut ticks: u64 = 0;
        loop {
            if interrupted.load(Ordering::SeqCst) {
                tracing::info!(ticks, "interrupted, stopping");
                break;
            }
            let started = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| tick(started)));
            ticks = ticks.wrapping_add(1);
            match outcome {
                Ok(Ok(ControlFlow::Continue)) => {
                    if let Some(rest) = self.period.checked_sub(started.elapsed()) {
                        thread::sleep(rest);
                    }
                }
                Ok(Ok(ControlFlow::Quit)) => {
                    tracing::info!(ticks, "quit requested");
                    break;
                }
                Ok(Err(err)) => {
                    tracing::error!(%err, "tick failed");
                    thread::sleep(self.backoff);
                }
                Err(payload) => {
                    tracing::error!(panic = %panic_message(payload.as_ref()), "tick panicked");
                    thread::sleep(self.backoff);
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "<non-string panic>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_loop() -> StepLoop {
        StepLoop::new(Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn interrupt_stops_before_first_tick() {
        let interrupted = AtomicBool::new(true);
        let mut ticks = 0;
        fast_loop().run(&interrupted, |_| -> Result<_, String> {
            ticks += 1;
            Ok(ControlFlow::Continue)
        });
        assert_eq!(ticks, 0);
    }

    #[test]
    fn interrupt_is_checked_between_ticks() {
        let interrupted = AtomicBool::new(false);
        let mut ticks = 0;
        fast_loop().run(&interrupted, |_| -> Result<_, String> {
            ticks += 1;
            if ticks == 3 {
                interrupted.store(true, Ordering::SeqCst);
            }
            Ok(ControlFlow::Continue)
        });
        assert_eq!(ticks, 3);
    }

    #[test]
    fn errors_and_panics_do_not_stop_the_loop() {
        let interrupted = AtomicBool::new(false);
        let mut ticks = 0;
        fast_loop().run(&interrupted, |_| {
            ticks += 1;
            match ticks {
                1 => Err("window enumeration failed".to_string()),
                2 => panic!("bad tick"),
                3 => Ok(ControlFlow::Continue),
                _ => Ok(ControlFlow::Quit),
            }
        });
        assert_eq!(ticks, 4);
    }

    #[test]
    fn ticks_are_paced() {
        let interrupted = AtomicBool::new(false);
        let mut step = StepLoop::new(Duration::from_millis(5), Duration::ZERO);
        let mut ticks = 0;
        let started = Instant::now();
        step.run(&interrupted, |_| -> Result<_, String> {
            ticks += 1;
            Ok(if ticks == 4 {
                ControlFlow::Quit
            } else {
                ControlFlow::Continue
            })
        });
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn default_period_matches_target_rate() {
        let step = StepLoop::default();
        assert_eq!(step.period().as_micros(), 16_666);
    }

    #[test]
    fn panic_payloads_are_readable() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "<non-string panic>");
    }
}
