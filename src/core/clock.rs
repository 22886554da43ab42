//=========================================================================
// Clock
//
// Per-scene frame clock. Measures the time elapsed between consecutive
// steps of a scene and optionally throttles the caller to a target frame
// rate.
//
// Every scene owns its own clock. Unfreezing a scene resets the clock so
// the first step after a pause observes a zero delta instead of the
// whole time spent frozen.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::thread;
use std::time::{Duration, Instant};

//=== Clock ===============================================================

/// Frame timer with an optional frame-rate cap.
#[derive(Debug, Clone)]
pub struct Clock {
    last_tick: Option<Instant>,
    last_frame: Option<Instant>,
    fps: Option<f64>,
}

impl Clock {
    //--- Construction -----------------------------------------------------

    /// Creates an unthrottled clock.
    pub fn new() -> Self {
        Self {
            last_tick: None,
            last_frame: None,
            fps: None,
        }
    }

    /// Creates a clock that throttles to `fps` frames per second.
    ///
    /// # Panics
    ///
    /// Panics if `fps <= 0.0`.
    pub fn with_fps(fps: f64) -> Self {
        assert!(fps > 0.0, "FPS must be positive, got {}", fps);
        Self {
            fps: Some(fps),
            ..Self::new()
        }
    }

    //--- Timing -----------------------------------------------------------

    /// Returns the time elapsed since the previous call.
    ///
    /// The first call after construction or [`reset`](Self::reset)
    /// returns [`Duration::ZERO`].
    pub fn delta(&mut self) -> Duration {
        let now = Instant::now();
        let delta = self
            .last_tick
            .map(|previous| now.duration_since(previous))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);
        delta
    }

    /// Forgets the previous tick.
    pub fn reset(&mut self) {
        self.last_tick = None;
        self.last_frame = None;
    }

    /// Sleeps just long enough to keep the caller at or below the target
    /// frame rate. No-op for unthrottled clocks.
    pub fn throttle(&mut self) {
        let Some(budget) = self.frame_budget() else {
            return;
        };

        if let Some(previous) = self.last_frame {
            let spent = previous.elapsed();
            if spent < budget {
                thread::sleep(budget - spent);
            }
        }
        self.last_frame = Some(Instant::now());
    }

    //--- Accessors --------------------------------------------------------

    pub fn fps(&self) -> Option<f64> {
        self.fps
    }

    /// Target duration of one frame.
    pub fn frame_budget(&self) -> Option<Duration> {
        self.fps
            .and_then(|fps| Duration::try_from_secs_f64(1.0 / fps).ok())
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_delta_is_zero() {
        let mut clock = Clock::new();
        assert_eq!(clock.delta(), Duration::ZERO);
    }

    #[test]
    fn delta_measures_elapsed_time() {
        let mut clock = Clock::new();
        clock.delta();
        thread::sleep(Duration::from_millis(5));
        assert!(clock.delta() >= Duration::from_millis(5));
    }

    #[test]
    fn reset_zeroes_next_delta() {
        let mut clock = Clock::new();
        clock.delta();
        thread::sleep(Duration::from_millis(2));
        clock.reset();
        assert_eq!(clock.delta(), Duration::ZERO);
    }

    #[test]
    fn throttle_holds_frame_rate() {
        let mut clock = Clock::with_fps(100.0);
        let start = Instant::now();
        clock.throttle();
        clock.throttle();
        clock.throttle();
        // Two full frame budgets of 10ms each
        assert!(start.elapsed() >= Duration::from_millis(19));
    }

    #[test]
    fn unthrottled_clock_never_sleeps() {
        let mut clock = Clock::new();
        let start = Instant::now();
        for _ in 0..10 {
            clock.throttle();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
        assert_eq!(clock.frame_budget(), None);
    }

    #[test]
    #[should_panic(expected = "FPS must be positive")]
    fn zero_fps_panics() {
        let _ = Clock::with_fps(0.0);
    }

    #[test]
    fn unrepresentable_budget_leaves_clock_unthrottled() {
        let clock = Clock::with_fps(1e-320);
        assert_eq!(clock.frame_budget(), None);
    }
}
