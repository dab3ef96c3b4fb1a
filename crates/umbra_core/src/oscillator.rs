//! Ping-pong ramps for animated shading parameters.
//!
//! A value ramps linearly from one bound to the other over a fixed duration,
//! then turns around. Ticks are driven by the frame's delta time; pausing
//! freezes both the value and the ramp progress.

use serde::{Deserialize, Serialize};
use umbra_math::Interval;

/// Default ramp duration in seconds.
pub const DEFAULT_RAMP_DURATION: f32 = 10.0;

/// Which bound the ramp is heading to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// min -> max
    Forward,
    /// max -> min
    Reverse,
}

impl Direction {
    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// A scalar that ping-pongs between two bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterOscillator {
    value: f32,
    bounds: Interval,
    direction: Direction,
    duration: f32,
    elapsed: f32,
    paused: bool,
}

impl ParameterOscillator {
    /// Create an oscillator at `bounds.min` heading forward.
    ///
    /// `duration` must be positive.
    pub fn new(bounds: Interval, duration: f32) -> Self {
        debug_assert!(duration > 0.0, "ramp duration must be positive");
        Self {
            value: bounds.min,
            bounds,
            direction: Direction::Forward,
            duration,
            elapsed: 0.0,
            paused: false,
        }
    }

    /// Advance the ramp by `dt`. Does nothing while paused.
    pub fn tick(&mut self, dt: f32) -> f32 {
        if self.paused {
            return self.value;
        }

        self.elapsed += dt;
        let ramp = self.ramp();

        if self.elapsed >= self.duration {
            self.value = ramp.max;
            self.direction = self.direction.flipped();
            self.elapsed = 0.0;
        } else {
            self.value = ramp.lerp(self.elapsed / self.duration);
        }

        self.value
    }

    /// Freeze value and progress.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Continue the ramp that was in progress when paused.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flip the pause state.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Replace the bounds and restart from the new minimum.
    ///
    /// The pause flag is left as is.
    pub fn reconfigure(&mut self, bounds: Interval) {
        self.bounds = bounds;
        self.value = bounds.min;
        self.direction = Direction::Forward;
        self.elapsed = 0.0;
    }

    /// Start and end of the current ramp.
    fn ramp(&self) -> Interval {
        match self.direction {
            Direction::Forward => self.bounds,
            Direction::Reverse => self.bounds.reversed(),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn bounds(&self) -> Interval {
        self.bounds
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oscillator() -> ParameterOscillator {
        ParameterOscillator::new(Interval::new(0.0, 1.0), 10.0)
    }

    #[test]
    fn test_starts_at_min_forward() {
        let osc = oscillator();
        assert_eq!(osc.value(), 0.0);
        assert_eq!(osc.direction(), Direction::Forward);
        assert!(!osc.is_paused());
    }

    #[test]
    fn test_full_ramp_reaches_max_and_flips() {
        let mut osc = oscillator();
        let value = osc.tick(10.0);

        assert_eq!(value, 1.0);
        assert_eq!(osc.direction(), Direction::Reverse);
        assert_eq!(osc.elapsed(), 0.0);
    }

    #[test]
    fn test_full_ramp_in_steps() {
        let mut osc = oscillator();
        for _ in 0..9 {
            osc.tick(1.0);
        }
        assert!((osc.value() - 0.9).abs() < 1e-6);
        assert_eq!(osc.direction(), Direction::Forward);

        osc.tick(1.0);
        assert_eq!(osc.value(), 1.0);
        assert_eq!(osc.direction(), Direction::Reverse);
    }

    #[test]
    fn test_reverse_ramp_heads_to_min() {
        let mut osc = oscillator();
        osc.tick(10.0);
        osc.tick(2.5);
        assert!((osc.value() - 0.75).abs() < 1e-6);

        osc.tick(7.5);
        assert_eq!(osc.value(), 0.0);
        assert_eq!(osc.direction(), Direction::Forward);
    }

    #[test]
    fn test_pause_freezes_value() {
        let mut osc = oscillator();
        osc.tick(4.0);
        let before = osc.value();

        osc.pause();
        for _ in 0..100 {
            osc.tick(0.5);
        }
        assert_eq!(osc.value(), before);
        assert_eq!(osc.elapsed(), 4.0);
    }

    #[test]
    fn test_resume_continues_ramp() {
        let mut osc = oscillator();
        osc.tick(10.0);
        osc.tick(3.0);
        osc.pause();
        osc.tick(50.0);
        osc.resume();

        // Resuming alone does not move the value
        assert!((osc.value() - 0.7).abs() < 1e-6);

        osc.tick(1.0);
        assert!((osc.value() - 0.6).abs() < 1e-6);
        assert_eq!(osc.direction(), Direction::Reverse);
    }

    #[test]
    fn test_reconfigure_restarts() {
        let mut osc = oscillator();
        osc.tick(10.0);
        osc.tick(5.0);
        osc.pause();

        osc.reconfigure(Interval::new(2.0, 4.0));
        assert_eq!(osc.value(), 2.0);
        assert_eq!(osc.direction(), Direction::Forward);
        assert_eq!(osc.elapsed(), 0.0);
        assert!(osc.is_paused());
    }

    #[test]
    fn test_independent_pause() {
        let mut smoothing = oscillator();
        let mut scale = ParameterOscillator::new(Interval::new(1.0, 3.0), 10.0);

        smoothing.pause();
        smoothing.tick(5.0);
        scale.tick(5.0);

        assert_eq!(smoothing.value(), 0.0);
        assert_eq!(scale.value(), 2.0);
    }

    #[test]
    fn test_toggle_pause() {
        let mut osc = oscillator();
        osc.toggle_pause();
        assert!(osc.is_paused());
        osc.toggle_pause();
        assert!(!osc.is_paused());
    }
}
