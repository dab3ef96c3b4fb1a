use serde::{Deserialize, Serialize};

/// A closed scalar range `[min, max]`.
///
/// Used for sampling ranges (primitive radii) and for the bounds an
/// animated parameter ramps between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create an interval. `min > max` is allowed and describes a falling ramp.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Signed width, negative for a falling ramp.
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Inclusive containment test.
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.min, self.max)
    }

    /// Linear interpolation from `min` (t = 0) to `max` (t = 1).
    ///
    /// `t` is not clamped.
    #[inline]
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t
    }

    /// Maps a unit random number `u` in [0, 1) onto the interval.
    #[inline]
    pub fn sample(&self, u: f32) -> f32 {
        self.lerp(u)
    }

    /// The same range traversed in the opposite direction.
    pub fn reversed(&self) -> Interval {
        Interval::new(self.max, self.min)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_creation() {
        let interval = Interval::new(0.0, 10.0);
        assert_eq!(interval.min, 0.0);
        assert_eq!(interval.max, 10.0);
    }

    #[test]
    fn test_interval_size() {
        let interval = Interval::new(2.0, 7.0);
        assert_eq!(interval.size(), 5.0);

        let negative = Interval::new(-5.0, 5.0);
        assert_eq!(negative.size(), 10.0);
    }

    #[test]
    fn test_interval_contains() {
        let interval = Interval::new(0.0, 10.0);

        // Inclusive bounds
        assert!(interval.contains(0.0));
        assert!(interval.contains(10.0));
        assert!(interval.contains(5.0));

        assert!(!interval.contains(-0.1));
        assert!(!interval.contains(10.1));
    }

    #[test]
    fn test_interval_clamp() {
        let interval = Interval::new(0.0, 10.0);

        assert_eq!(interval.clamp(-5.0), 0.0);
        assert_eq!(interval.clamp(5.0), 5.0);
        assert_eq!(interval.clamp(15.0), 10.0);
    }

    #[test]
    fn test_interval_lerp_endpoints() {
        let interval = Interval::new(3.0, 8.0);

        assert_eq!(interval.lerp(0.0), 3.0);
        assert_eq!(interval.lerp(1.0), 8.0);
        assert_eq!(interval.lerp(0.5), 5.5);
    }

    #[test]
    fn test_interval_reversed_lerp() {
        let interval = Interval::new(0.0, 4.0).reversed();

        assert_eq!(interval.lerp(0.0), 4.0);
        assert_eq!(interval.lerp(0.25), 3.0);
        assert_eq!(interval.lerp(1.0), 0.0);
    }

    #[test]
    fn test_interval_sample_stays_in_range() {
        let interval = Interval::new(3.0, 8.0);
        for i in 0..100 {
            let u = i as f32 / 100.0;
            assert!(interval.contains(interval.sample(u)));
        }
    }
}
