//! Progressive accumulation of noisy samples.
//!
//! Each frame compares the camera pose and viewport size against the last
//! frame. While both hold still, new samples are folded into a running mean
//! with weight `1 / (s + 1)`. Any change reallocates the buffer and restarts
//! at sample 0, which fully replaces the buffer.

use rayon::prelude::*;
use thiserror::Error;
use umbra_math::CameraPose;

use crate::ImageBuffer;

/// Errors raised while merging a sample into the accumulation buffer.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AccumulationError {
    #[error("No accumulation buffer is allocated")]
    NotAllocated,

    #[error("Sample is {got_width}x{got_height}, buffer is {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },
}

/// Blend weight of the newest sample at sample index `s`.
#[inline]
pub fn blend_weight(sample: u64) -> f32 {
    1.0 / (sample as f32 + 1.0)
}

/// What the controller decided for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameDecision {
    /// Viewport is empty; nothing is rendered and no state changes.
    Skip,
    /// History was discarded and the buffer (re)allocated.
    Reset { width: u32, height: u32 },
    /// History is kept; the next sample is blended in.
    Continue { sample: u64, weight: f32 },
}

impl FrameDecision {
    /// Sample index this frame renders, if any.
    pub fn sample(&self) -> Option<u64> {
        match *self {
            FrameDecision::Skip => None,
            FrameDecision::Reset { .. } => Some(0),
            FrameDecision::Continue { sample, .. } => Some(sample),
        }
    }

    /// Blend weight this frame uses, if any.
    pub fn weight(&self) -> Option<f32> {
        self.sample().map(blend_weight)
    }
}

/// Owns the accumulation buffer and the sample counter.
#[derive(Debug, Default)]
pub struct AccumulationController {
    buffer: Option<ImageBuffer>,
    sample: u64,
    last_pose: Option<CameraPose>,
    reallocations: u64,
}

impl AccumulationController {
    /// Create an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide reset-vs-continue for this frame.
    pub fn begin_frame(&mut self, pose: CameraPose, width: u32, height: u32) -> FrameDecision {
        if width == 0 || height == 0 {
            log::debug!("Viewport is {}x{}, skipping frame", width, height);
            return FrameDecision::Skip;
        }

        let same_size = self
            .buffer
            .as_ref()
            .is_some_and(|b| b.width == width && b.height == height);
        let same_pose = self.last_pose == Some(pose);

        if same_size && same_pose {
            self.sample += 1;
            return FrameDecision::Continue {
                sample: self.sample,
                weight: blend_weight(self.sample),
            };
        }

        log::debug!(
            "Resetting accumulation at {}x{} (resized: {}, moved: {})",
            width,
            height,
            !same_size,
            !same_pose
        );
        self.buffer = Some(ImageBuffer::new(width, height));
        self.reallocations += 1;
        self.sample = 0;
        self.last_pose = Some(pose);

        FrameDecision::Reset { width, height }
    }

    /// Fold a sample into the buffer with the current weight.
    pub fn accumulate(&mut self, sample: &ImageBuffer) -> Result<(), AccumulationError> {
        let weight = self.weight();
        let buffer = self.buffer.as_mut().ok_or(AccumulationError::NotAllocated)?;

        if buffer.dimensions() != sample.dimensions() {
            return Err(AccumulationError::DimensionMismatch {
                width: buffer.width,
                height: buffer.height,
                got_width: sample.width,
                got_height: sample.height,
            });
        }

        if weight >= 1.0 {
            buffer.pixels.copy_from_slice(&sample.pixels);
            return Ok(());
        }

        let keep = 1.0 - weight;
        buffer
            .pixels
            .par_iter_mut()
            .zip(sample.pixels.par_iter())
            .for_each(|(acc, new)| {
                *acc = *acc * keep + *new * weight;
            });

        Ok(())
    }

    /// Drop the buffer and return to idle.
    pub fn reset(&mut self) {
        if self.buffer.take().is_some() {
            log::debug!("Accumulation buffer released");
        }
        self.sample = 0;
        self.last_pose = None;
    }

    /// True when no buffer is allocated.
    pub fn is_idle(&self) -> bool {
        self.buffer.is_none()
    }

    /// Current sample index.
    pub fn sample(&self) -> u64 {
        self.sample
    }

    /// Blend weight of the current sample.
    pub fn weight(&self) -> f32 {
        blend_weight(self.sample)
    }

    /// The accumulated image, if allocated.
    pub fn buffer(&self) -> Option<&ImageBuffer> {
        self.buffer.as_ref()
    }

    /// Number of buffer allocations so far.
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use glam::{Quat, Vec3};

    fn pose(x: f32) -> CameraPose {
        CameraPose::new(Vec3::new(x, 1.0, 10.0), Quat::IDENTITY)
    }

    #[test]
    fn test_blend_weight_sequence() {
        assert_eq!(blend_weight(0), 1.0);
        assert_eq!(blend_weight(1), 0.5);
        assert_eq!(blend_weight(3), 0.25);

        for s in 0..1000 {
            assert!(blend_weight(s + 1) < blend_weight(s));
        }
    }

    #[test]
    fn test_first_frame_resets() {
        let mut acc = AccumulationController::new();
        assert!(acc.is_idle());

        let decision = acc.begin_frame(pose(0.0), 64, 32);
        assert_eq!(decision, FrameDecision::Reset { width: 64, height: 32 });
        assert_eq!(decision.weight(), Some(1.0));
        assert_eq!(acc.sample(), 0);
        assert_eq!(acc.reallocations(), 1);
    }

    #[test]
    fn test_still_camera_then_move() {
        let mut acc = AccumulationController::new();
        acc.begin_frame(pose(0.0), 64, 64);

        for expected in 1..=5 {
            let decision = acc.begin_frame(pose(0.0), 64, 64);
            assert_eq!(decision.sample(), Some(expected));
            assert_eq!(acc.sample(), expected);
        }
        assert_eq!(acc.reallocations(), 1);

        let decision = acc.begin_frame(pose(0.5), 64, 64);
        assert!(matches!(decision, FrameDecision::Reset { .. }));
        assert_eq!(acc.sample(), 0);
        assert_eq!(acc.reallocations(), 2);
    }

    #[test]
    fn test_rotation_change_resets() {
        let mut acc = AccumulationController::new();
        let still = pose(0.0);
        acc.begin_frame(still, 16, 16);
        acc.begin_frame(still, 16, 16);

        let turned = CameraPose::new(still.position, Quat::from_rotation_y(0.01));
        assert!(matches!(acc.begin_frame(turned, 16, 16), FrameDecision::Reset { .. }));
    }

    #[test]
    fn test_resize_resets() {
        let mut acc = AccumulationController::new();
        acc.begin_frame(pose(0.0), 64, 64);
        acc.begin_frame(pose(0.0), 64, 64);

        let decision = acc.begin_frame(pose(0.0), 128, 64);
        assert_eq!(decision, FrameDecision::Reset { width: 128, height: 64 });
        assert_eq!(acc.buffer().map(|b| b.dimensions()), Some((128, 64)));
    }

    #[test]
    fn test_zero_viewport_holds_state() {
        let mut acc = AccumulationController::new();
        acc.begin_frame(pose(0.0), 32, 32);
        acc.begin_frame(pose(0.0), 32, 32);

        assert_eq!(acc.begin_frame(pose(0.0), 0, 32), FrameDecision::Skip);
        assert_eq!(acc.begin_frame(pose(3.0), 32, 0), FrameDecision::Skip);
        assert_eq!(acc.sample(), 1);
        assert_eq!(acc.reallocations(), 1);

        // Same size and pose as before the minimize: keeps accumulating
        assert_eq!(acc.begin_frame(pose(0.0), 32, 32).sample(), Some(2));
    }

    #[test]
    fn test_zero_viewport_while_idle_allocates_nothing() {
        let mut acc = AccumulationController::new();
        assert_eq!(acc.begin_frame(pose(0.0), 0, 0), FrameDecision::Skip);
        assert!(acc.is_idle());
        assert_eq!(acc.reallocations(), 0);
    }

    #[test]
    fn test_accumulate_running_mean() {
        let mut acc = AccumulationController::new();
        let values = [1.0, 0.0, 0.5, 0.25];

        for v in values {
            acc.begin_frame(pose(0.0), 2, 2);
            acc.accumulate(&ImageBuffer::filled(2, 2, Color::splat(v))).unwrap();
        }

        let mean = values.iter().sum::<f32>() / values.len() as f32;
        let buffer = acc.buffer().unwrap();
        for pixel in &buffer.pixels {
            assert!((pixel.x - mean).abs() < 1e-5);
        }
    }

    #[test]
    fn test_reset_sample_replaces_history() {
        let mut acc = AccumulationController::new();
        acc.begin_frame(pose(0.0), 2, 2);
        acc.accumulate(&ImageBuffer::filled(2, 2, Color::ONE)).unwrap();

        acc.begin_frame(pose(1.0), 2, 2);
        acc.accumulate(&ImageBuffer::filled(2, 2, Color::splat(0.2))).unwrap();

        assert_eq!(acc.buffer().unwrap().get(1, 1), Color::splat(0.2));
    }

    #[test]
    fn test_accumulate_dimension_mismatch() {
        let mut acc = AccumulationController::new();
        assert_eq!(
            acc.accumulate(&ImageBuffer::new(2, 2)),
            Err(AccumulationError::NotAllocated)
        );

        acc.begin_frame(pose(0.0), 4, 4);
        let err = acc.accumulate(&ImageBuffer::new(2, 2)).unwrap_err();
        assert!(matches!(err, AccumulationError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut acc = AccumulationController::new();
        acc.begin_frame(pose(0.0), 8, 8);
        acc.begin_frame(pose(0.0), 8, 8);

        acc.reset();
        assert!(acc.is_idle());
        assert_eq!(acc.sample(), 0);

        // Releasing twice is fine
        acc.reset();
        assert!(matches!(acc.begin_frame(pose(0.0), 8, 8), FrameDecision::Reset { .. }));
    }
}
