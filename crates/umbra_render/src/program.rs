//! The seam to the render program that evaluates pixels.

use thiserror::Error;
use umbra_core::ImageBuffer;

use crate::params::FrameParameters;
use crate::primitive_buffer::{DispatchSize, PrimitiveBuffer};

/// Errors reported by a render program.
#[derive(Error, Debug)]
pub enum ProgramError {
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Dispatch of {x}x{y} groups does not cover a {width}x{height} viewport")]
    DispatchTooSmall { x: u32, y: u32, width: u32, height: u32 },

    #[error("Render program failed: {0}")]
    Failed(String),
}

/// A dispatch request: everything the program needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Dispatch<'a> {
    pub params: &'a FrameParameters,
    /// Present for the stochastic tracer only
    pub primitives: Option<&'a PrimitiveBuffer>,
    pub groups: DispatchSize,
    pub width: u32,
    pub height: u32,
}

/// Evaluates one raw sample per pixel.
///
/// Implementations receive a fully written parameter bundle and primitive
/// buffer; they never see a partially updated frame.
pub trait RenderProgram {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Render one sample of the frame.
    fn dispatch(&mut self, dispatch: &Dispatch<'_>) -> Result<ImageBuffer, ProgramError>;
}
