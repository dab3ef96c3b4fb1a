//! Umbra Render - the per-frame bridge to the render program.
//!
//! Each frame the [`FrameDriver`] decides whether to keep accumulating,
//! advances the animated parameters, packs everything the program reads
//! into a [`FrameParameters`] bundle and dispatches it over the viewport.
//! The program itself sits behind the [`RenderProgram`] trait; [`CpuPreview`]
//! is a CPU implementation for headless runs and tests.

pub mod driver;
pub mod marshal;
pub mod params;
pub mod preview;
pub mod primitive_buffer;
pub mod program;
mod shape_scene;

pub use driver::{AnimatedParam, FrameDriver, FrameError, FrameInput, FrameOutcome};
pub use marshal::{marshal_frame, marshal_shape_scene, FrameInputs, ShadingToggles};
pub use params::{FrameParameters, ParamValue};
pub use preview::CpuPreview;
pub use primitive_buffer::{DispatchSize, GpuPrimitive, PrimitiveBuffer, THREAD_GROUP_SIZE};
pub use program::{Dispatch, ProgramError, RenderProgram};
