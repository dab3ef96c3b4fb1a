//! Umbra Core - frame-persistent state for procedural GPU rendering.
//!
//! This crate provides the host-side pieces that the render program cannot
//! compute itself:
//!
//! - **Scene generation**: rejection-sampled sphere placement
//! - **Progressive accumulation**: reset-vs-continue decisions and the
//!   running-mean buffer
//! - **Parameter oscillators**: ping-pong ramps for animated parameters
//! - **Controls and settings**: external control capability and static
//!   configuration
//!
//! # Example
//!
//! ```
//! use umbra_core::{PlacementParams, SceneGenerator};
//!
//! let params = PlacementParams { count: 10, seed: 42, ..Default::default() };
//! let scene = SceneGenerator::new(params).generate_seeded();
//! assert!(scene.len() <= 10);
//! ```

pub mod accumulation;
pub mod config;
pub mod control;
pub mod image;
pub mod oscillator;
pub mod sampling;
pub mod scene;

// Re-export commonly used types
pub use accumulation::{blend_weight, AccumulationController, AccumulationError, FrameDecision};
pub use config::{ConfigError, ConfigResult, RenderMode, RenderSettings, ShapeSceneSettings};
pub use control::{ControlMap, ControlSource, ControlValue, NoControls, DEFAULT_LIGHT_DIRECTION};
pub use image::{Color, ImageBuffer};
pub use oscillator::{Direction, ParameterOscillator};
pub use scene::{MaterialKind, PlacementParams, Primitive, Scene, SceneGenerator};
