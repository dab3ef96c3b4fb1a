//! The per-frame driver.
//!
//! [`FrameDriver`] owns everything that persists between frames: settings,
//! the accumulation buffer, the animated parameters, the generated scene and
//! its primitive buffer, and the render program. Each call to
//! [`FrameDriver::render`] runs one frame to completion.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use umbra_core::control::keys as control_keys;
use umbra_core::sampling::gen_f32;
use umbra_core::{
    AccumulationController, AccumulationError, ControlSource, FrameDecision, ImageBuffer,
    ParameterOscillator, PlacementParams, RenderMode, RenderSettings, Scene, SceneGenerator,
    DEFAULT_LIGHT_DIRECTION,
};
use umbra_math::{Camera, Interval};

use crate::marshal::{marshal_frame, marshal_shape_scene, FrameInputs, ShadingToggles};
use crate::primitive_buffer::{DispatchSize, PrimitiveBuffer};
use crate::program::{Dispatch, ProgramError, RenderProgram};

/// Errors that abort the GPU part of a frame.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Render program error: {0}")]
    Program(#[from] ProgramError),

    #[error("Accumulation error: {0}")]
    Accumulation(#[from] AccumulationError),
}

/// Per-frame inputs from the host.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    pub camera: Camera,
    pub width: u32,
    pub height: u32,
    /// Seconds since the previous frame
    pub dt: f32,
}

impl FrameInput {
    pub fn new(camera: Camera, width: u32, height: u32, dt: f32) -> Self {
        Self {
            camera,
            width,
            height,
            dt,
        }
    }
}

/// What happened to the destination image this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The source image was copied through unchanged.
    PassThrough,
    /// Nothing was rendered; the destination was left untouched.
    Skipped,
    /// The render was written to the destination. Non-progressive modes
    /// always report sample 0 with weight 1.
    Rendered { sample: u64, weight: f32 },
}

/// Animated parameter selector for pause and resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatedParam {
    Smoothing,
    Scale,
}

/// Inputs that change the image without moving the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ShadingState {
    toggles: ShadingToggles,
    shape: i32,
    light_direction: Vec3,
}

/// Frame-persistent host state for the render program.
pub struct FrameDriver {
    settings: RenderSettings,
    accumulation: AccumulationController,
    smoothing: ParameterOscillator,
    scale: ParameterOscillator,
    infinite: bool,
    scene: Scene,
    primitives: Option<PrimitiveBuffer>,
    program: Option<Box<dyn RenderProgram>>,
    pending_regeneration: Option<PlacementParams>,
    jitter: StdRng,
    last_shading: Option<ShadingState>,
    enabled: bool,
    passing_through: bool,
}

impl FrameDriver {
    /// Create a disabled driver with no render program attached.
    pub fn new(settings: RenderSettings) -> Self {
        let animation = &settings.animation;
        Self {
            accumulation: AccumulationController::new(),
            smoothing: ParameterOscillator::new(animation.smoothing, animation.ramp_duration),
            scale: ParameterOscillator::new(animation.scale, animation.ramp_duration),
            infinite: settings.fractal.infinite,
            scene: Scene::new(),
            primitives: None,
            program: None,
            pending_regeneration: None,
            jitter: StdRng::seed_from_u64(settings.placement.seed),
            last_shading: None,
            enabled: false,
            passing_through: false,
            settings,
        }
    }

    /// Builder form of [`FrameDriver::set_program`].
    pub fn with_program(mut self, program: Box<dyn RenderProgram>) -> Self {
        self.set_program(program);
        self
    }

    /// Attach a render program, replacing any previous one.
    pub fn set_program(&mut self, program: Box<dyn RenderProgram>) {
        log::info!("Render program attached: {}", program.name());
        self.program = Some(program);
        self.passing_through = false;
    }

    /// Detach the render program. Frames pass through until a new one is set.
    pub fn take_program(&mut self) -> Option<Box<dyn RenderProgram>> {
        self.program.take()
    }

    /// Generate the scene and start from an empty accumulation buffer.
    pub fn enable(&mut self) {
        self.accumulation.reset();
        self.regenerate();
        self.enabled = true;
        log::info!(
            "Driver enabled ({} spheres, {:?} mode)",
            self.scene.len(),
            self.settings.mode
        );
    }

    /// Release the primitive buffer and the accumulation buffer.
    ///
    /// Safe to call repeatedly.
    pub fn disable(&mut self) {
        self.release_primitives();
        self.accumulation.reset();
        if self.enabled {
            log::info!("Driver disabled");
        }
        self.enabled = false;
    }

    /// Queue a new scene generation for the start of the next frame.
    ///
    /// A later request replaces an earlier one that has not run yet.
    pub fn request_regeneration(&mut self, params: PlacementParams) {
        if self.pending_regeneration.replace(params).is_some() {
            log::debug!("Replacing queued regeneration request");
        }
    }

    /// Flip the infinite-repetition switch and restart accumulation.
    pub fn toggle_infinite(&mut self) -> bool {
        self.infinite = !self.infinite;
        log::debug!("Infinite repetition: {}", self.infinite);
        self.accumulation.reset();
        self.infinite
    }

    pub fn pause_animation(&mut self, which: AnimatedParam) {
        self.oscillator_mut(which).pause();
    }

    pub fn resume_animation(&mut self, which: AnimatedParam) {
        self.oscillator_mut(which).resume();
    }

    /// Run one frame.
    ///
    /// `source` is the host's image for this frame; `destination` receives
    /// either a copy of it or the render. Only the stochastic tracer blends
    /// samples over still frames; the marchers show each frame as rendered.
    /// An empty viewport returns before the animated parameters tick, so the
    /// ramps hold while the window is minimized.
    pub fn render(
        &mut self,
        frame: &FrameInput,
        controls: &dyn ControlSource,
        source: &ImageBuffer,
        destination: &mut ImageBuffer,
    ) -> FrameOutcome {
        if self.program.is_none() || !self.enabled {
            if !self.passing_through {
                log::warn!("No render program or driver disabled, passing frames through");
                self.passing_through = true;
            }
            destination.copy_from(source);
            return FrameOutcome::PassThrough;
        }
        self.passing_through = false;

        self.apply_pending_regeneration();
        self.read_animation_bounds(controls);

        if frame.width == 0 || frame.height == 0 {
            log::debug!("Viewport is {}x{}, skipping frame", frame.width, frame.height);
            return FrameOutcome::Skipped;
        }

        let mut camera = frame.camera;
        camera.set_viewport(frame.width, frame.height);

        let shading = self.resolve_shading(controls);
        let progressive = self.settings.mode.is_progressive();
        let (sample, weight) = if progressive {
            if self.last_shading.is_some_and(|last| last != shading) {
                log::debug!("Shading inputs changed, restarting accumulation");
                self.accumulation.reset();
            }
            match self
                .accumulation
                .begin_frame(camera.pose(), frame.width, frame.height)
            {
                FrameDecision::Skip => return FrameOutcome::Skipped,
                FrameDecision::Reset { .. } => (0, 1.0),
                FrameDecision::Continue { sample, weight } => (sample, weight),
            }
        } else {
            (0, 1.0)
        };
        self.last_shading = Some(shading);

        let smooth_radius = self.smoothing.tick(frame.dt);
        let scale_factor = self.scale.tick(frame.dt);
        let pixel_offset = Vec2::new(gen_f32(&mut self.jitter), gen_f32(&mut self.jitter));

        let params = match self.settings.mode {
            RenderMode::SceneMarch => marshal_shape_scene(
                &self.settings,
                &camera,
                shading.light_direction,
                pixel_offset,
            ),
            RenderMode::Raymarch | RenderMode::Raytrace => {
                let fractal = &self.settings.fractal;
                marshal_frame(&FrameInputs {
                    settings: &self.settings,
                    camera: &camera,
                    frustum: camera.frustum_corners(),
                    global: fractal.global_transform.compose(),
                    iteration: fractal.iteration_transform.compose(),
                    smooth_radius,
                    scale_factor,
                    sample,
                    weight,
                    pixel_offset,
                    light_direction: shading.light_direction,
                    toggles: shading.toggles,
                    shape: shading.shape,
                })
            }
        };

        let primitives = match self.settings.mode {
            RenderMode::Raytrace => self.primitives.as_ref(),
            RenderMode::Raymarch | RenderMode::SceneMarch => None,
        };
        let request = Dispatch {
            params: &params,
            primitives,
            groups: DispatchSize::for_viewport(frame.width, frame.height),
            width: frame.width,
            height: frame.height,
        };

        let accumulation = progressive.then_some(&mut self.accumulation);
        let image = match Self::dispatch(self.program.as_deref_mut(), accumulation, &request) {
            Ok(image) => image,
            Err(err) => {
                log::warn!("Frame {} failed, passing through: {}", sample, err);
                // Next frame restarts from a full sample
                self.accumulation.reset();
                destination.copy_from(source);
                return FrameOutcome::PassThrough;
            }
        };

        match self.accumulation.buffer() {
            Some(buffer) if progressive => destination.copy_from(buffer),
            _ => destination.copy_from(&image),
        }
        log::trace!("Rendered sample {} (weight {:.4})", sample, weight);

        FrameOutcome::Rendered { sample, weight }
    }

    /// Dispatch and, for the tracer, fold the sample into the history.
    fn dispatch(
        program: Option<&mut (dyn RenderProgram + 'static)>,
        accumulation: Option<&mut AccumulationController>,
        request: &Dispatch<'_>,
    ) -> Result<ImageBuffer, FrameError> {
        let program = program.ok_or_else(|| ProgramError::Failed("no program attached".into()))?;
        let image = program.dispatch(request)?;
        if let Some(accumulation) = accumulation {
            accumulation.accumulate(&image)?;
        }
        Ok(image)
    }

    /// Switches, shape and light for this frame, controls over settings.
    fn resolve_shading(&self, controls: &dyn ControlSource) -> ShadingState {
        let mut toggles = ShadingToggles::resolve(&self.settings, controls);
        toggles.infinite = self.infinite;
        ShadingState {
            toggles,
            shape: controls
                .get_int(control_keys::SHAPE)
                .unwrap_or(self.settings.fractal.shape),
            light_direction: controls
                .get_vec3(control_keys::LIGHT_DIRECTION)
                .or(self.settings.lighting.direction)
                .unwrap_or(DEFAULT_LIGHT_DIRECTION),
        }
    }

    fn apply_pending_regeneration(&mut self) {
        if let Some(params) = self.pending_regeneration.take() {
            self.settings.placement = params;
            self.regenerate();
            self.accumulation.reset();
        }
    }

    /// Replace the scene and its primitive buffer.
    fn regenerate(&mut self) {
        self.release_primitives();
        self.scene = SceneGenerator::new(self.settings.placement).generate_seeded();
        let buffer = PrimitiveBuffer::from_scene(&self.scene);
        log::debug!(
            "Allocated primitive buffer: {} records, {} bytes",
            buffer.len(),
            buffer.byte_len()
        );
        self.primitives = Some(buffer);
    }

    fn release_primitives(&mut self) {
        if let Some(buffer) = self.primitives.take() {
            log::debug!("Released primitive buffer of {} records", buffer.len());
        }
    }

    /// Restart an oscillator when its control bounds moved.
    fn read_animation_bounds(&mut self, controls: &dyn ControlSource) {
        let animation = self.settings.animation;
        let read = |min_key: &str, max_key: &str, fallback: Interval| {
            Interval::new(
                controls.get_float(min_key).unwrap_or(fallback.min),
                controls.get_float(max_key).unwrap_or(fallback.max),
            )
        };

        let smoothing = read(control_keys::SMOOTH_MIN, control_keys::SMOOTH_MAX, animation.smoothing);
        if smoothing != self.smoothing.bounds() {
            log::debug!("Smoothing bounds changed to {:?}", smoothing);
            self.smoothing.reconfigure(smoothing);
        }

        let scale = read(control_keys::SCALE_MIN, control_keys::SCALE_MAX, animation.scale);
        if scale != self.scale.bounds() {
            log::debug!("Scale bounds changed to {:?}", scale);
            self.scale.reconfigure(scale);
        }
    }

    fn oscillator_mut(&mut self, which: AnimatedParam) -> &mut ParameterOscillator {
        match which {
            AnimatedParam::Smoothing => &mut self.smoothing,
            AnimatedParam::Scale => &mut self.scale,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The uploaded primitive buffer, present while enabled.
    pub fn primitives(&self) -> Option<&PrimitiveBuffer> {
        self.primitives.as_ref()
    }

    pub fn accumulation(&self) -> &AccumulationController {
        &self.accumulation
    }

    pub fn oscillator(&self, which: AnimatedParam) -> &ParameterOscillator {
        match which {
            AnimatedParam::Smoothing => &self.smoothing,
            AnimatedParam::Scale => &self.scale,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_infinite(&self) -> bool {
        self.infinite
    }

    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    pub fn has_pending_regeneration(&self) -> bool {
        self.pending_regeneration.is_some()
    }
}
