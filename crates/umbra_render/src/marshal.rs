//! Packs per-frame state and static settings into [`FrameParameters`].
//!
//! Every key in [`keys::ALL`] is written on every frame. The marble keys are
//! zeroed (with `_marbleEnabled = 0`) when the marble is off.
//!
//! The shape-scene marcher reads a separate, smaller set
//! ([`keys::SHAPE_SCENE_ALL`]) written by [`marshal_shape_scene`].

use glam::{Vec2, Vec3, Vec4};
use umbra_core::control::keys as control_keys;
use umbra_core::{ControlSource, RenderSettings};
use umbra_math::{Camera, ComposedTransform, FrustumCorners};

use crate::params::{keys, FrameParameters};

/// Boolean switches after applying control overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShadingToggles {
    pub infinite: bool,
    pub shadows: bool,
    pub specular: bool,
    pub reflection: bool,
    pub refraction: bool,
}

impl ShadingToggles {
    /// Settings values, overridden by any control that is set.
    pub fn resolve(settings: &RenderSettings, controls: &dyn ControlSource) -> Self {
        let lighting = &settings.lighting;
        Self {
            infinite: settings.fractal.infinite,
            shadows: controls
                .get_bool(control_keys::SHADOWS)
                .unwrap_or(lighting.shadows),
            specular: controls
                .get_bool(control_keys::SPECULAR)
                .unwrap_or(lighting.specular),
            reflection: controls
                .get_bool(control_keys::REFLECTION)
                .unwrap_or(lighting.reflection),
            refraction: controls
                .get_bool(control_keys::REFRACTION)
                .unwrap_or(lighting.refraction),
        }
    }
}

/// Everything computed for one frame before marshalling.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub settings: &'a RenderSettings,
    pub camera: &'a Camera,
    pub frustum: FrustumCorners,
    pub global: ComposedTransform,
    pub iteration: ComposedTransform,
    pub smooth_radius: f32,
    pub scale_factor: f32,
    pub sample: u64,
    pub weight: f32,
    pub pixel_offset: Vec2,
    pub light_direction: Vec3,
    pub toggles: ShadingToggles,
    pub shape: i32,
}

/// Build the parameter bundle for one frame.
pub fn marshal_frame(inputs: &FrameInputs) -> FrameParameters {
    let settings = inputs.settings;
    let mut params = FrameParameters::new();

    // Camera
    params.set_matrix(keys::CAM_TO_WORLD, inputs.camera.camera_to_world());
    params.set_matrix(
        keys::CAMERA_INVERSE_PROJECTION,
        inputs.camera.inverse_projection_matrix(),
    );
    params.set_matrix(keys::CAM_FRUSTUM, inputs.frustum.to_matrix());

    // March limits
    params.set_float(keys::MAX_DISTANCE, settings.march.max_distance);
    params.set_float(keys::EPSILON, settings.march.epsilon);
    params.set_int(keys::MAX_ITERATIONS, settings.march.max_iterations);

    // Light
    let lighting = &settings.lighting;
    params.set_vec3(keys::LIGHT_DIRECTION, inputs.light_direction);
    params.set_vec4(
        keys::LIGHT_DIRECTION_INTENSITY,
        inputs.light_direction.extend(lighting.intensity),
    );

    // Colors
    params.set_color(keys::MAIN_COLOR, settings.colors.main);
    params.set_color(keys::SECONDARY_COLOR, settings.colors.secondary);
    params.set_color(keys::SKY_COLOR, settings.colors.sky);
    params.set_color(keys::LIGHT_COLOR, settings.colors.light);

    // Flags
    let toggles = inputs.toggles;
    params.set_flag(keys::INFINITE, toggles.infinite);
    params.set_flag(keys::SHADOWS_ENABLED, toggles.shadows);
    params.set_flag(keys::SPECULAR_ENABLED, toggles.specular);
    params.set_flag(keys::REFLECTION_ENABLED, toggles.reflection);
    params.set_flag(keys::REFRACTION_ENABLED, toggles.refraction);

    // Sliders
    params.set_float(keys::SMOOTH_RADIUS, inputs.smooth_radius);
    params.set_float(keys::SCALE_FACTOR, inputs.scale_factor);
    params.set_float(keys::LIGHT_INTENSITY, lighting.intensity);
    params.set_float(keys::SHADOW_INTENSITY, lighting.shadow_intensity);
    params.set_vec2(keys::SHADOW_DISTANCE, lighting.shadow_distance);
    params.set_float(keys::AO_INTENSITY, lighting.ao_intensity);
    params.set_float(keys::SPECULAR_EXPONENT, lighting.specular_exponent);

    // Fractal transforms (the program reads the inverses)
    let fractal = &settings.fractal;
    params.set_matrix(keys::GLOBAL_TRANSFORM, inputs.global.inverse);
    params.set_matrix(keys::ITERATION_TRANSFORM, inputs.iteration.inverse);
    params.set_vec3(
        keys::ITERATION_OFFSET,
        fractal.iteration_transform.translation,
    );
    params.set_vec3(keys::MOD_OFFSET_POS, fractal.mod_offset);
    params.set_vec3(keys::MOD_INTERVAL, fractal.mod_interval);
    params.set_float(keys::GLOBAL_SCALE, fractal.global_scale);
    params.set_int(keys::SPONGE_ITERATIONS, fractal.sponge_iterations);
    params.set_vec4(keys::SPHERE, fractal.sphere);
    params.set_vec4(keys::BOX, fractal.cube);
    params.set_int(keys::SHAPE, inputs.shape);

    // Accumulation
    params.set_float(keys::SAMPLE, inputs.sample as f32);
    params.set_float(keys::BLEND_WEIGHT, inputs.weight);
    params.set_vec2(keys::PIXEL_OFFSET, inputs.pixel_offset);

    // Marble
    let marble = &settings.marble;
    params.set_flag(keys::MARBLE_ENABLED, marble.enabled);
    if marble.enabled {
        params.set_vec3(keys::MARBLE_POSITION, marble.position);
        params.set_color(keys::MARBLE_COLOR, marble.color);
        params.set_float(keys::MARBLE_ROUGHNESS, marble.roughness);
        params.set_float(keys::MARBLE_IOR, marble.ior);
    } else {
        params.set_vec3(keys::MARBLE_POSITION, Vec3::ZERO);
        params.set_color(keys::MARBLE_COLOR, Vec4::ZERO);
        params.set_float(keys::MARBLE_ROUGHNESS, 0.0);
        params.set_float(keys::MARBLE_IOR, 0.0);
    }

    params
}

/// Build the parameter bundle for the shape-scene marcher.
///
/// Rays are rebuilt from the inverse projection, so no frustum is written.
pub fn marshal_shape_scene(
    settings: &RenderSettings,
    camera: &Camera,
    light_direction: Vec3,
    pixel_offset: Vec2,
) -> FrameParameters {
    let shapes = &settings.shapes;
    let mut params = FrameParameters::new();

    params.set_matrix(keys::CAMERA_TO_WORLD, camera.camera_to_world());
    params.set_matrix(keys::CAMERA_INVERSE_PROJECTION, camera.inverse_projection_matrix());
    params.set_vec4(
        keys::LIGHT_DIRECTION_INTENSITY,
        light_direction.extend(settings.lighting.intensity),
    );
    params.set_vec2(keys::PIXEL_OFFSET, pixel_offset);

    params.set_vec3(keys::ALBEDO, shapes.albedo);
    params.set_int(keys::NUMBER_OF_REFLECTIONS, shapes.reflections);
    params.set_flag(keys::SMOOTH_BLEND, shapes.smooth_blend);
    params.set_float(keys::BLEND_COEFFICIENT, shapes.blend_coefficient);

    params.set_vec3(keys::GROUND, shapes.ground_position);
    params.set_vec3(keys::GROUND_SCALE, shapes.ground_scale);
    params.set_vec4(keys::SCENE_SPHERE, shapes.sphere);
    params.set_vec3(keys::SCENE_BOX, shapes.box_position);
    params.set_vec3(keys::SCENE_BOX_SCALE, shapes.box_scale);
    params.set_vec3(keys::PRISM, shapes.prism_position);
    params.set_vec2(keys::PRISM_SIZE, shapes.prism_size);
    params.set_vec3(keys::TORUS, shapes.torus_position);
    params.set_vec2(keys::TORUS_SIZE, shapes.torus_size);

    params
}
