//! The flat per-frame parameter bundle handed to the render program.

use std::collections::BTreeMap;

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Parameter names, as declared by the render program.
pub mod keys {
    pub const CAM_TO_WORLD: &str = "_CamToWorld";
    pub const CAMERA_INVERSE_PROJECTION: &str = "_CameraInverseProjection";
    pub const CAM_FRUSTUM: &str = "_CamFrustum";
    pub const MAX_DISTANCE: &str = "_maxDistance";
    pub const EPSILON: &str = "EPSILON";
    pub const MAX_ITERATIONS: &str = "MAX_ITERATIONS";
    pub const LIGHT_DIRECTION: &str = "_directionalLight";
    pub const LIGHT_DIRECTION_INTENSITY: &str = "_DirectionalLight";
    pub const MAIN_COLOR: &str = "_mainColor";
    pub const SECONDARY_COLOR: &str = "_secondaryColor";
    pub const SKY_COLOR: &str = "_skyColor";
    pub const LIGHT_COLOR: &str = "_lightColor";
    pub const INFINITE: &str = "_infinite";
    pub const SHADOWS_ENABLED: &str = "_shadowsEnabled";
    pub const SPECULAR_ENABLED: &str = "_specularEnabled";
    pub const REFLECTION_ENABLED: &str = "_reflectionEnabled";
    pub const REFRACTION_ENABLED: &str = "_refractionEnabled";
    pub const SMOOTH_RADIUS: &str = "_smoothRadius";
    pub const SCALE_FACTOR: &str = "_scaleFactor";
    pub const LIGHT_INTENSITY: &str = "_lightIntensity";
    pub const SHADOW_INTENSITY: &str = "_shadowIntensity";
    pub const SHADOW_DISTANCE: &str = "_shadowDistance";
    pub const AO_INTENSITY: &str = "_aoIntensity";
    pub const SPECULAR_EXPONENT: &str = "_specularExponent";
    pub const GLOBAL_TRANSFORM: &str = "_globalTransform";
    pub const ITERATION_TRANSFORM: &str = "_iterationTransform";
    pub const ITERATION_OFFSET: &str = "_iterationOffset";
    pub const MOD_OFFSET_POS: &str = "_modOffsetPos";
    pub const MOD_INTERVAL: &str = "_modInterval";
    pub const GLOBAL_SCALE: &str = "_GlobalScale";
    pub const SPONGE_ITERATIONS: &str = "sponge_iterations";
    pub const SPHERE: &str = "_sphere";
    pub const BOX: &str = "_box";
    pub const SHAPE: &str = "_shape";
    pub const SAMPLE: &str = "_Sample";
    pub const BLEND_WEIGHT: &str = "_BlendWeight";
    pub const PIXEL_OFFSET: &str = "_PixelOffset";
    pub const MARBLE_ENABLED: &str = "_marbleEnabled";
    pub const MARBLE_POSITION: &str = "_marblePosition";
    pub const MARBLE_COLOR: &str = "_marbleColor";
    pub const MARBLE_ROUGHNESS: &str = "_marbleRoughness";
    pub const MARBLE_IOR: &str = "_marbleIor";

    // Shape-scene marcher
    pub const CAMERA_TO_WORLD: &str = "_CameraToWorld";
    pub const ALBEDO: &str = "_Albedo";
    pub const NUMBER_OF_REFLECTIONS: &str = "_NumberOfReflections";
    pub const SMOOTH_BLEND: &str = "_SmoothBlend";
    pub const BLEND_COEFFICIENT: &str = "_BlendCoefficient";
    pub const GROUND: &str = "_Ground";
    pub const GROUND_SCALE: &str = "_GroundScale";
    pub const SCENE_SPHERE: &str = "_Sphere";
    pub const SCENE_BOX: &str = "_Box";
    pub const SCENE_BOX_SCALE: &str = "_BoxScale";
    pub const PRISM: &str = "_Prism";
    pub const PRISM_SIZE: &str = "_PrismSize";
    pub const TORUS: &str = "_Torus";
    pub const TORUS_SIZE: &str = "_TorusSize";

    /// Every key written each frame.
    pub const ALL: &[&str] = &[
        CAM_TO_WORLD,
        CAMERA_INVERSE_PROJECTION,
        CAM_FRUSTUM,
        MAX_DISTANCE,
        EPSILON,
        MAX_ITERATIONS,
        LIGHT_DIRECTION,
        LIGHT_DIRECTION_INTENSITY,
        MAIN_COLOR,
        SECONDARY_COLOR,
        SKY_COLOR,
        LIGHT_COLOR,
        INFINITE,
        SHADOWS_ENABLED,
        SPECULAR_ENABLED,
        REFLECTION_ENABLED,
        REFRACTION_ENABLED,
        SMOOTH_RADIUS,
        SCALE_FACTOR,
        LIGHT_INTENSITY,
        SHADOW_INTENSITY,
        SHADOW_DISTANCE,
        AO_INTENSITY,
        SPECULAR_EXPONENT,
        GLOBAL_TRANSFORM,
        ITERATION_TRANSFORM,
        ITERATION_OFFSET,
        MOD_OFFSET_POS,
        MOD_INTERVAL,
        GLOBAL_SCALE,
        SPONGE_ITERATIONS,
        SPHERE,
        BOX,
        SHAPE,
        SAMPLE,
        BLEND_WEIGHT,
        PIXEL_OFFSET,
        MARBLE_ENABLED,
        MARBLE_POSITION,
        MARBLE_COLOR,
        MARBLE_ROUGHNESS,
        MARBLE_IOR,
    ];

    /// Every key the shape-scene marcher reads.
    pub const SHAPE_SCENE_ALL: &[&str] = &[
        CAMERA_TO_WORLD,
        CAMERA_INVERSE_PROJECTION,
        LIGHT_DIRECTION_INTENSITY,
        PIXEL_OFFSET,
        ALBEDO,
        NUMBER_OF_REFLECTIONS,
        SMOOTH_BLEND,
        BLEND_COEFFICIENT,
        GROUND,
        GROUND_SCALE,
        SCENE_SPHERE,
        SCENE_BOX,
        SCENE_BOX_SCALE,
        PRISM,
        PRISM_SIZE,
        TORUS,
        TORUS_SIZE,
    ];
}

/// A single parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Color(Vec4),
    Matrix(Mat4),
}

impl ParamValue {
    /// Encode a flag the way the render program reads it.
    pub fn flag(enabled: bool) -> Self {
        ParamValue::Int(i32::from(enabled))
    }
}

/// Key/value parameter set for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameParameters {
    values: BTreeMap<&'static str, ParamValue>,
}

impl FrameParameters {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value.
    pub fn set(&mut self, key: &'static str, value: ParamValue) {
        self.values.insert(key, value);
    }

    pub fn set_float(&mut self, key: &'static str, value: f32) {
        self.set(key, ParamValue::Float(value));
    }

    pub fn set_int(&mut self, key: &'static str, value: i32) {
        self.set(key, ParamValue::Int(value));
    }

    pub fn set_flag(&mut self, key: &'static str, enabled: bool) {
        self.set(key, ParamValue::flag(enabled));
    }

    pub fn set_vec2(&mut self, key: &'static str, value: Vec2) {
        self.set(key, ParamValue::Vec2(value));
    }

    pub fn set_vec3(&mut self, key: &'static str, value: Vec3) {
        self.set(key, ParamValue::Vec3(value));
    }

    pub fn set_vec4(&mut self, key: &'static str, value: Vec4) {
        self.set(key, ParamValue::Vec4(value));
    }

    pub fn set_color(&mut self, key: &'static str, value: Vec4) {
        self.set(key, ParamValue::Color(value));
    }

    pub fn set_matrix(&mut self, key: &'static str, value: Mat4) {
        self.set(key, ParamValue::Matrix(value));
    }

    /// Get a parameter by key.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn float(&self, key: &str) -> Option<f32> {
        match self.get(key)? {
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn int(&self, key: &str) -> Option<i32> {
        match self.get(key)? {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn vec2(&self, key: &str) -> Option<Vec2> {
        match self.get(key)? {
            ParamValue::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn vec3(&self, key: &str) -> Option<Vec3> {
        match self.get(key)? {
            ParamValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Vec4 or color parameter.
    pub fn vec4(&self, key: &str) -> Option<Vec4> {
        match self.get(key)? {
            ParamValue::Vec4(v) | ParamValue::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn matrix(&self, key: &str) -> Option<Mat4> {
        match self.get(key)? {
            ParamValue::Matrix(m) => Some(*m),
            _ => None,
        }
    }

    /// True when the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut params = FrameParameters::new();
        params.set_float(keys::EPSILON, 0.01);
        params.set_flag(keys::INFINITE, true);
        params.set_color(keys::MAIN_COLOR, Vec4::ONE);

        assert_eq!(params.float(keys::EPSILON), Some(0.01));
        assert_eq!(params.int(keys::INFINITE), Some(1));
        assert_eq!(params.vec4(keys::MAIN_COLOR), Some(Vec4::ONE));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_wrong_type_reads_none() {
        let mut params = FrameParameters::new();
        params.set_int(keys::MAX_ITERATIONS, 64);
        assert_eq!(params.float(keys::MAX_ITERATIONS), None);
        assert_eq!(params.matrix(keys::CAM_TO_WORLD), None);
    }

    #[test]
    fn test_flag_encoding() {
        assert_eq!(ParamValue::flag(true), ParamValue::Int(1));
        assert_eq!(ParamValue::flag(false), ParamValue::Int(0));
    }

    #[test]
    fn test_keys_unique() {
        let mut sorted: Vec<&str> = keys::ALL.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), keys::ALL.len());

        let mut scene: Vec<&str> = keys::SHAPE_SCENE_ALL.to_vec();
        scene.sort_unstable();
        scene.dedup();
        assert_eq!(scene.len(), keys::SHAPE_SCENE_ALL.len());
    }
}
