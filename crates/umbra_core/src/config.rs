//! Static render configuration.
//!
//! Every section deserializes with defaults, so a settings file only needs
//! the values it changes.

use std::path::Path;

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use umbra_math::{Interval, TransformNode};

use crate::oscillator::DEFAULT_RAMP_DURATION;
use crate::scene::PlacementParams;

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Result type for settings operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which procedural renderer the program runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Sphere tracing through a signed distance field
    #[default]
    Raymarch,
    /// Stochastic ray tracing of generated spheres
    Raytrace,
    /// Ray marching a fixed set of analytic shapes with reflections
    SceneMarch,
}

impl RenderMode {
    /// True when samples are averaged over still frames.
    pub fn is_progressive(self) -> bool {
        matches!(self, RenderMode::Raytrace)
    }
}

/// Ray marching limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarchSettings {
    pub max_distance: f32,
    pub epsilon: f32,
    pub max_iterations: i32,
}

impl Default for MarchSettings {
    fn default() -> Self {
        Self {
            max_distance: 200.0,
            epsilon: 0.001,
            max_iterations: 256,
        }
    }
}

/// Scene colors (RGBA).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    pub main: Vec4,
    pub secondary: Vec4,
    pub sky: Vec4,
    pub light: Vec4,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            main: Vec4::new(0.8, 0.3, 0.2, 1.0),
            secondary: Vec4::new(0.2, 0.4, 0.8, 1.0),
            sky: Vec4::new(0.5, 0.7, 1.0, 1.0),
            light: Vec4::ONE,
        }
    }
}

/// Lighting and shading switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// Used when the control source has no light direction
    pub direction: Option<Vec3>,
    pub intensity: f32,
    pub shadow_intensity: f32,
    pub shadow_distance: Vec2,
    pub ao_intensity: f32,
    pub specular_exponent: f32,
    pub shadows: bool,
    pub specular: bool,
    pub reflection: bool,
    pub refraction: bool,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            direction: None,
            intensity: 1.2,
            shadow_intensity: 0.6,
            shadow_distance: Vec2::new(0.1, 50.0),
            ao_intensity: 0.3,
            specular_exponent: 32.0,
            shadows: true,
            specular: true,
            reflection: false,
            refraction: false,
        }
    }
}

/// Fractal placement and repetition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalSettings {
    pub global_transform: TransformNode,
    pub iteration_transform: TransformNode,
    pub global_scale: f32,
    pub sponge_iterations: i32,
    pub mod_interval: Vec3,
    pub mod_offset: Vec3,
    pub infinite: bool,
    pub shape: i32,
    /// Sphere as (center, radius)
    pub sphere: Vec4,
    /// Box as (center, half extent)
    pub cube: Vec4,
}

impl Default for FractalSettings {
    fn default() -> Self {
        Self {
            global_transform: TransformNode::default(),
            iteration_transform: TransformNode::default(),
            global_scale: 1.0,
            sponge_iterations: 3,
            mod_interval: Vec3::splat(10.0),
            mod_offset: Vec3::ZERO,
            infinite: false,
            shape: 0,
            sphere: Vec4::new(0.0, 0.0, 0.0, 2.0),
            cube: Vec4::new(0.0, 0.0, 0.0, 1.5),
        }
    }
}

/// Bounds and speed of the animated parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub smoothing: Interval,
    pub scale: Interval,
    /// Seconds per ramp, must be positive
    pub ramp_duration: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            smoothing: Interval::new(0.0, 1.0),
            scale: Interval::new(1.0, 2.0),
            ramp_duration: DEFAULT_RAMP_DURATION,
        }
    }
}

/// Optional secondary "marble" object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarbleSettings {
    pub enabled: bool,
    pub position: Vec3,
    pub color: Vec4,
    pub roughness: f32,
    pub ior: f32,
}

impl Default for MarbleSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            position: Vec3::new(0.0, 1.0, 0.0),
            color: Vec4::new(0.9, 0.9, 0.95, 1.0),
            roughness: 0.05,
            ior: 1.5,
        }
    }
}

/// Analytic shapes and reflection settings for the shape-scene marcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeSceneSettings {
    /// Bounces per pixel, 1 to 10
    pub reflections: i32,
    pub smooth_blend: bool,
    /// Smooth-union width, 0.01 to 1
    pub blend_coefficient: f32,
    pub albedo: Vec3,
    pub ground_position: Vec3,
    pub ground_scale: Vec3,
    /// Sphere as (center, radius)
    pub sphere: Vec4,
    pub box_position: Vec3,
    pub box_scale: Vec3,
    pub prism_position: Vec3,
    pub prism_size: Vec2,
    pub torus_position: Vec3,
    /// Major and minor radius
    pub torus_size: Vec2,
}

impl Default for ShapeSceneSettings {
    fn default() -> Self {
        Self {
            reflections: 8,
            smooth_blend: false,
            blend_coefficient: 0.01,
            albedo: Vec3::splat(0.6),
            ground_position: Vec3::ZERO,
            ground_scale: Vec3::new(10.0, 1.0, 10.0),
            sphere: Vec4::new(0.0, 1.0, 0.0, 1.0),
            box_position: Vec3::new(-3.0, 1.0, 0.0),
            box_scale: Vec3::ONE,
            prism_position: Vec3::new(3.0, 1.0, 0.0),
            prism_size: Vec2::new(1.0, 0.5),
            torus_position: Vec3::new(0.0, 1.0, -3.0),
            torus_size: Vec2::new(1.0, 0.25),
        }
    }
}

/// Complete render configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub mode: RenderMode,
    pub march: MarchSettings,
    pub colors: ColorSettings,
    pub lighting: LightingSettings,
    pub fractal: FractalSettings,
    pub animation: AnimationSettings,
    pub placement: PlacementParams,
    pub marble: MarbleSettings,
    pub shapes: ShapeSceneSettings,
}

impl RenderSettings {
    /// Parse settings from a JSON string.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let settings: RenderSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loading settings from {:?}", path.as_ref());
        Self::from_json_str(&contents)
    }

    /// Serialize settings to pretty JSON.
    pub fn to_json_string(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the core treats as preconditions.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.animation.ramp_duration > 0.0) {
            return Err(ConfigError::Invalid {
                field: "animation.ramp_duration",
                message: format!("must be positive, got {}", self.animation.ramp_duration),
            });
        }
        if self.placement.radius.min > self.placement.radius.max {
            return Err(ConfigError::Invalid {
                field: "placement.radius",
                message: format!(
                    "min {} exceeds max {}",
                    self.placement.radius.min, self.placement.radius.max
                ),
            });
        }
        if !(self.placement.placement_radius >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "placement.placement_radius",
                message: format!("must not be negative, got {}", self.placement.placement_radius),
            });
        }
        if !(1..=10).contains(&self.shapes.reflections) {
            return Err(ConfigError::Invalid {
                field: "shapes.reflections",
                message: format!("must be in 1..=10, got {}", self.shapes.reflections),
            });
        }
        if !(0.01..=1.0).contains(&self.shapes.blend_coefficient) {
            return Err(ConfigError::Invalid {
                field: "shapes.blend_coefficient",
                message: format!("must be in [0.01, 1], got {}", self.shapes.blend_coefficient),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let settings = RenderSettings::from_json_str("{}").unwrap();
        assert_eq!(settings, RenderSettings::default());
        assert_eq!(settings.placement.count, 100);
        assert_eq!(settings.placement.radius, Interval::new(3.0, 8.0));
        assert_eq!(settings.animation.ramp_duration, 10.0);
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{
            "mode": "raytrace",
            "placement": { "count": 10, "seed": 42 },
            "fractal": {
                "global_transform": { "translation": [1.0, 2.0, 3.0], "rotation": { "euler": [0.0, 90.0, 0.0] } }
            }
        }"#;
        let settings = RenderSettings::from_json_str(json).unwrap();

        assert_eq!(settings.mode, RenderMode::Raytrace);
        assert_eq!(settings.placement.count, 10);
        assert_eq!(settings.placement.seed, 42);
        assert_eq!(settings.placement.placement_radius, 100.0);
        assert_eq!(settings.fractal.global_transform.translation, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = RenderSettings::default();
        settings.marble.enabled = true;
        settings.lighting.direction = Some(Vec3::new(0.0, -1.0, 1.0));

        let json = settings.to_json_string().unwrap();
        assert_eq!(RenderSettings::from_json_str(&json).unwrap(), settings);
    }

    #[test]
    fn test_rejects_zero_duration() {
        let err = RenderSettings::from_json_str(r#"{ "animation": { "ramp_duration": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "animation.ramp_duration", .. }));
    }

    #[test]
    fn test_rejects_inverted_radius() {
        let json = r#"{ "placement": { "radius": { "min": 9.0, "max": 2.0 } } }"#;
        assert!(RenderSettings::from_json_str(json).is_err());
    }

    #[test]
    fn test_shape_scene_section() {
        let json = r#"{
            "mode": "scene_march",
            "shapes": { "reflections": 3, "smooth_blend": true, "blend_coefficient": 0.5 }
        }"#;
        let settings = RenderSettings::from_json_str(json).unwrap();

        assert_eq!(settings.mode, RenderMode::SceneMarch);
        assert!(!settings.mode.is_progressive());
        assert_eq!(settings.shapes.reflections, 3);
        assert!(settings.shapes.smooth_blend);
        assert_eq!(settings.shapes.torus_size, ShapeSceneSettings::default().torus_size);
        assert_eq!(RenderSettings::default().shapes.reflections, 8);
    }

    #[test]
    fn test_rejects_out_of_range_shape_values() {
        let err = RenderSettings::from_json_str(r#"{ "shapes": { "reflections": 11 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "shapes.reflections", .. }));

        let err = RenderSettings::from_json_str(r#"{ "shapes": { "blend_coefficient": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "shapes.blend_coefficient", .. }));
    }

    #[test]
    fn test_only_tracer_is_progressive() {
        assert!(RenderMode::Raytrace.is_progressive());
        assert!(!RenderMode::Raymarch.is_progressive());
        assert!(!RenderMode::SceneMarch.is_progressive());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            RenderSettings::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            RenderSettings::load("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
