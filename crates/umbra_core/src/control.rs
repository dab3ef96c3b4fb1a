//! Externally configured controls (sliders, toggles, selectors).
//!
//! The driver queries a [`ControlSource`] once per frame. Every getter
//! returns `None` for an unknown or unset control so callers can fall back
//! to their configured defaults.

use std::collections::HashMap;

use glam::Vec3;

/// Direction used when no directional light is configured.
pub const DEFAULT_LIGHT_DIRECTION: Vec3 = Vec3::NEG_Y;

/// Control names understood by the frame driver.
pub mod keys {
    pub const SMOOTH_MIN: &str = "smooth_min";
    pub const SMOOTH_MAX: &str = "smooth_max";
    pub const SCALE_MIN: &str = "scale_min";
    pub const SCALE_MAX: &str = "scale_max";
    pub const SHAPE: &str = "shape";
    pub const SHADOWS: &str = "shadows";
    pub const SPECULAR: &str = "specular";
    pub const REFLECTION: &str = "reflection";
    pub const REFRACTION: &str = "refraction";
    pub const LIGHT_DIRECTION: &str = "light_direction";
}

/// Read access to external controls.
pub trait ControlSource {
    fn get_float(&self, name: &str) -> Option<f32>;
    fn get_bool(&self, name: &str) -> Option<bool>;
    fn get_int(&self, name: &str) -> Option<i32>;
    fn get_vec3(&self, name: &str) -> Option<Vec3>;

    /// Light direction, or the downward default when absent.
    fn light_direction(&self) -> Vec3 {
        self.get_vec3(keys::LIGHT_DIRECTION)
            .unwrap_or(DEFAULT_LIGHT_DIRECTION)
    }
}

/// A control source with nothing set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoControls;

impl ControlSource for NoControls {
    fn get_float(&self, _name: &str) -> Option<f32> {
        None
    }

    fn get_bool(&self, _name: &str) -> Option<bool> {
        None
    }

    fn get_int(&self, _name: &str) -> Option<i32> {
        None
    }

    fn get_vec3(&self, _name: &str) -> Option<Vec3> {
        None
    }
}

/// A control value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    Float(f32),
    Bool(bool),
    Int(i32),
    Vec3(Vec3),
}

/// In-memory control source.
#[derive(Debug, Clone, Default)]
pub struct ControlMap {
    values: HashMap<String, ControlValue>,
}

impl ControlMap {
    /// Create an empty control map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a control, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: ControlValue) {
        self.values.insert(name.into(), value);
    }

    /// Builder form of [`ControlMap::set`].
    pub fn with(mut self, name: impl Into<String>, value: ControlValue) -> Self {
        self.set(name, value);
        self
    }

    /// Remove a control.
    pub fn unset(&mut self, name: &str) {
        self.values.remove(name);
    }

    fn get(&self, name: &str) -> Option<ControlValue> {
        self.values.get(name).copied()
    }
}

impl ControlSource for ControlMap {
    fn get_float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            ControlValue::Float(v) => Some(v),
            ControlValue::Int(v) => Some(v as f32),
            _ => None,
        }
    }

    fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ControlValue::Bool(v) => Some(v),
            ControlValue::Int(v) => Some(v != 0),
            _ => None,
        }
    }

    fn get_int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            ControlValue::Int(v) => Some(v),
            _ => None,
        }
    }

    fn get_vec3(&self, name: &str) -> Option<Vec3> {
        match self.get(name)? {
            ControlValue::Vec3(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_light_defaults_down() {
        assert_eq!(NoControls.light_direction(), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(ControlMap::new().light_direction(), DEFAULT_LIGHT_DIRECTION);
    }

    #[test]
    fn test_light_direction_override() {
        let controls = ControlMap::new().with(keys::LIGHT_DIRECTION, ControlValue::Vec3(Vec3::X));
        assert_eq!(controls.light_direction(), Vec3::X);
    }

    #[test]
    fn test_typed_getters() {
        let controls = ControlMap::new()
            .with(keys::SMOOTH_MIN, ControlValue::Float(0.25))
            .with(keys::SHAPE, ControlValue::Int(2))
            .with(keys::SHADOWS, ControlValue::Bool(true));

        assert_eq!(controls.get_float(keys::SMOOTH_MIN), Some(0.25));
        assert_eq!(controls.get_int(keys::SHAPE), Some(2));
        assert_eq!(controls.get_float(keys::SHAPE), Some(2.0));
        assert_eq!(controls.get_bool(keys::SHADOWS), Some(true));

        // Wrong type reads as unset
        assert_eq!(controls.get_int(keys::SMOOTH_MIN), None);
        assert_eq!(controls.get_vec3(keys::SHADOWS), None);
    }

    #[test]
    fn test_unset() {
        let mut controls = ControlMap::new().with(keys::SPECULAR, ControlValue::Bool(false));
        controls.unset(keys::SPECULAR);
        assert_eq!(controls.get_bool(keys::SPECULAR), None);
    }
}
