// Translation x rotation transforms for placing and iterating SDF primitives.
//
// Translation and rotation stay separate matrix factors; scale is never part
// of the matrix and travels as its own scalar so the render program can use
// it as a distance-metric correction.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A rotation given either as Euler angles or as a quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// Euler angles in degrees, applied Z first, then X, then Y.
    Euler(Vec3),
    /// A unit quaternion.
    Quaternion(Quat),
}

impl Rotation {
    /// Convert to a quaternion.
    pub fn to_quat(&self) -> Quat {
        match *self {
            Rotation::Euler(degrees) => Quat::from_euler(
                EulerRot::YXZ,
                degrees.y.to_radians(),
                degrees.x.to_radians(),
                degrees.z.to_radians(),
            ),
            Rotation::Quaternion(q) => q,
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::Euler(Vec3::ZERO)
    }
}

/// Translation plus rotation with a fixed unit scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformNode {
    pub translation: Vec3,
    pub rotation: Rotation,
}

/// A composed matrix together with its inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposedTransform {
    pub matrix: Mat4,
    pub inverse: Mat4,
}

impl TransformNode {
    /// Create a new transform node.
    pub fn new(translation: Vec3, rotation: Rotation) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Create a transform with only translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Create a transform from Euler angles in degrees.
    pub fn from_euler_degrees(translation: Vec3, degrees: Vec3) -> Self {
        Self::new(translation, Rotation::Euler(degrees))
    }

    /// Translation factor alone.
    pub fn translation_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
    }

    /// Rotation factor alone.
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation.to_quat())
    }

    /// Composed matrix: Translate(t) * Rotate(r).
    pub fn to_matrix(&self) -> Mat4 {
        self.translation_matrix() * self.rotation_matrix()
    }

    /// Rigid inverse: Rotate(r)^-1 * Translate(-t).
    pub fn to_inverse_matrix(&self) -> Mat4 {
        let q = self.rotation.to_quat();
        Mat4::from_quat(q.conjugate()) * Mat4::from_translation(-self.translation)
    }

    /// Compose the forward matrix and its inverse.
    pub fn compose(&self) -> ComposedTransform {
        ComposedTransform {
            matrix: self.to_matrix(),
            inverse: self.to_inverse_matrix(),
        }
    }
}

impl ComposedTransform {
    /// The identity transform.
    pub const IDENTITY: ComposedTransform = ComposedTransform {
        matrix: Mat4::IDENTITY,
        inverse: Mat4::IDENTITY,
    };

    /// Largest absolute element difference between `matrix * inverse` and
    /// the identity.
    pub fn identity_error(&self) -> f32 {
        let product = self.matrix * self.inverse;
        product
            .to_cols_array()
            .iter()
            .zip(Mat4::IDENTITY.to_cols_array().iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }
}
