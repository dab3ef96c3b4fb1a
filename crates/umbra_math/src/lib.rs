// Re-export glam for convenience
pub use glam::*;

// Umbra math types
mod camera;
mod frustum;
mod interval;
mod transform;

pub use camera::{Camera, CameraPose};
pub use frustum::{FrustumCorners, RayBasis, CORNER_BL, CORNER_BR, CORNER_TL, CORNER_TR};
pub use interval::Interval;
pub use transform::{ComposedTransform, Rotation, TransformNode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_mat4_rows_match_cols_transpose() {
        let m = Mat4::from_cols(Vec4::X, Vec4::Y * 2.0, Vec4::Z * 3.0, Vec4::W);
        assert_eq!(m.row(1), Vec4::new(0.0, 2.0, 0.0, 0.0));
        assert_eq!(m.transpose().col(1), m.row(1));
    }
}
