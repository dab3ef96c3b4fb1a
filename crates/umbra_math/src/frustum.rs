//! Frustum corner rays for full-screen ray marching and tracing.
//!
//! The render program reconstructs a per-pixel ray direction by bilinearly
//! interpolating four corner directions with the pixel's UV. The corners are
//! emitted in a fixed order (TL, TR, BR, BL) and packed as the rows of a
//! 4x4 matrix; changing the order or normalizing them corrupts the image.

use crate::{Mat4, Vec3, Vec4};

/// Row indices of the packed corner matrix.
pub const CORNER_TL: usize = 0;
pub const CORNER_TR: usize = 1;
pub const CORNER_BR: usize = 2;
pub const CORNER_BL: usize = 3;

/// An orthonormal forward/right/up basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl RayBasis {
    /// Create a basis from its three axes.
    pub fn new(forward: Vec3, right: Vec3, up: Vec3) -> Self {
        Self { forward, right, up }
    }

    /// The camera-local basis.
    ///
    /// Forward is +Z so that the negated forward used for the rays is -Z,
    /// the direction the camera looks down in its own frame.
    pub fn camera_local() -> Self {
        Self::new(Vec3::Z, Vec3::X, Vec3::Y)
    }
}

impl Default for RayBasis {
    fn default() -> Self {
        Self::camera_local()
    }
}

/// The four corner ray directions of a view frustum, not normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumCorners {
    pub top_left: Vec3,
    pub top_right: Vec3,
    pub bottom_right: Vec3,
    pub bottom_left: Vec3,
}

impl FrustumCorners {
    /// Build the corner rays for a vertical FOV in degrees and an aspect
    /// ratio (width / height).
    ///
    /// FOV outside (0, 180) produces degenerate but finite-or-infinite
    /// vectors; validating it is left to the caller.
    pub fn new(fov_y_degrees: f32, aspect: f32, basis: RayBasis) -> Self {
        let half_height = (fov_y_degrees * 0.5).to_radians().tan();
        let half_width = half_height * aspect;

        let f = -basis.forward;
        let go_right = basis.right * half_width;
        let go_up = basis.up * half_height;

        Self {
            top_left: f - go_right + go_up,
            top_right: f + go_right + go_up,
            bottom_right: f + go_right - go_up,
            bottom_left: f - go_right - go_up,
        }
    }

    /// Corner rays in the camera-local frame.
    pub fn camera_local(fov_y_degrees: f32, aspect: f32) -> Self {
        Self::new(fov_y_degrees, aspect, RayBasis::camera_local())
    }

    /// The corners in emission order: TL, TR, BR, BL.
    pub fn to_array(&self) -> [Vec3; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Pack the corners as matrix rows (TL, TR, BR, BL) with w = 0.
    pub fn to_matrix(&self) -> Mat4 {
        let [tl, tr, br, bl] = self.to_array();
        // from_cols + transpose places each corner in a row
        Mat4::from_cols(
            tl.extend(0.0),
            tr.extend(0.0),
            br.extend(0.0),
            bl.extend(0.0),
        )
        .transpose()
    }

    /// Recover corners from a packed matrix.
    pub fn from_matrix(m: Mat4) -> Self {
        let row = |i: usize| -> Vec3 {
            let r: Vec4 = m.row(i);
            r.truncate()
        };
        Self {
            top_left: row(CORNER_TL),
            top_right: row(CORNER_TR),
            bottom_right: row(CORNER_BR),
            bottom_left: row(CORNER_BL),
        }
    }

    /// Interpolated ray direction for a screen UV.
    ///
    /// UV (0,0) is bottom-left, (1,0) bottom-right, (1,1) top-right and
    /// (0,1) top-left.
    pub fn ray_at_uv(&self, u: f32, v: f32) -> Vec3 {
        let bottom = self.bottom_left.lerp(self.bottom_right, u);
        let top = self.top_left.lerp(self.top_right, u);
        bottom.lerp(top, v)
    }
}
