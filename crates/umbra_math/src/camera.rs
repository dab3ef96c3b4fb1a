use crate::{FrustumCorners, RayBasis};
use glam::{Mat4, Quat, Vec3};

/// Position and orientation of a camera.
///
/// Compared with exact float equality to detect camera motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl CameraPose {
    /// Create a new pose.
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// Camera for procedural rendering.
///
/// The camera looks down -Z in its local frame with +Y up.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(position: Vec3, orientation: Quat, aspect: f32) -> Self {
        Self {
            position,
            orientation,
            fov_y: 60.0,
            aspect,
            near: 0.3,
            far: 1000.0,
        }
    }

    /// Create a camera at `position` looking towards `target`.
    pub fn looking_at(position: Vec3, target: Vec3, up: Vec3, aspect: f32) -> Self {
        // look_at_rh is world -> camera; its inverse rotation is the orientation
        let view = Mat4::look_at_rh(position, target, up);
        let orientation = Quat::from_mat4(&view).inverse().normalize();
        Self::new(position, orientation, aspect)
    }

    /// Set the vertical field of view in degrees.
    pub fn with_fov(mut self, fov_y_degrees: f32) -> Self {
        self.fov_y = fov_y_degrees;
        self
    }

    /// Set the clip planes.
    pub fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Current pose.
    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.position, self.orientation)
    }

    /// Camera -> world matrix.
    pub fn camera_to_world(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// World -> camera matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation.conjugate()) * Mat4::from_translation(-self.position)
    }

    /// Get the projection matrix (camera → clip space)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }

    /// Inverse of the projection matrix (clip → camera space).
    pub fn inverse_projection_matrix(&self) -> Mat4 {
        self.projection_matrix().inverse()
    }

    /// View direction in world space.
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// Camera-local frustum corner rays.
    pub fn frustum_corners(&self) -> FrustumCorners {
        FrustumCorners::new(self.fov_y, self.aspect, RayBasis::camera_local())
    }

    /// Update aspect ratio (e.g., on window resize)
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Update aspect ratio from viewport dimensions, ignoring empty viewports.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY, 16.0 / 9.0)
    }
}
