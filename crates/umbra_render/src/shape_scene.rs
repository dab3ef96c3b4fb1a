//! CPU evaluation of the shape-scene marcher.
//!
//! Ground, sphere, box, triangular prism and torus distance fields, joined
//! with a hard or smooth union, marched with a fixed number of mirror
//! bounces. Rays come from the inverse projection rather than frustum
//! corners.

use glam::{Mat4, Vec2, Vec3, Vec3Swizzles, Vec4};
use umbra_core::Color;

use crate::params::{keys, FrameParameters};
use crate::program::ProgramError;

const MAX_STEPS: u32 = 256;
const MAX_DISTANCE: f32 = 200.0;
const EPSILON: f32 = 1e-3;
const AMBIENT: f32 = 0.05;
/// Half extent of an unscaled ground tile.
const GROUND_HALF_EXTENT: f32 = 5.0;

/// Parameters of one shape-scene dispatch.
pub(crate) struct ShapeSceneParams {
    camera_to_world: Mat4,
    inverse_projection: Mat4,
    to_light: Vec3,
    light_intensity: f32,
    pixel_offset: Vec2,
    albedo: Color,
    reflections: i32,
    smooth_blend: bool,
    blend_coefficient: f32,
    ground: Vec3,
    ground_scale: Vec3,
    sphere: Vec4,
    box_position: Vec3,
    box_scale: Vec3,
    prism: Vec3,
    prism_size: Vec2,
    torus: Vec3,
    torus_size: Vec2,
}

impl ShapeSceneParams {
    /// True when the bundle was written for the shape-scene marcher.
    pub(crate) fn matches(params: &FrameParameters) -> bool {
        params.contains(keys::CAMERA_TO_WORLD)
    }

    pub(crate) fn read(params: &FrameParameters) -> Result<Self, ProgramError> {
        fn need<T>(value: Option<T>, key: &'static str) -> Result<T, ProgramError> {
            value.ok_or(ProgramError::MissingParameter(key))
        }

        let light = need(
            params.vec4(keys::LIGHT_DIRECTION_INTENSITY),
            keys::LIGHT_DIRECTION_INTENSITY,
        )?;

        Ok(Self {
            camera_to_world: need(params.matrix(keys::CAMERA_TO_WORLD), keys::CAMERA_TO_WORLD)?,
            inverse_projection: need(
                params.matrix(keys::CAMERA_INVERSE_PROJECTION),
                keys::CAMERA_INVERSE_PROJECTION,
            )?,
            to_light: -light.truncate().normalize_or_zero(),
            light_intensity: light.w,
            pixel_offset: need(params.vec2(keys::PIXEL_OFFSET), keys::PIXEL_OFFSET)?,
            albedo: need(params.vec3(keys::ALBEDO), keys::ALBEDO)?,
            reflections: need(
                params.int(keys::NUMBER_OF_REFLECTIONS),
                keys::NUMBER_OF_REFLECTIONS,
            )?,
            smooth_blend: need(params.int(keys::SMOOTH_BLEND), keys::SMOOTH_BLEND)? != 0,
            blend_coefficient: need(params.float(keys::BLEND_COEFFICIENT), keys::BLEND_COEFFICIENT)?,
            ground: need(params.vec3(keys::GROUND), keys::GROUND)?,
            ground_scale: need(params.vec3(keys::GROUND_SCALE), keys::GROUND_SCALE)?,
            sphere: need(params.vec4(keys::SCENE_SPHERE), keys::SCENE_SPHERE)?,
            box_position: need(params.vec3(keys::SCENE_BOX), keys::SCENE_BOX)?,
            box_scale: need(params.vec3(keys::SCENE_BOX_SCALE), keys::SCENE_BOX_SCALE)?,
            prism: need(params.vec3(keys::PRISM), keys::PRISM)?,
            prism_size: need(params.vec2(keys::PRISM_SIZE), keys::PRISM_SIZE)?,
            torus: need(params.vec3(keys::TORUS), keys::TORUS)?,
            torus_size: need(params.vec2(keys::TORUS_SIZE), keys::TORUS_SIZE)?,
        })
    }

    /// World-space ray through pixel (x, y), row 0 at the top.
    fn ray(&self, x: u32, y: u32, width: u32, height: u32) -> (Vec3, Vec3) {
        let u = (x as f32 + self.pixel_offset.x) / width as f32;
        let v = 1.0 - (y as f32 + self.pixel_offset.y) / height as f32;
        let ndc = Vec3::new(u * 2.0 - 1.0, v * 2.0 - 1.0, 0.5);

        let local = self.inverse_projection.project_point3(ndc);
        let origin = self.camera_to_world.w_axis.truncate();
        let direction = self.camera_to_world.transform_vector3(local).normalize();
        (origin, direction)
    }

    fn union(&self, a: f32, b: f32) -> f32 {
        if self.smooth_blend {
            smooth_min(a, b, self.blend_coefficient)
        } else {
            a.min(b)
        }
    }

    fn distance(&self, p: Vec3) -> f32 {
        let ground_half = Vec3::new(
            self.ground_scale.x * GROUND_HALF_EXTENT,
            0.01,
            self.ground_scale.z * GROUND_HALF_EXTENT,
        );
        let shapes = [
            sd_sphere(p - self.sphere.truncate(), self.sphere.w),
            sd_box(p - self.box_position, self.box_scale * 0.5),
            sd_tri_prism(p - self.prism, self.prism_size),
            sd_torus(p - self.torus, self.torus_size),
        ];

        // The ground never blends into the shapes
        let blended = shapes
            .into_iter()
            .reduce(|a, b| self.union(a, b))
            .unwrap_or(f32::INFINITY);
        blended.min(sd_box(p - self.ground, ground_half))
    }

    fn normal(&self, p: Vec3) -> Vec3 {
        let e = EPSILON;
        Vec3::new(
            self.distance(p + Vec3::X * e) - self.distance(p - Vec3::X * e),
            self.distance(p + Vec3::Y * e) - self.distance(p - Vec3::Y * e),
            self.distance(p + Vec3::Z * e) - self.distance(p - Vec3::Z * e),
        )
        .normalize_or_zero()
    }

    fn march(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        let mut t = 0.0;
        for _ in 0..MAX_STEPS {
            if t > MAX_DISTANCE {
                break;
            }
            let p = origin + direction * t;
            let d = self.distance(p);
            if d < EPSILON {
                return Some(p);
            }
            t += d;
        }
        None
    }

    /// Shade one pixel, following up to `reflections` mirror bounces.
    pub(crate) fn shade_pixel(&self, x: u32, y: u32, width: u32, height: u32) -> Color {
        let (mut origin, mut direction) = self.ray(x, y, width, height);
        let mut color = Color::ZERO;
        let mut energy = Color::ONE;

        for _ in 0..self.reflections.max(1) {
            let Some(p) = self.march(origin, direction) else {
                return color + energy * sky(direction);
            };

            let n = self.normal(p);
            let lambert = n.dot(self.to_light).max(0.0);
            color += energy * self.albedo * (lambert * self.light_intensity + AMBIENT);
            energy *= self.albedo;

            origin = p + n * EPSILON * 2.0;
            direction -= 2.0 * direction.dot(n) * n;
        }

        color
    }
}

fn sky(direction: Vec3) -> Color {
    let a = 0.5 * (direction.y + 1.0);
    Color::ONE * (1.0 - a) + Color::new(0.5, 0.7, 1.0) * a
}

/// Polynomial smooth minimum of width `k`.
fn smooth_min(a: f32, b: f32, k: f32) -> f32 {
    let h = (0.5 + 0.5 * (b - a) / k).clamp(0.0, 1.0);
    b + (a - b) * h - k * h * (1.0 - h)
}

fn sd_sphere(p: Vec3, radius: f32) -> f32 {
    p.length() - radius
}

fn sd_box(p: Vec3, half: Vec3) -> f32 {
    let q = p.abs() - half;
    q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
}

/// Triangular prism along Z; `size` is (triangle size, half depth).
fn sd_tri_prism(p: Vec3, size: Vec2) -> f32 {
    let q = p.abs();
    (q.z - size.y).max((q.x * 0.866_025 + p.y * 0.5).max(-p.y) - size.x * 0.5)
}

/// Torus in the XZ plane; `size` is (major, minor) radius.
fn sd_torus(p: Vec3, size: Vec2) -> f32 {
    let q = Vec2::new(p.xz().length() - size.x, p.y);
    q.length() - size.y
}
