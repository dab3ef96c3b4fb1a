//! CPU preview program.
//!
//! A small stand-in for the GPU program that reads the same parameter bundle
//! and primitive buffer. It reconstructs rays from the frustum corners the
//! same way the GPU program does, which makes it useful for headless runs
//! and for checking the host-side contract. Shading is deliberately basic.
//! Bundles written for the shape-scene marcher are rendered by
//! the shape-scene module.

use glam::{Mat4, Vec2, Vec3, Vec4};
use rayon::prelude::*;
use umbra_core::{Color, ImageBuffer};
use umbra_math::FrustumCorners;

use crate::params::{keys, FrameParameters};
use crate::primitive_buffer::{GpuPrimitive, THREAD_GROUP_SIZE};
use crate::program::{Dispatch, ProgramError, RenderProgram};
use crate::shape_scene::ShapeSceneParams;

const AMBIENT: f32 = 0.05;

/// Parameters the preview reads, resolved once per dispatch.
struct PreviewParams {
    cam_to_world: Mat4,
    frustum: FrustumCorners,
    pixel_offset: Vec2,
    to_light: Vec3,
    light_intensity: f32,
    sky: Color,
    main: Color,
    sphere: Vec4,
    global_inverse: Mat4,
    max_distance: f32,
    epsilon: f32,
    max_iterations: i32,
}

impl PreviewParams {
    fn read(params: &FrameParameters) -> Result<Self, ProgramError> {
        fn need<T>(value: Option<T>, key: &'static str) -> Result<T, ProgramError> {
            value.ok_or(ProgramError::MissingParameter(key))
        }

        Ok(Self {
            cam_to_world: need(params.matrix(keys::CAM_TO_WORLD), keys::CAM_TO_WORLD)?,
            frustum: FrustumCorners::from_matrix(need(
                params.matrix(keys::CAM_FRUSTUM),
                keys::CAM_FRUSTUM,
            )?),
            pixel_offset: need(params.vec2(keys::PIXEL_OFFSET), keys::PIXEL_OFFSET)?,
            to_light: -need(params.vec3(keys::LIGHT_DIRECTION), keys::LIGHT_DIRECTION)?
                .normalize_or_zero(),
            light_intensity: need(params.float(keys::LIGHT_INTENSITY), keys::LIGHT_INTENSITY)?,
            sky: need(params.vec4(keys::SKY_COLOR), keys::SKY_COLOR)?.truncate(),
            main: need(params.vec4(keys::MAIN_COLOR), keys::MAIN_COLOR)?.truncate(),
            sphere: need(params.vec4(keys::SPHERE), keys::SPHERE)?,
            global_inverse: need(params.matrix(keys::GLOBAL_TRANSFORM), keys::GLOBAL_TRANSFORM)?,
            max_distance: need(params.float(keys::MAX_DISTANCE), keys::MAX_DISTANCE)?,
            epsilon: need(params.float(keys::EPSILON), keys::EPSILON)?,
            max_iterations: need(params.int(keys::MAX_ITERATIONS), keys::MAX_ITERATIONS)?,
        })
    }

    /// World-space ray through pixel (x, y), row 0 at the top.
    fn ray(&self, x: u32, y: u32, width: u32, height: u32) -> (Vec3, Vec3) {
        let u = (x as f32 + self.pixel_offset.x) / width as f32;
        let v = 1.0 - (y as f32 + self.pixel_offset.y) / height as f32;
        let local = self.frustum.ray_at_uv(u, v);
        let origin = self.cam_to_world.w_axis.truncate();
        let direction = self.cam_to_world.transform_vector3(local).normalize();
        (origin, direction)
    }

    fn background(&self, direction: Vec3) -> Color {
        let a = 0.5 * (direction.y + 1.0);
        Color::ONE * (1.0 - a) + self.sky * a
    }

    fn shade(&self, normal: Vec3, diffuse: Color, specular: Color) -> Color {
        let lambert = normal.dot(self.to_light).max(0.0);
        (diffuse + specular) * lambert * self.light_intensity + diffuse * AMBIENT
    }
}

/// CPU implementation of [`RenderProgram`].
#[derive(Debug, Default)]
pub struct CpuPreview;

impl CpuPreview {
    pub fn new() -> Self {
        Self
    }

    /// Closest sphere or ground hit for the stochastic tracer.
    fn trace(params: &PreviewParams, spheres: &[GpuPrimitive], origin: Vec3, direction: Vec3) -> Color {
        let mut closest = f32::INFINITY;
        let mut hit: Option<(Vec3, Color, Color)> = None;

        // Ground plane at y = 0
        if direction.y < 0.0 {
            let t = -origin.y / direction.y;
            if t > 0.0 {
                closest = t;
                hit = Some((Vec3::Y, Color::splat(0.8), Color::splat(0.04)));
            }
        }

        for sphere in spheres {
            let center = Vec3::from_array(sphere.position);
            if let Some(t) = hit_sphere(center, sphere.radius, origin, direction) {
                if t < closest {
                    closest = t;
                    let normal = (origin + direction * t - center) / sphere.radius;
                    hit = Some((
                        normal,
                        Color::from_array(sphere.albedo),
                        Color::from_array(sphere.specular),
                    ));
                }
            }
        }

        match hit {
            Some((normal, albedo, specular)) => params.shade(normal, albedo, specular),
            None => params.background(direction),
        }
    }

    /// Sphere-trace the configured SDF sphere through the global transform.
    fn march(params: &PreviewParams, origin: Vec3, direction: Vec3) -> Color {
        let center = params.sphere.truncate();
        let radius = params.sphere.w;
        let sdf = |p: Vec3| (params.global_inverse.transform_point3(p) - center).length() - radius;

        let mut t = 0.0;
        for _ in 0..params.max_iterations.max(0) {
            if t > params.max_distance {
                break;
            }
            let p = origin + direction * t;
            let d = sdf(p);
            if d < params.epsilon {
                let e = params.epsilon.max(1e-4);
                let normal = Vec3::new(
                    sdf(p + Vec3::X * e) - sdf(p - Vec3::X * e),
                    sdf(p + Vec3::Y * e) - sdf(p - Vec3::Y * e),
                    sdf(p + Vec3::Z * e) - sdf(p - Vec3::Z * e),
                )
                .normalize_or_zero();
                return params.shade(normal, params.main, Color::ZERO);
            }
            t += d;
        }

        params.background(direction)
    }
}

/// Nearest positive root of a ray/sphere intersection.
fn hit_sphere(center: Vec3, radius: f32, origin: Vec3, direction: Vec3) -> Option<f32> {
    let oc = center - origin;
    let a = direction.length_squared();
    let h = direction.dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();
    let near = (h - sqrtd) / a;
    if near > 1e-4 {
        return Some(near);
    }
    let far = (h + sqrtd) / a;
    (far > 1e-4).then_some(far)
}

impl RenderProgram for CpuPreview {
    fn name(&self) -> &str {
        "cpu-preview"
    }

    fn dispatch(&mut self, dispatch: &Dispatch<'_>) -> Result<ImageBuffer, ProgramError> {
        let (width, height) = (dispatch.width, dispatch.height);
        let groups = dispatch.groups;
        if groups.x * THREAD_GROUP_SIZE < width || groups.y * THREAD_GROUP_SIZE < height {
            return Err(ProgramError::DispatchTooSmall {
                x: groups.x,
                y: groups.y,
                width,
                height,
            });
        }

        if ShapeSceneParams::matches(dispatch.params) {
            let scene = ShapeSceneParams::read(dispatch.params)?;
            let mut image = ImageBuffer::new(width, height);
            image
                .pixels
                .par_chunks_mut(width.max(1) as usize)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, pixel) in row.iter_mut().enumerate() {
                        *pixel = scene.shade_pixel(x as u32, y as u32, width, height);
                    }
                });
            return Ok(image);
        }

        let params = PreviewParams::read(dispatch.params)?;
        let spheres = dispatch.primitives.map(|b| b.records());
        let mut image = ImageBuffer::new(width, height);

        image
            .pixels
            .par_chunks_mut(width.max(1) as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    let (origin, direction) = params.ray(x as u32, y as u32, width, height);
                    *pixel = match spheres {
                        Some(spheres) => Self::trace(&params, spheres, origin, direction),
                        None => Self::march(&params, origin, direction),
                    };
                }
            });

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive_buffer::{DispatchSize, PrimitiveBuffer};
    use umbra_core::Primitive;

    fn base_params(cam_to_world: Mat4) -> FrameParameters {
        let mut params = FrameParameters::new();
        params.set_matrix(keys::CAM_TO_WORLD, cam_to_world);
        params.set_matrix(keys::CAM_FRUSTUM, FrustumCorners::camera_local(60.0, 1.0).to_matrix());
        params.set_vec2(keys::PIXEL_OFFSET, Vec2::splat(0.5));
        params.set_vec3(keys::LIGHT_DIRECTION, Vec3::new(0.0, -1.0, -1.0));
        params.set_float(keys::LIGHT_INTENSITY, 1.0);
        params.set_color(keys::SKY_COLOR, Vec4::new(0.5, 0.7, 1.0, 1.0));
        params.set_color(keys::MAIN_COLOR, Vec4::new(1.0, 0.0, 0.0, 1.0));
        params.set_vec4(keys::SPHERE, Vec4::new(0.0, 0.0, 0.0, 1.0));
        params.set_matrix(keys::GLOBAL_TRANSFORM, Mat4::IDENTITY);
        params.set_float(keys::MAX_DISTANCE, 100.0);
        params.set_float(keys::EPSILON, 0.001);
        params.set_int(keys::MAX_ITERATIONS, 128);
        params
    }

    fn dispatch<'a>(params: &'a FrameParameters, primitives: Option<&'a PrimitiveBuffer>, size: u32) -> Dispatch<'a> {
        Dispatch {
            params,
            primitives,
            groups: DispatchSize::for_viewport(size, size),
            width: size,
            height: size,
        }
    }

    #[test]
    fn test_march_hits_center_sphere() {
        let params = base_params(Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)));
        let image = CpuPreview::new().dispatch(&dispatch(&params, None, 16)).unwrap();

        // Center pixel sees the red sphere, the corner sees the sky
        let center = image.get(8, 8);
        let corner = image.get(0, 0);
        assert!(center.x > center.z, "center={center:?}");
        assert!(corner.z > corner.x, "corner={corner:?}");
    }

    #[test]
    fn test_trace_hits_primitive() {
        let params = base_params(Mat4::from_translation(Vec3::new(0.0, 2.0, 10.0)));
        let sphere = Primitive::dielectric(Vec3::new(0.0, 2.0, 0.0), 2.0, Color::new(0.0, 1.0, 0.0));
        let buffer = PrimitiveBuffer::from_records(vec![GpuPrimitive::from(&sphere)]);

        let image = CpuPreview::new()
            .dispatch(&dispatch(&params, Some(&buffer), 16))
            .unwrap();

        let center = image.get(8, 8);
        assert!(center.y > center.x && center.y > center.z, "center={center:?}");
    }

    #[test]
    fn test_top_row_is_sky() {
        // Top of the image looks up, bottom looks at the ground
        let params = base_params(Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        let buffer = PrimitiveBuffer::default();
        let image = CpuPreview::new()
            .dispatch(&dispatch(&params, Some(&buffer), 8))
            .unwrap();

        let top = image.get(4, 0);
        let bottom = image.get(4, 7);
        assert_ne!(top, bottom);
        assert!(top.z > top.x);
    }

    #[test]
    fn test_missing_parameter() {
        let full = base_params(Mat4::IDENTITY);
        let mut params = FrameParameters::new();
        for (key, value) in full.iter().filter(|(k, _)| *k != keys::CAM_FRUSTUM) {
            params.set(key, *value);
        }

        let err = CpuPreview::new().dispatch(&dispatch(&params, None, 8)).unwrap_err();
        assert!(matches!(err, ProgramError::MissingParameter(keys::CAM_FRUSTUM)));
    }

    #[test]
    fn test_shape_scene_bundle() {
        let settings = umbra_core::RenderSettings {
            mode: umbra_core::RenderMode::SceneMarch,
            ..Default::default()
        };
        let camera = umbra_math::Camera::new(Vec3::new(0.0, 1.0, 8.0), glam::Quat::IDENTITY, 1.0);
        let params = crate::marshal::marshal_shape_scene(&settings, &camera, Vec3::NEG_Y, Vec2::splat(0.5));

        let image = CpuPreview::new().dispatch(&dispatch(&params, None, 16)).unwrap();
        assert_ne!(image.get(8, 8), image.get(0, 0));
    }

    #[test]
    fn test_dispatch_too_small() {
        let params = base_params(Mat4::IDENTITY);
        let request = Dispatch {
            params: &params,
            primitives: None,
            groups: DispatchSize { x: 1, y: 1, z: 1 },
            width: 64,
            height: 64,
        };

        let err = CpuPreview::new().dispatch(&request).unwrap_err();
        assert!(matches!(err, ProgramError::DispatchTooSmall { .. }));
    }

    #[test]
    fn test_hit_sphere_inside_returns_far_root() {
        let t = hit_sphere(Vec3::ZERO, 1.0, Vec3::ZERO, Vec3::X).unwrap();
        assert!((t - 1.0).abs() < 1e-5);
        assert!(hit_sphere(Vec3::new(0.0, 5.0, 0.0), 1.0, Vec3::ZERO, Vec3::X).is_none());
    }
}
