//! Procedural sphere scenes for the stochastic tracer.
//!
//! Spheres are placed by rejection sampling: each candidate either fits
//! without touching any already accepted sphere or its index is discarded.
//! A generated scene therefore holds at most the requested count.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use umbra_math::Interval;

use crate::sampling::{gen_f32, random_color_hsv, random_in_disk};
use crate::Color;

/// Specular reflectance of every dielectric primitive.
pub const DIELECTRIC_SPECULAR: f32 = 0.04;

/// Probability that a placed primitive is metallic.
pub const METAL_PROBABILITY: f32 = 0.5;

/// Surface kind of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Colored specular, black albedo
    Metal,
    /// Colored albedo, low grey specular
    Dielectric,
}

/// A sphere resting on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub position: Vec3,
    pub radius: f32,
    pub albedo: Color,
    pub specular: Color,
    pub material: MaterialKind,
}

impl Primitive {
    /// Create a metallic primitive tinted with `color`.
    pub fn metal(position: Vec3, radius: f32, color: Color) -> Self {
        Self {
            position,
            radius,
            albedo: Color::ZERO,
            specular: color,
            material: MaterialKind::Metal,
        }
    }

    /// Create a dielectric primitive with albedo `color`.
    pub fn dielectric(position: Vec3, radius: f32, color: Color) -> Self {
        Self {
            position,
            radius,
            albedo: color,
            specular: Color::splat(DIELECTRIC_SPECULAR),
            material: MaterialKind::Dielectric,
        }
    }

    /// True when the two spheres keep at least the sum of their radii apart.
    #[inline]
    pub fn is_separated_from(&self, other: &Primitive) -> bool {
        let min_dist = self.radius + other.radius;
        self.position.distance_squared(other.position) >= min_dist * min_dist
    }
}

/// Parameters for a scene generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementParams {
    /// Number of placement attempts, an upper bound on the scene size
    pub count: u32,
    /// Radius range of the spheres
    pub radius: Interval,
    /// Radius of the disk on the ground plane the spheres are placed in
    pub placement_radius: f32,
    /// Seed of the random stream
    pub seed: u64,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            count: 100,
            radius: Interval::new(3.0, 8.0),
            placement_radius: 100.0,
            seed: 0,
        }
    }
}

/// An ordered set of non-overlapping primitives.
///
/// Order is acceptance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    primitives: Vec<Primitive>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a primitive if it does not overlap any existing one.
    ///
    /// Returns false (and leaves the scene unchanged) on overlap.
    pub fn try_insert(&mut self, primitive: Primitive) -> bool {
        if self.fits(&primitive) {
            self.primitives.push(primitive);
            true
        } else {
            false
        }
    }

    /// True when `candidate` keeps its distance from every primitive.
    pub fn fits(&self, candidate: &Primitive) -> bool {
        self.primitives.iter().all(|p| p.is_separated_from(candidate))
    }

    /// Primitives in acceptance order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Get primitive count.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// True when the scene holds nothing.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Iterate primitives in acceptance order.
    pub fn iter(&self) -> std::slice::Iter<'_, Primitive> {
        self.primitives.iter()
    }

    /// Check the separation invariant over every pair.
    pub fn is_non_overlapping(&self) -> bool {
        self.primitives.iter().enumerate().all(|(i, p)| {
            self.primitives[i + 1..]
                .iter()
                .all(|q| p.is_separated_from(q))
        })
    }
}

/// Rejection-sampled sphere placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneGenerator {
    params: PlacementParams,
}

impl SceneGenerator {
    /// Create a generator for the given parameters.
    pub fn new(params: PlacementParams) -> Self {
        Self { params }
    }

    /// The placement parameters.
    pub fn params(&self) -> &PlacementParams {
        &self.params
    }

    /// Generate a scene from a random stream seeded with `params.seed`.
    pub fn generate_seeded(&self) -> Scene {
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        self.generate(&mut rng)
    }

    /// Generate a scene from the given random stream.
    ///
    /// Each index gets exactly one attempt; an overlapping candidate is
    /// dropped and the next index proceeds.
    pub fn generate(&self, rng: &mut dyn RngCore) -> Scene {
        let params = &self.params;
        let mut scene = Scene::new();
        let mut rejected = 0u32;

        for index in 0..params.count {
            let radius = params.radius.sample(gen_f32(rng));
            let p = random_in_disk(rng, params.placement_radius);
            let position = Vec3::new(p.x, radius, p.y);

            // Material is drawn only for accepted candidates
            let candidate = Primitive::dielectric(position, radius, Color::ZERO);
            if !scene.fits(&candidate) {
                log::trace!("Rejected sphere {} at {:?} (r={:.2})", index, position, radius);
                rejected += 1;
                continue;
            }

            let color = random_color_hsv(rng);
            let primitive = if gen_f32(rng) < METAL_PROBABILITY {
                Primitive::metal(position, radius, color)
            } else {
                Primitive::dielectric(position, radius, color)
            };
            scene.primitives.push(primitive);
        }

        log::debug!(
            "Generated {} spheres ({} rejected of {} attempts)",
            scene.len(),
            rejected,
            params.count
        );

        scene
    }
}
