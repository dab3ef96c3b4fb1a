//! Random sampling helpers shared by scene generation and frame jitter.

use glam::{Vec2, Vec3};
use rand::{Rng, RngCore};
use std::f32::consts::TAU;

use crate::Color;

/// Uniform random float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform-by-area point inside a disk of the given radius.
pub fn random_in_disk(rng: &mut dyn RngCore, radius: f32) -> Vec2 {
    // sqrt keeps the density constant over the area
    let r = radius * gen_f32(rng).sqrt();
    let theta = TAU * gen_f32(rng);
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Random color with hue, saturation and value each uniform in [0, 1].
pub fn random_color_hsv(rng: &mut dyn RngCore) -> Color {
    let h = gen_f32(rng);
    let s = gen_f32(rng);
    let v = gen_f32(rng);
    hsv_to_rgb(h, s, v)
}

/// Convert HSV (all components in [0, 1]) to linear RGB.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Color {
    if s <= 0.0 {
        return Vec3::splat(v);
    }

    let h6 = (h.rem_euclid(1.0)) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u32 {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gen_f32_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let x = gen_f32(&mut rng);
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_random_in_disk_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let p = random_in_disk(&mut rng, 100.0);
            assert!(p.length() <= 100.0 + 1e-3);
        }
    }

    #[test]
    fn test_random_in_disk_uniform_by_area() {
        // Half the area lies inside radius R / sqrt(2)
        let mut rng = StdRng::seed_from_u64(3);
        let inner = 1.0 / 2.0_f32.sqrt();
        let n = 20_000;
        let inside = (0..n)
            .filter(|_| random_in_disk(&mut rng, 1.0).length() < inner)
            .count();

        let fraction = inside as f32 / n as f32;
        assert!((fraction - 0.5).abs() < 0.02, "fraction={fraction}");
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        assert!((hsv_to_rgb(1.0 / 3.0, 1.0, 1.0) - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
        assert!((hsv_to_rgb(2.0 / 3.0, 1.0, 1.0) - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
        assert_eq!(hsv_to_rgb(0.3, 0.0, 0.25), Vec3::splat(0.25));
    }

    #[test]
    fn test_random_color_in_unit_cube() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let c = random_color_hsv(&mut rng);
            assert!(c.min_element() >= 0.0 && c.max_element() <= 1.0);
        }
    }
}
