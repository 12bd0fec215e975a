//! Warping of uniform random numbers onto directions.

use lumen_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Uniform sample in `[0, 1)`.
#[inline]
pub fn uniform(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Cosine-weighted direction on the +Z hemisphere. Density `cos θ / π`.
pub fn cosine_hemisphere(u1: f32, u2: f32) -> Vec3 {
    let r = u1.sqrt();
    let phi = 2.0 * PI * u2;
    Vec3::new(r * phi.cos(), r * phi.sin(), (1.0 - u1).max(0.0).sqrt())
}

/// Uniform direction on the unit sphere. Density `1 / 4π`.
pub fn uniform_sphere(u1: f32, u2: f32) -> Vec3 {
    let z = 1.0 - 2.0 * u1;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u2;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Express a local `(x, y, z)` direction in the frame `(t1, t2, n)`.
#[inline]
pub fn to_world(local: Vec3, t1: Vec3, t2: Vec3, n: Vec3) -> Vec3 {
    t1 * local.x + t2 * local.y + n * local.z
}

/// Reflect `w` (pointing away from the surface) about the normal `n`.
#[inline]
pub fn reflect(w: Vec3, n: Vec3) -> Vec3 {
    2.0 * w.dot(n) * n - w
}

/// Refract `w` (pointing away from the surface, on the side of `n`) with
/// relative index `eta = n_incident / n_transmitted`.
///
/// Returns `None` on total internal reflection.
pub fn refract(w: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = w.dot(n);
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i).max(0.0);
    if sin2_t > 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    Some((-w * eta + n * (eta * cos_i - cos_t)).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cosine_hemisphere_unit_and_upper() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let d = cosine_hemisphere(uniform(&mut rng), uniform(&mut rng));
            assert!((d.length() - 1.0).abs() < 1e-4);
            assert!(d.z >= 0.0);
        }
    }

    #[test]
    fn test_cosine_hemisphere_mean_cos() {
        // E[cos θ] under cos/π is 2/3.
        let mut rng = StdRng::seed_from_u64(11);
        let n = 20_000;
        let mean: f32 = (0..n)
            .map(|_| cosine_hemisphere(uniform(&mut rng), uniform(&mut rng)).z)
            .sum::<f32>()
            / n as f32;
        assert!((mean - 2.0 / 3.0).abs() < 0.01, "mean = {mean}");
    }

    #[test]
    fn test_uniform_sphere_is_unit() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1000 {
            let d = uniform_sphere(uniform(&mut rng), uniform(&mut rng));
            assert!((d.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_reflect_mirror() {
        let w = Vec3::new(1.0, 1.0, 0.0).normalize();
        let r = reflect(w, Vec3::Y);
        assert!((r - Vec3::new(-1.0, 1.0, 0.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_refract_straight_through() {
        let t = refract(Vec3::Y, Vec3::Y, 1.0 / 1.5).expect("no TIR at normal incidence");
        assert!((t + Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_refract_total_internal_reflection() {
        // Leaving glass at a grazing angle.
        let w = Vec3::new(0.9, 0.1, 0.0).normalize();
        assert!(refract(w, Vec3::Y, 1.5).is_none());
    }

    #[test]
    fn test_refract_snell() {
        let eta = 1.0 / 1.5;
        let w = Vec3::new(0.5, 0.75f32.sqrt(), 0.0);
        let t = refract(w, Vec3::Y, eta).expect("entering glass");
        let sin_i = w.x.abs();
        let sin_t = t.x.abs();
        assert!((sin_i * eta - sin_t).abs() < 1e-4);
        assert!(t.y < 0.0);
    }
}
