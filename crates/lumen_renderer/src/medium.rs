//! Homogeneous participating media.

use crate::{HitRecord, Material, ShadingSample, Spectrum};
use lumen_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// A participating medium, marched in equal sub-steps along a segment.
pub trait Medium: Send + Sync {
    /// Transmittance over a step of length `ds`.
    fn transmittance(&self, ds: f32) -> Spectrum;

    /// Number of equal sub-steps a segment is split into.
    fn steps(&self) -> usize;

    /// Scattering coefficient `σ_s`.
    fn scattering(&self) -> Spectrum;

    /// Phase function value for light arriving from `w_in` and leaving
    /// toward `w_out` (both pointing away from the scattering point).
    fn phase(&self, w_in: Vec3, w_out: Vec3) -> Spectrum;

    /// Transmittance between ray parameters `s_in` and `s_out` (unit-length
    /// direction), accumulated over [`Medium::steps`] equal sub-steps.
    fn transmittance_along(&self, s_in: f32, s_out: f32) -> Spectrum {
        let n = self.steps().max(1);
        let ds = (s_out - s_in).max(0.0) / n as f32;
        let step = self.transmittance(ds);
        (0..n).fold(Spectrum::ONE, |acc, _| acc * step)
    }
}

/// Henyey-Greenstein phase function with a per-channel asymmetry `g`.
#[derive(Debug, Clone, Copy)]
pub struct HenyeyGreenstein {
    g: Spectrum,
}

impl HenyeyGreenstein {
    pub fn new(g: Spectrum) -> Self {
        Self {
            g: g.clamp(Vec3::splat(-0.99), Vec3::splat(0.99)),
        }
    }

    pub fn isotropic() -> Self {
        Self::new(Spectrum::ZERO)
    }

    fn channel(g: f32, cos: f32) -> f32 {
        let g2 = g * g;
        let denom = (1.0 + g2 - 2.0 * g * cos).max(1e-6);
        (1.0 - g2) / (4.0 * PI * denom.powf(1.5))
    }

    /// Value for the cosine between the propagation directions.
    pub fn evaluate(&self, cos: f32) -> Spectrum {
        Spectrum::new(
            Self::channel(self.g.x, cos),
            Self::channel(self.g.y, cos),
            Self::channel(self.g.z, cos),
        )
    }
}

/// A homogeneous medium enclosed by the surfaces it is applied to.
///
/// As a surface material it lets rays pass straight through; the integrator
/// marches the enclosed segment through [`Material::medium`].
#[derive(Debug, Clone)]
pub struct Homogeneous {
    sigma_a: Spectrum,
    sigma_s: Spectrum,
    phase: HenyeyGreenstein,
    steps: usize,
}

impl Homogeneous {
    pub const DEFAULT_STEPS: usize = 10;

    pub fn new(sigma_a: Spectrum, sigma_s: Spectrum, phase: HenyeyGreenstein) -> Self {
        Self {
            sigma_a,
            sigma_s,
            phase,
            steps: Self::DEFAULT_STEPS,
        }
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps.max(1);
        self
    }

    /// Extinction coefficient `σ_t = σ_a + σ_s`.
    pub fn extinction(&self) -> Spectrum {
        self.sigma_a + self.sigma_s
    }
}

impl Medium for Homogeneous {
    fn transmittance(&self, ds: f32) -> Spectrum {
        let sigma_t = self.extinction();
        Spectrum::new(
            (-sigma_t.x * ds).exp(),
            (-sigma_t.y * ds).exp(),
            (-sigma_t.z * ds).exp(),
        )
    }

    fn steps(&self) -> usize {
        self.steps
    }

    fn scattering(&self) -> Spectrum {
        self.sigma_s
    }

    fn phase(&self, w_in: Vec3, w_out: Vec3) -> Spectrum {
        // Light travels along -w_in, then leaves along w_out.
        self.phase.evaluate((-w_in).dot(w_out))
    }
}

impl Material for Homogeneous {
    fn evaluate_brdf(&self, _hit: &HitRecord, _w_out: Vec3, _w_in: Vec3) -> Spectrum {
        Spectrum::ZERO
    }

    fn shading_sample(&self, hit: &HitRecord, _rng: &mut dyn RngCore) -> Option<ShadingSample> {
        let direction = -hit.w;
        let cos = hit.normal.dot(direction).abs();
        if cos <= 0.0 {
            return None;
        }

        Some(ShadingSample {
            direction,
            brdf: Spectrum::splat(1.0 / cos),
            emission: Spectrum::ZERO,
            pdf: 1.0,
            is_specular: true,
        })
    }

    fn probability(&self, _hit: &HitRecord, _direction: Vec3) -> f32 {
        0.0
    }

    fn casts_shadows(&self) -> bool {
        false
    }

    fn medium(&self) -> Option<&dyn Medium> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Ray;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fog() -> Homogeneous {
        Homogeneous::new(
            Spectrum::splat(0.1),
            Spectrum::splat(0.4),
            HenyeyGreenstein::isotropic(),
        )
    }

    #[test]
    fn test_transmittance_along_matches_beer_lambert() {
        let m = fog();
        let t = m.transmittance_along(1.0, 3.0);
        let expected = (-0.5f32 * 2.0).exp();

        assert!((t.x - expected).abs() < 1e-5);
        assert_eq!(m.transmittance_along(2.0, 2.0), Spectrum::ONE);
    }

    #[test]
    fn test_isotropic_phase_integrates_to_one() {
        let p = HenyeyGreenstein::isotropic().evaluate(0.3);
        assert!((p.x * 4.0 * PI - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_forward_scattering_peaks_forward() {
        let hg = HenyeyGreenstein::new(Spectrum::splat(0.7));
        assert!(hg.evaluate(1.0).x > hg.evaluate(-1.0).x);
    }

    #[test]
    fn test_homogeneous_surface_passes_through() {
        let m = fog();
        let dir = Vec3::new(0.2, -1.0, 0.0).normalize();
        let ray = Ray::new(-dir, dir);
        let hit = HitRecord::new(&ray, 1.0, Vec3::Y, &m);
        let mut rng = StdRng::seed_from_u64(0);

        let s = m.shading_sample(&hit, &mut rng).expect("pass through");
        assert!((s.direction - dir).length() < 1e-5);
        assert!((s.weight(hit.abs_cos(s.direction)) - Spectrum::ONE).length() < 1e-5);
        assert!(m.medium().is_some());
    }
}
