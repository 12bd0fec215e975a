//! Material trait and the reference materials.
//!
//! Direction conventions: every direction points away from the surface.
//! `hit.w` points back toward where the path came from, `w_in` toward
//! the light (or the next vertex).

use crate::sampling::{cosine_hemisphere, reflect, refract, to_world, uniform, uniform_sphere};
use crate::{HitRecord, Medium, Spectrum};
use lumen_math::Vec3;
use rand::RngCore;
use std::f32::consts::{FRAC_1_PI, PI};

/// Outcome of sampling a material (or a light's emission).
#[derive(Debug, Clone, Copy)]
pub struct ShadingSample {
    /// Unit sampled direction, pointing away from the surface
    pub direction: Vec3,
    /// BRDF value for the sampled direction. For specular samples this is
    /// the reflectance divided by `|cos θ|`, so [`ShadingSample::weight`]
    /// works the same for every kind of sample.
    pub brdf: Spectrum,
    /// Emitted radiance along `direction` (emission samples)
    pub emission: Spectrum,
    /// Density of `direction` (solid angle; 1 for deterministic specular)
    pub pdf: f32,
    pub is_specular: bool,
}

impl ShadingSample {
    /// `brdf · |cos θ| / pdf`, the throughput factor of this sample.
    pub fn weight(&self, abs_cos: f32) -> Spectrum {
        if self.pdf > 0.0 {
            self.brdf * (abs_cos / self.pdf)
        } else {
            Spectrum::ZERO
        }
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// BRDF for light arriving from `w_in` and leaving toward `w_out`.
    fn evaluate_brdf(&self, hit: &HitRecord, w_out: Vec3, w_in: Vec3) -> Spectrum;

    /// Radiance emitted toward `w_out`. Most materials return black.
    fn evaluate_emission(&self, _hit: &HitRecord, _w_out: Vec3) -> Spectrum {
        Spectrum::ZERO
    }

    fn has_specular_reflection(&self) -> bool {
        false
    }

    fn has_specular_refraction(&self) -> bool {
        false
    }

    /// The ideal reflection of `hit.w`, weighted by the reflected fraction.
    fn evaluate_specular_reflection(&self, _hit: &HitRecord) -> Option<ShadingSample> {
        None
    }

    /// The ideal refraction of `hit.w`; `None` on total internal reflection.
    fn evaluate_specular_refraction(&self, _hit: &HitRecord) -> Option<ShadingSample> {
        None
    }

    /// Importance sample a continuation direction given `hit.w`.
    /// `None` if the material absorbs.
    fn shading_sample(&self, hit: &HitRecord, rng: &mut dyn RngCore) -> Option<ShadingSample>;

    /// Sample an emission direction at a point sampled on a light.
    fn emission_sample(&self, _hit: &HitRecord, _rng: &mut dyn RngCore) -> Option<ShadingSample> {
        None
    }

    /// Density with which [`Material::shading_sample`] picks `direction`.
    fn probability(&self, hit: &HitRecord, direction: Vec3) -> f32;

    /// Density with which [`Material::emission_sample`] picks `direction`.
    fn emission_probability(&self, _hit: &HitRecord, _direction: Vec3) -> f32 {
        0.0
    }

    fn casts_shadows(&self) -> bool {
        true
    }

    /// Participating medium enclosed by surfaces of this material.
    fn medium(&self) -> Option<&dyn Medium> {
        None
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Diffuse {
    albedo: Spectrum,
}

impl Diffuse {
    /// Create a new diffuse material with the given albedo color.
    pub fn new(albedo: Spectrum) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> Spectrum {
        self.albedo
    }
}

impl Material for Diffuse {
    fn evaluate_brdf(&self, hit: &HitRecord, w_out: Vec3, w_in: Vec3) -> Spectrum {
        if hit.normal.dot(w_out) > 0.0 && hit.normal.dot(w_in) > 0.0 {
            self.albedo * FRAC_1_PI
        } else {
            Spectrum::ZERO
        }
    }

    fn shading_sample(&self, hit: &HitRecord, rng: &mut dyn RngCore) -> Option<ShadingSample> {
        let local = cosine_hemisphere(uniform(rng), uniform(rng));
        let pdf = local.z * FRAC_1_PI;
        if pdf <= 0.0 {
            return None;
        }

        Some(ShadingSample {
            direction: to_world(local, hit.t1, hit.t2, hit.normal).normalize(),
            brdf: self.albedo * FRAC_1_PI,
            emission: Spectrum::ZERO,
            pdf,
            is_specular: false,
        })
    }

    fn probability(&self, hit: &HitRecord, direction: Vec3) -> f32 {
        hit.normal.dot(direction).max(0.0) * FRAC_1_PI
    }
}

/// Perfect mirror.
#[derive(Debug, Clone)]
pub struct Mirror {
    reflectivity: Spectrum,
}

impl Mirror {
    pub fn new(reflectivity: Spectrum) -> Self {
        Self { reflectivity }
    }
}

impl Material for Mirror {
    fn evaluate_brdf(&self, _hit: &HitRecord, _w_out: Vec3, _w_in: Vec3) -> Spectrum {
        Spectrum::ZERO
    }

    fn has_specular_reflection(&self) -> bool {
        true
    }

    fn evaluate_specular_reflection(&self, hit: &HitRecord) -> Option<ShadingSample> {
        let direction = reflect(hit.w, hit.normal);
        let cos = hit.normal.dot(direction).abs();
        if cos <= 0.0 {
            return None;
        }

        Some(ShadingSample {
            direction,
            brdf: self.reflectivity / cos,
            emission: Spectrum::ZERO,
            pdf: 1.0,
            is_specular: true,
        })
    }

    fn shading_sample(&self, hit: &HitRecord, _rng: &mut dyn RngCore) -> Option<ShadingSample> {
        self.evaluate_specular_reflection(hit)
    }

    fn probability(&self, _hit: &HitRecord, _direction: Vec3) -> f32 {
        0.0
    }
}

/// Dielectric (glass) with Schlick's Fresnel approximation.
#[derive(Debug, Clone)]
pub struct Refractive {
    /// Index of refraction (1.0 = air, 1.5 = glass)
    ior: f32,
}

impl Refractive {
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Relative index `n_incident / n_transmitted` for the side `hit.w` is on.
    fn eta(&self, hit: &HitRecord) -> f32 {
        if hit.front_face {
            1.0 / self.ior
        } else {
            self.ior
        }
    }

    /// Fraction of light reflected at the interface.
    fn fresnel(&self, hit: &HitRecord) -> f32 {
        schlick(hit.normal.dot(hit.w), self.eta(hit))
    }
}

/// Schlick's approximation for relative index `eta = n1 / n2`.
///
/// `cos_i` is the cosine on the incident side. Returns 1 on total internal
/// reflection.
pub fn schlick(cos_i: f32, eta: f32) -> f32 {
    let r0 = ((eta - 1.0) / (eta + 1.0)).powi(2);
    let mut cos = cos_i.clamp(0.0, 1.0);
    if eta > 1.0 {
        let sin2_t = eta * eta * (1.0 - cos * cos);
        if sin2_t > 1.0 {
            return 1.0;
        }
        cos = (1.0 - sin2_t).sqrt();
    }
    r0 + (1.0 - r0) * (1.0 - cos).powi(5)
}

impl Material for Refractive {
    fn evaluate_brdf(&self, _hit: &HitRecord, _w_out: Vec3, _w_in: Vec3) -> Spectrum {
        Spectrum::ZERO
    }

    fn has_specular_reflection(&self) -> bool {
        true
    }

    fn has_specular_refraction(&self) -> bool {
        true
    }

    fn evaluate_specular_reflection(&self, hit: &HitRecord) -> Option<ShadingSample> {
        let direction = reflect(hit.w, hit.normal);
        let cos = hit.normal.dot(direction).abs();
        if cos <= 0.0 {
            return None;
        }

        Some(ShadingSample {
            direction,
            brdf: Spectrum::splat(self.fresnel(hit) / cos),
            emission: Spectrum::ZERO,
            pdf: 1.0,
            is_specular: true,
        })
    }

    fn evaluate_specular_refraction(&self, hit: &HitRecord) -> Option<ShadingSample> {
        let direction = refract(hit.w, hit.normal, self.eta(hit))?;
        let cos = hit.normal.dot(direction).abs();
        if cos <= 0.0 {
            return None;
        }

        Some(ShadingSample {
            direction,
            brdf: Spectrum::splat((1.0 - self.fresnel(hit)) / cos),
            emission: Spectrum::ZERO,
            pdf: 1.0,
            is_specular: true,
        })
    }

    fn shading_sample(&self, hit: &HitRecord, rng: &mut dyn RngCore) -> Option<ShadingSample> {
        let fresnel = self.fresnel(hit);

        if uniform(rng) >= fresnel {
            if let Some(mut refracted) = self.evaluate_specular_refraction(hit) {
                refracted.pdf = 1.0 - fresnel;
                return Some(refracted);
            }
        }

        let mut reflected = self.evaluate_specular_reflection(hit)?;
        reflected.pdf = fresnel;
        Some(reflected)
    }

    fn probability(&self, _hit: &HitRecord, _direction: Vec3) -> f32 {
        0.0
    }
}

/// Emitting material of area lights. One-sided: emits on the side of the
/// geometric normal only.
#[derive(Debug, Clone)]
pub struct AreaLightMaterial {
    radiance: Spectrum,
}

impl AreaLightMaterial {
    /// Emitter of total `power` spread uniformly over `area`.
    pub fn new(power: Spectrum, area: f32) -> Self {
        Self {
            radiance: power / (area * PI),
        }
    }

    pub fn from_radiance(radiance: Spectrum) -> Self {
        Self { radiance }
    }

    pub fn radiance(&self) -> Spectrum {
        self.radiance
    }
}

impl Material for AreaLightMaterial {
    fn evaluate_brdf(&self, _hit: &HitRecord, _w_out: Vec3, _w_in: Vec3) -> Spectrum {
        Spectrum::ZERO
    }

    fn evaluate_emission(&self, hit: &HitRecord, w_out: Vec3) -> Spectrum {
        if hit.normal.dot(w_out) > 0.0 {
            self.radiance
        } else {
            Spectrum::ZERO
        }
    }

    fn shading_sample(&self, _hit: &HitRecord, _rng: &mut dyn RngCore) -> Option<ShadingSample> {
        None
    }

    fn emission_sample(&self, hit: &HitRecord, rng: &mut dyn RngCore) -> Option<ShadingSample> {
        let local = cosine_hemisphere(uniform(rng), uniform(rng));
        let pdf = local.z * FRAC_1_PI;
        if pdf <= 0.0 {
            return None;
        }

        Some(ShadingSample {
            direction: to_world(local, hit.t1, hit.t2, hit.normal).normalize(),
            brdf: Spectrum::ZERO,
            emission: self.radiance,
            pdf,
            is_specular: false,
        })
    }

    fn probability(&self, _hit: &HitRecord, _direction: Vec3) -> f32 {
        0.0
    }

    fn emission_probability(&self, hit: &HitRecord, direction: Vec3) -> f32 {
        hit.normal.dot(direction).max(0.0) * FRAC_1_PI
    }

    fn casts_shadows(&self) -> bool {
        false
    }
}

/// Emitting material of point lights: isotropic radiant intensity.
#[derive(Debug, Clone)]
pub struct PointLightMaterial {
    intensity: Spectrum,
}

impl PointLightMaterial {
    /// Isotropic emitter of total `power`.
    pub fn new(power: Spectrum) -> Self {
        Self {
            intensity: power / (4.0 * PI),
        }
    }

    pub fn from_intensity(intensity: Spectrum) -> Self {
        Self { intensity }
    }
}

impl Material for PointLightMaterial {
    fn evaluate_brdf(&self, _hit: &HitRecord, _w_out: Vec3, _w_in: Vec3) -> Spectrum {
        Spectrum::ZERO
    }

    fn evaluate_emission(&self, _hit: &HitRecord, _w_out: Vec3) -> Spectrum {
        self.intensity
    }

    fn shading_sample(&self, _hit: &HitRecord, _rng: &mut dyn RngCore) -> Option<ShadingSample> {
        None
    }

    fn emission_sample(&self, _hit: &HitRecord, rng: &mut dyn RngCore) -> Option<ShadingSample> {
        Some(ShadingSample {
            direction: uniform_sphere(uniform(rng), uniform(rng)),
            brdf: Spectrum::ZERO,
            emission: self.intensity,
            pdf: 1.0 / (4.0 * PI),
            is_specular: false,
        })
    }

    fn probability(&self, _hit: &HitRecord, _direction: Vec3) -> f32 {
        0.0
    }

    fn emission_probability(&self, _hit: &HitRecord, _direction: Vec3) -> f32 {
        1.0 / (4.0 * PI)
    }

    fn casts_shadows(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Ray;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hit_from_above<'a>(material: &'a dyn Material, dir: Vec3) -> HitRecord<'a> {
        // Surface y = 0, ray arriving along `dir`.
        let ray = Ray::new(-dir * 2.0, dir);
        HitRecord::new(&ray, 2.0, Vec3::Y, material)
    }

    #[test]
    fn test_diffuse_sample_matches_probability() {
        let mat = Diffuse::new(Spectrum::splat(0.8));
        let hit = hit_from_above(&mat, Vec3::new(0.3, -1.0, 0.0).normalize());
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let s = mat.shading_sample(&hit, &mut rng).expect("diffuse always samples");
            assert!(s.direction.dot(hit.normal) >= 0.0);
            assert!((s.pdf - mat.probability(&hit, s.direction)).abs() < 1e-4);
            // brdf·cos/pdf == albedo for cosine sampling
            let w = s.weight(hit.abs_cos(s.direction));
            assert!((w - Spectrum::splat(0.8)).length() < 1e-3);
        }
    }

    #[test]
    fn test_diffuse_brdf_zero_below_surface() {
        let mat = Diffuse::new(Spectrum::ONE);
        let hit = hit_from_above(&mat, -Vec3::Y);

        assert_eq!(mat.evaluate_brdf(&hit, hit.w, -Vec3::Y), Spectrum::ZERO);
        assert!((mat.evaluate_brdf(&hit, hit.w, Vec3::Y).x - FRAC_1_PI).abs() < 1e-6);
    }

    #[test]
    fn test_mirror_reflects() {
        let mat = Mirror::new(Spectrum::splat(0.9));
        let dir = Vec3::new(1.0, -1.0, 0.0).normalize();
        let hit = hit_from_above(&mat, dir);
        let mut rng = StdRng::seed_from_u64(0);

        let s = mat.shading_sample(&hit, &mut rng).expect("mirror reflects");
        assert!(s.is_specular);
        assert!((s.direction - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-5);
        assert!((s.weight(hit.abs_cos(s.direction)) - Spectrum::splat(0.9)).length() < 1e-5);
    }

    #[test]
    fn test_refractive_total_internal_reflection() {
        let mat = Refractive::new(1.5);
        // Inside the glass (ray travels along the outward normal), grazing.
        let dir = Vec3::new(0.95, 0.2, 0.0).normalize();
        let ray = Ray::new(-dir, dir);
        let hit = HitRecord::new(&ray, 1.0, Vec3::Y, &mat);
        assert!(!hit.front_face);

        assert!(mat.evaluate_specular_refraction(&hit).is_none());
        assert_eq!(mat.fresnel(&hit), 1.0);

        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            let s = mat.shading_sample(&hit, &mut rng).expect("reflection always exists");
            // All energy goes to reflection.
            assert!(s.direction.dot(hit.normal) > 0.0);
            assert!((s.weight(hit.abs_cos(s.direction)) - Spectrum::ONE).length() < 1e-4);
        }
    }

    #[test]
    fn test_refractive_splits_energy() {
        let mat = Refractive::new(1.5);
        let hit = hit_from_above(&mat, Vec3::new(0.2, -1.0, 0.0).normalize());

        let r = mat.evaluate_specular_reflection(&hit).expect("reflection");
        let t = mat.evaluate_specular_refraction(&hit).expect("refraction");
        let total = r.weight(hit.abs_cos(r.direction)) + t.weight(hit.abs_cos(t.direction));

        assert!((total - Spectrum::ONE).length() < 1e-4);
        assert!(t.direction.y < 0.0);
    }

    #[test]
    fn test_schlick_normal_incidence() {
        let r = schlick(1.0, 1.0 / 1.5);
        assert!((r - 0.04).abs() < 1e-4);
    }

    #[test]
    fn test_area_light_one_sided() {
        let mat = AreaLightMaterial::new(Spectrum::splat(PI), 1.0);
        let hit = HitRecord::sampled(Vec3::ZERO, -Vec3::Y, 1.0, &mat);

        assert_eq!(mat.evaluate_emission(&hit, -Vec3::Y), Spectrum::ONE);
        assert_eq!(mat.evaluate_emission(&hit, Vec3::Y), Spectrum::ZERO);
        assert!(!mat.casts_shadows());
    }

    #[test]
    fn test_area_light_emission_sample_density() {
        let mat = AreaLightMaterial::from_radiance(Spectrum::ONE);
        let hit = HitRecord::sampled(Vec3::ZERO, Vec3::Z, 1.0, &mat);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..50 {
            let s = mat.emission_sample(&hit, &mut rng).expect("sample");
            assert!((s.pdf - mat.emission_probability(&hit, s.direction)).abs() < 1e-4);
        }
    }
}
