//! Whitted-style recursive ray tracer: direct light from every source plus
//! ideal specular reflection and refraction.

use super::{spawn_ray, Integrator};
use crate::{HitRecord, LightImage, Medium, Scene, Spectrum, SpectrumExt};
use lumen_math::Ray;
use rand::RngCore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhittedConfig {
    /// Recursion cutoff
    pub max_depth: usize,
}

impl Default for WhittedConfig {
    fn default() -> Self {
        Self { max_depth: 10 }
    }
}

pub struct WhittedIntegrator<'s> {
    scene: &'s Scene,
    config: WhittedConfig,
}

impl<'s> WhittedIntegrator<'s> {
    pub fn new(scene: &'s Scene, config: WhittedConfig) -> Self {
        Self { scene, config }
    }

    fn trace(&self, ray: &Ray, depth: usize, rng: &mut dyn RngCore) -> Spectrum {
        if depth >= self.config.max_depth {
            return Spectrum::ZERO;
        }
        let Some(hit) = self.scene.intersect(ray) else {
            return Spectrum::ZERO;
        };

        if hit.is_light() {
            return hit.material.evaluate_emission(&hit, hit.w);
        }

        if let Some(medium) = hit.material.medium() {
            return self.cross_medium(&hit, medium, ray, depth, rng);
        }

        let material = hit.material;
        let mut outgoing = self.lights(&hit, rng);

        if material.has_specular_reflection() {
            if let Some(reflection) = material.evaluate_specular_reflection(&hit) {
                let next = spawn_ray(self.scene, &hit, reflection.direction);
                outgoing += reflection.weight(hit.abs_cos(reflection.direction))
                    * self.trace(&next, depth + 1, rng);
            }
        }

        if material.has_specular_refraction() {
            // Absent on total internal reflection; the reflected part then
            // carries all the energy.
            if let Some(refraction) = material.evaluate_specular_refraction(&hit) {
                let next = spawn_ray(self.scene, &hit, refraction.direction);
                outgoing += refraction.weight(hit.abs_cos(refraction.direction))
                    * self.trace(&next, depth + 1, rng);
            }
        }

        outgoing
    }

    /// Direct light from every source, one position sample each.
    fn lights(&self, hit: &HitRecord, rng: &mut dyn RngCore) -> Spectrum {
        let mut total = Spectrum::ZERO;

        for light in self.scene.lights() {
            let sample = light.sample(rng);
            let to_light = sample.position - hit.position;
            let d2 = to_light.length_squared();
            if d2 <= 0.0 {
                continue;
            }
            let dir = to_light / d2.sqrt();

            let brdf = hit.material.evaluate_brdf(hit, hit.w, dir);
            let cos = hit.normal.dot(dir).max(0.0);
            let cos_light = if sample.on_surface {
                sample.normal.dot(-dir).max(0.0)
            } else {
                1.0
            };
            if brdf.is_black() || cos <= 0.0 || cos_light <= 0.0 {
                continue;
            }
            if self.scene.is_in_shadow(hit, to_light) {
                continue;
            }

            let pdf = sample.pdf.unwrap_or(1.0);
            let emission = sample.material.evaluate_emission(&sample, -dir);
            total += brdf * emission * (cos * cos_light / (d2 * pdf));
        }

        total
    }

    /// Pass through a medium boundary, attenuating by the transmittance up
    /// to the next surface when entering.
    fn cross_medium(
        &self,
        hit: &HitRecord,
        medium: &dyn Medium,
        ray: &Ray,
        depth: usize,
        rng: &mut dyn RngCore,
    ) -> Spectrum {
        let next = spawn_ray(self.scene, hit, ray.direction.normalize_or_zero());
        let transmittance = if hit.front_face {
            self.scene
                .intersect(&next)
                .map_or(Spectrum::ONE, |exit| medium.transmittance_along(0.0, exit.t))
        } else {
            Spectrum::ONE
        };

        transmittance * self.trace(&next, depth + 1, rng)
    }
}

impl Integrator for WhittedIntegrator<'_> {
    fn integrate(&self, ray: &Ray, rng: &mut dyn RngCore, _light_image: &mut LightImage) -> Spectrum {
        self.trace(ray, 0, rng).sanitized()
    }
}
