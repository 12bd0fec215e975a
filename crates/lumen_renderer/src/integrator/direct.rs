//! One-bounce direct lighting with BRDF sampling, light sampling, or both
//! combined by multiple importance sampling.

use super::{sample_light, spawn_ray, Integrator};
use crate::{Heuristic, HitRecord, LightImage, Scene, Spectrum, SpectrumExt};
use lumen_math::Ray;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// How the direct-lighting integral is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingTechnique {
    /// Follow one BRDF sample and look for a light
    Brdf,
    /// Sample one point on a light
    Light,
    /// Both, weighted by a heuristic
    #[default]
    Mis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectConfig {
    pub technique: SamplingTechnique,
    pub heuristic: Heuristic,
    /// Longest chain of specular bounces followed before shading
    pub max_specular_depth: usize,
}

impl Default for DirectConfig {
    fn default() -> Self {
        Self {
            technique: SamplingTechnique::Mis,
            heuristic: Heuristic::Power,
            max_specular_depth: 8,
        }
    }
}

/// Estimate of one technique together with the two densities MIS needs.
#[derive(Debug, Clone, Copy, Default)]
struct Estimate {
    value: Spectrum,
    /// Solid-angle density of the technique that produced the sample
    pdf_own: f32,
    /// Solid-angle density of the other technique for the same direction
    pdf_other: f32,
}

pub struct DirectLightingIntegrator<'s> {
    scene: &'s Scene,
    config: DirectConfig,
}

impl<'s> DirectLightingIntegrator<'s> {
    pub fn new(scene: &'s Scene, config: DirectConfig) -> Self {
        Self { scene, config }
    }

    fn sample_brdf(&self, hit: &HitRecord, rng: &mut dyn RngCore) -> Estimate {
        let Some(sample) = hit.material.shading_sample(hit, rng) else {
            return Estimate::default();
        };
        if sample.pdf <= 0.0 {
            return Estimate::default();
        }

        let ray = spawn_ray(self.scene, hit, sample.direction);
        let Some(light_hit) = self.scene.intersect(&ray) else {
            return Estimate::default();
        };
        let Some(light) = light_hit.object.and_then(|o| o.as_light()) else {
            return Estimate::default();
        };

        let emission = light_hit.material.evaluate_emission(&light_hit, light_hit.w);
        if emission.is_black() {
            return Estimate::default();
        }

        let cos_light = light_hit.abs_cos(light_hit.w);
        let d2 = (light_hit.position - hit.position).length_squared();
        let selection = 1.0 / self.scene.lights().len().max(1) as f32;
        let light_pdf = if light.area() > 0.0 && cos_light > 0.0 {
            selection / light.area() * d2 / cos_light
        } else {
            0.0
        };

        Estimate {
            value: emission * sample.weight(hit.facing_cos(sample.direction)),
            pdf_own: sample.pdf,
            pdf_other: light_pdf,
        }
    }

    fn sample_lights(&self, hit: &HitRecord, rng: &mut dyn RngCore) -> Estimate {
        let Some(sample) = sample_light(self.scene, hit.position, rng) else {
            return Estimate::default();
        };

        let brdf = hit.material.evaluate_brdf(hit, hit.w, sample.direction);
        let cos = hit.facing_cos(sample.direction);
        if brdf.is_black() || cos <= 0.0 {
            return Estimate::default();
        }
        if self.scene.is_in_shadow(hit, sample.hit.position - hit.position) {
            return Estimate::default();
        }

        // A delta light cannot be hit by a BRDF sample.
        let brdf_pdf = if sample.is_delta {
            0.0
        } else {
            hit.material.probability(hit, sample.direction)
        };

        Estimate {
            value: brdf * cos * sample.incident(),
            pdf_own: if sample.is_delta {
                f32::INFINITY
            } else {
                sample.solid_angle_pdf()
            },
            pdf_other: brdf_pdf,
        }
    }

    fn shade(&self, hit: &HitRecord, rng: &mut dyn RngCore) -> Spectrum {
        match self.config.technique {
            SamplingTechnique::Brdf => self.sample_brdf(hit, rng).value,
            SamplingTechnique::Light => self.sample_lights(hit, rng).value,
            SamplingTechnique::Mis => {
                let heuristic = self.config.heuristic;
                let brdf = self.sample_brdf(hit, rng);
                let light = self.sample_lights(hit, rng);

                let mut total = Spectrum::ZERO;
                if !brdf.value.is_black() {
                    total += brdf.value * heuristic.weight(brdf.pdf_own, brdf.pdf_other);
                }
                if !light.value.is_black() {
                    let w = if light.pdf_own.is_infinite() {
                        1.0
                    } else {
                        heuristic.weight(light.pdf_own, light.pdf_other)
                    };
                    total += light.value * w;
                }
                total
            }
        }
    }
}

impl Integrator for DirectLightingIntegrator<'_> {
    fn integrate(&self, ray: &Ray, rng: &mut dyn RngCore, _light_image: &mut LightImage) -> Spectrum {
        let mut throughput = Spectrum::ONE;
        let mut ray = *ray;

        for _ in 0..=self.config.max_specular_depth {
            let Some(hit) = self.scene.intersect(&ray) else {
                break;
            };

            if hit.is_light() {
                return (throughput * hit.material.evaluate_emission(&hit, hit.w)).sanitized();
            }

            let material = hit.material;
            let passes_through = material.medium().is_some();
            if !passes_through && !material.has_specular_reflection() && !material.has_specular_refraction() {
                return (throughput * self.shade(&hit, rng)).sanitized();
            }

            let Some(sample) = material.shading_sample(&hit, rng) else {
                break;
            };
            throughput *= sample.weight(hit.abs_cos(sample.direction));
            ray = spawn_ray(self.scene, &hit, sample.direction);
        }

        Spectrum::ZERO
    }
}
