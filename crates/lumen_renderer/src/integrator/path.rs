//! Unidirectional path tracer with next-event estimation and Russian
//! roulette.

use super::{direct_lighting, spawn_ray, surface_response, termination_probability, Integrator};
use crate::sampling::uniform;
use crate::{HitRecord, LightImage, Medium, Scene, Spectrum, SpectrumExt};
use lumen_math::{Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Path tracer settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathTracerConfig {
    /// Bounces below this depth are never terminated by Russian roulette
    pub min_depth: usize,
    /// Paths are always cut at this many surface vertices
    pub max_depth: usize,
    /// Russian-roulette termination probability between the two depths
    pub termination_probability: f32,
}

impl Default for PathTracerConfig {
    fn default() -> Self {
        Self {
            min_depth: 3,
            max_depth: 12,
            termination_probability: 0.5,
        }
    }
}

pub struct PathTracer<'s> {
    scene: &'s Scene,
    config: PathTracerConfig,
}

impl<'s> PathTracer<'s> {
    pub fn new(scene: &'s Scene, config: PathTracerConfig) -> Self {
        Self { scene, config }
    }

    /// Single-scattered light picked up while crossing `length` units of
    /// `medium` along `ray`, split into the medium's equal sub-steps.
    fn in_scattering(&self, medium: &dyn Medium, ray: &Ray, length: f32, rng: &mut dyn RngCore) -> Spectrum {
        let sigma_s = medium.scattering();
        if sigma_s.is_black() || length <= 0.0 {
            return Spectrum::ZERO;
        }

        let steps = medium.steps().max(1);
        let ds = length / steps as f32;
        let mut total = Spectrum::ZERO;

        for i in 0..steps {
            let s = (i as f32 + 0.5) * ds;
            let mut point = HitRecord::root(ray.at(s));
            point.w = -ray.direction;

            let to_camera = medium.transmittance(s);
            let scene = self.scene;
            let w = point.w;
            let scatter = |dir: Vec3| {
                // Attenuation from the point to where the shadow ray leaves
                // the medium.
                let exit = scene
                    .intersect(&Ray::new(point.position, dir))
                    .filter(|h| h.material.medium().is_some())
                    .map_or(Spectrum::ONE, |h| medium.transmittance(h.t));
                medium.phase(dir, w) * sigma_s * ds * exit
            };
            total += to_camera * direct_lighting(scene, &point, rng, scatter);
        }

        total
    }
}

impl Integrator for PathTracer<'_> {
    fn integrate(&self, ray: &Ray, rng: &mut dyn RngCore, _light_image: &mut LightImage) -> Spectrum {
        let scene = self.scene;
        let config = &self.config;

        let mut radiance = Spectrum::ZERO;
        let mut throughput = Spectrum::ONE;
        let mut ray = *ray;
        let mut depth = 0;
        let mut specular_bounce = false;
        let mut medium: Option<&dyn Medium> = None;

        while let Some(hit) = scene.intersect(&ray) {
            if let Some(m) = medium {
                radiance += throughput * self.in_scattering(m, &ray, hit.t, rng);
                throughput *= m.transmittance_along(0.0, hit.t);
            }

            if hit.is_light() {
                if depth == 0 || specular_bounce {
                    radiance += throughput * hit.material.evaluate_emission(&hit, hit.w);
                }
                break;
            }

            // Media boundaries are crossed without counting as a bounce.
            if let Some(m) = hit.material.medium() {
                medium = hit.front_face.then_some(m);
                ray = spawn_ray(scene, &hit, ray.direction);
                continue;
            }

            depth += 1;
            let sample = hit.material.shading_sample(&hit, rng);
            specular_bounce = sample.is_some_and(|s| s.is_specular);

            if !specular_bounce {
                radiance += throughput * direct_lighting(scene, &hit, rng, surface_response(&hit));
            }

            let q = termination_probability(
                depth,
                config.min_depth,
                config.max_depth,
                config.termination_probability,
            );
            if q >= 1.0 || (q > 0.0 && uniform(rng) < q) {
                break;
            }

            let Some(sample) = sample else {
                break;
            };
            throughput *= sample.weight(hit.abs_cos(sample.direction)) / (1.0 - q);
            if throughput.is_black() {
                break;
            }

            ray = spawn_ray(scene, &hit, sample.direction);
        }

        radiance.sanitized()
    }
}
