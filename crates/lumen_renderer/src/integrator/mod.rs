//! Light transport integrators.
//!
//! Every integrator estimates the radiance arriving along a camera ray. The
//! bidirectional tracer may also splat contributions onto other pixels
//! through the [`LightImage`] it is handed.

mod bdpt;
mod direct;
mod path;
mod vertex;
mod whitted;

pub use bdpt::{BdptConfig, BidirectionalPathTracer};
pub use direct::{DirectConfig, DirectLightingIntegrator, SamplingTechnique};
pub use path::{PathTracer, PathTracerConfig};
pub use vertex::{Path, PathVertex, VertexKind};
pub use whitted::{WhittedConfig, WhittedIntegrator};

use crate::{HitRecord, LightImage, Scene, Spectrum, SpectrumExt};
use lumen_math::{Ray, Vec3};
use rand::RngCore;

/// Estimates radiance along a ray.
pub trait Integrator: Send + Sync {
    /// Radiance arriving at the camera along `ray`.
    fn integrate(&self, ray: &Ray, rng: &mut dyn RngCore, light_image: &mut LightImage) -> Spectrum;
}

/// Probability of terminating a path of the given length: 0 below
/// `min`, 1 at or above `max`, `q` in between.
pub(crate) fn termination_probability(length: usize, min: usize, max: usize, q: f32) -> f32 {
    if length >= max {
        1.0
    } else if length < min {
        0.0
    } else {
        q.clamp(0.0, 1.0)
    }
}

/// Spawn a secondary ray from `hit` along `direction`.
pub(crate) fn spawn_ray(scene: &Scene, hit: &HitRecord, direction: Vec3) -> Ray {
    Ray::new(hit.position, direction).nudged(scene.epsilon())
}

/// A point sampled on a light as seen from a shading point.
pub(crate) struct LightSample<'s> {
    pub hit: HitRecord<'s>,
    /// Unit direction from the shading point toward the light
    pub direction: Vec3,
    pub distance_squared: f32,
    /// Emitted radiance (or intensity) toward the shading point
    pub emission: Spectrum,
    /// `|cos|` at the light; 1 for point lights
    pub cos_light: f32,
    /// Area density of the light sample, including light selection
    pub pdf: f32,
    pub is_delta: bool,
}

impl LightSample<'_> {
    /// Incident radiance estimate at the shading point, before the BRDF
    /// and the cosine there.
    pub fn incident(&self) -> Spectrum {
        if self.pdf <= 0.0 || self.distance_squared <= 0.0 {
            return Spectrum::ZERO;
        }
        self.emission * (self.cos_light / (self.distance_squared * self.pdf))
    }

    /// Solid-angle density of this sample as seen from the shading point.
    pub fn solid_angle_pdf(&self) -> f32 {
        if self.cos_light <= 0.0 {
            return 0.0;
        }
        self.pdf * self.distance_squared / self.cos_light
    }
}

/// Sample one light uniformly and a point on it, as seen from `position`.
///
/// Returns `None` for degenerate or back-facing samples.
pub(crate) fn sample_light<'s>(
    scene: &'s Scene,
    position: Vec3,
    rng: &mut dyn RngCore,
) -> Option<LightSample<'s>> {
    let (light, selection) = scene.random_light(rng)?;
    let hit = light.sample(rng);

    let to_light = hit.position - position;
    let distance_squared = to_light.length_squared();
    if distance_squared <= 0.0 {
        return None;
    }
    let direction = to_light / distance_squared.sqrt();

    let cos_light = if hit.on_surface {
        hit.normal.dot(-direction)
    } else {
        1.0
    };
    if cos_light <= 0.0 {
        return None;
    }

    let hit = hit.looking(-direction);
    let emission = hit.material.evaluate_emission(&hit, -direction);

    Some(LightSample {
        pdf: hit.pdf.unwrap_or(1.0) * selection,
        is_delta: light.is_delta(),
        hit,
        direction,
        distance_squared,
        emission,
        cos_light,
    })
}

/// Next-event estimate at `hit` with one uniformly chosen light.
///
/// `scatter(direction)` is the response of the shading point to light
/// arriving from `direction`, cosine included.
pub(crate) fn direct_lighting(
    scene: &Scene,
    hit: &HitRecord,
    rng: &mut dyn RngCore,
    scatter: impl Fn(Vec3) -> Spectrum,
) -> Spectrum {
    let Some(sample) = sample_light(scene, hit.position, rng) else {
        return Spectrum::ZERO;
    };

    let response = scatter(sample.direction);
    if response.is_black() {
        return Spectrum::ZERO;
    }
    if scene.is_in_shadow(hit, sample.hit.position - hit.position) {
        return Spectrum::ZERO;
    }

    (response * sample.incident()).sanitized()
}

/// BRDF times cosine at a surface, for [`direct_lighting`].
pub(crate) fn surface_response<'h>(hit: &'h HitRecord<'h>) -> impl Fn(Vec3) -> Spectrum + 'h {
    move |direction| hit.material.evaluate_brdf(hit, hit.w, direction) * hit.facing_cos(direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_termination_probability_bounds() {
        assert_eq!(termination_probability(0, 2, 5, 0.3), 0.0);
        assert_eq!(termination_probability(1, 2, 5, 0.3), 0.0);
        assert_eq!(termination_probability(2, 2, 5, 0.3), 0.3);
        assert_eq!(termination_probability(4, 2, 5, 0.3), 0.3);
        assert_eq!(termination_probability(5, 2, 5, 0.3), 1.0);
        assert_eq!(termination_probability(9, 2, 5, 0.3), 1.0);
    }
}
