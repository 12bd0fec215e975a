//! Scene facade consumed by the integrators.
//!
//! Bounded primitives live in a BSP accelerator. Unbounded primitives
//! (planes) and the lights sit next to it in a linear list.

use crate::light::LightPrimitive;
use crate::sampling::uniform;
use crate::{
    BspAccelerator, BspConfig, HitRecord, Intersectable, IntersectableList, Light, PinholeCamera,
    SceneError, SceneResult,
};
use lumen_math::{Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Default offset for secondary and shadow rays.
pub const DEFAULT_EPSILON: f32 = 1e-4;

/// A renderable scene: camera, geometry and lights.
pub struct Scene {
    pub camera: PinholeCamera,
    root: IntersectableList,
    lights: Vec<Arc<dyn Light>>,
    epsilon: f32,
}

impl Scene {
    /// Closest hit along `ray` with `t > 0`.
    pub fn intersect(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        self.root.intersect(ray)
    }

    pub fn lights(&self) -> &[Arc<dyn Light>] {
        &self.lights
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn camera(&self) -> &PinholeCamera {
        &self.camera
    }

    /// Pick one light uniformly. Returns it with its selection probability.
    pub fn random_light(&self, rng: &mut dyn RngCore) -> Option<(&dyn Light, f32)> {
        let n = self.lights.len();
        if n == 0 {
            return None;
        }
        let index = ((uniform(rng) * n as f32) as usize).min(n - 1);
        Some((self.lights[index].as_ref(), 1.0 / n as f32))
    }

    /// Whether the segment from `hit` to `hit.position + to_light` is blocked.
    ///
    /// The shadow ray starts `epsilon` off the surface on the light's side.
    /// Hits at or beyond the far end, and hits on materials that cast no
    /// shadows, do not occlude.
    pub fn is_in_shadow(&self, hit: &HitRecord, to_light: Vec3) -> bool {
        let target = hit.position + to_light;
        let offset = if hit.normal.dot(to_light) < 0.0 {
            -hit.normal
        } else {
            hit.normal
        };
        self.is_segment_blocked(hit.position + offset * self.epsilon, target)
    }

    /// Mutual visibility of two path vertices, offsetting both ends.
    pub fn visible(&self, a: &HitRecord, b: &HitRecord) -> bool {
        let d = b.position - a.position;
        let start = a.position + facing(a.normal, d) * self.epsilon;
        let end = b.position + facing(b.normal, -d) * self.epsilon;
        !self.is_segment_blocked(start, end)
    }

    fn is_segment_blocked(&self, mut origin: Vec3, target: Vec3) -> bool {
        loop {
            let ray = Ray::between(origin, target);
            let Some(hit) = self.root.intersect(&ray) else {
                return false;
            };
            if hit.t > 1.0 - self.epsilon {
                return false;
            }
            if hit.material.casts_shadows() {
                return true;
            }
            // Step past a transparent boundary and keep looking.
            origin = hit.position + (target - origin).normalize_or_zero() * self.epsilon;
        }
    }
}

/// `normal` flipped to the side of `dir` (zero stays zero).
fn facing(normal: Vec3, dir: Vec3) -> Vec3 {
    if normal.dot(dir) < 0.0 {
        -normal
    } else {
        normal
    }
}

/// Builder collecting primitives and lights into a [`Scene`].
pub struct SceneBuilder {
    camera: PinholeCamera,
    bounded: Vec<Arc<dyn Intersectable>>,
    unbounded: Vec<Arc<dyn Intersectable>>,
    lights: Vec<Arc<dyn Light>>,
    epsilon: f32,
    bsp: BspConfig,
}

impl SceneBuilder {
    pub fn new(camera: PinholeCamera) -> Self {
        Self {
            camera,
            bounded: Vec::new(),
            unbounded: Vec::new(),
            lights: Vec::new(),
            epsilon: DEFAULT_EPSILON,
            bsp: BspConfig::default(),
        }
    }

    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_bsp_config(mut self, config: BspConfig) -> Self {
        self.bsp = config;
        self
    }

    /// Add a primitive. Bounded ones go into the accelerator.
    pub fn add(&mut self, object: Arc<dyn Intersectable>) -> &mut Self {
        if object.bounding_box().is_some() {
            self.bounded.push(object);
        } else {
            self.unbounded.push(object);
        }
        self
    }

    /// Add a light. It is also hittable by camera and BRDF rays.
    pub fn add_light(&mut self, light: Arc<dyn Light>) -> &mut Self {
        self.lights.push(light);
        self
    }

    /// Build the scene. Fails if there are no lights.
    pub fn build(self) -> SceneResult<Scene> {
        if self.lights.is_empty() {
            return Err(SceneError::NoLights);
        }

        let mut root = IntersectableList::new();
        if !self.bounded.is_empty() {
            let bsp = BspAccelerator::build(self.bounded, &self.bsp)?;
            root.add(Arc::new(bsp));
        }
        for object in self.unbounded {
            root.add(object);
        }
        for light in &self.lights {
            root.add(Arc::new(LightPrimitive(light.clone())));
        }

        log::info!(
            "Scene ready: {} root objects, {} lights",
            root.len(),
            self.lights.len()
        );

        Ok(Scene {
            camera: self.camera,
            root,
            lights: self.lights,
            epsilon: self.epsilon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Diffuse, Homogeneous, HenyeyGreenstein, Plane, PointLight, RectangleLight, Sphere, Spectrum};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn camera() -> PinholeCamera {
        PinholeCamera::new(Vec3::new(0.0, 1.0, 5.0), Vec3::ZERO, Vec3::Y, 45.0, 16, 16)
    }

    fn grey() -> Arc<Diffuse> {
        Arc::new(Diffuse::new(Spectrum::splat(0.5)))
    }

    #[test]
    fn test_build_requires_lights() {
        let mut builder = SceneBuilder::new(camera());
        builder.add(Arc::new(Sphere::new(Vec3::ZERO, 1.0, grey())));
        assert_eq!(builder.build().err(), Some(SceneError::NoLights));
    }

    #[test]
    fn test_shadow_ray_blocked_by_sphere() {
        let mut builder = SceneBuilder::new(camera());
        builder
            .add(Arc::new(Plane::new(Vec3::Y, 0.0, grey())))
            .add(Arc::new(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 0.5, grey())))
            .add_light(Arc::new(PointLight::new(Vec3::new(0.0, 4.0, 0.0), Spectrum::ONE)));
        let scene = builder.build().expect("scene");

        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y);
        let floor = scene.intersect(&ray).expect("floor");
        assert!(floor.position.y.abs() < 1e-5);

        let light = Vec3::new(0.0, 4.0, 0.0);
        assert!(scene.is_in_shadow(&floor, light - floor.position));
        let beside = light + Vec3::new(3.0, 0.0, 0.0);
        assert!(!scene.is_in_shadow(&floor, beside - floor.position));
    }

    #[test]
    fn test_occluder_beyond_light_does_not_shadow() {
        let mut builder = SceneBuilder::new(camera());
        builder
            .add(Arc::new(Plane::new(Vec3::Y, 0.0, grey())))
            .add(Arc::new(Sphere::new(Vec3::new(0.0, 6.0, 0.0), 0.5, grey())))
            .add_light(Arc::new(PointLight::new(Vec3::new(0.0, 4.0, 0.0), Spectrum::ONE)));
        let scene = builder.build().expect("scene");

        let floor = scene
            .intersect(&Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y))
            .expect("floor");
        assert!(!scene.is_in_shadow(&floor, Vec3::new(0.0, 4.0, 0.0) - floor.position));
    }

    #[test]
    fn test_media_and_lights_do_not_shadow() {
        let fog = Arc::new(Homogeneous::new(
            Spectrum::splat(0.1),
            Spectrum::splat(0.1),
            HenyeyGreenstein::isotropic(),
        ));
        let mut builder = SceneBuilder::new(camera());
        builder
            .add(Arc::new(Plane::new(Vec3::Y, 0.0, grey())))
            .add(Arc::new(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 0.5, fog)))
            .add_light(Arc::new(RectangleLight::new(
                Vec3::new(-0.5, 4.0, -0.5),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Spectrum::splat(5.0),
            )));
        let scene = builder.build().expect("scene");

        let floor = scene
            .intersect(&Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y))
            .expect("floor");
        assert!(!scene.is_in_shadow(&floor, Vec3::new(0.0, 4.0, 0.0) - floor.position));
    }

    #[test]
    fn test_lights_are_hittable_and_selectable() {
        let mut builder = SceneBuilder::new(camera());
        builder
            .add(Arc::new(Sphere::new(Vec3::ZERO, 0.5, grey())))
            .add_light(Arc::new(RectangleLight::new(
                Vec3::new(-0.5, 3.0, -0.5),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
                Spectrum::splat(5.0),
            )))
            .add_light(Arc::new(PointLight::new(Vec3::new(2.0, 2.0, 0.0), Spectrum::ONE)));
        let scene = builder.build().expect("scene");

        let hit = scene
            .intersect(&Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y))
            .expect("light");
        assert!(hit.is_light());

        let mut rng = StdRng::seed_from_u64(8);
        let (_, pdf) = scene.random_light(&mut rng).expect("light");
        assert_eq!(pdf, 0.5);
    }

    #[test]
    fn test_visible_between_facing_surfaces() {
        let mut builder = SceneBuilder::new(camera());
        builder
            .add(Arc::new(Plane::new(Vec3::Y, 0.0, grey())))
            .add(Arc::new(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 0.5, grey())))
            .add_light(Arc::new(PointLight::new(Vec3::new(0.0, 4.0, 0.0), Spectrum::ONE)));
        let scene = builder.build().expect("scene");

        let floor = scene
            .intersect(&Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y))
            .expect("floor");
        let sphere_bottom = scene
            .intersect(&Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::Y))
            .expect("sphere");
        assert!((sphere_bottom.position.y - 1.5).abs() < 1e-4);
        assert!(scene.visible(&floor, &sphere_bottom));
        assert!(scene.visible(&sphere_bottom, &floor));
    }
}
