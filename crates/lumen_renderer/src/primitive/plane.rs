//! Infinite plane. Unbounded, so it lives beside the accelerator.

use crate::{HitRecord, Intersectable, Material};
use lumen_math::{Aabb, Ray, Vec3};
use std::sync::Arc;

/// The plane `normal · p + d = 0`.
pub struct Plane {
    normal: Vec3,
    d: f32,
    material: Arc<dyn Material>,
}

impl Plane {
    pub fn new(normal: Vec3, d: f32, material: Arc<dyn Material>) -> Self {
        let len = normal.length();
        Self {
            normal: normal / len,
            d: d / len,
            material,
        }
    }
}

impl Intersectable for Plane {
    fn intersect<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>> {
        let denom = self.normal.dot(ray.direction);
        if denom == 0.0 {
            return None;
        }

        let t = -(self.normal.dot(ray.origin) + self.d) / denom;
        if !(t > 0.0) || !t.is_finite() {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, self.material.as_ref()).with_object(self))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Diffuse, Spectrum};

    #[test]
    fn test_plane_hit_and_parallel_miss() {
        // y = -1
        let plane = Plane::new(Vec3::Y, 1.0, Arc::new(Diffuse::new(Spectrum::ONE)));

        let down = Ray::new(Vec3::ZERO, -Vec3::Y * 2.0);
        let hit = plane.intersect(&down).expect("should hit");
        assert!((hit.t - 0.5).abs() < 1e-6);
        assert!((hit.position.y + 1.0).abs() < 1e-6);
        assert_eq!(hit.normal, Vec3::Y);

        let parallel = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(plane.intersect(&parallel).is_none());
        assert!(plane.bounding_box().is_none());
    }
}
