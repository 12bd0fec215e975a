//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{HitRecord, Intersectable, Material};
use lumen_math::{Aabb, Ray, Vec3};
use std::sync::Arc;

/// A triangle primitive.
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();

        // Pad thin dimensions to avoid degenerate AABBs
        let bbox = Aabb::from_iter_points([v0, v1, v2]).padded();

        Self {
            v0,
            v1,
            v2,
            normal,
            material,
            bbox,
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }
}

impl Intersectable for Triangle {
    fn intersect<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-12 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !(t > 0.0) {
            return None;
        }

        Some(
            HitRecord::new(ray, t, self.normal, self.material.as_ref())
                .with_uv(u, v)
                .with_object(self),
        )
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Diffuse, Spectrum};

    fn triangle() -> Triangle {
        Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Arc::new(Diffuse::new(Spectrum::ONE)),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), -Vec3::Z);
        let tri = triangle();
        let hit = tri.intersect(&ray).expect("should hit");

        assert!((hit.t - 1.0).abs() < 1e-6);
        assert_eq!(hit.normal, Vec3::Z);
        assert!((hit.u - 0.25).abs() < 1e-6);
        assert!((hit.v - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_triangle_miss_outside_and_parallel() {
        let outside = Ray::new(Vec3::new(0.75, 0.75, 1.0), -Vec3::Z);
        assert!(triangle().intersect(&outside).is_none());

        let parallel = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::X);
        assert!(triangle().intersect(&parallel).is_none());
    }

    #[test]
    fn test_triangle_flat_box_is_padded() {
        let bbox = triangle().bounding_box().expect("bounded");
        assert!(bbox.z.size() > 0.0);
    }
}
