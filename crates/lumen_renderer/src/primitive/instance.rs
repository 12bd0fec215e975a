//! Transformed instance of another intersectable.

use crate::{HitRecord, Intersectable, Light};
use lumen_math::{Aabb, Mat3, Mat4, Mat4Ext, Ray};
use std::sync::Arc;

/// An object placed in the world by an affine object-to-world transform.
///
/// Rays are mapped into object space with the inverse transform (without
/// renormalizing, so `t` carries over), and hit records are mapped back
/// with the transform and its normal matrix.
pub struct Instance {
    object: Arc<dyn Intersectable>,
    transform: Mat4,
    inverse: Mat4,
    normal_matrix: Mat3,
}

impl Instance {
    pub fn new(object: Arc<dyn Intersectable>, transform: Mat4) -> Self {
        Self {
            object,
            inverse: transform.inverse(),
            normal_matrix: transform.normal_matrix(),
            transform,
        }
    }
}

impl Intersectable for Instance {
    fn intersect<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>> {
        let local = Ray::new(
            self.inverse.transform_point3(ray.origin),
            self.inverse.transform_vector3(ray.direction),
        );

        let mut hit = self
            .object
            .intersect(&local)?
            .transform(&self.transform, &self.normal_matrix);
        hit.w = -ray.direction.normalize_or_zero();
        Some(hit)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.transform.transform_aabb(&self.object.bounding_box()?))
    }

    fn as_light(&self) -> Option<&dyn Light> {
        self.object.as_light()
    }
}
