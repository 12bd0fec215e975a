//! Intersectable trait and a linear list of intersectables.

use crate::{HitRecord, Light};
use lumen_math::{Aabb, Ray};
use std::sync::Arc;

/// Trait for objects that can be hit by rays.
pub trait Intersectable: Send + Sync {
    /// Closest intersection with `t > 0`, if any.
    fn intersect<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>>;

    /// Axis-aligned bounds, or `None` for unbounded objects (infinite planes).
    fn bounding_box(&self) -> Option<Aabb>;

    /// The light source this object is, if it is one.
    fn as_light(&self) -> Option<&dyn Light> {
        None
    }
}

/// A list of intersectable objects, tested by linear scan.
#[derive(Clone, Default)]
pub struct IntersectableList {
    objects: Vec<Arc<dyn Intersectable>>,
}

impl IntersectableList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Arc<dyn Intersectable>) {
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Arc<dyn Intersectable>] {
        &self.objects
    }
}

impl From<Vec<Arc<dyn Intersectable>>> for IntersectableList {
    fn from(objects: Vec<Arc<dyn Intersectable>>) -> Self {
        Self { objects }
    }
}

impl Intersectable for IntersectableList {
    fn intersect<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            if let Some(hit) = object.intersect(ray) {
                if hit.t > 0.0 && closest.as_ref().map_or(true, |c| hit.t < c.t) {
                    closest = Some(hit);
                }
            }
        }

        closest
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.objects
            .iter()
            .try_fold(Aabb::EMPTY, |acc, o| Some(acc.union(&o.bounding_box()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Diffuse, Plane, Sphere, Spectrum};
    use lumen_math::Vec3;

    fn grey() -> Arc<Diffuse> {
        Arc::new(Diffuse::new(Spectrum::splat(0.5)))
    }

    #[test]
    fn test_list_returns_closest() {
        let mut list = IntersectableList::new();
        list.add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0, grey())));
        list.add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, grey())));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let hit = list.intersect(&ray).expect("should hit");

        assert!((hit.t - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_list_bounding_box_none_if_unbounded() {
        let mut list = IntersectableList::new();
        list.add(Arc::new(Sphere::new(Vec3::ZERO, 1.0, grey())));
        assert!(list.bounding_box().is_some());

        list.add(Arc::new(Plane::new(Vec3::Y, 1.0, grey())));
        assert!(list.bounding_box().is_none());
    }
}
