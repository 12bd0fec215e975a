//! Two-sided parallelogram primitive.

use crate::light::intersect_parallelogram;
use crate::{HitRecord, Intersectable, Material};
use lumen_math::{Aabb, Ray, Vec3};
use std::sync::Arc;

/// Parallelogram spanned by `edge1` and `edge2` from `anchor`.
pub struct Rectangle {
    anchor: Vec3,
    edge1: Vec3,
    edge2: Vec3,
    normal: Vec3,
    material: Arc<dyn Material>,
}

impl Rectangle {
    pub fn new(anchor: Vec3, edge1: Vec3, edge2: Vec3, material: Arc<dyn Material>) -> Self {
        Self {
            anchor,
            edge1,
            edge2,
            normal: edge1.cross(edge2).normalize_or_zero(),
            material,
        }
    }
}

impl Intersectable for Rectangle {
    fn intersect<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>> {
        let (t, s0, s1) = intersect_parallelogram(self.anchor, self.edge1, self.edge2, self.normal, ray)?;
        Some(
            HitRecord::new(ray, t, self.normal, self.material.as_ref())
                .with_uv(s0, s1)
                .with_object(self),
        )
    }

    fn bounding_box(&self) -> Option<Aabb> {
        let corners = [
            self.anchor,
            self.anchor + self.edge1,
            self.anchor + self.edge2,
            self.anchor + self.edge1 + self.edge2,
        ];
        Some(Aabb::from_iter_points(corners).padded())
    }
}
