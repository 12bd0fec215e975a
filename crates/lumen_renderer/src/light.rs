//! Light sources: point lights and one-sided rectangular area lights.

use crate::sampling::uniform;
use crate::{AreaLightMaterial, HitRecord, Intersectable, PointLightMaterial, Spectrum};
use lumen_math::{Aabb, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A light source. Lights are also intersectable, so camera and BRDF rays
/// can hit them directly.
pub trait Light: Intersectable {
    /// Sample a point on the light. The record carries the area density
    /// in `pdf` (1 for point lights).
    fn sample(&self, rng: &mut dyn RngCore) -> HitRecord<'_>;

    /// Emitting area (0 for point lights).
    fn area(&self) -> f32;

    /// True if the light is a single point.
    fn is_delta(&self) -> bool {
        false
    }
}

/// Isotropic point light.
pub struct PointLight {
    position: Vec3,
    material: PointLightMaterial,
}

impl PointLight {
    /// Point light of total `power`.
    pub fn new(position: Vec3, power: Spectrum) -> Self {
        Self {
            position,
            material: PointLightMaterial::new(power),
        }
    }

    /// Point light with the given radiant intensity.
    pub fn with_intensity(position: Vec3, intensity: Spectrum) -> Self {
        Self {
            position,
            material: PointLightMaterial::from_intensity(intensity),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}

impl Intersectable for PointLight {
    fn intersect<'a>(&'a self, _ray: &Ray) -> Option<HitRecord<'a>> {
        None
    }

    fn bounding_box(&self) -> Option<Aabb> {
        None
    }

    fn as_light(&self) -> Option<&dyn Light> {
        Some(self)
    }
}

impl Light for PointLight {
    fn sample(&self, _rng: &mut dyn RngCore) -> HitRecord<'_> {
        HitRecord::sampled(self.position, Vec3::ZERO, 1.0, &self.material).with_object(self)
    }

    fn area(&self) -> f32 {
        0.0
    }

    fn is_delta(&self) -> bool {
        true
    }
}

/// Parallelogram light spanned by two edges from an anchor corner.
///
/// Emits on the side of `edge1 × edge2` only.
pub struct RectangleLight {
    anchor: Vec3,
    edge1: Vec3,
    edge2: Vec3,
    normal: Vec3,
    area: f32,
    material: AreaLightMaterial,
}

impl RectangleLight {
    /// Area light of total `power`.
    pub fn new(anchor: Vec3, edge1: Vec3, edge2: Vec3, power: Spectrum) -> Self {
        let cross = edge1.cross(edge2);
        let area = cross.length();
        Self {
            anchor,
            edge1,
            edge2,
            normal: cross.normalize_or_zero(),
            area,
            material: AreaLightMaterial::new(power, area),
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn radiance(&self) -> Spectrum {
        self.material.radiance()
    }
}

impl Intersectable for RectangleLight {
    fn intersect<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>> {
        let (t, s0, s1) = intersect_parallelogram(self.anchor, self.edge1, self.edge2, self.normal, ray)?;

        // Keep the geometric normal: the light is one-sided.
        let mut hit = HitRecord::new(ray, t, self.normal, &self.material)
            .with_uv(s0, s1)
            .with_object(self);
        hit.set_normal(self.normal);
        Some(hit)
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

    fn as_light(&self) -> Option<&dyn Light> {
        Some(self)
    }
}

impl Light for RectangleLight {
    fn sample(&self, rng: &mut dyn RngCore) -> HitRecord<'_> {
        let (s0, s1) = (uniform(rng), uniform(rng));
        let position = self.anchor + self.edge1 * s0 + self.edge2 * s1;
        HitRecord::sampled(position, self.normal, 1.0 / self.area, &self.material)
            .with_uv(s0, s1)
            .with_object(self)
    }

    fn area(&self) -> f32 {
        self.area
    }
}

/// Ray/parallelogram intersection. Returns `(t, s0, s1)` with the hit at
/// `anchor + s0·edge1 + s1·edge2`.
pub(crate) fn intersect_parallelogram(
    anchor: Vec3,
    edge1: Vec3,
    edge2: Vec3,
    normal: Vec3,
    ray: &Ray,
) -> Option<(f32, f32, f32)> {
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-8 {
        return None;
    }
    let t = normal.dot(anchor - ray.origin) / denom;
    if !(t > 0.0) {
        return None;
    }

    // Solve p - anchor = s0·e1 + s1·e2 in the plane.
    let d = ray.at(t) - anchor;
    let (e11, e12, e22) = (edge1.dot(edge1), edge1.dot(edge2), edge2.dot(edge2));
    let det = e11 * e22 - e12 * e12;
    if det.abs() < 1e-12 {
        return None;
    }
    let (d1, d2) = (d.dot(edge1), d.dot(edge2));
    let s0 = (e22 * d1 - e12 * d2) / det;
    let s1 = (e11 * d2 - e12 * d1) / det;

    if (0.0..=1.0).contains(&s0) && (0.0..=1.0).contains(&s1) {
        Some((t, s0, s1))
    } else {
        None
    }
}

/// Adapter placing a shared light in the intersectable root.
pub struct LightPrimitive(pub Arc<dyn Light>);

impl Intersectable for LightPrimitive {
    fn intersect<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>> {
        self.0.intersect(ray)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.0.bounding_box()
    }

    fn as_light(&self) -> Option<&dyn Light> {
        Some(self.0.as_ref())
    }
}
