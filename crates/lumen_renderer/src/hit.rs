//! HitRecord: the result of a ray/surface intersection or a surface sample.

use crate::{Intersectable, Material, ShadingSample, Spectrum};
use lumen_math::{Mat3, Mat4, Ray, Vec3};
use rand::RngCore;

/// Material used by degenerate records (camera and path roots).
/// Reflects and emits nothing.
struct RootMaterial;

impl Material for RootMaterial {
    fn evaluate_brdf(&self, _hit: &HitRecord, _w_out: Vec3, _w_in: Vec3) -> Spectrum {
        Spectrum::ZERO
    }

    fn shading_sample(&self, _hit: &HitRecord, _rng: &mut dyn RngCore) -> Option<ShadingSample> {
        None
    }

    fn probability(&self, _hit: &HitRecord, _direction: Vec3) -> f32 {
        0.0
    }
}

static ROOT_MATERIAL: RootMaterial = RootMaterial;

/// Record of a ray-object intersection, or of a point sampled on a light.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub position: Vec3,
    /// Unit surface normal. Zero for points that are not on a surface.
    pub normal: Vec3,
    /// Tangent vectors; `(t1, t2, normal)` is an orthonormal frame
    pub t1: Vec3,
    pub t2: Vec3,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Unit direction pointing back toward the ray origin
    pub w: Vec3,
    /// Ray parameter of the intersection
    pub t: f32,
    /// Whether the ray arrived on the side the outward normal points to
    pub front_face: bool,
    /// False for point lights, the camera and path roots
    pub on_surface: bool,
    /// The object that was hit, if any
    pub object: Option<&'a dyn Intersectable>,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Area density when the record was produced by sampling a light
    pub pdf: Option<f32>,
}

/// Orthonormal tangents for a unit normal.
///
/// Uses X as the helper axis and falls back to Y when the normal is
/// (nearly) parallel to X.
pub fn tangent_frame(normal: Vec3) -> (Vec3, Vec3) {
    if normal == Vec3::ZERO {
        return (Vec3::ZERO, Vec3::ZERO);
    }
    let mut t1 = Vec3::X.cross(normal);
    if t1.length_squared() < 1e-6 {
        t1 = Vec3::Y.cross(normal);
    }
    let t1 = t1.normalize();
    let t2 = normal.cross(t1);
    (t1, t2)
}

impl<'a> HitRecord<'a> {
    /// Build a record for a ray hit at parameter `t`.
    ///
    /// The stored normal is flipped to face the incoming ray, the way
    /// two-sided surfaces are shaded.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, material: &'a dyn Material) -> Self {
        let mut rec = Self {
            position: ray.at(t),
            normal: Vec3::ZERO,
            t1: Vec3::ZERO,
            t2: Vec3::ZERO,
            u: 0.0,
            v: 0.0,
            w: -ray.direction.normalize_or_zero(),
            t,
            front_face: true,
            on_surface: true,
            object: None,
            material,
            pdf: None,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Record for a point sampled on a surface (or a point light when
    /// `normal` is zero). `w` defaults to the normal.
    pub fn sampled(position: Vec3, normal: Vec3, pdf: f32, material: &'a dyn Material) -> Self {
        let (t1, t2) = tangent_frame(normal);
        Self {
            position,
            normal,
            t1,
            t2,
            u: 0.0,
            v: 0.0,
            w: normal,
            t: 0.0,
            front_face: true,
            on_surface: normal != Vec3::ZERO,
            object: None,
            material,
            pdf: Some(pdf),
        }
    }

    /// Degenerate record at a path root (the camera position).
    pub fn root(position: Vec3) -> HitRecord<'static> {
        HitRecord {
            position,
            normal: Vec3::ZERO,
            t1: Vec3::ZERO,
            t2: Vec3::ZERO,
            u: 0.0,
            v: 0.0,
            w: Vec3::ZERO,
            t: 0.0,
            front_face: true,
            on_surface: false,
            object: None,
            material: &ROOT_MATERIAL,
            pdf: None,
        }
    }

    pub fn with_uv(mut self, u: f32, v: f32) -> Self {
        self.u = u;
        self.v = v;
        self
    }

    pub fn with_object(mut self, object: &'a dyn Intersectable) -> Self {
        self.object = Some(object);
        self
    }

    /// Copy of this record looking back along `w` instead.
    pub fn looking(&self, w: Vec3) -> Self {
        let mut rec = self.clone();
        rec.w = w;
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction.dot(outward_normal) < 0.0;
        let normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
        self.set_normal(normal);
    }

    /// Replace the normal (keeping `front_face`) and rebuild the tangent frame.
    pub fn set_normal(&mut self, normal: Vec3) {
        self.normal = normal;
        (self.t1, self.t2) = tangent_frame(normal);
    }

    /// True if the record lies on a light source.
    pub fn is_light(&self) -> bool {
        self.object.and_then(|o| o.as_light()).is_some()
    }

    /// `|cos|` between the normal and the unit direction `dir`, or 1 off-surface.
    #[inline]
    pub fn abs_cos(&self, dir: Vec3) -> f32 {
        if self.on_surface {
            self.normal.dot(dir).abs()
        } else {
            1.0
        }
    }

    /// Cosine between the normal and the unit direction `dir`, clamped at
    /// zero for directions behind the surface, or 1 off-surface.
    #[inline]
    pub fn facing_cos(&self, dir: Vec3) -> f32 {
        if self.on_surface {
            self.normal.dot(dir).max(0.0)
        } else {
            1.0
        }
    }

    /// Map the record from object space to world space.
    ///
    /// `normal_matrix` is the inverse-transpose of the upper 3x3 of `transform`.
    /// The ray parameter is preserved when the world ray was mapped into
    /// object space with the inverse transform.
    pub fn transform(&self, transform: &Mat4, normal_matrix: &Mat3) -> HitRecord<'a> {
        let mut rec = self.clone();
        rec.position = transform.transform_point3(self.position);
        rec.w = transform.transform_vector3(self.w).normalize_or_zero();
        if self.on_surface {
            rec.set_normal((*normal_matrix * self.normal).normalize_or_zero());
        }
        rec
    }
}

impl std::fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRecord")
            .field("position", &self.position)
            .field("normal", &self.normal)
            .field("w", &self.w)
            .field("t", &self.t)
            .field("on_surface", &self.on_surface)
            .field("pdf", &self.pdf)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Mat4Ext;

    fn assert_orthonormal(n: Vec3) {
        let (t1, t2) = tangent_frame(n);
        assert!((t1.length() - 1.0).abs() < 1e-5);
        assert!((t2.length() - 1.0).abs() < 1e-5);
        assert!(t1.dot(n).abs() < 1e-5);
        assert!(t2.dot(n).abs() < 1e-5);
        assert!(t1.dot(t2).abs() < 1e-5);
    }

    #[test]
    fn test_tangent_frame_orthonormal() {
        assert_orthonormal(Vec3::Y);
        assert_orthonormal(Vec3::Z);
        assert_orthonormal(Vec3::new(1.0, 2.0, -3.0).normalize());
    }

    #[test]
    fn test_tangent_frame_parallel_to_x_falls_back() {
        assert_orthonormal(Vec3::X);
        assert_orthonormal(-Vec3::X);
    }

    #[test]
    fn test_face_normal_flips_against_ray() {
        let ray = Ray::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y);
        let rec = HitRecord::new(&ray, 1.0, Vec3::Y, &ROOT_MATERIAL);

        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Y);
        assert_eq!(rec.w, -Vec3::Y);
        assert_eq!(rec.position, Vec3::ZERO);
    }

    #[test]
    fn test_cosines_off_surface_are_one() {
        let root = HitRecord::root(Vec3::ZERO);

        assert_eq!(root.abs_cos(Vec3::X), 1.0);
        assert_eq!(root.facing_cos(-Vec3::X), 1.0);
        assert!(!root.is_light());
    }

    #[test]
    fn test_transform_uses_normal_matrix() {
        let ray = Ray::new(Vec3::new(0.5, 0.5, 5.0), -Vec3::Z);
        let normal = Vec3::new(1.0, 1.0, 1.0).normalize();
        let rec = HitRecord::new(&ray, 4.0, normal, &ROOT_MATERIAL);

        let m = Mat4::from_scale(Vec3::new(3.0, 1.0, 1.0));
        let world = rec.transform(&m, &m.normal_matrix());

        // Normal stays perpendicular to a transformed tangent.
        let tangent = m.transform_vector3(rec.t1);
        assert!(world.normal.dot(tangent).abs() < 1e-5);
        assert!((world.normal.length() - 1.0).abs() < 1e-5);
        assert_eq!(world.position, m.transform_point3(rec.position));
    }
}
