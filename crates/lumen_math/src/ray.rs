use crate::Vec3;

/// A ray in 3D space with an origin and a direction.
///
/// Rays are immutable values; offsetting the origin produces a new ray.
/// Directions are not required to be normalized.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray from `from` pointing at `to`, with `at(1.0) == to`.
    pub fn between(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Same direction, origin moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> Ray {
        Ray::new(self.origin + offset, self.direction)
    }

    /// Same direction, origin moved `eps` along the normalized direction.
    pub fn nudged(&self, eps: f32) -> Ray {
        self.translated(self.direction.normalize_or_zero() * eps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_translated_is_new_value() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y);
        let moved = ray.translated(Vec3::new(0.0, 0.0, 1.0));

        assert_eq!(ray.origin, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(moved.origin, Vec3::new(1.0, 2.0, 4.0));
        assert_eq!(moved.direction, ray.direction);
    }

    #[test]
    fn test_ray_nudged() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0));
        let nudged = ray.nudged(0.5);

        assert!((nudged.origin - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_ray_between() {
        let ray = Ray::between(Vec3::ONE, Vec3::new(3.0, 1.0, 1.0));

        assert_eq!(ray.at(1.0), Vec3::new(3.0, 1.0, 1.0));
        assert_eq!(ray.at(0.5), Vec3::new(2.0, 1.0, 1.0));
    }
}
