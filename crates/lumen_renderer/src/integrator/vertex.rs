//! Path vertices and paths built by the path-based integrators.

use crate::{HitRecord, ShadingSample, Spectrum};
use lumen_math::Vec3;

/// What a vertex lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexKind {
    /// Root of an eye subpath
    Camera,
    /// Root of a light subpath; `delta` for point lights
    Light { delta: bool },
    /// Any later vertex
    Surface,
}

/// One vertex of an eye or light subpath.
#[derive(Debug, Clone)]
pub struct PathVertex<'s> {
    pub kind: VertexKind,
    /// Intersection (or sampled light point, or the camera root)
    pub hit: HitRecord<'s>,
    /// Sampled continuation out of this vertex, if any
    pub sample: Option<ShadingSample>,
    /// Position in the path; 0 is the root
    pub index: usize,
    /// Throughput from the root up to and including this vertex
    pub alpha: Spectrum,
    /// Area density of sampling this vertex from its predecessor
    pub pdf_fwd: f32,
    /// Area density of sampling this vertex from its successor, walking
    /// the path the other way
    pub pdf_rev: f32,
    /// Whether the continuation out of this vertex is perfectly specular
    pub delta: bool,
}

impl<'s> PathVertex<'s> {
    /// Eye subpath root at the camera.
    pub fn camera(hit: HitRecord<'s>) -> Self {
        Self {
            kind: VertexKind::Camera,
            hit,
            sample: None,
            index: 0,
            alpha: Spectrum::ONE,
            pdf_fwd: 1.0,
            pdf_rev: 0.0,
            delta: false,
        }
    }

    /// Light subpath root at a sampled light point. `pdf_fwd` is the area
    /// density of the point including light selection.
    pub fn light(hit: HitRecord<'s>, pdf_fwd: f32, delta_light: bool) -> Self {
        let alpha = if pdf_fwd > 0.0 {
            Spectrum::splat(1.0 / pdf_fwd)
        } else {
            Spectrum::ZERO
        };
        Self {
            kind: VertexKind::Light { delta: delta_light },
            hit,
            sample: None,
            index: 0,
            alpha,
            pdf_fwd,
            pdf_rev: 0.0,
            delta: false,
        }
    }

    /// Vertex found by extending a subpath.
    pub fn surface(hit: HitRecord<'s>, index: usize, alpha: Spectrum) -> Self {
        Self {
            kind: VertexKind::Surface,
            hit,
            sample: None,
            index,
            alpha,
            pdf_fwd: 0.0,
            pdf_rev: 0.0,
            delta: false,
        }
    }

    pub fn is_root(&self) -> bool {
        self.index == 0
    }

    /// True for the root of a light subpath on a point light.
    pub fn is_delta_light(&self) -> bool {
        matches!(self.kind, VertexKind::Light { delta: true })
    }

    pub fn position(&self) -> Vec3 {
        self.hit.position
    }

    /// Convert a solid-angle density at this vertex toward `next` into an
    /// area density at `next`.
    pub fn convert_density(&self, pdf: f32, next: &PathVertex) -> f32 {
        let to_next = next.position() - self.position();
        let d2 = to_next.length_squared();
        if d2 <= 0.0 {
            return 0.0;
        }
        let cos = next.hit.abs_cos(to_next / d2.sqrt());
        pdf * cos / d2
    }
}

/// A subpath, stored in insertion order from its root.
#[derive(Debug, Clone, Default)]
pub struct Path<'s> {
    vertices: Vec<PathVertex<'s>>,
}

impl<'s> Path<'s> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, vertex: PathVertex<'s>) {
        self.vertices.push(vertex);
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn last(&self) -> Option<&PathVertex<'s>> {
        self.vertices.last()
    }

    pub fn vertices(&self) -> &[PathVertex<'s>] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [PathVertex<'s>] {
        &mut self.vertices
    }
}

impl<'s> std::ops::Index<usize> for Path<'s> {
    type Output = PathVertex<'s>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.vertices[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Diffuse, HitRecord};

    #[test]
    fn test_convert_density_uses_cosine_and_distance() {
        let material = Diffuse::new(Spectrum::ONE);
        let from = PathVertex::camera(HitRecord::root(Vec3::ZERO));
        let facing = PathVertex::surface(
            HitRecord::sampled(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, 1.0, &material),
            1,
            Spectrum::ONE,
        );
        assert!((from.convert_density(1.0, &facing) - 0.25).abs() < 1e-6);

        // Tilt the receiving surface by 60 degrees.
        let n = Vec3::new(0.75f32.sqrt(), -0.5, 0.0);
        let tilted = PathVertex::surface(
            HitRecord::sampled(Vec3::new(0.0, 2.0, 0.0), n, 1.0, &material),
            1,
            Spectrum::ONE,
        );
        assert!((from.convert_density(1.0, &tilted) - 0.125).abs() < 1e-6);

        // Off-surface receivers have no cosine.
        assert!((facing.convert_density(1.0, &from) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_light_root_throughput() {
        let material = Diffuse::new(Spectrum::ONE);
        let root = PathVertex::light(HitRecord::sampled(Vec3::ZERO, Vec3::Y, 0.25, &material), 0.125, false);
        assert_eq!(root.alpha, Spectrum::splat(8.0));
        assert!(!root.is_delta_light());

        let point = PathVertex::light(HitRecord::root(Vec3::ZERO), 1.0, true);
        assert!(point.is_delta_light());
        assert!(point.is_root());
    }

    #[test]
    fn test_path_keeps_insertion_order() {
        let mut path = Path::with_capacity(3);
        path.push(PathVertex::camera(HitRecord::root(Vec3::ZERO)));
        for i in 1..3 {
            path.push(PathVertex::surface(HitRecord::root(Vec3::splat(i as f32)), i, Spectrum::ONE));
        }
        assert_eq!(path.len(), 3);
        assert!(path[0].is_root());
        assert_eq!(path[0].kind, VertexKind::Camera);
        assert_eq!(path[2].position(), Vec3::splat(2.0));
        assert_eq!(path.last().map(|v| v.index), Some(2));
    }
}
