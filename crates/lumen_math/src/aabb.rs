use crate::{Axis, Interval, Ray, Vec3};

/// Axis-aligned bounding box used by the spatial accelerator.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// Boxes built through [`Aabb::from_points`] order each axis' endpoints, so
/// `min <= max` holds no matter which corners were passed in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self { x, y, z }
    }

    /// Create an AABB from two corner points given in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            x: Interval::ordered(a.x, b.x),
            y: Interval::ordered(a.y, b.y),
            z: Interval::ordered(a.z, b.z),
        }
    }

    /// Smallest box containing every point of the iterator.
    ///
    /// Returns [`Aabb::EMPTY`] for an empty iterator.
    pub fn from_iter_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        points
            .into_iter()
            .fold(Aabb::EMPTY, |acc, p| acc.union(&Aabb::from_points(p, p)))
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Enlarge this box so it also covers `other`.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::surrounding(self, other)
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Returns the center point of the bounding box.
    pub fn center(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    /// Get the interval for a specific axis.
    pub fn axis_interval(&self, axis: Axis) -> Interval {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    fn with_axis_interval(&self, axis: Axis, interval: Interval) -> Aabb {
        let mut out = *self;
        match axis {
            Axis::X => out.x = interval,
            Axis::Y => out.y = interval,
            Axis::Z => out.z = interval,
        }
        out
    }

    /// Cut the box at `coord` along `axis` into `(below, above)`.
    ///
    /// The coordinate is clamped into the box, so the two halves always
    /// reconstruct the original box.
    pub fn split(&self, axis: Axis, coord: f32) -> (Aabb, Aabb) {
        let extent = self.axis_interval(axis);
        let (lo, hi) = (extent.min, extent.max);
        let cut = coord.max(lo).min(hi);

        (
            self.with_axis_interval(axis, Interval::new(lo, cut)),
            self.with_axis_interval(axis, Interval::new(cut, hi)),
        )
    }

    /// Returns true if `p` lies inside or on the boundary of the box.
    pub fn contains(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Returns true if the two boxes share at least one point (touching counts).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.x.overlaps(&other.x) && self.y.overlaps(&other.y) && self.z.overlaps(&other.z)
    }

    /// Pad intervals to avoid zero-width boxes (flat primitives).
    pub fn padded(&self) -> Aabb {
        let delta = 0.0001;
        let pad = |i: Interval| {
            let i = Interval::ordered(i.min, i.max);
            if i.size() < delta {
                i.expand(delta)
            } else {
                i
            }
        };
        Aabb::new(pad(self.x), pad(self.y), pad(self.z))
    }

    /// Grow every axis by `delta` (half on each side).
    pub fn expanded(&self, delta: f32) -> Aabb {
        Aabb::new(self.x.expand(delta), self.y.expand(delta), self.z.expand(delta))
    }

    /// Ray/box slab test over `t >= 0`.
    ///
    /// Returns the entry and exit parameters of the ray, or `None` if the box is
    /// missed. Zero direction components divide to `±inf`; the resulting `NaN`
    /// slabs (ray origin exactly on a face) are ignored by `f32::max`/`f32::min`.
    pub fn slab(&self, ray: &Ray) -> Option<(f32, f32)> {
        let mut tmin = 0.0f32;
        let mut tmax = f32::INFINITY;

        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let interval = self.axis_interval(axis);
            let inv = 1.0 / axis.of(ray.direction);
            let origin = axis.of(ray.origin);

            let mut t0 = (interval.min - origin) * inv;
            let mut t1 = (interval.max - origin) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            tmin = tmin.max(t0);
            tmax = tmax.min(t1);
            if tmax < tmin {
                return None;
            }
        }

        Some((tmin, tmax))
    }

    /// Returns true if the box is empty on any axis.
    pub fn is_empty(&self) -> bool {
        self.x.min > self.x.max || self.y.min > self.y.max || self.z.min > self.z.max
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}
