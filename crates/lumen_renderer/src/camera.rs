//! Pinhole camera for ray generation and light-path splatting.

use lumen_math::{Ray, Vec3};

/// Pinhole camera with the image plane at unit distance.
#[derive(Debug, Clone)]
pub struct PinholeCamera {
    pub image_width: u32,
    pub image_height: u32,

    // Camera basis: `w` points backwards, away from the view direction
    center: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,

    // Half extents of the image plane at unit distance
    half_width: f32,
    half_height: f32,
}

impl PinholeCamera {
    /// Create a camera at `look_from` looking at `look_at`.
    ///
    /// `vfov` is the vertical field of view in degrees.
    pub fn new(look_from: Vec3, look_at: Vec3, vup: Vec3, vfov: f32, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let w = (look_from - look_at).normalize_or_zero();
        let mut u = vup.cross(w).normalize_or_zero();
        if u == Vec3::ZERO {
            // View direction parallel to up
            u = Vec3::X.cross(w).normalize_or_zero();
        }
        let v = w.cross(u);

        let half_height = (vfov.to_radians() / 2.0).tan();
        let half_width = half_height * (width as f32 / height as f32);

        Self {
            image_width: width,
            image_height: height,
            center: look_from,
            u,
            v,
            w,
            half_width,
            half_height,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.center
    }

    /// Unit viewing direction.
    pub fn forward(&self) -> Vec3 {
        -self.w
    }

    /// Area of the image plane at unit distance from the pinhole.
    pub fn image_plane_area(&self) -> f32 {
        4.0 * self.half_width * self.half_height
    }

    /// Ray through pixel `(x, y)`, offset by `jitter` in `[0, 1)²` within
    /// the pixel. Pixel rows run top to bottom.
    pub fn generate_ray(&self, x: u32, y: u32, jitter: (f32, f32)) -> Ray {
        let px = (x as f32 + jitter.0) / self.image_width as f32;
        let py = (y as f32 + jitter.1) / self.image_height as f32;

        let sx = (2.0 * px - 1.0) * self.half_width;
        let sy = (1.0 - 2.0 * py) * self.half_height;

        let direction = (sx * self.u + sy * self.v - self.w).normalize();
        Ray::new(self.center, direction)
    }

    /// Raster coordinates of `point`, or `None` if it is behind the camera
    /// or projects outside the image.
    pub fn project(&self, point: Vec3) -> Option<(f32, f32)> {
        let d = point - self.center;
        let depth = -d.dot(self.w);
        if depth <= 0.0 {
            return None;
        }

        let sx = d.dot(self.u) / depth;
        let sy = d.dot(self.v) / depth;
        let px = (sx / self.half_width + 1.0) * 0.5 * self.image_width as f32;
        let py = (1.0 - sy / self.half_height) * 0.5 * self.image_height as f32;

        let inside = px >= 0.0
            && px < self.image_width as f32
            && py >= 0.0
            && py < self.image_height as f32;
        inside.then_some((px, py))
    }

    /// Solid-angle density of primary rays along the unit `direction`:
    /// `1 / (A · cos³θ)`, zero behind the camera.
    pub fn pdf_direction(&self, direction: Vec3) -> f32 {
        let cos = direction.dot(self.forward());
        if cos <= 0.0 {
            return 0.0;
        }
        1.0 / (self.image_plane_area() * cos * cos * cos)
    }

    /// Importance emitted along the unit `direction`. Equal to the
    /// primary-ray density for a pinhole.
    pub fn importance(&self, direction: Vec3) -> f32 {
        self.pdf_direction(direction)
    }
}
