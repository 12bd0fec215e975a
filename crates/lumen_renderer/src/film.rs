//! Film sinks: the final image buffer and the light-tracing splat buffer.

use crate::Spectrum;
use std::path::Path;

/// Sink for per-pixel samples.
pub trait Film {
    /// Add `value` to pixel `(x, y)`.
    fn add_sample(&mut self, x: u32, y: u32, value: Spectrum);

    fn width(&self) -> u32;

    fn height(&self) -> u32;
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Spectrum) -> [u8; 4] {
    let r = (255.0 * clamp_01(linear_to_gamma(color.x))) as u8;
    let g = (255.0 * clamp_01(linear_to_gamma(color.y))) as u8;
    let b = (255.0 * clamp_01(linear_to_gamma(color.z))) as u8;
    [r, g, b, 255]
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Spectrum>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Spectrum::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Spectrum {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Spectrum) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Add every pixel of `light` scaled by `weight`.
    pub fn add_light_image(&mut self, light: &LightImage, weight: f32) {
        for (pixel, splat) in self.pixels.iter_mut().zip(&light.pixels) {
            *pixel += *splat * weight;
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 4) as usize);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }

    /// Tonemapped 8-bit image, ready to be saved.
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(color_to_rgba(self.get(x, y)))
        })
    }

    /// Write the tonemapped image; the format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.to_image().save(path)
    }
}

impl Film for ImageBuffer {
    fn add_sample(&mut self, x: u32, y: u32, value: Spectrum) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] += value;
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Accumulation buffer for contributions splatted by light subpaths.
///
/// Each render worker owns one; they are merged once all work is done.
#[derive(Debug, Clone)]
pub struct LightImage {
    width: u32,
    height: u32,
    pixels: Vec<Spectrum>,
}

impl LightImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Spectrum::ZERO; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Spectrum {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Add another buffer of the same size into this one.
    pub fn merge(mut self, other: LightImage) -> LightImage {
        if self.pixels.len() != other.pixels.len() {
            log::warn!(
                "Ignoring light image of size {}x{} (expected {}x{})",
                other.width,
                other.height,
                self.width,
                self.height
            );
            return self;
        }
        for (a, b) in self.pixels.iter_mut().zip(other.pixels) {
            *a += b;
        }
        self
    }

    pub fn scale(&mut self, factor: f32) {
        for p in &mut self.pixels {
            *p *= factor;
        }
    }

    /// Sum over all pixels.
    pub fn total(&self) -> Spectrum {
        self.pixels.iter().copied().sum()
    }
}

impl Film for LightImage {
    /// Samples landing outside the image are dropped.
    fn add_sample(&mut self, x: u32, y: u32, value: Spectrum) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] += value;
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgba_clamps() {
        assert_eq!(color_to_rgba(Spectrum::new(4.0, -1.0, 0.25)), [255, 0, 127, 255]);
    }

    #[test]
    fn test_light_image_ignores_out_of_range() {
        let mut img = LightImage::new(4, 3);
        img.add_sample(4, 0, Spectrum::ONE);
        img.add_sample(0, 3, Spectrum::ONE);
        img.add_sample(1, 1, Spectrum::splat(2.0));

        assert_eq!(img.total(), Spectrum::splat(2.0));
    }

    #[test]
    fn test_light_image_merge_and_scale() {
        let mut a = LightImage::new(2, 2);
        let mut b = LightImage::new(2, 2);
        a.add_sample(0, 0, Spectrum::ONE);
        b.add_sample(0, 0, Spectrum::ONE);
        b.add_sample(1, 1, Spectrum::splat(4.0));

        let mut merged = a.merge(b);
        merged.scale(0.5);
        assert_eq!(merged.get(0, 0), Spectrum::ONE);
        assert_eq!(merged.get(1, 1), Spectrum::splat(2.0));
    }

    #[test]
    fn test_image_buffer_adds_light_image() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(0, 0, Spectrum::splat(0.5));
        let mut light = LightImage::new(2, 1);
        light.add_sample(0, 0, Spectrum::ONE);

        image.add_light_image(&light, 0.25);
        assert_eq!(image.get(0, 0), Spectrum::splat(0.75));
        assert_eq!(image.to_image().dimensions(), (2, 1));
    }
}
