//! RGB spectrum helpers.

use lumen_math::Vec3;

/// RGB radiance/reflectance triple. Arithmetic comes from `Vec3`.
pub type Spectrum = Vec3;

/// Extra operations on [`Spectrum`] used by the integrators.
pub trait SpectrumExt {
    /// True if every component is zero.
    fn is_black(&self) -> bool;

    /// Rec. 709 luminance.
    fn luminance(&self) -> f32;

    /// Replace NaN and infinite components by zero.
    fn sanitized(self) -> Self;
}

impl SpectrumExt for Spectrum {
    #[inline]
    fn is_black(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    #[inline]
    fn luminance(&self) -> f32 {
        0.2126 * self.x + 0.7152 * self.y + 0.0722 * self.z
    }

    fn sanitized(self) -> Self {
        let fix = |c: f32| if c.is_finite() { c } else { 0.0 };
        Vec3::new(fix(self.x), fix(self.y), fix(self.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_is_black() {
        assert!(Spectrum::ZERO.is_black());
        assert!(!Spectrum::new(0.0, 1e-6, 0.0).is_black());
    }

    #[test]
    fn test_spectrum_sanitized() {
        let s = Spectrum::new(f32::NAN, f32::INFINITY, 0.5).sanitized();
        assert_eq!(s, Spectrum::new(0.0, 0.0, 0.5));
    }

    #[test]
    fn test_spectrum_luminance_white() {
        assert!((Spectrum::ONE.luminance() - 1.0).abs() < 1e-5);
    }
}
