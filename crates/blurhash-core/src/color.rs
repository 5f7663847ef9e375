//! Colour conversion between gamma-encoded bytes and linear light.
//!
//! The codec uses a plain 2.2 power curve in both directions. All math is
//! done in `f64` and rounding is half away from zero, so decoded output is
//! bit-stable across runs and platforms.

use once_cell::sync::Lazy;

/// Gamma exponent applied when converting bytes to linear light.
pub const GAMMA: f64 = 2.2;

/// Byte -> linear table; every encode touches each pixel three times.
static SRGB_TO_LINEAR_LUT: Lazy<[f64; 256]> = Lazy::new(|| {
    let mut lut = [0.0f64; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = (i as f64 / 255.0).powf(GAMMA);
    }
    lut
});

/// Convert a gamma-encoded byte (0..=255) to linear light (0.0..=1.0).
///
/// # Examples
///
/// ```
/// use blurhash_core::color::srgb_to_linear;
/// assert_eq!(srgb_to_linear(0), 0.0);
/// assert_eq!(srgb_to_linear(255), 1.0);
/// ```
#[inline]
pub fn srgb_to_linear(value: u8) -> f64 {
    SRGB_TO_LINEAR_LUT[value as usize]
}

/// Convert a linear value to a gamma-encoded byte.
///
/// Values outside \[0.0, 1.0\] (and NaN) are clamped before the power curve
/// is applied; the result is rounded half away from zero.
///
/// # Examples
///
/// ```
/// use blurhash_core::color::linear_to_srgb;
/// assert_eq!(linear_to_srgb(0.0), 0);
/// assert_eq!(linear_to_srgb(1.0), 255);
/// assert_eq!(linear_to_srgb(-3.0), 0);
/// ```
#[inline]
pub fn linear_to_srgb(value: f64) -> u8 {
    let clamped = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    };
    (255.0 * clamped.powf(1.0 / GAMMA)).round().clamp(0.0, 255.0) as u8
}

/// Compute `sign(value) * |value|^exp`.
///
/// # Examples
///
/// ```
/// use blurhash_core::color::sign_pow;
/// assert!((sign_pow(4.0, 0.5) - 2.0).abs() < 1e-10);
/// assert!((sign_pow(-4.0, 0.5) - (-2.0)).abs() < 1e-10);
/// ```
#[inline]
pub fn sign_pow(value: f64, exp: f64) -> f64 {
    value.abs().powf(exp).copysign(value)
}

/// An 8-bit RGB colour, as packed into the DC symbols of a hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Split a 24-bit `0xRRGGBB` integer into channels.
    pub const fn from_packed(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }

    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Lowercase `#rrggbb`.
    ///
    /// ```
    /// use blurhash_core::Rgb;
    /// assert_eq!(Rgb::new(0, 10, 255).to_hex(), "#000aff");
    /// ```
    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.packed())
    }

    pub(crate) fn to_linear(self) -> [f64; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }

    pub(crate) fn from_linear(linear: [f64; 3]) -> Self {
        Self {
            r: linear_to_srgb(linear[0]),
            g: linear_to_srgb(linear[1]),
            b: linear_to_srgb(linear[2]),
        }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.packed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_to_linear_boundary() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert_eq!(srgb_to_linear(255), 1.0);
    }

    #[test]
    fn test_srgb_to_linear_known_values() {
        // (128/255)^2.2
        let val = srgb_to_linear(128);
        assert!((val - 0.219_519_7).abs() < 1e-6, "got {val}");
    }

    #[test]
    fn test_linear_to_srgb_clamp() {
        assert_eq!(linear_to_srgb(-0.5), 0);
        assert_eq!(linear_to_srgb(1.5), 255);
        assert_eq!(linear_to_srgb(f64::NAN), 0);
    }

    #[test]
    fn test_roundtrip_is_exact() {
        for i in 0..=255u8 {
            assert_eq!(linear_to_srgb(srgb_to_linear(i)), i, "roundtrip failed for {i}");
        }
    }

    #[test]
    fn test_srgb_to_linear_monotonic() {
        let mut prev = srgb_to_linear(0);
        for i in 1..=255u8 {
            let curr = srgb_to_linear(i);
            assert!(curr > prev, "not monotonic at {i}: {prev} >= {curr}");
            prev = curr;
        }
    }

    #[test]
    fn test_sign_pow() {
        assert!((sign_pow(9.0, 0.5) - 3.0).abs() < 1e-10);
        assert!((sign_pow(-9.0, 0.5) - (-3.0)).abs() < 1e-10);
        assert_eq!(sign_pow(0.0, 2.0), 0.0);
    }

    #[test]
    fn test_rgb_packing() {
        let rgb = Rgb::new(128, 64, 200);
        assert_eq!(rgb.packed(), 0x8040c8);
        assert_eq!(Rgb::from_packed(0x8040c8), rgb);
        assert_eq!(rgb.to_hex(), "#8040c8");
        assert_eq!(rgb.to_string(), "#8040c8");
    }
}
