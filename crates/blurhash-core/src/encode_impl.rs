//! BlurHash encoding: convert an RGB image into a compact BlurHash string.
//!
//! The encoder projects the image onto a small grid of cosine basis
//! functions and quantizes the resulting coefficients into a base83 string.

use std::f64::consts::PI;

use crate::base83;
use crate::color::{sign_pow, Rgb};
use crate::error::BlurhashError;
use crate::grid::{bounded_buffer_len, PixelGrid};

/// Encode an RGB image into a BlurHash string.
///
/// # Arguments
///
/// * `pixels` - Flat RGB byte array in row-major order (3 bytes per pixel).
/// * `width` - Image width in pixels.
/// * `height` - Image height in pixels.
/// * `components_x` - Number of horizontal components (1..=9).
/// * `components_y` - Number of vertical components (1..=9).
///
/// The resulting string is always `4 + 2 * components_x * components_y`
/// characters long.
///
/// # Errors
///
/// Returns an error if the component counts are out of range, a side is zero
/// or above 10000, or the pixel buffer length does not match
/// `width * height * 3`.
///
/// # Examples
///
/// ```
/// use blurhash_core::encode;
/// // A 2x2 red image
/// let pixels = [255, 0, 0, 255, 0, 0, 255, 0, 0, 255, 0, 0];
/// let hash = encode(&pixels, 2, 2, 4, 3).unwrap();
/// assert_eq!(hash.len(), 28);
/// ```
pub fn encode(
    pixels: &[u8],
    width: u32,
    height: u32,
    components_x: u32,
    components_y: u32,
) -> Result<String, BlurhashError> {
    let expected_len = bounded_buffer_len(width, height)?;
    check_component_count("x", components_x)?;
    check_component_count("y", components_y)?;

    if pixels.len() != expected_len {
        return Err(BlurhashError::InvalidArgument(format!(
            "pixel buffer length {} does not match {}x{}x3 = {}",
            pixels.len(),
            width,
            height,
            expected_len
        )));
    }

    let components = transform(pixels, width, height, components_x, components_y);
    pack(&components, components_x, components_y)
}

/// Encode a [`PixelGrid`]; see [`encode`].
///
/// ```
/// use blurhash_core::{encode_grid, PixelGrid, Rgb};
/// let grid = PixelGrid::filled(10, 10, Rgb::new(128, 64, 200)).unwrap();
/// assert_eq!(encode_grid(&grid, 1, 1).unwrap().len(), 6);
/// ```
pub fn encode_grid(
    grid: &PixelGrid,
    components_x: u32,
    components_y: u32,
) -> Result<String, BlurhashError> {
    encode(
        grid.as_bytes(),
        grid.width(),
        grid.height(),
        components_x,
        components_y,
    )
}

fn check_component_count(component: &'static str, value: u32) -> Result<(), BlurhashError> {
    if (1..=9).contains(&value) {
        Ok(())
    } else {
        Err(BlurhashError::InvalidComponentCount { component, value })
    }
}

/// Basis weight per axis: 1 for the constant term, 2 otherwise.
#[inline]
fn normalization(n: usize) -> f64 {
    if n == 0 {
        1.0
    } else {
        2.0
    }
}

/// Compute the `components_x * components_y` linear-light coefficients,
/// ordered with `i` (horizontal frequency) varying fastest.
fn transform(
    pixels: &[u8],
    width: u32,
    height: u32,
    components_x: u32,
    components_y: u32,
) -> Vec<[f64; 3]> {
    let w = width as usize;
    let h = height as usize;
    let wf = width as f64;
    let hf = height as f64;

    // cos_x[i][x] = cos(PI * i * x / width)
    let cos_x: Vec<Vec<f64>> = (0..components_x as usize)
        .map(|i| {
            (0..w)
                .map(|x| (PI * i as f64 * x as f64 / wf).cos())
                .collect()
        })
        .collect();
    // cos_y[j][y] = cos(PI * j * y / height)
    let cos_y: Vec<Vec<f64>> = (0..components_y as usize)
        .map(|j| {
            (0..h)
                .map(|y| (PI * j as f64 * y as f64 / hf).cos())
                .collect()
        })
        .collect();

    let linear_pixels: Vec<[f64; 3]> = pixels
        .chunks_exact(3)
        .map(|px| Rgb::new(px[0], px[1], px[2]).to_linear())
        .collect();

    let scale = 1.0 / (wf * hf);
    let mut components = Vec::with_capacity((components_x * components_y) as usize);

    for (j, cos_y_row) in cos_y.iter().enumerate() {
        for (i, cos_x_row) in cos_x.iter().enumerate() {
            let norm_factor = normalization(i) * normalization(j);
            let mut sum = [0.0f64; 3];

            for (y, &cos_y_val) in cos_y_row.iter().enumerate() {
                let row = &linear_pixels[y * w..(y + 1) * w];
                for (px, &cos_x_val) in row.iter().zip(cos_x_row) {
                    let basis = norm_factor * cos_x_val * cos_y_val;
                    sum[0] += basis * px[0];
                    sum[1] += basis * px[1];
                    sum[2] += basis * px[2];
                }
            }

            components.push([sum[0] * scale, sum[1] * scale, sum[2] * scale]);
        }
    }

    components
}

/// Quantize one AC channel into `0..=18`.
#[inline]
fn quantize_ac(value: f64, max_value: f64) -> u64 {
    (sign_pow(value / max_value, 0.5) * 9.0 + 9.5)
        .floor()
        .clamp(0.0, 18.0) as u64
}

/// Serialize coefficients into the BlurHash string.
fn pack(
    components: &[[f64; 3]],
    components_x: u32,
    components_y: u32,
) -> Result<String, BlurhashError> {
    let (dc, ac) = components
        .split_first()
        .ok_or_else(|| BlurhashError::InvalidArgument("no components to encode".to_string()))?;

    let max_ac_component = ac
        .iter()
        .flat_map(|c| c.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()))
        .clamp(0.0, 1.0);
    let quant_max_ac = (max_ac_component * 166.0 - 0.5)
        .floor()
        .clamp(0.0, 82.0) as u64;
    let ac_component_norm_factor = (quant_max_ac as f64 + 1.0) / 166.0;

    let size_flag = (components_x - 1) + (components_y - 1) * 9;
    let mut result = String::with_capacity(4 + 2 * components.len());

    result.push_str(&base83::encode(size_flag as u64, 1)?);
    result.push_str(&base83::encode(quant_max_ac, 1)?);
    result.push_str(&base83::encode(Rgb::from_linear(*dc).packed() as u64, 4)?);
    for component in ac {
        let quant_r = quantize_ac(component[0], ac_component_norm_factor);
        let quant_g = quantize_ac(component[1], ac_component_norm_factor);
        let quant_b = quantize_ac(component[2], ac_component_norm_factor);
        result.push_str(&base83::encode(quant_r * 19 * 19 + quant_g * 19 + quant_b, 2)?);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_size_flag() {
        let pixels = vec![0u8; 4 * 4 * 3];
        let hash = encode(&pixels, 4, 4, 4, 3).unwrap();
        // Size flag for 4x3: (4-1) + (3-1)*9 = 21
        assert_eq!(base83::decode(&hash[0..1]).unwrap(), 21);
    }

    #[test]
    fn test_quantize_ac_range() {
        assert_eq!(quantize_ac(0.0, 0.5), 9);
        assert_eq!(quantize_ac(0.5, 0.5), 18);
        assert_eq!(quantize_ac(-0.5, 0.5), 0);
        // Out-of-range values saturate.
        assert_eq!(quantize_ac(4.0, 0.5), 18);
        assert_eq!(quantize_ac(-4.0, 0.5), 0);
    }

    #[test]
    fn test_encode_max_ac_is_zero_without_ac_terms() {
        let pixels = vec![200u8; 6 * 6 * 3];
        let hash = encode(&pixels, 6, 6, 1, 1).unwrap();
        assert_eq!(hash.len(), 6);
        assert_eq!(&hash[1..2], "0");
    }

    #[test]
    fn test_encode_dc_is_gamma_roundtrip() {
        let pixels: Vec<u8> = [128u8, 64, 200].repeat(10 * 10);
        let hash = encode(&pixels, 10, 10, 1, 1).unwrap();
        assert_eq!(base83::decode(&hash[2..6]).unwrap(), 0x8040c8);
    }

    #[test]
    fn test_encode_component_count_validation() {
        let pixels = vec![0u8; 4 * 4 * 3];
        assert_eq!(
            encode(&pixels, 4, 4, 0, 3),
            Err(BlurhashError::InvalidComponentCount {
                component: "x",
                value: 0
            })
        );
        assert!(encode(&pixels, 4, 4, 10, 3).is_err());
        assert!(encode(&pixels, 4, 4, 4, 0).is_err());
        assert!(encode(&pixels, 4, 4, 4, 10).is_err());
    }

    #[test]
    fn test_encode_dimension_validation() {
        assert!(matches!(
            encode(&[], 0, 4, 1, 1),
            Err(BlurhashError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            encode(&[], 10_001, 1, 1, 1),
            Err(BlurhashError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_pixel_buffer_validation() {
        let pixels = vec![0u8; 10];
        assert!(matches!(
            encode(&pixels, 4, 4, 4, 3),
            Err(BlurhashError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_encode_horizontal_gradient_uses_x_terms() {
        let mut pixels = Vec::with_capacity(8 * 3);
        for x in 0..8u8 {
            pixels.extend_from_slice(&[x * 32, x * 32, x * 32]);
        }
        let hash = encode(&pixels, 8, 1, 4, 1).unwrap();
        assert_eq!(hash.len(), 10);
        assert_ne!(&hash[1..2], "0", "gradient should carry AC energy");
    }
}
