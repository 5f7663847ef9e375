//! BlurHash decoding: convert a BlurHash string back into an RGB image.
//!
//! The decoder parses the base83-encoded BlurHash string, extracts the
//! cosine coefficients, and reconstructs an image of the requested size.
//! Output is a pure function of `(hash, width, height, punch)`.

use std::f64::consts::PI;

use crate::base83;
use crate::color::{sign_pow, Rgb};
use crate::dimensions::MAX_COMPONENTS;
use crate::error::BlurhashError;
use crate::grid::{bounded_buffer_len, PixelGrid};

/// Shortest possible hash: header, max AC and four DC symbols.
const MIN_LENGTH: usize = 6;

/// Extract the number of X and Y components from a BlurHash header.
///
/// Only the header symbol is inspected; use [`validate`] to also check the
/// total length.
///
/// # Errors
///
/// Returns [`BlurhashError::InvalidLength`] if the BlurHash is too short
/// (< 6 characters) and [`BlurhashError::InvalidComponentCount`] if the
/// header implies more than 9 components on an axis.
///
/// # Examples
///
/// ```
/// use blurhash_core::components;
/// let (cx, cy) = components("LEHV6nWB2yk8pyo0adR*.7kCMdnj").unwrap();
/// assert_eq!((cx, cy), (4, 3));
/// ```
pub fn components(blurhash: &str) -> Result<(u32, u32), BlurhashError> {
    if let Some(ch) = blurhash.chars().find(|c| !c.is_ascii()) {
        return Err(BlurhashError::InvalidBase83Character(ch));
    }
    if blurhash.len() < MIN_LENGTH {
        return Err(BlurhashError::InvalidLength {
            expected: MIN_LENGTH,
            actual: blurhash.len(),
        });
    }
    let size_info = base83::decode(&blurhash[0..1])?;
    let size_y = (size_info / 9) + 1;
    let size_x = (size_info % 9) + 1;
    // Header symbols 81 and 82 would imply a tenth row of components.
    if size_y > MAX_COMPONENTS as u64 {
        return Err(BlurhashError::InvalidComponentCount {
            component: "y",
            value: size_y as u32,
        });
    }
    Ok((size_x as u32, size_y as u32))
}

/// Check that a hash is as long as its header says it should be and return
/// its component counts.
///
/// # Errors
///
/// Returns [`BlurhashError::InvalidLength`] when the string is shorter than
/// 6 characters or its length is not `4 + 2 * components_x * components_y`,
/// and [`BlurhashError::InvalidBase83Character`] for a bad header symbol.
///
/// ```
/// use blurhash_core::{validate, BlurhashError};
/// assert_eq!(validate("LEHV6nWB2yk8pyo0adR*.7kCMdnj").unwrap(), (4, 3));
/// assert_eq!(
///     validate("LEHV6nWB"),
///     Err(BlurhashError::InvalidLength { expected: 28, actual: 8 })
/// );
/// ```
pub fn validate(blurhash: &str) -> Result<(u32, u32), BlurhashError> {
    let (size_x, size_y) = components(blurhash)?;
    let expected = 4 + 2 * (size_x * size_y) as usize;
    if blurhash.len() != expected {
        return Err(BlurhashError::InvalidLength {
            expected,
            actual: blurhash.len(),
        });
    }
    Ok((size_x, size_y))
}

/// Decode a BlurHash string into a flat RGB byte array.
///
/// # Returns
///
/// A `Vec<u8>` of length `width * height * 3` containing RGB pixel data in
/// row-major order.
///
/// # Errors
///
/// Returns an error if the BlurHash string is invalid (wrong length or
/// invalid characters) or a requested side is zero or above 10000.
///
/// # Examples
///
/// ```
/// use blurhash_core::decode;
/// let pixels = decode("LEHV6nWB2yk8pyo0adR*.7kCMdnj", 32, 32).unwrap();
/// assert_eq!(pixels.len(), 32 * 32 * 3);
/// ```
pub fn decode(blurhash: &str, width: u32, height: u32) -> Result<Vec<u8>, BlurhashError> {
    decode_with_punch(blurhash, width, height, 1.0)
}

/// Decode a BlurHash string into a [`PixelGrid`].
pub fn decode_grid(blurhash: &str, width: u32, height: u32) -> Result<PixelGrid, BlurhashError> {
    PixelGrid::new(width, height, decode(blurhash, width, height)?)
}

/// Decode with a contrast factor applied to the AC terms.
///
/// `punch` multiplies the dequantized AC scale; `1.0` is a plain decode,
/// larger values exaggerate the colour variation.
///
/// # Errors
///
/// As [`decode`], plus [`BlurhashError::InvalidArgument`] for a negative or
/// non-finite `punch`.
pub fn decode_with_punch(
    blurhash: &str,
    width: u32,
    height: u32,
    punch: f64,
) -> Result<Vec<u8>, BlurhashError> {
    let (size_x, size_y) = validate(blurhash)?;
    let out_len = bounded_buffer_len(width, height)?;
    if !punch.is_finite() || punch < 0.0 {
        return Err(BlurhashError::InvalidArgument(format!(
            "punch must be a non-negative finite number, got {punch}"
        )));
    }

    let quant_max_value = base83::decode(&blurhash[1..2])?;
    let real_max_value = (quant_max_value as f64 + 1.0) / 166.0 * punch;

    let num_components = (size_x * size_y) as usize;
    let mut colours: Vec<[f64; 3]> = Vec::with_capacity(num_components);
    colours.push(dc_color(blurhash)?.to_linear());

    for component_idx in 1..num_components {
        let start = 4 + component_idx * 2;
        let ac_value = base83::decode(&blurhash[start..start + 2])?;

        let quant_r = (ac_value / (19 * 19)) as f64;
        let quant_g = ((ac_value / 19) % 19) as f64;
        let quant_b = (ac_value % 19) as f64;

        colours.push([
            sign_pow((quant_r - 9.0) / 9.0, 2.0) * real_max_value,
            sign_pow((quant_g - 9.0) / 9.0, 2.0) * real_max_value,
            sign_pow((quant_b - 9.0) / 9.0, 2.0) * real_max_value,
        ]);
    }

    let w = width as usize;
    let h = height as usize;
    let wf = width as f64;
    let hf = height as f64;

    let cos_x: Vec<Vec<f64>> = (0..size_x as usize)
        .map(|i| {
            (0..w)
                .map(|x| (PI * i as f64 * x as f64 / wf).cos())
                .collect()
        })
        .collect();
    let cos_y: Vec<Vec<f64>> = (0..size_y as usize)
        .map(|j| {
            (0..h)
                .map(|y| (PI * j as f64 * y as f64 / hf).cos())
                .collect()
        })
        .collect();

    let mut result = vec![0u8; out_len];

    for (y, row) in result.chunks_exact_mut(w * 3).enumerate() {
        for (x, out) in row.chunks_exact_mut(3).enumerate() {
            let mut pixel = [0.0f64; 3];

            for (j, cos_y_row) in cos_y.iter().enumerate() {
                let cy = cos_y_row[y];
                for (i, cos_x_row) in cos_x.iter().enumerate() {
                    let basis = cos_x_row[x] * cy;
                    let colour = &colours[i + j * size_x as usize];
                    pixel[0] += colour[0] * basis;
                    pixel[1] += colour[1] * basis;
                    pixel[2] += colour[2] * basis;
                }
            }

            let rgb = Rgb::from_linear(pixel);
            out.copy_from_slice(&[rgb.r, rgb.g, rgb.b]);
        }
    }

    Ok(result)
}

/// The packed DC symbols (positions 2..6) of an already length-checked hash.
pub(crate) fn dc_color(blurhash: &str) -> Result<Rgb, BlurhashError> {
    let value = base83::decode(&blurhash[2..6])?;
    // Four symbols can hold up to 83^4 - 1, which exceeds 24 bits.
    let packed = u32::try_from(value)
        .ok()
        .filter(|v| *v <= 0xff_ffff)
        .ok_or_else(|| {
            BlurhashError::InvalidArgument(format!("DC value {value} exceeds 24 bits"))
        })?;
    Ok(Rgb::from_packed(packed))
}
