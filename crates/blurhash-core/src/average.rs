//! Average colour straight from the DC symbols, without reconstructing an
//! image.

use crate::color::Rgb;
use crate::decode_impl::{dc_color, validate};
use crate::error::BlurhashError;

/// Return the average colour stored in a hash.
///
/// The DC symbols already hold gamma-encoded bytes, so the packed value is
/// returned as-is.
///
/// # Errors
///
/// Any error from [`validate`](crate::validate), or a bad DC symbol.
///
/// ```
/// use blurhash_core::average_color;
/// assert_eq!(
///     average_color("LEHV6nWB2yk8pyo0adR*.7kCMdnj").unwrap().to_hex(),
///     "#979695"
/// );
/// ```
pub fn average_color(blurhash: &str) -> Result<Rgb, BlurhashError> {
    validate(blurhash)?;
    dc_color(blurhash)
}

/// Like [`average_color`] but formatted as `#rrggbb`, with `fallback`
/// returned for any hash that fails validation.
///
/// ```
/// use blurhash_core::average_color_or;
/// assert_eq!(average_color_or("bad", "#000000"), "#000000");
/// ```
pub fn average_color_or(blurhash: &str, fallback: &str) -> String {
    average_color(blurhash)
        .map(Rgb::to_hex)
        .unwrap_or_else(|_| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode_impl::encode;

    #[test]
    fn test_average_color_of_solid_image() {
        let pixels: Vec<u8> = [128u8, 64, 200].repeat(4 * 4);
        let hash = encode(&pixels, 4, 4, 3, 2).unwrap();
        assert_eq!(average_color(&hash).unwrap(), Rgb::new(128, 64, 200));
        assert_eq!(average_color_or(&hash, "#000000"), "#8040c8");
    }

    #[test]
    fn test_average_color_zero_padded() {
        let pixels: Vec<u8> = [0u8, 0, 15].repeat(2 * 2);
        let hash = encode(&pixels, 2, 2, 1, 1).unwrap();
        assert_eq!(average_color_or(&hash, ""), "#00000f");
    }

    #[test]
    fn test_average_color_fallbacks() {
        assert_eq!(average_color_or("bad", "#000000"), "#000000");
        assert_eq!(average_color_or("", "#ffffff"), "#ffffff");
        // Header declares 4x3 but only the DC is present.
        assert_eq!(average_color_or("L00000", "none"), "none");
        assert_eq!(average_color_or("00!000", "none"), "none");
    }

    #[test]
    fn test_average_color_errors() {
        assert!(matches!(
            average_color("L00000"),
            Err(BlurhashError::InvalidLength { .. })
        ));
    }
}
