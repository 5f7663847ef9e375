//! Raster byte buffers <-> [`PixelGrid`].

use blurhash_core::PixelGrid;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::RasterError;

/// Converts between encoded raster bytes and RGB pixel grids.
pub trait RasterCodec: Send + Sync {
    /// Encode a grid into a lossless byte buffer.
    fn encode(&self, grid: &PixelGrid) -> Result<Vec<u8>, RasterError>;

    /// Decode raster bytes (as produced by a thumbnailer) into a grid.
    fn decode(&self, bytes: &[u8]) -> Result<PixelGrid, RasterError>;
}

/// PNG output; input in any format the `image` crate was built to read.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl RasterCodec for PngCodec {
    fn encode(&self, grid: &PixelGrid) -> Result<Vec<u8>, RasterError> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out).write_image(
            grid.as_bytes(),
            grid.width(),
            grid.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelGrid, RasterError> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        PixelGrid::new(width, height, rgb.into_raw()).map_err(|e| RasterError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blurhash_core::Rgb;

    #[test]
    fn test_png_signature() {
        let grid = PixelGrid::filled(3, 2, Rgb::new(1, 2, 3)).unwrap();
        let png = PngCodec.encode(&grid).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_png_is_lossless() {
        let grid = PixelGrid::from_rows(&[
            vec![[255, 0, 0], [0, 255, 0], [0, 0, 255]],
            vec![[10, 20, 30], [40, 50, 60], [70, 80, 90]],
        ])
        .unwrap();
        let png = PngCodec.encode(&grid).unwrap();
        assert_eq!(PngCodec.decode(&png).unwrap(), grid);
    }

    #[test]
    fn test_png_encoding_is_deterministic() {
        let grid = PixelGrid::filled(8, 8, Rgb::new(200, 100, 50)).unwrap();
        assert_eq!(PngCodec.encode(&grid).unwrap(), PngCodec.encode(&grid).unwrap());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(PngCodec.decode(b"definitely not an image").is_err());
    }
}
