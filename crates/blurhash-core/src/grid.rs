//! An immutable RGB pixel grid.

use crate::color::Rgb;
use crate::error::BlurhashError;

/// Row-major RGB pixels, 3 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Wrap a flat RGB buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BlurhashError::InvalidDimensions`] for a zero side and
    /// [`BlurhashError::InvalidArgument`] when `data.len() != width * height * 3`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BlurhashError> {
        let expected = buffer_len(width, height)?;
        if data.len() != expected {
            return Err(BlurhashError::InvalidArgument(format!(
                "pixel buffer length {} does not match {width}x{height}x3 = {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a grid from rows of RGB triples. Every row must have the same
    /// length.
    ///
    /// ```
    /// use blurhash_core::PixelGrid;
    /// let grid = PixelGrid::from_rows(&[vec![[255, 0, 0], [0, 255, 0]]]).unwrap();
    /// assert_eq!((grid.width(), grid.height()), (2, 1));
    /// ```
    pub fn from_rows(rows: &[Vec<[u8; 3]>]) -> Result<Self, BlurhashError> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|row| row.len() != width) {
            return Err(BlurhashError::InvalidArgument(format!(
                "ragged pixel rows: expected {width} pixels per row, found {}",
                bad.len()
            )));
        }
        let data = rows.iter().flatten().flatten().copied().collect();
        Self::new(to_u32(width)?, to_u32(rows.len())?, data)
    }

    /// A grid where every pixel has the same colour.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Result<Self, BlurhashError> {
        let len = buffer_len(width, height)?;
        let data = [color.r, color.g, color.b]
            .iter()
            .copied()
            .cycle()
            .take(len)
            .collect();
        Self::new(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The flat row-major RGB bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// The pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some(Rgb::new(
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
        ))
    }

    /// Iterate over rows as byte slices of `width * 3` bytes.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.width as usize * 3)
    }

    /// Iterate over all pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.data
            .chunks_exact(3)
            .map(|px| Rgb::new(px[0], px[1], px[2]))
    }
}

fn to_u32(value: usize) -> Result<u32, BlurhashError> {
    u32::try_from(value)
        .map_err(|_| BlurhashError::InvalidArgument(format!("dimension {value} exceeds u32")))
}

/// Cap on either side of an image handled by the codec, bounding CPU and
/// memory per call.
pub(crate) const MAX_DIMENSION: u32 = 10_000;

/// Like [`buffer_len`], but also rejects a side above [`MAX_DIMENSION`].
pub(crate) fn bounded_buffer_len(width: u32, height: u32) -> Result<usize, BlurhashError> {
    let len = buffer_len(width, height)?;
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(BlurhashError::InvalidDimensions {
            width,
            height,
            reason: "dimensions must be <= 10000",
        });
    }
    Ok(len)
}

/// `width * height * 3`, rejecting zero sides and overflow.
pub(crate) fn buffer_len(width: u32, height: u32) -> Result<usize, BlurhashError> {
    if width == 0 || height == 0 {
        return Err(BlurhashError::InvalidDimensions {
            width,
            height,
            reason: "width and height must be > 0",
        });
    }
    (width as u64)
        .checked_mul(height as u64)
        .and_then(|v| v.checked_mul(3))
        .and_then(|v| usize::try_from(v).ok())
        .ok_or(BlurhashError::InvalidDimensions {
            width,
            height,
            reason: "dimensions overflow buffer size calculation",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_length() {
        assert!(PixelGrid::new(2, 2, vec![0; 12]).is_ok());
        assert!(matches!(
            PixelGrid::new(2, 2, vec![0; 11]),
            Err(BlurhashError::InvalidArgument(_))
        ));
        assert!(matches!(
            PixelGrid::new(0, 2, vec![]),
            Err(BlurhashError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_from_rows() {
        let grid = PixelGrid::from_rows(&[
            vec![[1, 2, 3], [4, 5, 6]],
            vec![[7, 8, 9], [10, 11, 12]],
        ])
        .unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.pixel(1, 1), Some(Rgb::new(10, 11, 12)));
        assert_eq!(grid.pixel(2, 0), None);
        assert_eq!(grid.rows().count(), 2);
    }

    #[test]
    fn test_from_rows_rejects_ragged_and_empty() {
        assert!(PixelGrid::from_rows(&[vec![[0, 0, 0]], vec![]]).is_err());
        assert!(PixelGrid::from_rows(&[]).is_err());
    }

    #[test]
    fn test_filled() {
        let grid = PixelGrid::filled(3, 2, Rgb::new(9, 8, 7)).unwrap();
        assert_eq!(grid.as_bytes().len(), 18);
        assert!(grid.pixels().all(|px| px == Rgb::new(9, 8, 7)));
    }
}
