//! Source images and the thumbnailer that samples them.

use std::borrow::Cow;
use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::error::ThumbnailError;

/// Host-side handle to a source image.
pub trait ImageHandle {
    /// Stable identity used for cache keys. Must change whenever the image
    /// content changes, or the host must call
    /// [`Placeholder::invalidate`](crate::Placeholder::invalidate).
    fn identity(&self) -> Cow<'_, str>;

    /// Native `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Native aspect ratio, `width / height`.
    fn ratio(&self) -> f64 {
        let (width, height) = self.dimensions();
        width as f64 / height as f64
    }
}

/// Parameters for one sample raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRequest {
    pub width: u32,
    pub height: u32,
    /// Crop to fill the requested box instead of letterboxing.
    pub crop: bool,
    /// Lossy quality hint (0..=100); ignored by lossless thumbnailers.
    pub quality: u8,
}

/// Produces a downscaled raster of a source image.
pub trait Thumbnailer: Send + Sync {
    type Image: ImageHandle + ?Sized;

    /// Return encoded raster bytes of roughly `request.width` x
    /// `request.height` pixels.
    fn sample(&self, image: &Self::Image, request: &SampleRequest)
        -> Result<Vec<u8>, ThumbnailError>;
}

impl<T: Thumbnailer + ?Sized> Thumbnailer for Arc<T> {
    type Image = T::Image;

    fn sample(&self, image: &Self::Image, request: &SampleRequest) -> Result<Vec<u8>, ThumbnailError> {
        (**self).sample(image, request)
    }
}

/// An in-memory image with a host-assigned identity.
#[derive(Debug, Clone)]
pub struct SourceImage {
    identity: String,
    image: DynamicImage,
}

impl SourceImage {
    pub fn new(identity: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            identity: identity.into(),
            image,
        }
    }

    /// Decode encoded image bytes.
    pub fn from_bytes(identity: impl Into<String>, bytes: &[u8]) -> Result<Self, ThumbnailError> {
        Ok(Self::new(identity, image::load_from_memory(bytes)?))
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

impl ImageHandle for SourceImage {
    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.identity)
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Resizes a [`SourceImage`] with the `image` crate and returns PNG bytes.
#[derive(Debug, Clone, Copy)]
pub struct ResizeThumbnailer {
    filter: FilterType,
}

impl ResizeThumbnailer {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl Default for ResizeThumbnailer {
    fn default() -> Self {
        Self::new(FilterType::Triangle)
    }
}

impl Thumbnailer for ResizeThumbnailer {
    type Image = SourceImage;

    fn sample(
        &self,
        image: &SourceImage,
        request: &SampleRequest,
    ) -> Result<Vec<u8>, ThumbnailError> {
        if request.width == 0 || request.height == 0 {
            return Err(ThumbnailError(format!(
                "cannot sample to {}x{}",
                request.width, request.height
            )));
        }
        let resized = if request.crop {
            image
                .image
                .resize_to_fill(request.width, request.height, self.filter)
        } else {
            image
                .image
                .resize_exact(request.width, request.height, self.filter)
        };

        let mut out = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(resized.to_rgb8()).write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn checkerboard(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        }))
    }

    #[test]
    fn test_source_image_handle() {
        let source = SourceImage::new("photo-1", checkerboard(300, 200));
        assert_eq!(source.identity(), "photo-1");
        assert_eq!(source.dimensions(), (300, 200));
        assert!((source.ratio() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_sample_respects_requested_size() {
        let source = SourceImage::new("photo-1", checkerboard(300, 200));
        let request = SampleRequest {
            width: 13,
            height: 8,
            crop: true,
            quality: 70,
        };
        let bytes = ResizeThumbnailer::default().sample(&source, &request).unwrap();
        let sampled = image::load_from_memory(&bytes).unwrap();
        assert_eq!((sampled.width(), sampled.height()), (13, 8));
    }

    #[test]
    fn test_sample_rejects_empty_request() {
        let source = SourceImage::new("photo-1", checkerboard(4, 4));
        let request = SampleRequest {
            width: 0,
            height: 8,
            crop: true,
            quality: 70,
        };
        assert!(ResizeThumbnailer::default().sample(&source, &request).is_err());
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(SourceImage::from_bytes("x", b"nope").is_err());
    }
}
