//! # blurhash-placeholder
//!
//! Blurred image placeholders built on [`blurhash_core`].
//!
//! A [`Placeholder`] samples a source image through an injected
//! [`Thumbnailer`], encodes the sample into a BlurHash, decodes it back into
//! a tiny PNG and wraps that PNG in a blurred SVG `data:` URI that can be
//! dropped straight into an `<img src>`. Hashes and decoded rasters are kept
//! in an injected [`CacheStore`].
//!
//! ## Quick Start
//!
//! ```
//! use blurhash_placeholder::{ColorSource, Placeholder, ResizeThumbnailer, SourceImage};
//! use image::{DynamicImage, RgbImage};
//!
//! let image = SourceImage::new(
//!     "cover.jpg",
//!     DynamicImage::ImageRgb8(RgbImage::from_pixel(60, 40, image::Rgb([30, 90, 200]))),
//! );
//! let placeholder = Placeholder::with_defaults(ResizeThumbnailer::default());
//!
//! let uri = placeholder.blur(&image, None).unwrap();
//! assert!(uri.starts_with("data:image/svg+xml;charset=utf-8,"));
//!
//! let color = placeholder
//!     .average_color(ColorSource::Hash("not a hash"), None, "#000000")
//!     .unwrap();
//! assert_eq!(color, "#000000");
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod raster;
pub mod svg;
pub mod thumbnail;

mod pipeline;

pub use cache::{CacheStore, MemoryStore, Namespace, ResultCache};
pub use config::PlaceholderConfig;
pub use error::{CacheError, PlaceholderError, RasterError, ThumbnailError};
pub use pipeline::{ColorSource, Placeholder};
pub use raster::{PngCodec, RasterCodec};
pub use thumbnail::{ImageHandle, ResizeThumbnailer, SampleRequest, SourceImage, Thumbnailer};
