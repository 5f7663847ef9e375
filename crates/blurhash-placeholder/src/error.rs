//! Error types for the placeholder pipeline.

use blurhash_core::BlurhashError;
use thiserror::Error;

/// A thumbnailer could not produce a sample raster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ThumbnailError(pub String);

/// Raster bytes could not be encoded or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RasterError(pub String);

/// The backing cache store failed. Never surfaced by the pipeline; cache
/// failures only degrade to recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CacheError(pub String);

impl From<image::ImageError> for ThumbnailError {
    fn from(err: image::ImageError) -> Self {
        ThumbnailError(err.to_string())
    }
}

impl From<image::ImageError> for RasterError {
    fn from(err: image::ImageError) -> Self {
        RasterError(err.to_string())
    }
}

/// Errors returned by [`Placeholder`](crate::Placeholder) operations.
///
/// `Clone` so a single failed computation can be handed to every caller
/// that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
    /// The hash or an argument was rejected by the codec.
    #[error(transparent)]
    Codec(#[from] BlurhashError),

    /// The thumbnailer failed to produce a sample.
    #[error("thumbnailer failed: {0}")]
    Thumbnail(#[from] ThumbnailError),

    /// The raster codec could not read the sample or write the placeholder.
    #[error("raster codec failed: {0}")]
    Raster(#[from] RasterError),

    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PlaceholderError {
    /// Returns `true` for failures of an external collaborator rather than
    /// of the input.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            PlaceholderError::Thumbnail(_) | PlaceholderError::Raster(_)
        )
    }
}
