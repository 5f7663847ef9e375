//! The end-to-end placeholder pipeline: sample, encode, decode, composite.

use std::borrow::Cow;

use blurhash_core::{average_color, decode_grid, encode_grid, plan, plan_components, validate};
use tracing::{debug, instrument, warn};

use crate::cache::{CacheStore, MemoryStore, Namespace, ResultCache};
use crate::config::PlaceholderConfig;
use crate::error::PlaceholderError;
use crate::raster::{PngCodec, RasterCodec};
use crate::svg;
use crate::thumbnail::{ImageHandle, SampleRequest, Thumbnailer};

/// Input for [`Placeholder::average_color`].
#[derive(Debug)]
pub enum ColorSource<'a, I: ?Sized> {
    /// An existing hash; only its header and DC symbols are read.
    Hash(&'a str),
    /// An image, encoded (or fetched from the encode cache) first.
    Image(&'a I),
}

// Manual impls: derives would require `I: Clone`.
impl<I: ?Sized> Clone for ColorSource<'_, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: ?Sized> Copy for ColorSource<'_, I> {}

/// Produces and caches BlurHash placeholders for host images.
///
/// All collaborators are injected: `T` samples source images, `S` persists
/// encode and decode results, `R` converts rasters.
pub struct Placeholder<T, S = MemoryStore, R = PngCodec> {
    thumbnailer: T,
    cache: ResultCache<S>,
    raster: R,
    config: PlaceholderConfig,
}

impl<T: Thumbnailer> Placeholder<T> {
    /// Default configuration, an in-memory store and PNG rasters.
    pub fn with_defaults(thumbnailer: T) -> Self {
        let config = PlaceholderConfig::default();
        Self {
            thumbnailer,
            cache: ResultCache::with_namespaces(
                MemoryStore::new(),
                config.cache_encode,
                config.cache_decode,
            ),
            raster: PngCodec,
            config,
        }
    }
}

impl<T, S, R> Placeholder<T, S, R>
where
    T: Thumbnailer,
    S: CacheStore,
    R: RasterCodec,
{
    /// # Errors
    ///
    /// Returns [`PlaceholderError::Config`] if `config` fails validation.
    pub fn new(
        thumbnailer: T,
        store: S,
        raster: R,
        config: PlaceholderConfig,
    ) -> Result<Self, PlaceholderError> {
        config.validate()?;
        let cache = ResultCache::with_namespaces(store, config.cache_encode, config.cache_decode);
        Ok(Self {
            thumbnailer,
            cache,
            raster,
            config,
        })
    }

    pub fn config(&self) -> &PlaceholderConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResultCache<S> {
        &self.cache
    }

    /// BlurHash of `image` at `ratio` (the image's native ratio if `None`).
    ///
    /// Served from the encode cache when possible; otherwise a sample raster
    /// is requested from the thumbnailer and encoded with a component grid
    /// planned from the components budget.
    #[instrument(level = "debug", skip_all, fields(identity = %image.identity()))]
    pub fn encode(&self, image: &T::Image, ratio: Option<f64>) -> Result<String, PlaceholderError> {
        let identity = image.identity();
        let ratio = ratio.unwrap_or_else(|| image.ratio());
        let entry = entry_key(&identity, ratio);

        let bytes = self.cache.get_or_compute(Namespace::Encode, &entry, || {
            Ok(self.compute_hash(image, ratio)?.into_bytes())
        })?;

        let hash = match String::from_utf8(bytes) {
            Ok(hash) if validate(&hash).is_ok() => hash,
            _ => {
                warn!(%ratio, "discarding malformed cached hash");
                let hash = self.compute_hash(image, ratio)?;
                self.cache.set(Namespace::Encode, &entry, hash.as_bytes());
                hash
            }
        };
        // After the entry write and on every hit: no stored entry may be
        // missing from its identity index.
        self.cache
            .index(Namespace::Encode, &index_key(&identity), &entry);
        Ok(hash)
    }

    /// PNG bytes of `hash` decoded at `width` x `height`, served from the
    /// decode cache when possible.
    #[instrument(level = "debug", skip(self))]
    pub fn decode(&self, hash: &str, width: u32, height: u32) -> Result<Vec<u8>, PlaceholderError> {
        validate(hash)?;
        let key = format!("{hash}|{width}|{height}");
        self.cache.get_or_compute(Namespace::Decode, &key, || {
            let grid = decode_grid(hash, width, height)?;
            Ok(self.raster.encode(&grid)?)
        })
    }

    /// Blurred placeholder URI for `image`.
    #[instrument(level = "debug", skip_all, fields(identity = %image.identity()))]
    pub fn blur(&self, image: &T::Image, ratio: Option<f64>) -> Result<String, PlaceholderError> {
        let ratio = ratio.unwrap_or_else(|| image.ratio());
        let hash = self.encode(image, Some(ratio))?;
        self.blur_hash(&hash, ratio)
    }

    /// Blurred placeholder URI for an existing hash, sized for `ratio`
    /// against the decode budget.
    pub fn blur_hash(&self, hash: &str, ratio: f64) -> Result<String, PlaceholderError> {
        let (width, height) = plan(self.config.decode_budget, ratio)?;
        debug!(width, height, "decode target");
        let png = self.decode(hash, width, height)?;
        Ok(self.uri(&png, width, height))
    }

    /// Wrap PNG bytes in the blurred SVG data URI. Never cached.
    pub fn uri(&self, png: &[u8], width: u32, height: u32) -> String {
        svg::uri(png, width, height)
    }

    /// `#rrggbb` average colour, or `fallback` when a supplied hash is
    /// malformed.
    ///
    /// # Errors
    ///
    /// Only the [`ColorSource::Image`] path can fail, when encoding fails.
    pub fn average_color(
        &self,
        source: ColorSource<'_, T::Image>,
        ratio: Option<f64>,
        fallback: &str,
    ) -> Result<String, PlaceholderError> {
        let hash = match source {
            ColorSource::Hash(hash) => Cow::Borrowed(hash),
            ColorSource::Image(image) => Cow::Owned(self.encode(image, ratio)?),
        };
        match average_color(&hash) {
            Ok(rgb) => Ok(rgb.to_hex()),
            Err(err) => {
                debug!(error = %err, "average colour falls back");
                Ok(fallback.to_string())
            }
        }
    }

    /// Drop every cached hash of the image with this identity. Hosts call
    /// this when an image is replaced or updated.
    ///
    /// Decoded rasters are keyed by hash, not identity, and stay valid.
    #[instrument(level = "debug", skip(self))]
    pub fn invalidate(&self, identity: &str) -> usize {
        self.cache
            .remove_indexed(Namespace::Encode, &index_key(identity))
    }

    fn compute_hash(&self, image: &T::Image, ratio: f64) -> Result<String, PlaceholderError> {
        let (width, height) = self.sample_size(ratio)?;
        let request = SampleRequest {
            width,
            height,
            crop: true,
            quality: self.config.sample_quality,
        };
        debug!(width, height, "requesting sample raster");
        let bytes = self.thumbnailer.sample(image, &request)?;
        let grid = self.raster.decode(&bytes)?;

        let (components_x, components_y) = plan_components(self.config.components_budget, ratio)?;
        debug!(
            components_x,
            components_y,
            sample_width = grid.width(),
            sample_height = grid.height(),
            "encoding sample"
        );
        Ok(encode_grid(&grid, components_x, components_y)?)
    }

    fn sample_size(&self, ratio: f64) -> Result<(u32, u32), PlaceholderError> {
        let (width, height) = plan(self.config.sample_budget, ratio)?;
        Ok(cap_side(width, height, self.config.max_sample_side))
    }
}

fn entry_key(identity: &str, ratio: f64) -> String {
    format!("hash|{identity}|{ratio}")
}

fn index_key(identity: &str) -> String {
    format!("index|{identity}")
}

/// Scale `(width, height)` down so neither side exceeds `max_side`.
fn cap_side(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side {
        return (width, height);
    }
    let scale = max_side as f64 / longest as f64;
    let fit = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_side);
    (fit(width), fit(height))
}
