//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::error::PlaceholderError;

/// Tunables for [`Placeholder`](crate::Placeholder).
///
/// Every field has a default, so a partial TOML table is enough:
///
/// ```
/// use blurhash_placeholder::PlaceholderConfig;
/// let config = PlaceholderConfig::from_toml_str("decode_budget = 64").unwrap();
/// assert_eq!(config.decode_budget, 64);
/// assert_eq!(config.components_budget, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    /// Pixel budget (`width * height`) of the sample raster fed to the encoder.
    pub sample_budget: u32,
    /// Upper bound for either side of the sample raster.
    pub max_sample_side: u32,
    /// Quality hint passed to the thumbnailer.
    pub sample_quality: u8,
    /// Budget for `components_x * components_y`.
    pub components_budget: u32,
    /// Pixel budget of the decoded placeholder raster.
    pub decode_budget: u32,
    /// Cache hashes per image identity and ratio.
    pub cache_encode: bool,
    /// Cache decoded PNG rasters per hash and size.
    pub cache_decode: bool,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            sample_budget: 100,
            max_sample_side: 400,
            sample_quality: 70,
            components_budget: 12,
            decode_budget: 100,
            cache_encode: true,
            cache_decode: true,
        }
    }
}

impl PlaceholderConfig {
    /// Parse a TOML document, filling missing keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceholderError::Config`] for malformed TOML or values
    /// rejected by [`validate`](Self::validate).
    pub fn from_toml_str(contents: &str) -> Result<Self, PlaceholderError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| PlaceholderError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject budgets and sides of zero and a quality above 100.
    pub fn validate(&self) -> Result<(), PlaceholderError> {
        let budgets = [
            ("sample_budget", self.sample_budget),
            ("max_sample_side", self.max_sample_side),
            ("components_budget", self.components_budget),
            ("decode_budget", self.decode_budget),
        ];
        if let Some((name, _)) = budgets.iter().find(|(_, value)| *value == 0) {
            return Err(PlaceholderError::Config(format!("{name} must be positive")));
        }
        if self.sample_quality > 100 {
            return Err(PlaceholderError::Config(format!(
                "sample_quality must be 0..=100, got {}",
                self.sample_quality
            )));
        }
        Ok(())
    }
}
