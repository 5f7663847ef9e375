//! Aspect-ratio aware sizing.
//!
//! Given a budget of "entities" (pixels or components) and an aspect ratio
//! (`width / height`), pick integer dimensions whose product is close to the
//! budget while keeping the ratio.

use crate::error::BlurhashError;

/// Largest component count per axis the format can represent.
pub const MAX_COMPONENTS: u32 = 9;

/// Plan `(width, height)` so that `width * height` is roughly `budget`.
///
/// `height = round(sqrt(budget / ratio))` and `width = round(budget / height)`,
/// both rounded half away from zero and never below 1.
///
/// # Errors
///
/// Returns [`BlurhashError::InvalidArgument`] if `budget` is zero or `ratio`
/// is not a finite positive number.
///
/// # Examples
///
/// ```
/// use blurhash_core::plan;
/// assert_eq!(plan(100, 1.5).unwrap(), (13, 8));
/// assert_eq!(plan(100, 1.0).unwrap(), (10, 10));
/// ```
pub fn plan(budget: u32, ratio: f64) -> Result<(u32, u32), BlurhashError> {
    if budget == 0 {
        return Err(BlurhashError::InvalidArgument(
            "budget must be positive".to_string(),
        ));
    }
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(BlurhashError::InvalidArgument(format!(
            "aspect ratio must be a positive finite number, got {ratio}"
        )));
    }

    let budget = budget as f64;
    let height = (budget / ratio).sqrt().round().clamp(1.0, u32::MAX as f64);
    let width = (budget / height).round().clamp(1.0, u32::MAX as f64);
    Ok((width as u32, height as u32))
}

/// Plan component counts for a hash against a components budget, each axis
/// clamped to `1..=9`.
///
/// ```
/// use blurhash_core::plan_components;
/// assert_eq!(plan_components(12, 1.0).unwrap(), (4, 3));
/// assert_eq!(plan_components(12, 4.0).unwrap(), (6, 2));
/// assert_eq!(plan_components(500, 1.0).unwrap(), (9, 9));
/// ```
pub fn plan_components(budget: u32, ratio: f64) -> Result<(u32, u32), BlurhashError> {
    let (x, y) = plan(budget, ratio)?;
    Ok((x.clamp(1, MAX_COMPONENTS), y.clamp(1, MAX_COMPONENTS)))
}
