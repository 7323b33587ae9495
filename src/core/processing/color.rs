use std::sync::Arc;

use crate::core::params::BandAssignment;
use crate::core::processing::stats::BandStats;
use crate::types::Rgb;

/// Color of one pixel from its per-band values, or `None` (transparent).
///
/// Each channel reads its assigned band, normalizes it into `[0, 1]` against that
/// band's statistics, scales by `255 * brightness` and clamps to `[0, 255]`. Channels
/// are independent and linear.
///
/// The pixel is transparent when any selected value is nodata or non-finite, when
/// `values` is too short for the assignment (e.g. an assignment left over from a
/// dataset with more bands), or when `stats` has no entry for a selected band.
#[inline]
pub fn color_for(
    values: &[Option<f64>],
    assignment: &BandAssignment,
    stats: &[BandStats],
    brightness: f64,
) -> Option<Rgb> {
    if values.len() <= assignment.max_index() {
        return None;
    }
    let r = channel_value(values, stats, assignment.red, brightness)?;
    let g = channel_value(values, stats, assignment.green, brightness)?;
    let b = channel_value(values, stats, assignment.blue, brightness)?;
    Some(Rgb::new(r, g, b))
}

#[inline]
fn channel_value(
    values: &[Option<f64>],
    stats: &[BandStats],
    band: usize,
    brightness: f64,
) -> Option<u8> {
    let value = values[band].filter(|v| v.is_finite())?;
    let scaled = stats.get(band)?.normalize(value) * 255.0 * brightness;
    // NaN (e.g. inf * 0) saturates to 0 in the cast.
    Some(scaled.clamp(0.0, 255.0).round() as u8)
}

/// Immutable inputs of the color mapping, captured once per layer rebuild so that a
/// render never observes parameters changing underneath it.
#[derive(Clone, Debug)]
pub struct ColorSnapshot {
    stats: Arc<[BandStats]>,
    assignment: BandAssignment,
    brightness: f64,
}

impl ColorSnapshot {
    pub fn new(stats: Arc<[BandStats]>, assignment: BandAssignment, brightness: f64) -> Self {
        Self {
            stats,
            assignment,
            brightness,
        }
    }

    #[inline]
    pub fn color_for(&self, values: &[Option<f64>]) -> Option<Rgb> {
        color_for(values, &self.assignment, &self.stats, self.brightness)
    }

    pub fn stats(&self) -> &[BandStats] {
        &self.stats
    }

    pub fn assignment(&self) -> BandAssignment {
        self.assignment
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }
}
