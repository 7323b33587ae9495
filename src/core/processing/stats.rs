use ndarray::{Array2, s};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::raster::RasterDataset;
use crate::types::StatsStrategy;

/// Display bounds of one band. `min <= max` always holds; a band without any valid
/// sample gets `{0, 0}`.
#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct BandStats {
    pub min: f64,
    pub max: f64,
}

impl BandStats {
    pub const EMPTY: BandStats = BandStats { min: 0.0, max: 0.0 };

    /// Position of `value` within `[min, max]`, unclamped. Degenerate bounds map to 0.
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        if span.is_finite() {
            (value - self.min) / span
        } else {
            // Bounds near f64::MAX apart: halve every operand so the span stays finite.
            (value / 2.0 - self.min / 2.0) / (self.max / 2.0 - self.min / 2.0)
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }
}

fn check_stride(stride: usize) -> Result<()> {
    if stride == 0 {
        return Err(Error::InvalidArgument {
            arg: "stride",
            value: "0".to_string(),
        });
    }
    Ok(())
}

#[inline]
fn sampled(grid: &Array2<Option<f64>>, stride: usize) -> impl Iterator<Item = f64> + '_ {
    let step = stride as isize;
    grid.slice(s![..;step, ..;step])
        .into_iter()
        .filter_map(|&v| v.filter(|x| x.is_finite()))
}

/// Min/max over every `stride`-th row and column, nodata excluded.
pub fn compute(grid: &Array2<Option<f64>>, stride: usize) -> Result<BandStats> {
    check_stride(stride)?;
    Ok(min_max(grid, stride))
}

/// Like [`compute`], with a selectable bound strategy.
pub fn compute_with(
    grid: &Array2<Option<f64>>,
    stride: usize,
    strategy: StatsStrategy,
) -> Result<BandStats> {
    check_stride(stride)?;
    strategy.validate()?;
    Ok(band_bounds(grid, stride, strategy))
}

/// Statistics for every band of `dataset`, in band order. Bands are processed in
/// parallel; the call returns only once all of them are complete.
pub fn compute_all(
    dataset: &RasterDataset,
    stride: usize,
    strategy: StatsStrategy,
) -> Result<Vec<BandStats>> {
    check_stride(stride)?;
    strategy.validate()?;

    let stats: Vec<BandStats> = dataset
        .bands()
        .par_iter()
        .map(|grid| band_bounds(grid, stride, strategy))
        .collect();

    for (band, s) in stats.iter().enumerate() {
        debug!(band, min = s.min, max = s.max, "band statistics");
    }
    Ok(stats)
}

fn band_bounds(grid: &Array2<Option<f64>>, stride: usize, strategy: StatsStrategy) -> BandStats {
    match strategy {
        StatsStrategy::MinMax => min_max(grid, stride),
        StatsStrategy::Percentile { low, high } => percentile_bounds(grid, stride, low, high),
    }
}

fn min_max(grid: &Array2<Option<f64>>, stride: usize) -> BandStats {
    let mut count: usize = 0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in sampled(grid, stride) {
        count += 1;
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    if count == 0 {
        trace!("no valid samples; using empty statistics");
        return BandStats::EMPTY;
    }
    BandStats { min, max }
}

fn percentile_bounds(grid: &Array2<Option<f64>>, stride: usize, low: f64, high: f64) -> BandStats {
    let mut values: Vec<f64> = sampled(grid, stride).collect();
    if values.is_empty() {
        trace!("no valid samples; using empty statistics");
        return BandStats::EMPTY;
    }
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    BandStats {
        min: value_at(&values, low),
        max: value_at(&values, high),
    }
}

/// Element at `floor(p * n)`, clamped to the last index.
#[inline]
fn value_at(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let idx = ((p * n as f64).floor() as usize).min(n - 1);
    sorted[idx]
}
