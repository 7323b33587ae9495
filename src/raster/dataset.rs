use ndarray::Array2;
use thiserror::Error;

use super::bounds::BoundingBox;

/// Structural problems that make a band stack unusable as a dataset.
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("Dataset has no bands")]
    NoBands,
    #[error("Band {band} has an empty grid")]
    EmptyGrid { band: usize },
    #[error("Band {band} shape mismatch: expected {expected:?}, got {found:?}")]
    ShapeMismatch {
        band: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Invalid bounding box: {0:?}")]
    InvalidBounds(BoundingBox),
}

/// A decoded multi-band raster. Immutable once constructed: every band shares the same
/// (rows, cols) shape and `None` marks nodata.
#[derive(Debug, Clone)]
pub struct RasterDataset {
    bands: Vec<Array2<Option<f64>>>,
    bounds: BoundingBox,
}

impl RasterDataset {
    pub fn new(bands: Vec<Array2<Option<f64>>>, bounds: BoundingBox) -> Result<Self, DatasetError> {
        let first = bands.first().ok_or(DatasetError::NoBands)?;
        let expected = first.dim();
        for (band, grid) in bands.iter().enumerate() {
            if grid.is_empty() {
                return Err(DatasetError::EmptyGrid { band });
            }
            if grid.dim() != expected {
                return Err(DatasetError::ShapeMismatch {
                    band,
                    expected,
                    found: grid.dim(),
                });
            }
        }
        if !bounds.is_valid() {
            return Err(DatasetError::InvalidBounds(bounds));
        }
        Ok(Self { bands, bounds })
    }

    /// Build from dense grids where `nodata` (if any) and non-finite samples mark missing data.
    pub fn from_dense(
        bands: Vec<Array2<f64>>,
        nodata: Option<f64>,
        bounds: BoundingBox,
    ) -> Result<Self, DatasetError> {
        let masked = bands
            .into_iter()
            .map(|grid| {
                grid.mapv(|v| {
                    if !v.is_finite() || nodata.is_some_and(|nd| v == nd) {
                        None
                    } else {
                        Some(v)
                    }
                })
            })
            .collect();
        Self::new(masked, bounds)
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// (rows, cols) shared by every band.
    pub fn dim(&self) -> (usize, usize) {
        self.bands[0].dim()
    }

    pub fn band(&self, index: usize) -> Option<&Array2<Option<f64>>> {
        self.bands.get(index)
    }

    pub fn bands(&self) -> &[Array2<Option<f64>>] {
        &self.bands
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Copy the per-band samples of one pixel into `buf` (one slot per band).
    #[inline]
    pub fn pixel_values_into(&self, row: usize, col: usize, buf: &mut [Option<f64>]) {
        for (slot, grid) in buf.iter_mut().zip(&self.bands) {
            *slot = grid.get((row, col)).copied().flatten();
        }
    }

    pub fn pixel_values(&self, row: usize, col: usize) -> Vec<Option<f64>> {
        let mut buf = vec![None; self.band_count()];
        self.pixel_values_into(row, col, &mut buf);
        buf
    }

    /// Grid cell containing a geographic point, or `None` outside the bounding box.
    pub fn locate(&self, lat: f64, lon: f64) -> Option<(usize, usize)> {
        if !self.bounds.contains(lat, lon) {
            return None;
        }
        let (rows, cols) = self.dim();
        let frac_row = fraction(self.bounds.north - lat, self.bounds.lat_span());
        let frac_col = fraction(lon - self.bounds.west, self.bounds.lon_span());
        let row = ((frac_row * rows as f64) as usize).min(rows - 1);
        let col = ((frac_col * cols as f64) as usize).min(cols - 1);
        Some((row, col))
    }
}

#[inline]
fn fraction(offset: f64, span: f64) -> f64 {
    if span > 0.0 { offset / span } else { 0.0 }
}
