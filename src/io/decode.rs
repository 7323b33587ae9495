use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::raster::{BoundingBox, DatasetError, RasterDataset};

/// Errors raised while turning raw bytes into a `RasterDataset`
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed dataset document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Band {band} row {row} has {found} samples, expected {expected}")]
    RaggedRow {
        band: usize,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Invalid dataset: {0}")]
    Invalid(#[from] DatasetError),
}

/// Boundary to the external raster parser. Implementations own all knowledge of
/// file formats; the engine only consumes the decoded band stack.
pub trait RasterDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RasterDataset, DecodeError>;
}

impl<F> RasterDecoder for F
where
    F: Fn(&[u8]) -> Result<RasterDataset, DecodeError>,
{
    fn decode(&self, bytes: &[u8]) -> Result<RasterDataset, DecodeError> {
        self(bytes)
    }
}

/// Serialized form of an already-decoded dataset: nested `band -> row -> column`
/// samples with `null` for nodata, plus an optional nodata sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDocument {
    pub bounds: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodata: Option<f64>,
    pub bands: Vec<Vec<Vec<Option<f64>>>>,
}

impl DatasetDocument {
    pub fn from_dataset(dataset: &RasterDataset) -> Self {
        let bands = dataset
            .bands()
            .iter()
            .map(|grid| grid.rows().into_iter().map(|row| row.to_vec()).collect())
            .collect();
        Self {
            bounds: *dataset.bounds(),
            nodata: None,
            bands,
        }
    }

    pub fn into_dataset(self) -> Result<RasterDataset, DecodeError> {
        let nodata = self.nodata;
        let mut grids = Vec::with_capacity(self.bands.len());
        for (band, rows) in self.bands.into_iter().enumerate() {
            let height = rows.len();
            let width = rows.first().map_or(0, Vec::len);
            let mut flat = Vec::with_capacity(height * width);
            for (row, samples) in rows.into_iter().enumerate() {
                if samples.len() != width {
                    return Err(DecodeError::RaggedRow {
                        band,
                        row,
                        expected: width,
                        found: samples.len(),
                    });
                }
                flat.extend(samples.into_iter().map(|v| {
                    v.filter(|x| x.is_finite() && nodata.is_none_or(|nd| *x != nd))
                }));
            }
            let grid = Array2::from_shape_vec((height, width), flat)
                .map_err(|_| DatasetError::EmptyGrid { band })?;
            grids.push(grid);
        }
        Ok(RasterDataset::new(grids, self.bounds)?)
    }
}

/// Decoder for `DatasetDocument` JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDatasetDecoder;

impl RasterDecoder for JsonDatasetDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RasterDataset, DecodeError> {
        let doc: DatasetDocument = serde_json::from_slice(bytes)?;
        let dataset = doc.into_dataset()?;
        let (rows, cols) = dataset.dim();
        debug!(bands = dataset.band_count(), rows, cols, "decoded dataset document");
        Ok(dataset)
    }
}
