//! In-memory raster model: the decoded band stack (`RasterDataset`) and its
//! geographic extent (`BoundingBox`). Datasets are validated on construction and
//! never mutated afterwards.
pub mod bounds;
pub mod dataset;

pub use bounds::BoundingBox;
pub use dataset::{DatasetError, RasterDataset};
