use std::sync::Arc;

use crate::core::processing::color::ColorSnapshot;
use crate::core::processing::render::{RgbaImage, render_native, render_window};
use crate::raster::{BoundingBox, RasterDataset};
use crate::types::Rgb;

/// Identity of one built layer. Every rebuild gets a fresh id.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// A renderable raster layer: the dataset plus the color snapshot and opacity it was
/// built with. Layers are never edited; a parameter change builds a new one.
#[derive(Clone, Debug)]
pub struct RasterLayer {
    id: LayerId,
    dataset: Arc<RasterDataset>,
    snapshot: ColorSnapshot,
    opacity: f64,
    resolution: usize,
}

impl RasterLayer {
    pub fn new(
        id: LayerId,
        dataset: Arc<RasterDataset>,
        snapshot: ColorSnapshot,
        opacity: f64,
        resolution: usize,
    ) -> Self {
        Self {
            id,
            dataset,
            snapshot,
            opacity,
            resolution,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Tile edge length in pixels
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn snapshot(&self) -> &ColorSnapshot {
        &self.snapshot
    }

    pub fn dataset(&self) -> &Arc<RasterDataset> {
        &self.dataset
    }

    pub fn bounds(&self) -> &BoundingBox {
        self.dataset.bounds()
    }

    /// Color of a single dataset cell; `None` is transparent or out of range.
    pub fn pixel_color(&self, row: usize, col: usize) -> Option<Rgb> {
        let (rows, cols) = self.dataset.dim();
        if row >= rows || col >= cols {
            return None;
        }
        self.snapshot.color_for(&self.dataset.pixel_values(row, col))
    }

    /// Render a map tile covering `tile` at the layer's resolution.
    pub fn render_tile(&self, tile: &BoundingBox) -> RgbaImage {
        self.render_window(tile, self.resolution, self.resolution)
    }

    pub fn render_window(&self, window: &BoundingBox, width: usize, height: usize) -> RgbaImage {
        render_window(&self.dataset, &self.snapshot, self.opacity, window, width, height)
    }

    /// Render the whole raster at native size.
    pub fn render_rgba(&self) -> RgbaImage {
        render_native(&self.dataset, &self.snapshot, self.opacity)
    }
}
