use std::collections::BTreeSet;

use crate::core::params::{BandAssignment, VisualizationParams};
use crate::map::layer::RasterLayer;
use crate::raster::BoundingBox;

/// The map widget as seen by the raster engine.
pub trait MapSurface {
    /// Install `layer` under `name` and list it as an overlay choice.
    fn attach_layer(&mut self, name: &str, layer: RasterLayer);
    /// Remove the layer registered under `name` (and its overlay entry), handing it back
    /// to the caller for disposal.
    fn detach_layer(&mut self, name: &str) -> Option<RasterLayer>;
    /// The layer currently registered under `name`.
    fn layer(&self, name: &str) -> Option<&RasterLayer>;
    fn fit_bounds(&mut self, bounds: &BoundingBox);
    fn fly_to_bounds(&mut self, bounds: &BoundingBox);
    fn list_overlay_names(&self) -> BTreeSet<String>;
}

/// The raster control panel as seen by the engine.
pub trait ControlSurface {
    /// Replace the per-channel band choices; an empty slice clears them.
    fn set_band_choices(&mut self, labels: &[String]);
    fn show_assignment(&mut self, assignment: &BandAssignment);
    fn show_params(&mut self, params: &VisualizationParams);
    /// Enable or disable everything that needs a loaded raster (fly-to, band selects).
    fn set_raster_controls_enabled(&mut self, enabled: bool);
}

/// Labels offered for each channel: `Band 1` through `Band {count}`.
pub fn band_choice_labels(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Band {}", i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_one_based() {
        assert_eq!(band_choice_labels(3), vec!["Band 1", "Band 2", "Band 3"]);
        assert!(band_choice_labels(0).is_empty());
    }
}
