use std::collections::{BTreeMap, BTreeSet};

use tracing::{trace, warn};

use crate::core::params::{BandAssignment, VisualizationParams};
use crate::map::layer::{LayerId, RasterLayer};
use crate::map::surface::{ControlSurface, MapSurface};
use crate::raster::BoundingBox;

/// Overlay entry for the vector annotation group, present on every map.
pub const VECTOR_OVERLAY_NAME: &str = "Drawn Features";

/// In-memory map surface. Keeps the attached layers and viewport and counts every
/// attach/detach so callers can audit layer lifecycles.
#[derive(Debug, Default)]
pub struct HeadlessMap {
    layers: BTreeMap<String, RasterLayer>,
    static_overlays: BTreeSet<String>,
    viewport: Option<BoundingBox>,
    attach_count: u64,
    detach_count: u64,
    overwritten: Vec<LayerId>,
}

impl HeadlessMap {
    /// A map with the vector overlay entry registered.
    pub fn new() -> Self {
        let mut map = Self::default();
        map.static_overlays.insert(VECTOR_OVERLAY_NAME.to_string());
        map
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn attach_count(&self) -> u64 {
        self.attach_count
    }

    pub fn detach_count(&self) -> u64 {
        self.detach_count
    }

    /// Layers that were replaced by an attach without being detached first.
    pub fn overwritten(&self) -> &[LayerId] {
        &self.overwritten
    }

    pub fn viewport(&self) -> Option<&BoundingBox> {
        self.viewport.as_ref()
    }
}

impl MapSurface for HeadlessMap {
    fn attach_layer(&mut self, name: &str, layer: RasterLayer) {
        trace!(overlay = name, id = %layer.id(), "attach");
        self.attach_count += 1;
        if let Some(previous) = self.layers.insert(name.to_string(), layer) {
            warn!(
                overlay = name,
                id = %previous.id(),
                "attach replaced a layer that was never detached"
            );
            self.overwritten.push(previous.id());
        }
    }

    fn detach_layer(&mut self, name: &str) -> Option<RasterLayer> {
        let layer = self.layers.remove(name)?;
        trace!(overlay = name, id = %layer.id(), "detach");
        self.detach_count += 1;
        Some(layer)
    }

    fn layer(&self, name: &str) -> Option<&RasterLayer> {
        self.layers.get(name)
    }

    fn fit_bounds(&mut self, bounds: &BoundingBox) {
        self.viewport = Some(*bounds);
    }

    fn fly_to_bounds(&mut self, bounds: &BoundingBox) {
        self.viewport = Some(*bounds);
    }

    fn list_overlay_names(&self) -> BTreeSet<String> {
        self.static_overlays
            .iter()
            .chain(self.layers.keys())
            .cloned()
            .collect()
    }
}

/// In-memory control panel recording what the engine presented.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessControls {
    pub band_labels: Vec<String>,
    pub assignment: BandAssignment,
    pub opacity_label: String,
    pub brightness_label: String,
    pub raster_controls_enabled: bool,
}

impl Default for HeadlessControls {
    fn default() -> Self {
        Self {
            band_labels: Vec::new(),
            assignment: BandAssignment::default(),
            opacity_label: "100%".to_string(),
            brightness_label: "100%".to_string(),
            raster_controls_enabled: false,
        }
    }
}

impl ControlSurface for HeadlessControls {
    fn set_band_choices(&mut self, labels: &[String]) {
        self.band_labels = labels.to_vec();
    }

    fn show_assignment(&mut self, assignment: &BandAssignment) {
        self.assignment = *assignment;
    }

    fn show_params(&mut self, params: &VisualizationParams) {
        self.opacity_label = format!("{}%", params.opacity_percent());
        self.brightness_label = format!("{}%", params.brightness_percent());
    }

    fn set_raster_controls_enabled(&mut self, enabled: bool) {
        self.raster_controls_enabled = enabled;
    }
}
