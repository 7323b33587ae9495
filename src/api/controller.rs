use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::core::params::{BandAssignment, OverlayConfig, VisualizationParams};
use crate::core::processing::color::ColorSnapshot;
use crate::core::processing::stats::{BandStats, compute_all};
use crate::error::{Error, Result};
use crate::io::{DecodeError, RasterDecoder};
use crate::map::{ControlSurface, LayerId, MapSurface, RasterLayer, band_choice_labels};
use crate::raster::{BoundingBox, RasterDataset};
use crate::types::{Channel, LayerState};

/// Token issued when a load starts. Its completion is applied only while the token's
/// epoch is still the controller's current epoch.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LoadTicket {
    epoch: u64,
}

impl LoadTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    /// The dataset was installed and is displayed. `warning` carries a non-fatal
    /// `UnsupportedFormat` for rasters with fewer than three bands.
    Applied {
        band_count: usize,
        warning: Option<Error>,
    },
    /// A newer load or a removal superseded this one; nothing changed.
    Stale { ticket_epoch: u64, current_epoch: u64 },
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied { .. })
    }
}

/// The currently attached raster layer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RasterLayerHandle {
    pub id: LayerId,
    pub name: String,
}

/// Dataset and statistics are created together and replaced together.
#[derive(Debug)]
struct LoadedRaster {
    dataset: Arc<RasterDataset>,
    stats: Arc<[BandStats]>,
}

/// Owns the raster overlay: the loaded dataset, its statistics, the visualization
/// parameters and the single layer attached to the map.
///
/// States move `Empty -> Loaded -> Displaying`; every parameter or band change while
/// displaying rebuilds the layer from scratch, and `remove` returns to `Empty`.
pub struct RasterLayerController<M, C> {
    config: OverlayConfig,
    map: M,
    controls: C,
    raster: Option<LoadedRaster>,
    assignment: BandAssignment,
    params: VisualizationParams,
    handle: Option<RasterLayerHandle>,
    state: LayerState,
    epoch: u64,
    next_layer_id: u64,
    rebuilds: u64,
}

impl<M: MapSurface, C: ControlSurface> RasterLayerController<M, C> {
    pub fn new(map: M, controls: C, config: OverlayConfig) -> Result<Self> {
        config.validate()?;
        let mut controller = Self {
            config,
            map,
            controls,
            raster: None,
            assignment: BandAssignment::default(),
            params: VisualizationParams::default(),
            handle: None,
            state: LayerState::Empty,
            epoch: 0,
            next_layer_id: 0,
            rebuilds: 0,
        };
        controller.publish_empty_controls();
        Ok(controller)
    }

    pub fn state(&self) -> LayerState {
        self.state
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn assignment(&self) -> BandAssignment {
        self.assignment
    }

    pub fn params(&self) -> VisualizationParams {
        self.params
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of layers built since construction.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn handle(&self) -> Option<&RasterLayerHandle> {
        self.handle.as_ref()
    }

    pub fn dataset(&self) -> Option<&Arc<RasterDataset>> {
        self.raster.as_ref().map(|r| &r.dataset)
    }

    pub fn band_count(&self) -> Option<usize> {
        self.dataset().map(|d| d.band_count())
    }

    pub fn stats(&self) -> Option<&[BandStats]> {
        self.raster.as_ref().map(|r| &r.stats[..])
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn controls(&self) -> &C {
        &self.controls
    }

    /// The layer currently attached to the map, if any.
    pub fn current_layer(&self) -> Option<&RasterLayer> {
        let handle = self.handle.as_ref()?;
        self.map.layer(&handle.name)
    }

    pub fn into_parts(self) -> (M, C) {
        (self.map, self.controls)
    }

    /// Start an asynchronous load. Any load begun earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.epoch += 1;
        debug!(epoch = self.epoch, "load started");
        LoadTicket { epoch: self.epoch }
    }

    /// Finish the load identified by `ticket` with the decoder's result.
    ///
    /// Stale tickets are discarded without touching state. Decode failures are
    /// returned and leave the current raster (if any) on display.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        decoded: std::result::Result<RasterDataset, DecodeError>,
    ) -> Result<LoadOutcome> {
        if ticket.epoch != self.epoch {
            info!(
                ticket = ticket.epoch,
                current = self.epoch,
                "discarding superseded load"
            );
            return Ok(LoadOutcome::Stale {
                ticket_epoch: ticket.epoch,
                current_epoch: self.epoch,
            });
        }
        let dataset = decoded.map_err(|e| {
            warn!("raster decode failed: {}", e);
            Error::from(e)
        })?;
        self.install(dataset)
    }

    /// Load an already-decoded dataset synchronously.
    pub fn load(&mut self, dataset: RasterDataset) -> Result<LoadOutcome> {
        let ticket = self.begin_load();
        self.complete_load(ticket, Ok(dataset))
    }

    /// Decode `bytes` with `decoder` and load the result.
    pub fn load_bytes<D: RasterDecoder + ?Sized>(
        &mut self,
        decoder: &D,
        bytes: &[u8],
    ) -> Result<LoadOutcome> {
        let ticket = self.begin_load();
        let decoded = decoder.decode(bytes);
        self.complete_load(ticket, decoded)
    }

    fn install(&mut self, dataset: RasterDataset) -> Result<LoadOutcome> {
        // Statistics are complete before any state is replaced or any pixel colored.
        let stats = compute_all(&dataset, self.config.sample_stride, self.config.stats)?;
        let band_count = dataset.band_count();
        let bounds = *dataset.bounds();

        let warning = if band_count < 3 {
            let reason = format!(
                "raster has {} band(s); channels without a band fall back to band 1",
                band_count
            );
            warn!("{}", reason);
            Some(Error::UnsupportedFormat { reason })
        } else {
            None
        };

        self.dispose_layer();
        self.raster = Some(LoadedRaster {
            dataset: Arc::new(dataset),
            stats: stats.into(),
        });
        self.assignment = BandAssignment::clamped_default(band_count);
        self.params = VisualizationParams::default();
        self.state = LayerState::Loaded;
        info!(band_count, epoch = self.epoch, "raster loaded");

        self.controls.set_band_choices(&band_choice_labels(band_count));
        self.controls.show_assignment(&self.assignment);
        self.controls.show_params(&self.params);

        self.display()?;
        self.map.fit_bounds(&bounds);
        self.controls.set_raster_controls_enabled(true);

        Ok(LoadOutcome::Applied {
            band_count,
            warning,
        })
    }

    /// Replace the attached layer with one built from the current statistics,
    /// assignment and parameters.
    pub fn display(&mut self) -> Result<()> {
        let raster = self.raster.as_ref().ok_or(Error::NoRaster)?;
        let dataset = Arc::clone(&raster.dataset);
        let snapshot = ColorSnapshot::new(
            Arc::clone(&raster.stats),
            self.assignment,
            self.params.brightness,
        );

        self.next_layer_id += 1;
        let id = LayerId(self.next_layer_id);
        let layer = RasterLayer::new(
            id,
            dataset,
            snapshot,
            self.params.opacity,
            self.config.resolution,
        );

        self.dispose_layer();
        let name = self.config.display_name.clone();
        self.map.attach_layer(&name, layer);
        self.handle = Some(RasterLayerHandle { id, name });
        self.state = LayerState::Displaying;
        self.rebuilds += 1;
        debug!(
            %id,
            assignment = %self.assignment,
            opacity = self.params.opacity,
            brightness = self.params.brightness,
            "raster layer rebuilt"
        );
        Ok(())
    }

    /// Edit opacity and/or brightness and rebuild. Out-of-range values are clamped.
    pub fn update_params(&mut self, opacity: Option<f64>, brightness: Option<f64>) -> Result<()> {
        if self.raster.is_none() {
            return Err(Error::NoRaster);
        }
        self.params.apply(opacity, brightness)?;
        self.controls.show_params(&self.params);
        self.display()
    }

    /// Show `band` on `channel` and rebuild. An index past the last band is rejected
    /// and the previous assignment kept.
    pub fn update_assignment(&mut self, channel: Channel, band: usize) -> Result<()> {
        let band_count = self.band_count().ok_or(Error::NoRaster)?;
        if band >= band_count {
            warn!(%channel, band, band_count, "rejecting band selection");
            return Err(Error::InvalidBandIndex {
                channel,
                index: band,
                band_count,
            });
        }
        self.assignment.set(channel, band);
        self.controls.show_assignment(&self.assignment);
        self.display()
    }

    /// Drop the raster and its layer and reset every parameter. Also supersedes any
    /// load still in flight. Does nothing else when already empty.
    pub fn remove(&mut self) {
        self.epoch += 1;
        if self.state == LayerState::Empty {
            debug!("no raster layer to remove");
            return;
        }
        self.dispose_layer();
        self.raster = None;
        self.assignment = BandAssignment::default();
        self.params = VisualizationParams::default();
        self.state = LayerState::Empty;
        self.publish_empty_controls();
        info!("raster layer removed");
    }

    /// Move the map view onto the loaded raster.
    pub fn fly_to_raster(&mut self) -> Result<BoundingBox> {
        let bounds = *self.dataset().ok_or(Error::NoRaster)?.bounds();
        self.map.fly_to_bounds(&bounds);
        Ok(bounds)
    }

    fn dispose_layer(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        match self.map.detach_layer(&handle.name) {
            Some(layer) => {
                trace!(id = %layer.id(), "disposing raster layer");
                drop(layer);
            }
            None => warn!(id = %handle.id, "raster layer was already detached from the map"),
        }
    }

    fn publish_empty_controls(&mut self) {
        self.controls.set_band_choices(&[]);
        self.controls.show_assignment(&self.assignment);
        self.controls.show_params(&self.params);
        self.controls.set_raster_controls_enabled(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{HeadlessControls, HeadlessMap};
    use ndarray::array;

    type Controller = RasterLayerController<HeadlessMap, HeadlessControls>;

    fn controller() -> Controller {
        let config = OverlayConfig {
            sample_stride: 1,
            ..OverlayConfig::default()
        };
        RasterLayerController::new(HeadlessMap::new(), HeadlessControls::default(), config).unwrap()
    }

    fn dataset(bands: usize) -> RasterDataset {
        let grids = (0..bands)
            .map(|b| array![[Some(b as f64), Some(b as f64 + 10.0)]])
            .collect();
        RasterDataset::new(grids, BoundingBox::new(45.0, 44.0, 8.0, 6.0)).unwrap()
    }

    #[test]
    fn starts_empty_with_controls_disabled() {
        let c = controller();
        assert_eq!(c.state(), LayerState::Empty);
        assert!(!c.controls().raster_controls_enabled);
        assert!(c.handle().is_none());
        assert_eq!(c.map().layer_count(), 0);
    }

    #[test]
    fn load_displays_and_fits() {
        let mut c = controller();
        let outcome = c.load(dataset(3)).unwrap();
        assert!(matches!(outcome, LoadOutcome::Applied { band_count: 3, warning: None }));
        assert_eq!(c.state(), LayerState::Displaying);
        assert_eq!(c.map().viewport(), Some(&BoundingBox::new(45.0, 44.0, 8.0, 6.0)));
        assert_eq!(c.controls().band_labels.len(), 3);
        assert!(c.controls().raster_controls_enabled);
        assert!(c.map().list_overlay_names().contains("Raster"));
        assert_eq!(c.rebuild_count(), 1);
    }

    #[test]
    fn display_without_raster_fails() {
        let mut c = controller();
        assert!(matches!(c.display(), Err(Error::NoRaster)));
        assert!(matches!(c.update_params(Some(0.2), None), Err(Error::NoRaster)));
        assert!(matches!(c.update_assignment(Channel::Red, 0), Err(Error::NoRaster)));
        assert!(matches!(c.fly_to_raster(), Err(Error::NoRaster)));
    }

    #[test]
    fn single_band_load_warns_and_falls_back_to_grayscale() {
        let mut c = controller();
        match c.load(dataset(1)).unwrap() {
            LoadOutcome::Applied { band_count, warning } => {
                assert_eq!(band_count, 1);
                assert!(matches!(warning, Some(Error::UnsupportedFormat { .. })));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(c.assignment(), BandAssignment::new(0, 0, 0));
        let px = c.current_layer().unwrap().pixel_color(0, 1).unwrap();
        assert_eq!((px.r, px.g, px.b), (255, 255, 255));
    }

    #[test]
    fn new_load_resets_assignment_and_params() {
        let mut c = controller();
        c.load(dataset(4)).unwrap();
        c.update_assignment(Channel::Blue, 3).unwrap();
        c.update_params(Some(0.4), Some(1.5)).unwrap();
        c.load(dataset(2)).unwrap();
        assert_eq!(c.assignment(), BandAssignment::new(0, 1, 0));
        assert_eq!(c.params(), VisualizationParams::default());
        assert_eq!(c.map().layer_count(), 1);
        assert!(c.map().overwritten().is_empty());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut c = controller();
        let first = c.begin_load();
        let second = c.begin_load();
        assert_eq!((first.epoch(), second.epoch()), (1, 2));
        assert_eq!(c.epoch(), second.epoch());
        let outcome = c.complete_load(first, Ok(dataset(5))).unwrap();
        assert!(matches!(outcome, LoadOutcome::Stale { ticket_epoch: 1, current_epoch: 2 }));
        assert_eq!(c.state(), LayerState::Empty);

        c.complete_load(second, Ok(dataset(3))).unwrap();
        assert_eq!(c.band_count(), Some(3));
    }

    #[test]
    fn removal_supersedes_pending_load() {
        let mut c = controller();
        let ticket = c.begin_load();
        c.remove();
        assert!(c.epoch() > ticket.epoch());
        let outcome = c.complete_load(ticket, Ok(dataset(3))).unwrap();
        assert!(!outcome.is_applied());
        assert_eq!(c.state(), LayerState::Empty);
        assert_eq!(c.map().layer_count(), 0);
    }

    #[test]
    fn decode_failure_keeps_current_raster() {
        let mut c = controller();
        c.load(dataset(3)).unwrap();
        let before = c.handle().cloned();
        let err = c
            .load_bytes(&crate::io::JsonDatasetDecoder, b"not json")
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(c.state(), LayerState::Displaying);
        assert_eq!(c.handle().cloned(), before);
        assert_eq!(c.band_count(), Some(3));
    }

    #[test]
    fn fly_to_raster_moves_viewport() {
        let mut c = controller();
        c.load(dataset(3)).unwrap();
        let bounds = c.fly_to_raster().unwrap();
        assert_eq!(c.map().viewport(), Some(&bounds));
    }

    #[test]
    fn layer_snapshot_is_not_affected_by_later_edits() {
        let mut c = controller();
        c.load(dataset(3)).unwrap();
        let old = c.current_layer().unwrap().clone();
        c.update_params(None, Some(0.0)).unwrap();
        assert_eq!(old.snapshot().brightness(), 1.0);
        assert_eq!(c.current_layer().unwrap().snapshot().brightness(), 0.0);
        assert_ne!(old.id(), c.handle().unwrap().id);
    }
}
