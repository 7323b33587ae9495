use approx::assert_relative_eq;
use ndarray::{Array2, array};

use mapoverlay::{
    BandAssignment, BoundingBox, Channel, Error, HeadlessControls, HeadlessMap, JsonDatasetDecoder,
    LayerState, LoadOutcome, MapSurface, OverlayConfig, RasterDataset, RasterDecoder,
    RasterLayerController, Rgb, VECTOR_OVERLAY_NAME,
};

type Controller = RasterLayerController<HeadlessMap, HeadlessControls>;

fn controller() -> Controller {
    RasterLayerController::new(
        HeadlessMap::new(),
        HeadlessControls::default(),
        OverlayConfig {
            sample_stride: 1,
            ..OverlayConfig::default()
        },
    )
    .unwrap()
}

fn two_by_two() -> RasterDataset {
    RasterDataset::from_dense(
        vec![
            array![[10.0, 20.0], [30.0, 40.0]],
            array![[0.0, 0.0], [0.0, 0.0]],
            array![[5.0, 5.0], [5.0, 5.0]],
        ],
        None,
        BoundingBox::new(45.0, 44.0, 8.0, 6.0),
    )
    .unwrap()
}

fn uniform(bands: usize) -> RasterDataset {
    let grids = (0..bands)
        .map(|b| Array2::from_elem((4, 4), Some(b as f64 * 10.0)))
        .collect();
    RasterDataset::new(grids, BoundingBox::new(1.0, 0.0, 1.0, 0.0)).unwrap()
}

#[test]
fn two_by_two_end_to_end() {
    let mut c = controller();
    let outcome = c.load(two_by_two()).unwrap();
    assert!(matches!(
        outcome,
        LoadOutcome::Applied {
            band_count: 3,
            warning: None
        }
    ));

    let stats = c.stats().unwrap();
    assert_relative_eq!(stats[0].min, 10.0);
    assert_relative_eq!(stats[0].max, 40.0);
    assert!(stats[1].is_degenerate());
    assert_relative_eq!(stats[2].min, 5.0);
    assert_relative_eq!(stats[2].max, 5.0);

    let layer = c.current_layer().unwrap();
    assert_eq!(layer.pixel_color(0, 0), Some(Rgb::new(0, 0, 0)));
    // (40 - 10) / 30 * 255 on red, degenerate green and blue
    assert_eq!(layer.pixel_color(1, 1), Some(Rgb::new(255, 0, 0)));
    assert_eq!(c.map().viewport(), Some(&BoundingBox::new(45.0, 44.0, 8.0, 6.0)));
}

#[test]
fn load_then_remove_leaves_nothing_behind() {
    let mut c = controller();
    c.load(uniform(3)).unwrap();
    assert_eq!(c.state(), LayerState::Displaying);
    assert!(c.map().list_overlay_names().contains("Raster"));

    c.remove();
    assert_eq!(c.state(), LayerState::Empty);
    assert!(c.current_layer().is_none());
    assert!(c.handle().is_none());
    assert_eq!(c.map().layer_count(), 0);
    let names = c.map().list_overlay_names();
    assert_eq!(names.len(), 1);
    assert!(names.contains(VECTOR_OVERLAY_NAME));

    assert!(c.controls().band_labels.is_empty());
    assert!(!c.controls().raster_controls_enabled);
    assert!(matches!(c.update_params(Some(0.5), None), Err(Error::NoRaster)));
    assert!(matches!(c.fly_to_raster(), Err(Error::NoRaster)));
}

#[test]
fn out_of_range_band_keeps_previous_assignment() {
    let mut c = controller();
    c.load(uniform(3)).unwrap();
    let rebuilds = c.rebuild_count();

    let err = c.update_assignment(Channel::Red, 7).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidBandIndex {
            channel: Channel::Red,
            index: 7,
            band_count: 3
        }
    ));
    assert_eq!(c.assignment(), BandAssignment::new(0, 1, 2));
    assert_eq!(c.controls().assignment, BandAssignment::new(0, 1, 2));
    assert_eq!(c.rebuild_count(), rebuilds);
    assert_eq!(c.state(), LayerState::Displaying);
}

#[test]
fn repeated_param_updates_never_leak_layers() {
    let mut c = controller();
    c.load(uniform(3)).unwrap();
    let rebuilds = c.rebuild_count();
    let attached = c.map().attach_count();
    let detached = c.map().detach_count();

    for n in 1..=3u64 {
        c.update_params(Some(0.5), None).unwrap();
        assert_eq!(c.rebuild_count(), rebuilds + n);
        assert_eq!(c.map().attach_count(), attached + n);
        assert_eq!(c.map().detach_count(), detached + n);
        assert_eq!(c.map().layer_count(), 1);
    }
    assert!(c.map().overwritten().is_empty());
    assert_relative_eq!(c.current_layer().unwrap().opacity(), 0.5);
    assert_eq!(c.controls().opacity_label, "50%");
}

#[test]
fn new_load_resets_assignment_and_params() {
    let mut c = controller();
    c.load(uniform(4)).unwrap();
    c.update_assignment(Channel::Blue, 3).unwrap();
    c.update_params(Some(0.2), Some(1.8)).unwrap();

    c.load(uniform(3)).unwrap();
    assert_eq!(c.assignment(), BandAssignment::new(0, 1, 2));
    assert_relative_eq!(c.params().opacity, 1.0);
    assert_relative_eq!(c.params().brightness, 1.0);
    assert_eq!(c.controls().band_labels, vec!["Band 1", "Band 2", "Band 3"]);
    assert_eq!(c.map().layer_count(), 1);
    assert!(c.map().overwritten().is_empty());
}

#[test]
fn single_band_raster_loads_with_warning() {
    let mut c = controller();
    match c.load(uniform(1)).unwrap() {
        LoadOutcome::Applied {
            band_count,
            warning,
        } => {
            assert_eq!(band_count, 1);
            assert!(matches!(warning, Some(Error::UnsupportedFormat { .. })));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(c.assignment(), BandAssignment::new(0, 0, 0));
    assert!(c.current_layer().unwrap().pixel_color(0, 0).is_some());
}

#[test]
fn overtaken_load_is_discarded() {
    let mut c = controller();
    let first = c.begin_load();
    let second = c.begin_load();

    let doc = br#"{"bounds":{"north":1.0,"south":0.0,"east":1.0,"west":0.0},
                   "bands":[[[1.0]],[[2.0]],[[3.0]]]}"#;
    let outcome = c
        .complete_load(second, JsonDatasetDecoder.decode(doc))
        .unwrap();
    assert!(outcome.is_applied());

    let late = c.complete_load(first, Ok(uniform(4))).unwrap();
    assert!(matches!(late, LoadOutcome::Stale { .. }));
    assert_eq!(c.band_count(), Some(3));
}

#[test]
fn failed_decode_keeps_current_raster() {
    let mut c = controller();
    c.load(uniform(3)).unwrap();
    let id = c.handle().unwrap().id;

    let err = c.load_bytes(&JsonDatasetDecoder, b"not json").unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
    assert_eq!(c.state(), LayerState::Displaying);
    assert_eq!(c.handle().unwrap().id, id);
    assert_eq!(c.band_count(), Some(3));
}

#[test]
fn redisplay_builds_an_identical_new_layer() {
    let mut c = controller();
    c.load(two_by_two()).unwrap();
    let before = c.current_layer().unwrap().clone();

    c.display().unwrap();
    let after = c.current_layer().unwrap();
    assert_ne!(after.id(), before.id());
    assert_eq!(after.render_rgba(), before.render_rgba());
    assert_eq!(c.map().layer_count(), 1);
}

#[test]
fn edits_reuse_the_loaded_statistics() {
    let mut c = controller();
    c.load(two_by_two()).unwrap();
    let stats_ptr = c.current_layer().unwrap().snapshot().stats().as_ptr();
    let stats = c.stats().unwrap().to_vec();

    c.update_params(Some(0.3), Some(1.7)).unwrap();
    c.update_assignment(Channel::Red, 2).unwrap();
    c.update_params(None, Some(0.4)).unwrap();

    let layer = c.current_layer().unwrap();
    assert!(std::ptr::eq(layer.snapshot().stats().as_ptr(), stats_ptr));
    assert_eq!(c.stats().unwrap(), stats.as_slice());
}

#[test]
fn vector_overlay_name_is_reserved() {
    let config = OverlayConfig {
        display_name: VECTOR_OVERLAY_NAME.to_string(),
        ..OverlayConfig::default()
    };
    let result =
        RasterLayerController::new(HeadlessMap::new(), HeadlessControls::default(), config);
    assert!(matches!(
        result,
        Err(Error::InvalidArgument {
            arg: "display_name",
            ..
        })
    ));
}
