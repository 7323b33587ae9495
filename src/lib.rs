#![doc = r##"
MAPOVERLAY: band compositing and live recoloring for raster map overlays.

This crate turns a decoded multi-band raster into a colored map layer and keeps that
layer consistent while a user edits opacity, brightness and the bands shown on the
red, green and blue channels. It powers the `mapoverlay` CLI and can be embedded behind
any map widget that implements [`map::MapSurface`].

Pipeline
--------
1. A raster decoder (external, see [`io::RasterDecoder`]) produces a [`RasterDataset`].
2. Per-band statistics are computed once per load from a strided sample of each band.
3. Every rebuild captures an immutable [`ColorSnapshot`] and wraps it in a
   [`RasterLayer`]; the per-pixel [`color_for`] mapping is pure and allocation free.
4. The [`RasterLayerController`] swaps layers on the map, never leaving more than one
   attached, and the [`ParameterChangeDispatcher`] forwards control edits in order.

Quick start
-----------
```rust
use mapoverlay::{
    BoundingBox, Channel, HeadlessControls, HeadlessMap, OverlayConfig, RasterDataset,
    RasterLayerController,
};
use ndarray::array;

fn main() -> mapoverlay::Result<()> {
    let bands = vec![
        array![[Some(10.0), Some(20.0)], [Some(30.0), Some(40.0)]],
        array![[Some(0.0), Some(0.0)], [Some(0.0), Some(0.0)]],
        array![[Some(5.0), Some(5.0)], [Some(5.0), None]],
    ];
    let dataset = RasterDataset::new(bands, BoundingBox::new(45.0, 44.0, 8.0, 6.0))
        .map_err(mapoverlay::Error::external)?;

    let mut controller = RasterLayerController::new(
        HeadlessMap::new(),
        HeadlessControls::default(),
        OverlayConfig::default(),
    )?;
    controller.load(dataset)?;
    controller.update_params(Some(0.5), Some(1.2))?;
    controller.update_assignment(Channel::Green, 0)?;

    let layer = controller.current_layer().expect("layer is displayed");
    assert!(layer.pixel_color(1, 1).is_none()); // nodata on the blue band
    Ok(())
}
```

Asynchronous loads
------------------
Decoding may finish long after it started. Take a [`LoadTicket`] when the decode
begins and hand it back with the result; completions overtaken by a newer load or a
removal are reported as [`LoadOutcome::Stale`] and change nothing.

```rust
use mapoverlay::{
    HeadlessControls, HeadlessMap, JsonDatasetDecoder, LoadOutcome, OverlayConfig,
    RasterDecoder, RasterLayerController,
};

fn main() -> mapoverlay::Result<()> {
    let mut controller = RasterLayerController::new(
        HeadlessMap::new(),
        HeadlessControls::default(),
        OverlayConfig::default(),
    )?;
    let doc = br#"{"bounds":{"north":1.0,"south":0.0,"east":1.0,"west":0.0},
                   "bands":[[[1.0,2.0]],[[3.0,4.0]],[[5.0,6.0]]]}"#;

    let slow = controller.begin_load();
    controller.remove();
    let outcome = controller.complete_load(slow, JsonDatasetDecoder.decode(doc))?;
    assert!(matches!(outcome, LoadOutcome::Stale { .. }));
    Ok(())
}
```

Error handling
--------------
All fallible operations return [`Result<T>`]; every error is recoverable and leaves the
controller in its previous valid state. Rasters with fewer than three bands load with
an [`Error::UnsupportedFormat`] warning and render from band 1 on missing channels.

Useful modules
--------------
- [`api`]: controller, dispatcher and preview export.
- [`core`]: statistics, color mapping, rendering and parameter types.
- [`raster`]: the decoded dataset model.
- [`map`]: map/control surface traits and headless implementations.
- [`io`]: decode boundary and preview writers.
- [`error`]: crate-level `Error` and `Result`.
"##]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod map;
pub mod raster;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::params::{BandAssignment, OverlayConfig, VisualizationParams};
pub use error::{Error, Result};
pub use types::{Channel, LayerState, Rgb, StatsArg, StatsStrategy};

// Engine primitives
pub use crate::core::processing::color::{ColorSnapshot, color_for};
pub use crate::core::processing::render::RgbaImage;
pub use crate::core::processing::stats::{BandStats, compute, compute_all, compute_with};

// Data model and boundaries
pub use io::{DatasetDocument, DecodeError, JsonDatasetDecoder, RasterDecoder};
pub use map::{
    ControlSurface, HeadlessControls, HeadlessMap, LayerId, MapSurface, RasterLayer,
    VECTOR_OVERLAY_NAME,
};
pub use raster::{BoundingBox, DatasetError, RasterDataset};

// High-level API re-exports
pub use api::{
    ControlEvent, DispatchOutcome, LoadOutcome, LoadTicket, ParameterChangeDispatcher,
    PreviewReport, RasterLayerController, RasterLayerHandle, save_layer_preview,
};
