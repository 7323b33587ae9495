//! High-level engine API: the `RasterLayerController` lifecycle, the
//! `ParameterChangeDispatcher` that feeds it control-panel edits, and preview export.
//! Prefer these entry points over the low-level `core` processing modules.
pub mod controller;
pub mod dispatcher;
pub mod preview;

pub use controller::{LoadOutcome, LoadTicket, RasterLayerController, RasterLayerHandle};
pub use dispatcher::{ControlEvent, DispatchOutcome, ParameterChangeDispatcher};
pub use preview::{PreviewReport, save_layer_preview};
