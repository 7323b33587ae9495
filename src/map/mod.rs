//! Map-side boundary: the renderable `RasterLayer`, the `MapSurface` and
//! `ControlSurface` traits the engine drives, and headless implementations of both
//! for the CLI and tests.
pub mod headless;
pub mod layer;
pub mod surface;

pub use headless::{HeadlessControls, HeadlessMap, VECTOR_OVERLAY_NAME};
pub use layer::{LayerId, RasterLayer};
pub use surface::{ControlSurface, MapSurface, band_choice_labels};
