//! Core building blocks: band statistics, the per-pixel color mapping and the
//! rasterizers built on it, plus the parameter and configuration types. These are
//! pure primitives consumed by the stateful `api` layer.
pub mod params;
pub mod processing;
