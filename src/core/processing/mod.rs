pub mod color;
pub mod render;
pub mod stats;
