//! I/O layer: the raster decode boundary (`decode`) and preview writers (`writers`).
//! File-format parsing lives behind `RasterDecoder`; the crate ships only a decoder for
//! already-decoded datasets serialized as JSON.
pub mod decode;
pub use decode::{DatasetDocument, DecodeError, JsonDatasetDecoder, RasterDecoder};

pub mod writers;
