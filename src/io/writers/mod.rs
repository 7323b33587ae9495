//! Preview writers: JPEG encoding of flattened layer renders and world files that
//! georeference them.
pub mod jpeg;
pub mod worldfile;
