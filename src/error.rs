//! Crate-level error type and `Result` alias for structured, locally recoverable errors.
//! Wraps decode and I/O failures and provides semantic variants for the raster
//! lifecycle (unsupported band layouts, invalid band indices, missing raster).
use thiserror::Error;

use crate::types::Channel;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] crate::io::DecodeError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Unsupported format: {reason}")]
    UnsupportedFormat { reason: String },

    #[error("Invalid band index {index} for {channel} channel; dataset has {band_count} band(s)")]
    InvalidBandIndex {
        channel: Channel,
        index: usize,
        band_count: usize,
    },

    #[error("No raster loaded")]
    NoRaster,

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }
}
