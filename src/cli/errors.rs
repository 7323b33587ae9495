use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Nothing to do: pass --output, --print-stats or both")]
    NoOutputRequested,

    #[error("Invalid events file: {0}")]
    Events(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Overlay(#[from] mapoverlay::Error),
}
