//! Command Line Interface (CLI) layer for MAPOVERLAY.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`): load a decoded dataset into a
//! controller backed by a headless map, replay control edits, then report
//! statistics and/or export a preview.
//!
//! If you are embedding the engine into another application, use the
//! library API (`mapoverlay::api`) instead of the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
