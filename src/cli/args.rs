use clap::Parser;
use std::path::PathBuf;

use mapoverlay::StatsArg;

#[derive(Parser)]
#[command(name = "mapoverlay", version, about = "MAPOVERLAY CLI")]
pub struct CliArgs {
    /// Decoded raster dataset (JSON dataset document)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output JPEG preview of the composited raster layer
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Engine configuration file (JSON); flags below override its fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON array of control events replayed in order after loading
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Band shown on the red channel (0-based)
    #[arg(long)]
    pub red: Option<usize>,

    /// Band shown on the green channel (0-based)
    #[arg(long)]
    pub green: Option<usize>,

    /// Band shown on the blue channel (0-based)
    #[arg(long)]
    pub blue: Option<usize>,

    /// Layer opacity in [0, 1]; out-of-range values are clamped
    #[arg(long)]
    pub opacity: Option<f64>,

    /// Brightness multiplier in [0, 2]; out-of-range values are clamped
    #[arg(long)]
    pub brightness: Option<f64>,

    /// Row/column sampling step for band statistics (1 = every pixel)
    #[arg(long)]
    pub stride: Option<usize>,

    /// Statistics strategy (minmax or percentile 2%/98%)
    #[arg(long, value_enum)]
    pub stats: Option<StatsArg>,

    /// Name of the raster overlay entry
    #[arg(long)]
    pub display_name: Option<String>,

    /// Print band statistics and the final visualization state as JSON
    #[arg(long, default_value_t = false)]
    pub print_stats: bool,

    /// Write a world file next to the preview
    #[arg(long, default_value_t = false)]
    pub world_file: bool,

    /// Enable logging (RUST_LOG overrides the default filter)
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
