use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::map::VECTOR_OVERLAY_NAME;
use crate::types::{Channel, Rgb, StatsStrategy};

/// User-facing display parameters. Independent of the loaded dataset.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct VisualizationParams {
    /// Layer opacity in [0, 1]
    pub opacity: f64,
    /// Linear brightness multiplier in [0, 2]
    pub brightness: f64,
}

impl VisualizationParams {
    pub const MAX_OPACITY: f64 = 1.0;
    pub const MAX_BRIGHTNESS: f64 = 2.0;

    /// Apply an edit. Out-of-range values are clamped; non-finite values are rejected
    /// and leave the parameters untouched.
    pub fn apply(&mut self, opacity: Option<f64>, brightness: Option<f64>) -> Result<()> {
        if let Some(o) = opacity.filter(|o| !o.is_finite()) {
            return Err(Error::InvalidArgument {
                arg: "opacity",
                value: o.to_string(),
            });
        }
        if let Some(b) = brightness.filter(|b| !b.is_finite()) {
            return Err(Error::InvalidArgument {
                arg: "brightness",
                value: b.to_string(),
            });
        }
        if let Some(o) = opacity {
            self.opacity = o.clamp(0.0, Self::MAX_OPACITY);
        }
        if let Some(b) = brightness {
            self.brightness = b.clamp(0.0, Self::MAX_BRIGHTNESS);
        }
        Ok(())
    }

    pub fn opacity_percent(&self) -> u32 {
        (self.opacity * 100.0).round() as u32
    }

    pub fn brightness_percent(&self) -> u32 {
        (self.brightness * 100.0).round() as u32
    }
}

impl Default for VisualizationParams {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            brightness: 1.0,
        }
    }
}

/// Bands shown on the red, green and blue display channels (0-based, may repeat).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct BandAssignment {
    pub red: usize,
    pub green: usize,
    pub blue: usize,
}

impl BandAssignment {
    pub const fn new(red: usize, green: usize, blue: usize) -> Self {
        Self { red, green, blue }
    }

    /// `(0, 1, 2)` with every unavailable index replaced by band 0.
    /// A single-band dataset therefore renders as grayscale.
    pub fn clamped_default(band_count: usize) -> Self {
        let pick = |preferred: usize| if preferred < band_count { preferred } else { 0 };
        Self::new(pick(0), pick(1), pick(2))
    }

    pub fn set(&mut self, channel: Channel, band: usize) {
        match channel {
            Channel::Red => self.red = band,
            Channel::Green => self.green = band,
            Channel::Blue => self.blue = band,
        }
    }

    #[inline]
    pub fn max_index(&self) -> usize {
        self.red.max(self.green).max(self.blue)
    }
}

impl Default for BandAssignment {
    fn default() -> Self {
        Self::new(0, 1, 2)
    }
}

impl std::fmt::Display for BandAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// Engine configuration suitable for config files and presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Row/column step used when sampling bands for statistics (1 = every pixel)
    pub sample_stride: usize,
    /// Edge length in pixels of one rendered map tile
    pub resolution: usize,
    /// Name the raster layer is registered under on the map
    pub display_name: String,
    pub stats: StatsStrategy,
    /// Color behind transparent or translucent pixels in flattened previews
    pub background: Rgb,
}

impl OverlayConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: OverlayConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_stride == 0 {
            return Err(Error::InvalidArgument {
                arg: "sample_stride",
                value: "0".to_string(),
            });
        }
        if self.resolution == 0 {
            return Err(Error::InvalidArgument {
                arg: "resolution",
                value: "0".to_string(),
            });
        }
        // The raster entry must stay distinguishable from the vector overlay.
        if self.display_name.trim().is_empty() || self.display_name == VECTOR_OVERLAY_NAME {
            return Err(Error::InvalidArgument {
                arg: "display_name",
                value: self.display_name.clone(),
            });
        }
        self.stats.validate()
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            sample_stride: 10,
            resolution: 256,
            display_name: "Raster".to_string(),
            stats: StatsStrategy::MinMax,
            background: Rgb::WHITE,
        }
    }
}
