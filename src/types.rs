//! Shared types and enums used across the overlay engine.
//! Includes display `Channel`s, the `Rgb` color triple, statistics strategies
//! (`StatsStrategy`, `StatsArg`) and the controller's `LayerState`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        };
        write!(f, "{}", s)
    }
}

/// An opaque 8-bit color. Transparency is expressed as `Option<Rgb>::None`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS functional notation, the form map renderers accept for per-pixel colors.
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// How per-band display bounds are derived from the sampled values.
#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StatsStrategy {
    /// Plain minimum and maximum of the sampled values.
    #[default]
    MinMax,
    /// Percentile clip: bounds are the sampled values at fractions `low` and `high`.
    Percentile { low: f64, high: f64 },
}

impl StatsStrategy {
    /// 2%/98% clip, a common stretch for imagery with outliers.
    pub const CLIP_2_98: StatsStrategy = StatsStrategy::Percentile {
        low: 0.02,
        high: 0.98,
    };

    pub fn validate(&self) -> Result<()> {
        if let StatsStrategy::Percentile { low, high } = *self {
            let in_unit = |p: f64| (0.0..=1.0).contains(&p);
            if !in_unit(low) || !in_unit(high) || low > high {
                return Err(Error::InvalidArgument {
                    arg: "percentile",
                    value: format!("{}..{}", low, high),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for StatsStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsStrategy::MinMax => write!(f, "MinMax"),
            StatsStrategy::Percentile { low, high } => {
                write!(f, "Percentile({:.2}..{:.2})", low, high)
            }
        }
    }
}

/// Command-line selector for `StatsStrategy`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum StatsArg {
    Minmax,
    Percentile,
}

impl From<StatsArg> for StatsStrategy {
    fn from(arg: StatsArg) -> Self {
        match arg {
            StatsArg::Minmax => StatsStrategy::MinMax,
            StatsArg::Percentile => StatsStrategy::CLIP_2_98,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LayerState {
    Empty,
    Loaded,
    Displaying,
}

impl std::fmt::Display for LayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerState::Empty => write!(f, "Empty"),
            LayerState::Loaded => write!(f, "Loaded"),
            LayerState::Displaying => write!(f, "Displaying"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_notation() {
        assert_eq!(Rgb::new(12, 0, 255).to_css(), "rgb(12, 0, 255)");
    }

    #[test]
    fn percentile_bounds_are_validated() {
        assert!(StatsStrategy::CLIP_2_98.validate().is_ok());
        assert!(StatsStrategy::MinMax.validate().is_ok());
        assert!(
            StatsStrategy::Percentile {
                low: 0.9,
                high: 0.1
            }
            .validate()
            .is_err()
        );
        assert!(
            StatsStrategy::Percentile {
                low: -0.1,
                high: 0.5
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn stats_strategy_serde_shape() {
        let json = serde_json::to_string(&StatsStrategy::CLIP_2_98).unwrap();
        assert_eq!(json, r#"{"kind":"percentile","low":0.02,"high":0.98}"#);
        let back: StatsStrategy = serde_json::from_str(r#"{"kind":"minmax"}"#).unwrap();
        assert_eq!(back, StatsStrategy::MinMax);
    }
}
