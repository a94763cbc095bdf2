//! agrocam data - reference tables for Cameroonian agriculture
//!
//! Regions, crops, diseases, pests, market prices and traditional practices,
//! plus the small pure calculators (seasons, units, distances, formatting)
//! that the advisory tools build on. Everything here is immutable and
//! created at compile time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod crop;
pub mod disease;
pub mod error;
pub mod market;
pub mod practices;
pub mod region;
pub mod text;
pub mod utils;

pub use crop::{Crop, CropInfo, Season, SoilType, WaterNeed};
pub use disease::{diseases_for, pests_for, DiseaseRecord, PestRecord};
pub use error::{Error, Result};
pub use market::{market_price, PriceRange, CURRENCY};
pub use region::{AgroZone, Region, RegionInfo};

/// Numeric interval with inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Span<T> {
    /// Lower bound
    pub min: T,
    /// Upper bound
    pub max: T,
}

impl<T: PartialOrd + Copy> Span<T> {
    /// Create a span
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the bounds
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Span<f64> {
    /// Midpoint of the span
    #[must_use]
    pub fn mid(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// French month name (1 = janvier)
#[must_use]
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
        "octobre", "novembre", "décembre",
    ];
    NAMES
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("mois inconnu")
}
