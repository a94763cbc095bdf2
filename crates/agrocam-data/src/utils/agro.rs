//! Seasons, crop maturity and lunar calendar

use crate::crop::{Crop, Season};
use crate::region::Region;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Season in effect for a region during `month` (1-12)
#[must_use]
pub fn season_for(region: Region, month: u32) -> Season {
    match region {
        Region::Nord | Region::ExtremeNord => {
            if (6..=9).contains(&month) {
                Season::SaisonDesPluies
            } else {
                Season::SaisonSeche
            }
        }
        Region::Centre | Region::Sud | Region::Est | Region::Littoral => match month {
            3..=5 | 8..=11 => Season::SaisonDesPluies,
            6 | 7 => Season::PetiteSaisonSeche,
            _ => Season::GrandeSaisonSeche,
        },
        _ => {
            if region.is_wet_month(month) {
                Season::SaisonDesPluies
            } else {
                Season::SaisonSeche
            }
        }
    }
}

/// Field activities typical for the month
#[must_use]
pub fn seasonal_activities(region: Region, month: u32) -> &'static [&'static str] {
    if region.is_sahelian() {
        if (6..=9).contains(&month) {
            &["plantation", "sarclage", "fertilisation"]
        } else {
            &["récolte", "préparation du sol", "commercialisation"]
        }
    } else {
        match month {
            3 | 4 | 5 | 8 | 9 => &["plantation", "entretien des cultures"],
            12 | 1 | 2 => &["préparation du sol", "récolte des cultures pérennes"],
            _ => &["entretien général", "surveillance sanitaire"],
        }
    }
}

/// Expected harvest window
#[derive(Debug, Clone, Serialize)]
pub struct MaturityEstimate {
    /// Crop
    pub crop: Crop,
    /// Planting date
    pub planting_date: NaiveDate,
    /// Days to maturity after regional adjustment
    pub cycle_days: i64,
    /// Expected harvest date
    pub harvest_date: NaiveDate,
}

/// Expected harvest date; the Sahel shortens cycles by 10 %, the western
/// highlands lengthen them by 10 %
#[must_use]
pub fn estimate_maturity(crop: Crop, planting_date: NaiveDate, region: Region) -> MaturityEstimate {
    let base = f64::from(crop.cycle_days());
    let factor = match region {
        Region::Nord | Region::ExtremeNord => 0.9,
        Region::Ouest | Region::NordOuest => 1.1,
        _ => 1.0,
    };
    let cycle_days = (base * factor) as i64;
    MaturityEstimate {
        crop,
        planting_date,
        cycle_days,
        harvest_date: planting_date + Duration::days(cycle_days),
    }
}

/// Growing degree days for one day
#[must_use]
pub fn growing_degree_days(temp_min: f64, temp_max: f64, base_temp: f64) -> f64 {
    ((temp_min + temp_max) / 2.0 - base_temp).max(0.0)
}

/// Lunar phase, still used by many farmers to time sowing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoonPhase {
    /// New moon
    #[serde(rename = "Nouvelle lune")]
    NouvelleLune,
    /// Waxing crescent
    #[serde(rename = "Premier croissant")]
    PremierCroissant,
    /// Full moon
    #[serde(rename = "Pleine lune")]
    PleineLune,
    /// Waning crescent
    #[serde(rename = "Dernier croissant")]
    DernierCroissant,
}

impl MoonPhase {
    /// French label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NouvelleLune => "Nouvelle lune",
            Self::PremierCroissant => "Premier croissant",
            Self::PleineLune => "Pleine lune",
            Self::DernierCroissant => "Dernier croissant",
        }
    }
}

const LUNAR_CYCLE_DAYS: f64 = 29.53;

/// Approximate moon phase from the 2000-01-06 new moon
#[must_use]
pub fn moon_phase(date: NaiveDate) -> MoonPhase {
    let reference = NaiveDate::from_ymd_opt(2000, 1, 6).unwrap_or(NaiveDate::MIN);
    let days = (date - reference).num_days() as f64;
    let fraction = (days % LUNAR_CYCLE_DAYS).rem_euclid(LUNAR_CYCLE_DAYS) / LUNAR_CYCLE_DAYS;
    match fraction {
        f if f < 0.125 => MoonPhase::NouvelleLune,
        f if f < 0.375 => MoonPhase::PremierCroissant,
        f if f < 0.625 => MoonPhase::PleineLune,
        f if f < 0.875 => MoonPhase::DernierCroissant,
        _ => MoonPhase::NouvelleLune,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_for_bimodal_region() {
        assert_eq!(season_for(Region::Centre, 4), Season::SaisonDesPluies);
        assert_eq!(season_for(Region::Centre, 7), Season::PetiteSaisonSeche);
        assert_eq!(season_for(Region::Centre, 1), Season::GrandeSaisonSeche);
        assert_eq!(season_for(Region::Littoral, 10), Season::SaisonDesPluies);
    }

    #[test]
    fn test_season_for_sahel_and_highlands() {
        assert_eq!(season_for(Region::ExtremeNord, 7), Season::SaisonDesPluies);
        assert_eq!(season_for(Region::Nord, 4), Season::SaisonSeche);
        assert_eq!(season_for(Region::Ouest, 10), Season::SaisonDesPluies);
        assert_eq!(season_for(Region::Ouest, 11), Season::SaisonSeche);
    }

    #[test]
    fn test_seasonal_activities() {
        assert!(seasonal_activities(Region::Nord, 7).contains(&"sarclage"));
        assert!(seasonal_activities(Region::Nord, 1).contains(&"récolte"));
        assert!(seasonal_activities(Region::Centre, 4).contains(&"plantation"));
        assert!(seasonal_activities(Region::Centre, 10).contains(&"surveillance sanitaire"));
    }

    #[test]
    fn test_estimate_maturity_regional_factor() {
        let planted = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(estimate_maturity(Crop::Mais, planted, Region::Centre).cycle_days, 120);
        assert_eq!(estimate_maturity(Crop::Mais, planted, Region::Nord).cycle_days, 108);
        let highlands = estimate_maturity(Crop::Mais, planted, Region::Ouest);
        assert_eq!(highlands.cycle_days, 132);
        assert_eq!(highlands.harvest_date, NaiveDate::from_ymd_opt(2024, 7, 25).unwrap());
    }

    #[test]
    fn test_growing_degree_days() {
        assert_eq!(growing_degree_days(20.0, 30.0, 10.0), 15.0);
        assert_eq!(growing_degree_days(4.0, 8.0, 10.0), 0.0);
    }

    #[test]
    fn test_moon_phase() {
        let reference = NaiveDate::from_ymd_opt(2000, 1, 6).unwrap();
        assert_eq!(moon_phase(reference), MoonPhase::NouvelleLune);
        assert_eq!(moon_phase(reference + Duration::days(15)), MoonPhase::PleineLune);
        assert_eq!(moon_phase(reference + Duration::days(7)), MoonPhase::PremierCroissant);
    }
}
