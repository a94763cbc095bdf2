//! Reference lookups: regions, crops, prices and seasons

use crate::server::load_config;
use agrocam_data::crop::suitable_crops;
use agrocam_data::utils::{format_fcfa, season_for, seasonal_activities};
use agrocam_data::{market_price, month_name, Crop, Region};
use anyhow::Result;
use chrono::Datelike;

/// `agrocam regions`
pub fn regions() -> Result<()> {
    println!("{:<14} {:<20} {:<14} Cultures principales", "Région", "Climat", "Pluie (mm)");
    for region in Region::ALL {
        let info = region.info();
        println!(
            "{:<14} {:<20} {:<14} {}",
            region.name(),
            info.climate,
            format!("{}-{}", info.rainfall_mm.min, info.rainfall_mm.max),
            info.main_crops.join(", ")
        );
    }
    Ok(())
}

/// `agrocam crops [--region]`
pub fn crops(region: Option<&str>) -> Result<()> {
    match region {
        Some(name) => {
            let region: Region = name.parse()?;
            println!("Cultures adaptées à la région {region}:");
            for info in suitable_crops(region) {
                println!(
                    "  - {:<16} {} jours, rendement moyen {} kg/ha",
                    info.crop.label(),
                    info.cycle_days,
                    info.yield_kg_ha
                );
            }
        }
        None => {
            for crop in Crop::ALL {
                println!(
                    "  - {:<16} {:<16} {} jours{}",
                    crop.label(),
                    crop.family(),
                    crop.cycle_days(),
                    if crop.is_legume() { " (légumineuse)" } else { "" }
                );
            }
        }
    }
    Ok(())
}

/// `agrocam prices <crop>`
pub fn prices(crop: &str) -> Result<()> {
    let crop: Crop = crop.parse()?;
    let price = market_price(crop);
    println!(
        "💰 {}: {} - {} par {} (moyenne {})",
        crop.label(),
        format_fcfa(f64::from(price.min)),
        format_fcfa(f64::from(price.max)),
        price.unit,
        format_fcfa(f64::from(price.avg))
    );
    if !price.tabulated {
        println!("   (estimation générale, pas de cotation pour cette culture)");
    }
    Ok(())
}

/// `agrocam season [--region] [--month]`
pub fn season(region: Option<&str>, month: Option<u32>) -> Result<()> {
    let region = match region {
        Some(name) => name.parse::<Region>()?,
        None => load_config()?.agriculture.default_region,
    };
    let month = month.unwrap_or_else(|| chrono::Local::now().month());

    println!(
        "📅 {} en {}: {}",
        region,
        month_name(month),
        season_for(region, month).label()
    );
    println!("Activités: {}", seasonal_activities(region, month).join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_accept_known_names() {
        assert!(crops(Some("Ouest")).is_ok());
        assert!(prices("cacao").is_ok());
        assert!(season(Some("Extrême-Nord"), Some(8)).is_ok());
    }

    #[test]
    fn test_lookups_reject_unknown_names() {
        assert!(crops(Some("Lagos")).is_err());
        assert!(prices("quinoa").is_err());
    }
}
