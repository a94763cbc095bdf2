//! Crops, soils and seasons

use crate::error::{Error, Result};
use crate::region::Region;
use crate::text::normalize_key;
use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Crop grown in Cameroon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Crop {
    /// Cocoa
    #[serde(rename = "cacao")]
    Cacao,
    /// Coffee
    #[serde(rename = "café")]
    Cafe,
    /// Cassava
    #[serde(rename = "manioc")]
    Manioc,
    /// Maize
    #[serde(rename = "maïs")]
    Mais,
    /// Plantain
    #[serde(rename = "plantain")]
    Plantain,
    /// Groundnut
    #[serde(rename = "arachide")]
    Arachide,
    /// Yam
    #[serde(rename = "igname")]
    Igname,
    /// Cotton
    #[serde(rename = "coton")]
    Coton,
    /// Oil palm
    #[serde(rename = "palmier_à_huile")]
    PalmierAHuile,
    /// Tomato
    #[serde(rename = "tomate")]
    Tomate,
    /// Okra
    #[serde(rename = "gombo")]
    Gombo,
    /// Chili pepper
    #[serde(rename = "piment")]
    Piment,
}

/// Soil type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    /// Clay
    Argileux,
    /// Sand
    Sableux,
    /// Silt / loam
    Limoneux,
    /// Laterite
    #[serde(rename = "latéritique")]
    Lateritique,
    /// Volcanic
    Volcanique,
    /// Humus-rich
    #[serde(rename = "humifère")]
    Humifere,
}

impl SoilType {
    /// French name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Argileux => "argileux",
            Self::Sableux => "sableux",
            Self::Limoneux => "limoneux",
            Self::Lateritique => "latéritique",
            Self::Volcanique => "volcanique",
            Self::Humifere => "humifère",
        }
    }

    /// Water retention class, used for irrigation spacing
    #[must_use]
    pub fn water_retention(&self) -> &'static str {
        match self {
            Self::Argileux | Self::Humifere | Self::Volcanique => "élevée",
            Self::Limoneux | Self::Lateritique => "moyenne",
            Self::Sableux => "faible",
        }
    }
}

impl FromStr for SoilType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = normalize_key(s);
        let soil = match key.as_str() {
            k if k.starts_with("argil") || k == "clay" => Self::Argileux,
            k if k.starts_with("sabl") || k == "sandy" || k == "sand" => Self::Sableux,
            k if k.starts_with("limon") || k == "loam" => Self::Limoneux,
            k if k.starts_with("laterit") || k.starts_with("ferrallit") => Self::Lateritique,
            k if k.starts_with("volcan") => Self::Volcanique,
            k if k.starts_with("humif") => Self::Humifere,
            _ => return Err(Error::InvalidInput(format!("type de sol inconnu: {s}"))),
        };
        Ok(soil)
    }
}

/// Season label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Season {
    /// Dry season (single-season regions)
    #[serde(rename = "saison_sèche")]
    SaisonSeche,
    /// Rainy season
    #[serde(rename = "saison_des_pluies")]
    SaisonDesPluies,
    /// Short dry season (June-July, bimodal regions)
    #[serde(rename = "petite_saison_sèche")]
    PetiteSaisonSeche,
    /// Long dry season (December-February, bimodal regions)
    #[serde(rename = "grande_saison_sèche")]
    GrandeSaisonSeche,
}

impl Season {
    /// French label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SaisonSeche => "saison sèche",
            Self::SaisonDesPluies => "saison des pluies",
            Self::PetiteSaisonSeche => "petite saison sèche",
            Self::GrandeSaisonSeche => "grande saison sèche",
        }
    }

    /// Any of the dry variants
    #[must_use]
    pub fn is_dry(&self) -> bool {
        !matches!(self, Self::SaisonDesPluies)
    }
}

/// Qualitative water requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterNeed {
    /// Low
    Faible,
    /// Medium
    Moyen,
    /// High
    #[serde(rename = "élevé")]
    Eleve,
}

/// Static crop record
#[derive(Debug, Clone, Serialize)]
pub struct CropInfo {
    /// Crop
    pub crop: Crop,
    /// Scientific name
    pub scientific_name: &'static str,
    /// Botanical family
    pub family: &'static str,
    /// French, English and local names
    pub local_names: &'static [&'static str],
    /// Growth cycle (days)
    pub cycle_days: u32,
    /// Temperature tolerance (°C)
    pub temperature_c: Span<f64>,
    /// Water requirement
    pub water_need: WaterNeed,
    /// Soil pH tolerance
    pub ph: Span<f64>,
    /// Suitable soils
    pub soils: &'static [SoilType],
    /// Regions where the crop is recommended
    pub regions: &'static [Region],
    /// Seasons in which it is planted
    pub seasons: &'static [Season],
    /// Usual planting months
    pub planting_months: &'static [u32],
    /// Usual harvest months
    pub harvest_months: &'static [u32],
    /// Average yield (kg/ha)
    pub yield_kg_ha: u32,
}

const ALL_MONTHS: &[u32] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

static CROPS: [CropInfo; 6] = [
    CropInfo {
        crop: Crop::Cacao,
        scientific_name: "Theobroma cacao",
        family: "Malvaceae",
        local_names: &["Cacao", "Cocoa"],
        cycle_days: 365,
        temperature_c: Span::new(21.0, 32.0),
        water_need: WaterNeed::Eleve,
        ph: Span::new(6.0, 7.0),
        soils: &[SoilType::Argileux, SoilType::Humifere],
        regions: &[Region::Centre, Region::Sud, Region::Littoral, Region::SudOuest],
        seasons: &[Season::SaisonDesPluies],
        planting_months: &[4, 5, 6, 9],
        harvest_months: &[9, 10, 11, 12, 1],
        yield_kg_ha: 600,
    },
    CropInfo {
        crop: Crop::Cafe,
        scientific_name: "Coffea arabica/robusta",
        family: "Rubiaceae",
        local_names: &["Café", "Coffee"],
        cycle_days: 365,
        temperature_c: Span::new(15.0, 24.0),
        water_need: WaterNeed::Moyen,
        ph: Span::new(6.0, 6.8),
        soils: &[SoilType::Volcanique, SoilType::Humifere],
        regions: &[Region::Ouest, Region::NordOuest, Region::Sud],
        seasons: &[Season::SaisonDesPluies],
        planting_months: &[4, 5],
        harvest_months: &[10, 11, 12, 1],
        yield_kg_ha: 800,
    },
    CropInfo {
        crop: Crop::Manioc,
        scientific_name: "Manihot esculenta",
        family: "Euphorbiaceae",
        local_names: &["Manioc", "Cassava", "Mianga"],
        cycle_days: 300,
        temperature_c: Span::new(20.0, 30.0),
        water_need: WaterNeed::Moyen,
        ph: Span::new(5.5, 6.5),
        soils: &[SoilType::Sableux, SoilType::Argileux, SoilType::Lateritique],
        regions: &Region::ALL,
        seasons: &[Season::SaisonDesPluies, Season::PetiteSaisonSeche],
        planting_months: &[3, 4, 5, 8, 9],
        harvest_months: &[11, 12, 1, 2, 3],
        yield_kg_ha: 15000,
    },
    CropInfo {
        crop: Crop::Mais,
        scientific_name: "Zea mays",
        family: "Poaceae",
        local_names: &["Maïs", "Corn", "Mbong"],
        cycle_days: 120,
        temperature_c: Span::new(18.0, 32.0),
        water_need: WaterNeed::Moyen,
        ph: Span::new(5.8, 7.0),
        soils: &[SoilType::Argileux, SoilType::Limoneux],
        regions: &[Region::Centre, Region::Ouest, Region::Adamaoua, Region::Nord],
        seasons: &[Season::SaisonDesPluies],
        planting_months: &[3, 4, 8, 9],
        harvest_months: &[6, 7, 11, 12],
        yield_kg_ha: 2500,
    },
    CropInfo {
        crop: Crop::Plantain,
        scientific_name: "Musa paradisiaca",
        family: "Musaceae",
        local_names: &["Plantain", "Kondré"],
        cycle_days: 365,
        temperature_c: Span::new(22.0, 30.0),
        water_need: WaterNeed::Eleve,
        ph: Span::new(6.0, 7.5),
        soils: &[SoilType::Humifere, SoilType::Argileux],
        regions: &[Region::Centre, Region::Sud, Region::Littoral, Region::Est],
        seasons: &[Season::SaisonDesPluies],
        planting_months: &[3, 4, 5, 9],
        harvest_months: ALL_MONTHS,
        yield_kg_ha: 20000,
    },
    CropInfo {
        crop: Crop::Arachide,
        scientific_name: "Arachis hypogaea",
        family: "Fabaceae",
        local_names: &["Arachide", "Peanut", "Nkassi"],
        cycle_days: 120,
        temperature_c: Span::new(20.0, 30.0),
        water_need: WaterNeed::Moyen,
        ph: Span::new(6.0, 7.0),
        soils: &[SoilType::Sableux, SoilType::Limoneux],
        regions: &[Region::Centre, Region::Nord, Region::Adamaoua, Region::ExtremeNord],
        seasons: &[Season::SaisonDesPluies],
        planting_months: &[3, 4, 8],
        harvest_months: &[6, 7, 11],
        yield_kg_ha: 1200,
    },
];

impl Crop {
    /// All crop keys
    pub const ALL: [Crop; 12] = [
        Crop::Cacao,
        Crop::Cafe,
        Crop::Manioc,
        Crop::Mais,
        Crop::Plantain,
        Crop::Arachide,
        Crop::Igname,
        Crop::Coton,
        Crop::PalmierAHuile,
        Crop::Tomate,
        Crop::Gombo,
        Crop::Piment,
    ];

    /// Table key (`"maïs"`, `"palmier_à_huile"`)
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Cacao => "cacao",
            Self::Cafe => "café",
            Self::Manioc => "manioc",
            Self::Mais => "maïs",
            Self::Plantain => "plantain",
            Self::Arachide => "arachide",
            Self::Igname => "igname",
            Self::Coton => "coton",
            Self::PalmierAHuile => "palmier_à_huile",
            Self::Tomate => "tomate",
            Self::Gombo => "gombo",
            Self::Piment => "piment",
        }
    }

    /// Human-readable French name
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::PalmierAHuile => "palmier à huile",
            other => other.key(),
        }
    }

    /// Detailed record, if one is tabulated
    #[must_use]
    pub fn info(&self) -> Option<&'static CropInfo> {
        CROPS.iter().find(|c| c.crop == *self)
    }

    /// Botanical family, used for rotation advice
    #[must_use]
    pub fn family(&self) -> &'static str {
        match self.info() {
            Some(info) => info.family,
            None => match self {
                Self::Igname => "Dioscoreaceae",
                Self::Coton | Self::Gombo => "Malvaceae",
                Self::PalmierAHuile => "Arecaceae",
                Self::Tomate | Self::Piment => "Solanaceae",
                _ => "inconnue",
            },
        }
    }

    /// Nitrogen-fixing legume
    #[must_use]
    pub fn is_legume(&self) -> bool {
        self.family() == "Fabaceae"
    }

    /// Tree or multi-year crop
    #[must_use]
    pub fn is_perennial(&self) -> bool {
        matches!(self, Self::Cacao | Self::Cafe | Self::PalmierAHuile | Self::Plantain)
    }

    /// Growth cycle in days, 120 when untabulated
    #[must_use]
    pub fn cycle_days(&self) -> u32 {
        self.info().map_or(120, |i| i.cycle_days)
    }

    /// Crops with a detailed record
    pub fn detailed() -> impl Iterator<Item = &'static CropInfo> {
        CROPS.iter()
    }

    /// Find a crop mentioned in free text
    #[must_use]
    pub fn find_in_text(text: &str) -> Option<Crop> {
        let normalized = format!(" {} ", normalize_key(text));
        normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .find_map(|word| word.parse().ok())
            .or_else(|| {
                normalized
                    .contains(" palmier a huile ")
                    .then_some(Crop::PalmierAHuile)
            })
    }
}

/// Detailed crops recommended for a region
#[must_use]
pub fn suitable_crops(region: Region) -> Vec<&'static CropInfo> {
    CROPS.iter().filter(|c| c.regions.contains(&region)).collect()
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Crop {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let crop = match normalize_key(s).as_str() {
            "cacao" | "cocoa" | "cacaoyer" => Self::Cacao,
            "cafe" | "coffee" | "cafeier" => Self::Cafe,
            "manioc" | "cassava" | "mianga" => Self::Manioc,
            "mais" | "maize" | "corn" | "mbong" => Self::Mais,
            "plantain" | "banane plantain" | "kondre" => Self::Plantain,
            "arachide" | "arachides" | "peanut" | "groundnut" | "nkassi" => Self::Arachide,
            "igname" | "yam" => Self::Igname,
            "coton" | "cotton" => Self::Coton,
            "palmier a huile" | "palmier" | "oil palm" | "palme" => Self::PalmierAHuile,
            "tomate" | "tomates" | "tomato" => Self::Tomate,
            "gombo" | "okra" => Self::Gombo,
            "piment" | "chili" => Self::Piment,
            _ => return Err(Error::UnknownCrop(s.to_string())),
        };
        Ok(crop)
    }
}

impl TryFrom<String> for Crop {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crop_aliases() {
        assert_eq!("Maïs".parse::<Crop>().unwrap(), Crop::Mais);
        assert_eq!("mais".parse::<Crop>().unwrap(), Crop::Mais);
        assert_eq!("palmier_à_huile".parse::<Crop>().unwrap(), Crop::PalmierAHuile);
        assert_eq!("cassava".parse::<Crop>().unwrap(), Crop::Manioc);
        assert!("riz".parse::<Crop>().is_err());
    }

    #[test]
    fn test_six_detailed_records() {
        assert_eq!(Crop::detailed().count(), 6);
        let maize = Crop::Mais.info().unwrap();
        assert_eq!(maize.cycle_days, 120);
        assert_eq!(maize.yield_kg_ha, 2500);
        assert!(Crop::Gombo.info().is_none());
        assert_eq!(Crop::Gombo.cycle_days(), 120);
    }

    #[test]
    fn test_suitable_crops_for_north() {
        let crops: Vec<Crop> = suitable_crops(Region::Nord).iter().map(|c| c.crop).collect();
        assert!(crops.contains(&Crop::Mais));
        assert!(crops.contains(&Crop::Arachide));
        assert!(crops.contains(&Crop::Manioc));
        assert!(!crops.contains(&Crop::Cacao));
    }

    #[test]
    fn test_families() {
        assert!(Crop::Arachide.is_legume());
        assert!(!Crop::Mais.is_legume());
        assert_eq!(Crop::Tomate.family(), "Solanaceae");
    }

    #[test]
    fn test_find_crop_in_text() {
        assert_eq!(
            Crop::find_in_text("Mon maïs a des taches jaunes"),
            Some(Crop::Mais)
        );
        assert_eq!(Crop::find_in_text("prix du palmier à huile"), Some(Crop::PalmierAHuile));
        assert_eq!(Crop::find_in_text("bonjour"), None);
    }

    #[test]
    fn test_soil_parse() {
        assert_eq!("Argileux".parse::<SoilType>().unwrap(), SoilType::Argileux);
        assert_eq!("latéritique".parse::<SoilType>().unwrap(), SoilType::Lateritique);
        assert!("béton".parse::<SoilType>().is_err());
    }
}
