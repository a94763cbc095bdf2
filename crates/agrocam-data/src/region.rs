//! The ten administrative regions and their agro-climatic profile

use crate::crop::SoilType;
use crate::error::{Error, Result};
use crate::text::normalize_key;
use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Administrative region of Cameroon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Region {
    /// Centre (Yaoundé)
    Centre,
    /// Littoral (Douala)
    Littoral,
    /// Ouest (Bafoussam)
    Ouest,
    /// Sud (Ebolowa)
    Sud,
    /// Est (Bertoua)
    Est,
    /// Nord (Garoua)
    Nord,
    /// Adamaoua (Ngaoundéré)
    Adamaoua,
    /// Extrême-Nord (Maroua)
    #[serde(rename = "Extrême-Nord")]
    ExtremeNord,
    /// Nord-Ouest (Bamenda)
    #[serde(rename = "Nord-Ouest")]
    NordOuest,
    /// Sud-Ouest (Buea)
    #[serde(rename = "Sud-Ouest")]
    SudOuest,
}

/// Broad agro-ecological zone, used by the planting calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgroZone {
    /// Humid forest and western highlands, bimodal rains
    #[serde(rename = "zone_forestière")]
    Forest,
    /// Guinea and Sudano-Sahelian savanna, single rainy season
    #[serde(rename = "zone_savane")]
    Savanna,
}

/// Static profile of a region
#[derive(Debug, Clone, Serialize)]
pub struct RegionInfo {
    /// Region
    pub region: Region,
    /// Climate classification
    pub climate: &'static str,
    /// Dominant soil types
    pub soils: &'static [SoilType],
    /// Primary crops and activities
    pub main_crops: &'static [&'static str],
    /// Annual rainfall band (mm)
    pub rainfall_mm: Span<u32>,
    /// Typical annual rainfall used for water balances (mm)
    pub reference_rainfall_mm: u32,
    /// Temperature band (°C)
    pub temperature_c: Span<f64>,
    /// Months of the rainy season(s)
    pub wet_months: &'static [u32],
    /// Main agricultural towns
    pub zones: &'static [&'static str],
    /// Regional capital (lat, lon)
    pub capital: (&'static str, f64, f64),
}

impl RegionInfo {
    /// Months outside the rainy season(s)
    #[must_use]
    pub fn dry_months(&self) -> Vec<u32> {
        (1..=12).filter(|m| !self.wet_months.contains(m)).collect()
    }
}

const BIMODAL_WET: &[u32] = &[3, 4, 5, 8, 9, 10, 11];
const HIGHLAND_WET: &[u32] = &[3, 4, 5, 8, 9, 10];
const SAHEL_WET: &[u32] = &[6, 7, 8, 9];

static REGIONS: [RegionInfo; 10] = [
    RegionInfo {
        region: Region::Centre,
        climate: "Équatorial de transition",
        soils: &[SoilType::Argileux, SoilType::Lateritique],
        main_crops: &["manioc", "maïs", "plantain", "arachide"],
        rainfall_mm: Span::new(1000, 1600),
        reference_rainfall_mm: 1400,
        temperature_c: Span::new(22.0, 28.0),
        wet_months: BIMODAL_WET,
        zones: &["Yaoundé", "Mbalmayo", "Obala", "Mfou", "Soa"],
        capital: ("Yaoundé", 3.848, 11.502),
    },
    RegionInfo {
        region: Region::Littoral,
        climate: "Équatorial humide",
        soils: &[SoilType::Argileux, SoilType::Sableux],
        main_crops: &["cacao", "palmier à huile", "plantain", "manioc"],
        rainfall_mm: Span::new(1500, 4000),
        reference_rainfall_mm: 2800,
        temperature_c: Span::new(24.0, 30.0),
        wet_months: BIMODAL_WET,
        zones: &["Douala", "Edéa", "Nkongsamba", "Pouma", "Dizangué"],
        capital: ("Douala", 4.051, 9.768),
    },
    RegionInfo {
        region: Region::Ouest,
        climate: "Tropical d'altitude",
        soils: &[SoilType::Volcanique, SoilType::Humifere],
        main_crops: &["café", "maraîchage", "pomme de terre", "haricot"],
        rainfall_mm: Span::new(1500, 2000),
        reference_rainfall_mm: 1800,
        temperature_c: Span::new(18.0, 25.0),
        wet_months: HIGHLAND_WET,
        zones: &["Bafoussam", "Dschang", "Mbouda", "Bangangté", "Foumban"],
        capital: ("Bafoussam", 5.478, 10.417),
    },
    RegionInfo {
        region: Region::Sud,
        climate: "Équatorial humide",
        soils: &[SoilType::Argileux, SoilType::Lateritique],
        main_crops: &["cacao", "café", "plantain", "manioc"],
        rainfall_mm: Span::new(1500, 2000),
        reference_rainfall_mm: 1600,
        temperature_c: Span::new(23.0, 28.0),
        wet_months: BIMODAL_WET,
        zones: &["Ebolowa", "Sangmélima", "Kribi", "Ambam", "Lolodorf"],
        capital: ("Ebolowa", 2.900, 11.150),
    },
    RegionInfo {
        region: Region::Est,
        climate: "Équatorial humide",
        soils: &[SoilType::Lateritique, SoilType::Argileux],
        main_crops: &["manioc", "plantain", "café", "cacao"],
        rainfall_mm: Span::new(1500, 1800),
        reference_rainfall_mm: 1500,
        temperature_c: Span::new(23.0, 28.0),
        wet_months: BIMODAL_WET,
        zones: &["Bertoua", "Batouri", "Yokadouma", "Abong-Mbang", "Kette"],
        capital: ("Bertoua", 4.577, 13.684),
    },
    RegionInfo {
        region: Region::Nord,
        climate: "Tropical sec",
        soils: &[SoilType::Sableux, SoilType::Argileux],
        main_crops: &["coton", "arachide", "mil", "sorgho"],
        rainfall_mm: Span::new(900, 1200),
        reference_rainfall_mm: 1000,
        temperature_c: Span::new(25.0, 35.0),
        wet_months: SAHEL_WET,
        zones: &["Garoua", "Guider", "Figuil", "Pitoa", "Bibemi"],
        capital: ("Garoua", 9.301, 13.397),
    },
    RegionInfo {
        region: Region::Adamaoua,
        climate: "Tropical d'altitude",
        soils: &[SoilType::Lateritique, SoilType::Volcanique],
        main_crops: &["maïs", "arachide", "igname", "élevage"],
        rainfall_mm: Span::new(1200, 1500),
        reference_rainfall_mm: 1300,
        temperature_c: Span::new(20.0, 28.0),
        wet_months: HIGHLAND_WET,
        zones: &["Ngaoundéré", "Meiganga", "Banyo", "Tibati", "Tignère"],
        capital: ("Ngaoundéré", 7.327, 13.584),
    },
    RegionInfo {
        region: Region::ExtremeNord,
        climate: "Sahélien",
        soils: &[SoilType::Sableux, SoilType::Argileux],
        main_crops: &["mil", "sorgho", "niébé", "arachide"],
        rainfall_mm: Span::new(400, 800),
        reference_rainfall_mm: 600,
        temperature_c: Span::new(28.0, 40.0),
        wet_months: SAHEL_WET,
        zones: &["Maroua", "Mokolo", "Kousseri", "Waza", "Mora"],
        capital: ("Maroua", 10.591, 14.316),
    },
    RegionInfo {
        region: Region::NordOuest,
        climate: "Tropical d'altitude",
        soils: &[SoilType::Volcanique, SoilType::Humifere],
        main_crops: &["café", "maraîchage", "igname", "maïs"],
        rainfall_mm: Span::new(1200, 2000),
        reference_rainfall_mm: 1600,
        temperature_c: Span::new(18.0, 26.0),
        wet_months: HIGHLAND_WET,
        zones: &["Bamenda", "Kumbo", "Wum", "Nkambe", "Fundong"],
        capital: ("Bamenda", 5.963, 10.159),
    },
    RegionInfo {
        region: Region::SudOuest,
        climate: "Équatorial humide",
        soils: &[SoilType::Volcanique, SoilType::Argileux],
        main_crops: &["palmier à huile", "cacao", "café", "plantain"],
        rainfall_mm: Span::new(2000, 4000),
        reference_rainfall_mm: 3000,
        temperature_c: Span::new(22.0, 28.0),
        wet_months: HIGHLAND_WET,
        zones: &["Buea", "Limbe", "Kumba", "Mamfe", "Idenau"],
        capital: ("Buea", 4.155, 9.241),
    },
];

impl Region {
    /// All regions in table order
    pub const ALL: [Region; 10] = [
        Region::Centre,
        Region::Littoral,
        Region::Ouest,
        Region::Sud,
        Region::Est,
        Region::Nord,
        Region::Adamaoua,
        Region::ExtremeNord,
        Region::NordOuest,
        Region::SudOuest,
    ];

    /// Canonical French name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Centre => "Centre",
            Self::Littoral => "Littoral",
            Self::Ouest => "Ouest",
            Self::Sud => "Sud",
            Self::Est => "Est",
            Self::Nord => "Nord",
            Self::Adamaoua => "Adamaoua",
            Self::ExtremeNord => "Extrême-Nord",
            Self::NordOuest => "Nord-Ouest",
            Self::SudOuest => "Sud-Ouest",
        }
    }

    /// Static profile
    #[must_use]
    pub fn info(&self) -> &'static RegionInfo {
        // Table order matches `ALL`
        &REGIONS[*self as usize]
    }

    /// Agro-ecological zone
    #[must_use]
    pub fn zone(&self) -> AgroZone {
        match self {
            Self::Nord | Self::ExtremeNord | Self::Adamaoua => AgroZone::Savanna,
            _ => AgroZone::Forest,
        }
    }

    /// Nord and Extrême-Nord share the single Sahelian rainy season
    #[must_use]
    pub fn is_sahelian(&self) -> bool {
        matches!(self, Self::Nord | Self::ExtremeNord)
    }

    /// Whether a rainy season covers `month`
    #[must_use]
    pub fn is_wet_month(&self, month: u32) -> bool {
        self.info().wet_months.contains(&month)
    }

    /// Region whose capital is closest to the given coordinates
    #[must_use]
    pub fn nearest(lat: f64, lon: f64) -> Region {
        let mut best = Region::Centre;
        let mut best_km = f64::MAX;
        for region in Self::ALL {
            let (_, clat, clon) = region.info().capital;
            let km = crate::utils::geo::haversine_km(lat, lon, clat, clon);
            if km < best_km {
                best_km = km;
                best = region;
            }
        }
        best
    }

    /// Find a region or one of its towns mentioned in free text
    #[must_use]
    pub fn find_in_text(text: &str) -> Option<Region> {
        let normalized = format!(" {} ", normalize_key(text));
        // Compound names first so "nord ouest" is not read as "nord"
        let mut by_length: Vec<Region> = Self::ALL.to_vec();
        by_length.sort_by_key(|r| std::cmp::Reverse(r.name().len()));
        for region in &by_length {
            // "est" is also the verb; only "l'Est" names the region
            let needle = match region {
                Region::Est => " l est ".to_string(),
                other => format!(" {} ", normalize_key(other.name())),
            };
            if normalized.contains(&needle) {
                return Some(*region);
            }
        }
        Self::ALL.into_iter().find(|region| {
            region
                .info()
                .zones
                .iter()
                .any(|town| normalized.contains(&format!(" {} ", normalize_key(town))))
        })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let region = match normalize_key(s).as_str() {
            "centre" | "center" => Self::Centre,
            "littoral" => Self::Littoral,
            "ouest" | "west" => Self::Ouest,
            "sud" | "south" => Self::Sud,
            "est" | "east" => Self::Est,
            "nord" | "north" => Self::Nord,
            "adamaoua" | "adamawa" => Self::Adamaoua,
            "extreme nord" | "far north" => Self::ExtremeNord,
            "nord ouest" | "north west" | "northwest" => Self::NordOuest,
            "sud ouest" | "south west" | "southwest" => Self::SudOuest,
            _ => return Err(Error::UnknownRegion(s.to_string())),
        };
        Ok(region)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.name().to_string()
    }
}

impl TryFrom<String> for Region {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}
