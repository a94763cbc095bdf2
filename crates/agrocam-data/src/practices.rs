//! Local inputs, equipment and traditional practices

use crate::crop::Crop;
use crate::region::AgroZone;
use serde::Serialize;

/// Locally available fertilizer
#[derive(Debug, Clone, Serialize)]
pub struct Fertilizer {
    /// Table key
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    /// organique, minéral or chimique
    pub kind: &'static str,
    /// Nutrient content
    pub composition: &'static str,
    /// Application rate per hectare
    pub rate_per_ha: &'static str,
    /// Price (FCFA)
    pub price: u32,
    /// Unit the price applies to
    pub price_unit: &'static str,
}

/// Farm equipment
#[derive(Debug, Clone, Serialize)]
pub struct FarmTool {
    /// Name
    pub name: &'static str,
    /// Motorised equipment
    pub mechanised: bool,
    /// Indicative price (FCFA)
    pub price: u32,
}

/// Traditional technique
#[derive(Debug, Clone, Serialize)]
pub struct Technique {
    /// Table key
    pub key: &'static str,
    /// Benefits
    pub benefits: &'static [&'static str],
    /// Worked examples
    pub examples: &'static [&'static str],
    /// Typical duration
    pub duration: Option<&'static str>,
}

/// Planting window of the zone calendar
#[derive(Debug, Clone, Serialize)]
pub struct PlantingWindow {
    /// Zone
    pub zone: AgroZone,
    /// Season label
    pub season: &'static str,
    /// Months (empty means all year)
    pub months: &'static [u32],
    /// Crops sown in the window
    pub crops: &'static [&'static str],
}

/// Crop association with its benefit
#[derive(Debug, Clone, Serialize)]
pub struct Association {
    /// Main crop
    pub main: Crop,
    /// Companion
    pub companion: &'static str,
    /// Benefit
    pub benefit: &'static str,
}

static FERTILIZERS: [Fertilizer; 4] = [
    Fertilizer {
        key: "fumier_bovin",
        name: "Fumier bovin",
        kind: "organique",
        composition: "NPK 1-0.5-1",
        rate_per_ha: "10-15 tonnes",
        price: 15000,
        price_unit: "tonne",
    },
    Fertilizer {
        key: "compost",
        name: "Compost",
        kind: "organique",
        composition: "NPK 1.5-1-1.5",
        rate_per_ha: "5-10 tonnes",
        price: 10000,
        price_unit: "tonne",
    },
    Fertilizer {
        key: "cendres_bois",
        name: "Cendres de bois",
        kind: "minéral",
        composition: "K, Ca, Mg",
        rate_per_ha: "500 kg",
        price: 50,
        price_unit: "kg",
    },
    Fertilizer {
        key: "npk_1520",
        name: "NPK 15-20-15",
        kind: "chimique",
        composition: "NPK 15-20-15",
        rate_per_ha: "200-300 kg",
        price: 400,
        price_unit: "kg",
    },
];

static TOOLS: [FarmTool; 7] = [
    FarmTool { name: "machette", mechanised: false, price: 2500 },
    FarmTool { name: "houe", mechanised: false, price: 3000 },
    FarmTool { name: "serfouette", mechanised: false, price: 2000 },
    FarmTool { name: "pulvérisateur à dos", mechanised: false, price: 25000 },
    FarmTool { name: "motoculteur", mechanised: true, price: 500_000 },
    FarmTool { name: "tronçonneuse", mechanised: true, price: 150_000 },
    FarmTool { name: "motopompe", mechanised: true, price: 100_000 },
];

static TECHNIQUES: [Technique; 3] = [
    Technique {
        key: "association_culturale",
        benefits: &["Optimisation de l'espace", "Réduction des risques", "Amélioration du sol"],
        examples: &[
            "maïs-haricot: le haricot fixe l'azote",
            "cacao-plantain: ombrage",
            "manioc-arachide: optimisation du sol",
        ],
        duration: None,
    },
    Technique {
        key: "jachère_améliorée",
        benefits: &["Restauration fertilité", "Contrôle adventices"],
        examples: &["jachère à légumineuses (mucuna, pueraria)"],
        duration: Some("2-3 ans"),
    },
    Technique {
        key: "compostage",
        benefits: &["Valorisation des résidus", "Fertilisation à faible coût"],
        examples: &["Résidus de culture", "Fumier", "Cendres"],
        duration: Some("3-6 mois"),
    },
];

static ASSOCIATIONS: [Association; 4] = [
    Association { main: Crop::Mais, companion: "haricot", benefit: "le haricot fixe l'azote" },
    Association { main: Crop::Cacao, companion: "plantain", benefit: "ombrage des jeunes cacaoyers" },
    Association { main: Crop::Manioc, companion: "arachide", benefit: "optimisation du sol" },
    Association { main: Crop::Plantain, companion: "cacao", benefit: "revenu pendant l'installation du verger" },
];

static CALENDAR: [PlantingWindow; 5] = [
    PlantingWindow {
        zone: AgroZone::Forest,
        season: "première saison",
        months: &[3, 4, 5],
        crops: &["maïs", "arachide", "haricot"],
    },
    PlantingWindow {
        zone: AgroZone::Forest,
        season: "deuxième saison",
        months: &[8, 9],
        crops: &["maïs", "légumes"],
    },
    PlantingWindow {
        zone: AgroZone::Forest,
        season: "toute l'année",
        months: &[],
        crops: &["manioc", "plantain", "légumes feuilles"],
    },
    PlantingWindow {
        zone: AgroZone::Savanna,
        season: "saison des pluies",
        months: &[5, 6, 7],
        crops: &["maïs", "sorgho", "mil", "arachide", "coton"],
    },
    PlantingWindow {
        zone: AgroZone::Savanna,
        season: "contre-saison",
        months: &[10, 11, 12],
        crops: &["maraîchage", "riz irrigué"],
    },
];

/// Local fertilizers
#[must_use]
pub fn fertilizers() -> &'static [Fertilizer] {
    &FERTILIZERS
}

/// Fertilizer by key
#[must_use]
pub fn fertilizer(key: &str) -> Option<&'static Fertilizer> {
    FERTILIZERS.iter().find(|f| f.key == key)
}

/// Equipment, manual or mechanised
pub fn farm_tools(mechanised: bool) -> impl Iterator<Item = &'static FarmTool> {
    TOOLS.iter().filter(move |t| t.mechanised == mechanised)
}

/// Traditional techniques
#[must_use]
pub fn techniques() -> &'static [Technique] {
    &TECHNIQUES
}

/// Associations where `crop` is the main crop
pub fn associations_for(crop: Crop) -> impl Iterator<Item = &'static Association> {
    ASSOCIATIONS.iter().filter(move |a| a.main == crop)
}

/// Planting windows of a zone
pub fn planting_windows(zone: AgroZone) -> impl Iterator<Item = &'static PlantingWindow> {
    CALENDAR.iter().filter(move |w| w.zone == zone)
}
