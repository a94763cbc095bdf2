//! Diseases and pests per crop

use crate::crop::Crop;
use serde::Serialize;

/// Disease record
#[derive(Debug, Clone, Serialize)]
pub struct DiseaseRecord {
    /// Host crop
    pub crop: Crop,
    /// Common French name
    pub name: &'static str,
    /// Causal agent (fungus, virus, insect)
    pub agent: &'static str,
    /// Observable symptoms, lowercase
    pub symptoms: &'static [&'static str],
    /// Affected plant parts
    pub affected_parts: &'static [&'static str],
    /// Environmental triggers
    pub conditions: &'static [&'static str],
    /// Severity label
    pub severity: &'static str,
    /// Recommended treatments
    pub treatments: &'static [&'static str],
    /// Preventive practices
    pub prevention: &'static [&'static str],
}

/// Pest record
#[derive(Debug, Clone, Serialize)]
pub struct PestRecord {
    /// Host crop
    pub crop: Crop,
    /// Common French name
    pub name: &'static str,
    /// Scientific name
    pub scientific_name: &'static str,
    /// Visual description
    pub description: &'static str,
    /// Typical damage
    pub damage: &'static [&'static str],
    /// Where it is found on the plant
    pub location: &'static [&'static str],
    /// Life cycle duration
    pub life_cycle: &'static str,
    /// Period of peak infestation
    pub peak_period: &'static str,
    /// Economic impact label
    pub economic_impact: &'static str,
}

static DISEASES: [DiseaseRecord; 6] = [
    DiseaseRecord {
        crop: Crop::Cacao,
        name: "Pourriture brune",
        agent: "Phytophthora palmivora",
        symptoms: &["taches brunes", "pourriture fruits", "brunissement cabosses", "exsudat"],
        affected_parts: &["fruits", "cabosses", "branches"],
        conditions: &["humidité élevée", "température 25-30°c", "blessures"],
        severity: "élevée",
        treatments: &["fongicides cupriques", "taille sanitaire", "amélioration drainage"],
        prevention: &[
            "récolte régulière des cabosses",
            "élimination des cabosses malades",
            "espacement adéquat",
        ],
    },
    DiseaseRecord {
        crop: Crop::Cacao,
        name: "Mirides",
        agent: "Sahlbergella singularis",
        symptoms: &["taches noires", "dessèchement branches", "écoulement sève", "chancres"],
        affected_parts: &["branches", "tronc", "rameaux"],
        conditions: &["saison sèche", "stress hydrique", "mauvais entretien"],
        severity: "très élevée",
        treatments: &["insecticides", "taille parties atteintes", "amélioration ombrage"],
        prevention: &["ombrage équilibré", "surveillance en saison sèche"],
    },
    DiseaseRecord {
        crop: Crop::Cacao,
        name: "Chancre du cacaoyer",
        agent: "Phytophthora megakarya",
        symptoms: &["chancres bruns", "exsudat noir", "flétrissement", "défoliation"],
        affected_parts: &["tronc", "branches", "fruits"],
        conditions: &["blessures", "humidité", "mauvaise ventilation"],
        severity: "critique",
        treatments: &["fongicides systémiques", "curettage chancres", "mastication"],
        prevention: &["éviter les blessures au tronc", "désinfection des outils"],
    },
    DiseaseRecord {
        crop: Crop::Mais,
        name: "Charbon du maïs",
        agent: "Ustilago maydis",
        symptoms: &["galles blanches", "galles noires", "déformation épis", "spores noires"],
        affected_parts: &["épis", "feuilles", "tiges"],
        conditions: &["humidité", "blessures", "variété sensible"],
        severity: "modérée",
        treatments: &["variétés résistantes", "rotation culturale", "élimination galles"],
        prevention: &["semences certifiées", "rotation sur 2 ans"],
    },
    DiseaseRecord {
        crop: Crop::Mais,
        name: "Striure du maïs",
        agent: "Maize streak virus",
        symptoms: &["striures jaunes", "nanisme", "déformation feuilles", "rendement réduit"],
        affected_parts: &["feuilles", "plant entier"],
        conditions: &["cicadelles vectrices", "saison des pluies"],
        severity: "élevée",
        treatments: &["variétés résistantes", "lutte contre cicadelles", "dates plantation"],
        prevention: &["semis précoce", "destruction des repousses"],
    },
    DiseaseRecord {
        crop: Crop::Manioc,
        name: "Mosaïque du manioc",
        agent: "Cassava mosaic virus",
        symptoms: &["mosaïque feuilles", "jaunissement", "déformation", "nanisme"],
        affected_parts: &["feuilles", "plant entier"],
        conditions: &["boutures infectées", "aleurodes vectrices"],
        severity: "élevée",
        treatments: &["boutures saines", "lutte contre aleurodes", "variétés résistantes"],
        prevention: &["sélection de boutures saines", "arrachage des plants malades"],
    },
];

static PESTS: [PestRecord; 5] = [
    PestRecord {
        crop: Crop::Cacao,
        name: "Mirides",
        scientific_name: "Sahlbergella singularis",
        description: "Insecte brun-noir, 10-12mm, antennes longues",
        damage: &["taches noires branches", "dessèchement", "écoulement sève"],
        location: &["branches", "tronc", "rameaux"],
        life_cycle: "45-60 jours",
        peak_period: "saison sèche",
        economic_impact: "très élevé",
    },
    PestRecord {
        crop: Crop::Cacao,
        name: "Punaises des cabosses",
        scientific_name: "Bathycoelia thalassina",
        description: "Punaise verte, 8-10mm, forme ovale",
        damage: &["piqûres cabosses", "déformation fruits", "coulure"],
        location: &["cabosses", "fruits"],
        life_cycle: "30-40 jours",
        peak_period: "saison des pluies",
        economic_impact: "élevé",
    },
    PestRecord {
        crop: Crop::Mais,
        name: "Foreur de tige",
        scientific_name: "Sesamia calamistis",
        description: "Chenille rosâtre, 25-40mm, tête brune",
        damage: &["trous dans tiges", "brisure plants", "flétrissement"],
        location: &["tiges", "épis"],
        life_cycle: "35-45 jours",
        peak_period: "début saison pluies",
        economic_impact: "élevé",
    },
    PestRecord {
        crop: Crop::Mais,
        name: "Légionnaire d'automne",
        scientific_name: "Spodoptera frugiperda",
        description: "Chenille gris-brun, 30-40mm, rayures longitudinales",
        damage: &["défoliation", "consommation grains", "trous feuilles"],
        location: &["feuilles", "épis", "grains"],
        life_cycle: "30-35 jours",
        peak_period: "toute l'année",
        economic_impact: "très élevé",
    },
    PestRecord {
        crop: Crop::Manioc,
        name: "Cochenille farineuse",
        scientific_name: "Phenacoccus manihoti",
        description: "Insecte blanc farineux, 2-4mm, colonies denses",
        damage: &["jaunissement feuilles", "déformation", "fumagine"],
        location: &["feuilles", "tiges", "bourgeons"],
        life_cycle: "20-30 jours",
        peak_period: "saison sèche",
        economic_impact: "élevé",
    },
];

/// Known diseases of a crop (may be empty)
#[must_use]
pub fn diseases_for(crop: Crop) -> Vec<&'static DiseaseRecord> {
    DISEASES.iter().filter(|d| d.crop == crop).collect()
}

/// Known pests of a crop (may be empty)
#[must_use]
pub fn pests_for(crop: Crop) -> Vec<&'static PestRecord> {
    PESTS.iter().filter(|p| p.crop == crop).collect()
}

/// Every disease record
pub fn all_diseases() -> impl Iterator<Item = &'static DiseaseRecord> {
    DISEASES.iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diseases_by_crop() {
        let cacao: Vec<&str> = diseases_for(Crop::Cacao).iter().map(|d| d.name).collect();
        assert_eq!(cacao, vec!["Pourriture brune", "Mirides", "Chancre du cacaoyer"]);
        assert_eq!(diseases_for(Crop::Manioc).len(), 1);
        assert!(diseases_for(Crop::Gombo).is_empty());
    }

    #[test]
    fn test_disease_names_unique_per_crop() {
        for crop in Crop::ALL {
            let mut names: Vec<&str> = diseases_for(crop).iter().map(|d| d.name).collect();
            let before = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(before, names.len(), "duplicate disease for {crop}");
        }
    }

    #[test]
    fn test_pests_by_crop() {
        assert_eq!(pests_for(Crop::Mais).len(), 2);
        assert_eq!(pests_for(Crop::Manioc)[0].scientific_name, "Phenacoccus manihoti");
    }
}
