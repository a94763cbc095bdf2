//! Resource tools: soil, fertilization, irrigation, land suitability,
//! nutrient budgets and amendments
//!
//! Agronomic coefficients exist for the six main crops; any other crop is
//! evaluated with the maize coefficients.

use crate::domain::DomainTool;
use crate::env::ToolEnv;
use crate::error::{Error, Result};
use crate::input::{number, opt_number, positive, round1, run, string_list};
use crate::registry::{ToolCategory, ToolDefinition};
use agrocam_data::practices::{fertilizer, Fertilizer};
use agrocam_data::text::normalize_key;
use agrocam_data::{Crop, Region, SoilType, Span};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// =============================================================================
// Soil requirements
// =============================================================================

/// Soil a crop needs
#[derive(Debug, Clone, Serialize)]
pub struct SoilProfile {
    /// Optimal pH
    pub ph_optimal: Span<f64>,
    /// Useful rooting depth (cm)
    pub root_depth_cm: u32,
    /// Drainage
    pub drainage: &'static str,
    /// Organic matter (%): minimum and optimum
    pub organic_matter: Span<f64>,
    /// Suitable textures
    pub textures: &'static [&'static str],
    /// Most demanded nutrients
    pub key_nutrients: &'static [&'static str],
}

static MAIZE_SOIL: SoilProfile = SoilProfile {
    ph_optimal: Span::new(5.8, 7.0),
    root_depth_cm: 80,
    drainage: "bon",
    organic_matter: Span::new(2.0, 4.0),
    textures: &["limoneux", "argilo-limoneux", "limono-sableux"],
    key_nutrients: &["azote", "phosphore", "potassium"],
};

/// Soil needs of a crop (maize coefficients when untabulated)
#[must_use]
pub fn soil_profile(crop: Crop) -> &'static SoilProfile {
    static CACAO: SoilProfile = SoilProfile {
        ph_optimal: Span::new(6.0, 7.0),
        root_depth_cm: 150,
        drainage: "bon",
        organic_matter: Span::new(3.0, 5.0),
        textures: &["argilo-limoneux", "limoneux"],
        key_nutrients: &["azote", "potassium", "magnésium"],
    };
    static CAFE: SoilProfile = SoilProfile {
        ph_optimal: Span::new(6.0, 6.8),
        root_depth_cm: 120,
        drainage: "excellent",
        organic_matter: Span::new(4.0, 6.0),
        textures: &["volcanique", "limoneux"],
        key_nutrients: &["azote", "potassium", "calcium"],
    };
    static MANIOC: SoilProfile = SoilProfile {
        ph_optimal: Span::new(5.5, 6.5),
        root_depth_cm: 60,
        drainage: "bon",
        organic_matter: Span::new(1.5, 3.0),
        textures: &["sableux", "limono-sableux"],
        key_nutrients: &["potassium", "phosphore"],
    };
    static PLANTAIN: SoilProfile = SoilProfile {
        ph_optimal: Span::new(6.0, 7.5),
        root_depth_cm: 100,
        drainage: "bon",
        organic_matter: Span::new(3.0, 5.0),
        textures: &["limoneux", "humifère"],
        key_nutrients: &["potassium", "azote", "magnésium"],
    };
    static ARACHIDE: SoilProfile = SoilProfile {
        ph_optimal: Span::new(6.0, 7.0),
        root_depth_cm: 50,
        drainage: "excellent",
        organic_matter: Span::new(2.0, 3.5),
        textures: &["sableux", "limono-sableux"],
        key_nutrients: &["calcium", "phosphore", "soufre"],
    };
    match crop {
        Crop::Cacao => &CACAO,
        Crop::Cafe => &CAFE,
        Crop::Manioc => &MANIOC,
        Crop::Plantain => &PLANTAIN,
        Crop::Arachide => &ARACHIDE,
        _ => &MAIZE_SOIL,
    }
}

/// Typical soil of a region
#[derive(Debug, Clone, Serialize)]
pub struct RegionalSoil {
    /// Soil family
    pub kind: &'static str,
    /// Typical pH
    pub ph: f64,
    /// Typical organic matter (%)
    pub organic_matter: f64,
    /// Known limitations
    pub constraints: &'static [&'static str],
}

/// Typical soil of the region's zone
#[must_use]
pub fn regional_soil(region: Region) -> &'static RegionalSoil {
    static FERRALLITIC: RegionalSoil = RegionalSoil {
        kind: "ferrallitique",
        ph: 4.8,
        organic_matter: 2.5,
        constraints: &["acidité", "pauvreté en bases", "lixiviation"],
    };
    static VOLCANIC: RegionalSoil = RegionalSoil {
        kind: "volcanique",
        ph: 5.8,
        organic_matter: 4.2,
        constraints: &["pentes", "érosion potentielle"],
    };
    static FERRUGINOUS: RegionalSoil = RegionalSoil {
        kind: "ferrugineux",
        ph: 6.2,
        organic_matter: 1.8,
        constraints: &["faible matière organique", "carence en phosphore", "battance"],
    };
    match region {
        Region::Ouest | Region::NordOuest => &VOLCANIC,
        Region::Nord | Region::ExtremeNord | Region::Adamaoua => &FERRUGINOUS,
        _ => &FERRALLITIC,
    }
}

/// Corrective action on a field
#[derive(Debug, Clone, Serialize)]
pub struct Improvement {
    /// What to do
    pub action: &'static str,
    /// Why
    pub reason: String,
    /// Quantity (t/ha)
    pub quantity_t_ha: f64,
    /// Cost per hectare (FCFA)
    pub cost_fcfa: f64,
}

/// Crop needs against the regional soil
#[derive(Debug, Clone, Serialize)]
pub struct SoilRequirements {
    /// Crop
    pub crop: Crop,
    /// Region
    pub region: Region,
    /// What the crop needs
    pub requirements: &'static SoilProfile,
    /// What the region usually offers
    pub regional_soil: &'static RegionalSoil,
    /// pH evaluated (measured, else regional)
    pub ph: f64,
    /// optimal, trop acide or trop alcalin
    pub ph_status: &'static str,
    /// Whether the stated soil type suits the crop, when given
    pub soil_type_suitable: Option<bool>,
    /// Corrections to apply
    pub improvements: Vec<Improvement>,
    /// bonne or moyenne
    pub overall_suitability: &'static str,
}

/// Compare the crop's soil needs with the region's soil
pub fn soil_requirements(
    crop: Crop,
    region: Region,
    soil_type: Option<&str>,
    current_ph: Option<f64>,
) -> SoilRequirements {
    let requirements = soil_profile(crop);
    let soil = regional_soil(region);
    let ph = current_ph.unwrap_or(soil.ph);

    let ph_status = if ph < requirements.ph_optimal.min {
        "trop acide"
    } else if ph > requirements.ph_optimal.max {
        "trop alcalin"
    } else {
        "optimal"
    };

    let mut improvements = Vec::new();
    if ph < requirements.ph_optimal.min {
        let quantity = round1((requirements.ph_optimal.min - ph) * 2.0);
        improvements.push(Improvement {
            action: "chaulage",
            reason: format!("pH {ph} sous l'optimum de {}", requirements.ph_optimal.min),
            quantity_t_ha: quantity,
            cost_fcfa: (quantity * 50_000.0).round(),
        });
    }
    if soil.organic_matter < requirements.organic_matter.min {
        let quantity = round1((requirements.organic_matter.max - soil.organic_matter) * 20.0);
        improvements.push(Improvement {
            action: "apport de compost",
            reason: format!(
                "matière organique {} % sous le minimum de {} %",
                soil.organic_matter, requirements.organic_matter.min
            ),
            quantity_t_ha: quantity,
            cost_fcfa: (quantity * 10_000.0).round(),
        });
    }

    let soil_type_suitable = soil_type
        .and_then(|s| s.parse::<SoilType>().ok())
        .map(|s| crop.info().map_or(true, |info| info.soils.contains(&s)));

    SoilRequirements {
        crop,
        region,
        requirements,
        regional_soil: soil,
        ph,
        ph_status,
        soil_type_suitable,
        overall_suitability: if improvements.is_empty() {
            "bonne"
        } else {
            "moyenne"
        },
        improvements,
    }
}

#[derive(Deserialize)]
struct SoilArgs {
    crop: Crop,
    #[serde(default)]
    region: Option<Region>,
    #[serde(default)]
    soil_type: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    current_ph: Option<f64>,
}

fn soil_tool(env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: SoilArgs| {
        Ok(soil_requirements(
            args.crop,
            env.region_or_default(args.region),
            args.soil_type.as_deref(),
            args.current_ph,
        ))
    })
}

// =============================================================================
// Fertilizer plan
// =============================================================================

/// Macro and secondary nutrient needs (kg/ha)
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NutrientDemand {
    /// Nitrogen
    pub n: f64,
    /// Phosphate
    pub p2o5: f64,
    /// Potash
    pub k2o: f64,
    /// Calcium
    pub ca: f64,
    /// Magnesium
    pub mg: f64,
}

impl NutrientDemand {
    const fn new(n: f64, p2o5: f64, k2o: f64, ca: f64, mg: f64) -> Self {
        Self {
            n,
            p2o5,
            k2o,
            ca,
            mg,
        }
    }

    fn scaled(self, factor: f64) -> Self {
        Self::new(
            round1(self.n * factor),
            round1(self.p2o5 * factor),
            round1(self.k2o * factor),
            round1(self.ca * factor),
            round1(self.mg * factor),
        )
    }
}

/// Nutrient needs of a crop per season (kg/ha)
#[must_use]
pub fn nutrient_demand(crop: Crop) -> NutrientDemand {
    match crop {
        Crop::Cacao => NutrientDemand::new(120.0, 40.0, 150.0, 80.0, 30.0),
        Crop::Cafe => NutrientDemand::new(150.0, 50.0, 180.0, 100.0, 40.0),
        Crop::Manioc => NutrientDemand::new(80.0, 40.0, 120.0, 30.0, 15.0),
        Crop::Plantain => NutrientDemand::new(250.0, 100.0, 300.0, 120.0, 50.0),
        Crop::Arachide => NutrientDemand::new(30.0, 60.0, 80.0, 80.0, 20.0),
        _ => NutrientDemand::new(200.0, 80.0, 160.0, 50.0, 25.0),
    }
}

fn fertility_factor(fertility: &str) -> f64 {
    match normalize_key(fertility).as_str() {
        "faible" | "pauvre" => 1.3,
        "bonne" | "bon" => 0.8,
        "elevee" | "riche" => 0.6,
        _ => 1.0,
    }
}

/// Product in the fertilization plan
#[derive(Debug, Clone, Serialize)]
pub struct Application {
    /// Product
    pub product: &'static str,
    /// Rate (kg/ha)
    pub rate_kg_ha: f64,
    /// Quantity over the area (kg)
    pub total_kg: f64,
    /// Cost over the area (FCFA)
    pub cost_fcfa: f64,
    /// When to apply
    pub timing: &'static str,
}

/// Fertilization plan
#[derive(Debug, Clone, Serialize)]
pub struct FertilizerPlan {
    /// Crop
    pub crop: Crop,
    /// Area (ha)
    pub area_ha: f64,
    /// Fertility as given
    pub soil_fertility: String,
    /// Budget as given
    pub budget: String,
    /// Needs adjusted to fertility (kg/ha)
    pub needs_kg_ha: NutrientDemand,
    /// Products to apply
    pub applications: Vec<Application>,
    /// Total cost (FCFA)
    pub total_cost: f64,
    /// Local products favoured by the budget
    pub local_options: Vec<&'static Fertilizer>,
    /// Share of the spend that can go to mineral fertilizer (%)
    pub mineral_share_percent: u32,
}

const COMPOST_T_HA: f64 = 5.0;
/// Nutrients brought by the compost dose (N, P2O5, K2O kg/ha)
const COMPOST_SUPPLY: (f64, f64, f64) = (75.0, 50.0, 75.0);

/// Compost base dressing topped up with urea and rock phosphate
pub fn fertilizer_plan(crop: Crop, area_ha: f64, fertility: &str, budget: &str) -> FertilizerPlan {
    let needs = nutrient_demand(crop).scaled(fertility_factor(fertility));

    let mut applications = vec![Application {
        product: "Compost",
        rate_kg_ha: COMPOST_T_HA * 1000.0,
        total_kg: COMPOST_T_HA * 1000.0 * area_ha,
        cost_fcfa: COMPOST_T_HA * 10_000.0 * area_ha,
        timing: "2 à 4 semaines avant semis ou plantation",
    }];

    let mut add = |product, rate: f64, price_kg: f64, timing| {
        let rate = round1(rate);
        applications.push(Application {
            product,
            rate_kg_ha: rate,
            total_kg: round1(rate * area_ha),
            cost_fcfa: (rate * area_ha * price_kg).round(),
            timing,
        });
    };
    let remaining_n = needs.n - COMPOST_SUPPLY.0;
    if remaining_n > 20.0 {
        add(
            "Urée (46% N)",
            remaining_n / 0.46,
            450.0,
            "moitié 4-6 semaines après semis, moitié à la floraison",
        );
    }
    let remaining_p = needs.p2o5 - COMPOST_SUPPLY.1;
    if remaining_p > 20.0 {
        add(
            "Phosphate naturel",
            remaining_p / 0.28,
            300.0,
            "au semis, dans le poquet",
        );
    }

    let key = normalize_key(budget);
    let (keys, mineral_share_percent): (&[&str], u32) =
        if key.contains("limit") || key.contains("faible") {
            (&["fumier_bovin", "compost", "cendres_bois"][..], 20)
        } else if key.contains("elev") {
            (&["npk_1520", "compost"][..], 80)
        } else {
            (&["compost", "npk_1520", "fumier_bovin"][..], 50)
        };

    FertilizerPlan {
        crop,
        area_ha,
        soil_fertility: fertility.to_string(),
        budget: budget.to_string(),
        needs_kg_ha: needs,
        total_cost: applications.iter().map(|a| a.cost_fcfa).sum(),
        applications,
        local_options: keys.iter().filter_map(|k| fertilizer(k)).collect(),
        mineral_share_percent,
    }
}

#[derive(Deserialize)]
struct FertilizerArgs {
    crop: Crop,
    #[serde(deserialize_with = "number")]
    area_ha: f64,
    #[serde(default)]
    soil_fertility: Option<String>,
    #[serde(default)]
    budget: Option<String>,
}

fn fertilizer_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: FertilizerArgs| {
        Ok(fertilizer_plan(
            args.crop,
            positive(args.area_ha, "area_ha")?,
            args.soil_fertility.as_deref().unwrap_or("moyenne"),
            args.budget.as_deref().unwrap_or("modéré"),
        ))
    })
}

// =============================================================================
// Irrigation
// =============================================================================

/// Seasonal water need (mm) and its critical stages
fn water_need(crop: Crop) -> (Span<f64>, &'static [&'static str]) {
    match crop {
        Crop::Cacao => (Span::new(1200.0, 1800.0), &["floraison", "développement des fruits"]),
        Crop::Cafe => (Span::new(1000.0, 1500.0), &["floraison", "grossissement des grains"]),
        Crop::Manioc => (Span::new(600.0, 1000.0), &["établissement", "tubérisation"]),
        Crop::Plantain => (Span::new(1200.0, 1800.0), &["toute l'année"]),
        Crop::Arachide => (Span::new(400.0, 550.0), &["floraison", "formation des gousses"]),
        _ => (Span::new(450.0, 600.0), &["floraison", "remplissage des grains"]),
    }
}

/// Irrigation system
#[derive(Debug, Clone, Serialize)]
pub struct IrrigationSystem {
    /// Name
    pub name: &'static str,
    /// Water application efficiency
    pub efficiency: f64,
    /// Installation cost (FCFA/ha)
    pub cost_per_ha: f64,
    /// Water saved compared to flooding
    pub water_saving: f64,
    /// Maintenance burden
    pub maintenance: &'static str,
}

static SYSTEMS: [IrrigationSystem; 4] = [
    IrrigationSystem {
        name: "goutte à goutte",
        efficiency: 0.9,
        cost_per_ha: 800_000.0,
        water_saving: 0.5,
        maintenance: "modérée",
    },
    IrrigationSystem {
        name: "aspersion",
        efficiency: 0.75,
        cost_per_ha: 400_000.0,
        water_saving: 0.3,
        maintenance: "élevée",
    },
    IrrigationSystem {
        name: "gravitaire",
        efficiency: 0.6,
        cost_per_ha: 150_000.0,
        water_saving: 0.1,
        maintenance: "faible",
    },
    IrrigationSystem {
        name: "micro-aspersion",
        efficiency: 0.8,
        cost_per_ha: 600_000.0,
        water_saving: 0.4,
        maintenance: "modérée",
    },
];

fn system_for(crop: Crop) -> &'static IrrigationSystem {
    let name = match crop {
        Crop::Cacao | Crop::Cafe | Crop::Plantain => "micro-aspersion",
        Crop::Mais | Crop::Arachide => "aspersion",
        _ => "goutte à goutte",
    };
    SYSTEMS.iter().find(|s| s.name == name).unwrap_or(&SYSTEMS[0])
}

/// Water-saving practice
#[derive(Debug, Clone, Serialize)]
pub struct Conservation {
    /// Practice
    pub practice: &'static str,
    /// Water saved (%)
    pub saving_percent: u32,
    /// Cost per hectare (FCFA)
    pub cost_per_ha: u32,
    /// Ease of adoption
    pub difficulty: &'static str,
}

static CONSERVATION: [Conservation; 4] = [
    Conservation {
        practice: "Paillage",
        saving_percent: 30,
        cost_per_ha: 20_000,
        difficulty: "facile",
    },
    Conservation {
        practice: "Brise-vent",
        saving_percent: 15,
        cost_per_ha: 50_000,
        difficulty: "moyenne",
    },
    Conservation {
        practice: "Récupération de l'eau de pluie",
        saving_percent: 0,
        cost_per_ha: 100_000,
        difficulty: "complexe",
    },
    Conservation {
        practice: "Amélioration du sol",
        saving_percent: 25,
        cost_per_ha: 30_000,
        difficulty: "facile",
    },
];

/// Irrigation plan
#[derive(Debug, Clone, Serialize)]
pub struct IrrigationPlan {
    /// Crop
    pub crop: Crop,
    /// Region
    pub region: Region,
    /// Area (ha)
    pub area_ha: f64,
    /// Water source as given
    pub water_source: String,
    /// Seasonal need (mm): minimum and optimum
    pub water_need_mm: Span<f64>,
    /// Stages where water stress is most damaging
    pub critical_periods: &'static [&'static str],
    /// Typical regional rainfall (mm)
    pub rainfall_mm: u32,
    /// Optimum minus rainfall (mm), never negative
    pub deficit_mm: f64,
    /// Whether the deficit exceeds 100 mm
    pub irrigation_required: bool,
    /// Suggested system when irrigation is required
    pub recommended_system: Option<&'static IrrigationSystem>,
    /// Installation cost over the area (FCFA)
    pub installation_cost: f64,
    /// Water to bring over the area (m³)
    pub water_volume_m3: f64,
    /// Water-saving practices
    pub conservation: &'static [Conservation],
    /// Advice on the water source
    pub source_advice: Option<&'static str>,
}

/// Water balance of the crop in the region and the matching system
pub fn irrigation_plan(crop: Crop, region: Region, area_ha: f64, water_source: &str) -> IrrigationPlan {
    let (need, critical_periods) = water_need(crop);
    let rainfall_mm = region.info().reference_rainfall_mm;
    let deficit_mm = (need.max - f64::from(rainfall_mm)).max(0.0);
    let irrigation_required = deficit_mm > 100.0;
    let recommended_system = irrigation_required.then(|| system_for(crop));

    let (installation_cost, water_volume_m3) = recommended_system.map_or((0.0, 0.0), |s| {
        // 1 mm over 1 ha is 10 m³
        (s.cost_per_ha * area_ha, round1(deficit_mm * 10.0 / s.efficiency * area_ha))
    });

    let source = normalize_key(water_source);
    let source_advice = match (irrigation_required, source.as_str()) {
        (true, "pluie" | "eau de pluie") => {
            Some("la pluie seule ne couvre pas le besoin: prévoir un bassin de stockage ou un forage")
        }
        (true, s) if s.contains("riviere") || s.contains("cours") => {
            Some("pomper hors des heures chaudes et filtrer l'eau avant le réseau")
        }
        (true, s) if s.contains("forage") || s.contains("puits") => {
            Some("vérifier le débit du forage avant de dimensionner le réseau")
        }
        _ => None,
    };

    IrrigationPlan {
        crop,
        region,
        area_ha,
        water_source: water_source.to_string(),
        water_need_mm: need,
        critical_periods,
        rainfall_mm,
        deficit_mm,
        irrigation_required,
        recommended_system,
        installation_cost,
        water_volume_m3,
        conservation: &CONSERVATION,
        source_advice,
    }
}

#[derive(Deserialize)]
struct IrrigationArgs {
    crop: Crop,
    #[serde(default)]
    region: Option<Region>,
    #[serde(default, deserialize_with = "opt_number")]
    area_ha: Option<f64>,
    #[serde(default)]
    water_source: Option<String>,
}

fn irrigation_tool(env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: IrrigationArgs| {
        let area_ha = positive(args.area_ha.unwrap_or(1.0), "area_ha")?;
        Ok(irrigation_plan(
            args.crop,
            env.region_or_default(args.region),
            area_ha,
            args.water_source.as_deref().unwrap_or("pluie"),
        ))
    })
}

// =============================================================================
// Land suitability
// =============================================================================

/// Site conditions of a plot
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Terrain {
    /// Altitude (m)
    #[serde(default, alias = "altitude_m", deserialize_with = "opt_number")]
    pub altitude: Option<f64>,
    /// Slope (%)
    #[serde(default, alias = "pente", deserialize_with = "opt_number")]
    pub slope: Option<f64>,
    /// Drainage class
    #[serde(default)]
    pub drainage: Option<String>,
    /// Soil pH
    #[serde(default, deserialize_with = "opt_number")]
    pub ph: Option<f64>,
    /// Sun exposure
    #[serde(default, alias = "exposition")]
    pub exposure: Option<String>,
}

struct SiteCriteria {
    altitude_m: Span<f64>,
    max_slope: f64,
    drainage: &'static [&'static str],
    exposure: &'static [&'static str],
    ph: Span<f64>,
}

fn site_criteria(crop: Crop) -> SiteCriteria {
    match crop {
        Crop::Cacao => SiteCriteria {
            altitude_m: Span::new(0.0, 800.0),
            max_slope: 30.0,
            drainage: &["bien draine", "moderement draine"],
            exposure: &["ombrage", "mi ombre"],
            ph: Span::new(5.5, 7.0),
        },
        Crop::Cafe => SiteCriteria {
            altitude_m: Span::new(500.0, 2000.0),
            max_slope: 45.0,
            drainage: &["bien draine"],
            exposure: &["mi ombre", "ombrage"],
            ph: Span::new(6.0, 7.0),
        },
        _ => SiteCriteria {
            altitude_m: Span::new(0.0, 1500.0),
            max_slope: 15.0,
            drainage: &["bien draine", "moderement draine"],
            exposure: &["plein soleil"],
            ph: Span::new(5.8, 7.2),
        },
    }
}

const STATUS: [&str; 4] = ["inadéquat", "marginal", "bon", "excellent"];

/// Score of one criterion (1 to 3)
#[derive(Debug, Clone, Serialize)]
pub struct CriterionScore {
    /// Criterion
    pub criterion: &'static str,
    /// Observed value
    pub value: String,
    /// Score
    pub score: u8,
    /// Label of the score
    pub status: &'static str,
}

/// FAO-style suitability assessment
#[derive(Debug, Clone, Serialize)]
pub struct LandSuitability {
    /// Crop
    pub crop: Crop,
    /// Region
    pub region: Region,
    /// Whether the crop is grown in the region
    pub grown_in_region: bool,
    /// Per-criterion scores
    pub criteria: Vec<CriterionScore>,
    /// Score as a share of the maximum (%)
    pub score_percent: f64,
    /// S1, S2, S3 or N
    pub suitability_class: &'static str,
    /// Corrections for weak criteria
    pub improvements: Vec<Improvement>,
    /// Cost of the corrections per hectare (FCFA)
    pub improvement_cost: f64,
    /// élevé, moyen or faible
    pub potential: &'static str,
}

fn criterion(criterion: &'static str, value: String, score: u8) -> CriterionScore {
    CriterionScore {
        criterion,
        value,
        score,
        status: STATUS[usize::from(score.min(3))],
    }
}

fn class_for(percent: f64) -> &'static str {
    if percent >= 80.0 {
        "Très apte (S1)"
    } else if percent >= 60.0 {
        "Apte (S2)"
    } else if percent >= 40.0 {
        "Marginalement apte (S3)"
    } else {
        "Inapte (N)"
    }
}

/// Score the given terrain criteria; missing ones are not scored
pub fn land_suitability(crop: Crop, region: Region, terrain: &Terrain) -> LandSuitability {
    let reference = site_criteria(crop);
    let mut criteria = Vec::new();
    let mut improvements = Vec::new();

    if let Some(altitude) = terrain.altitude {
        let range = reference.altitude_m;
        let score = if range.contains(altitude) {
            3
        } else if altitude >= range.min - 200.0 && altitude <= range.max + 200.0 {
            2
        } else {
            1
        };
        criteria.push(criterion("altitude", format!("{altitude} m"), score));
    }
    if let Some(slope) = terrain.slope {
        let score = if slope <= reference.max_slope / 2.0 {
            3
        } else if slope <= reference.max_slope {
            2
        } else {
            1
        };
        criteria.push(criterion("pente", format!("{slope} %"), score));
    }
    if let Some(drainage) = terrain.drainage.as_deref() {
        let key = normalize_key(drainage);
        let score = if reference.drainage.iter().any(|d| key.contains(d)) {
            3
        } else {
            1
        };
        if score < 2 {
            improvements.push(Improvement {
                action: "installation de drains, billonnage",
                reason: format!("drainage {drainage}"),
                quantity_t_ha: 0.0,
                cost_fcfa: 100_000.0,
            });
        }
        criteria.push(criterion("drainage", drainage.to_string(), score));
    }
    if let Some(ph) = terrain.ph {
        let range = reference.ph;
        let score = if range.contains(ph) {
            3
        } else if ph >= range.min - 0.5 && ph <= range.max + 0.5 {
            2
        } else {
            1
        };
        if score < 2 && ph < range.min {
            improvements.push(Improvement {
                action: "chaulage (2-3 t/ha)",
                reason: format!("pH {ph} trop acide"),
                quantity_t_ha: 2.5,
                cost_fcfa: 150_000.0,
            });
        }
        criteria.push(criterion("pH", ph.to_string(), score));
    }
    if let Some(exposure) = terrain.exposure.as_deref() {
        let key = normalize_key(exposure);
        let score = if reference.exposure.iter().any(|e| key.contains(e)) {
            3
        } else {
            2
        };
        criteria.push(criterion("exposition", exposure.to_string(), score));
    }

    let max = (criteria.len() * 3) as f64;
    let total: f64 = criteria.iter().map(|c| f64::from(c.score)).sum();
    let score_percent = if max > 0.0 {
        round1(total / max * 100.0)
    } else {
        0.0
    };

    LandSuitability {
        crop,
        region,
        grown_in_region: crop.info().map_or(false, |i| i.regions.contains(&region)),
        suitability_class: class_for(score_percent),
        potential: if score_percent >= 70.0 {
            "élevé"
        } else if score_percent >= 50.0 {
            "moyen"
        } else {
            "faible"
        },
        improvement_cost: improvements.iter().map(|i| i.cost_fcfa).sum(),
        criteria,
        score_percent,
        improvements,
    }
}

#[derive(Deserialize)]
struct SuitabilityArgs {
    crop: Crop,
    #[serde(default)]
    region: Option<Region>,
    #[serde(default, alias = "terrain_characteristics")]
    terrain: Terrain,
}

fn suitability_tool(env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: SuitabilityArgs| {
        Ok(land_suitability(
            args.crop,
            env.region_or_default(args.region),
            &args.terrain,
        ))
    })
}

// =============================================================================
// Nutrient budget
// =============================================================================

/// Nutrient export per kg of harvest (g): N, P, K, Ca, Mg, S
fn uptake_g_per_kg(crop: Crop) -> [f64; 6] {
    match crop {
        Crop::Cacao => [25.0, 3.0, 35.0, 8.0, 4.0, 2.0],
        Crop::Cafe => [20.0, 2.0, 25.0, 5.0, 3.0, 1.5],
        Crop::Manioc => [5.0, 1.0, 8.0, 3.0, 1.0, 0.5],
        Crop::Plantain => [12.0, 1.5, 20.0, 4.0, 2.0, 1.0],
        Crop::Arachide => [40.0, 4.0, 12.0, 8.0, 3.0, 2.0],
        _ => [15.0, 3.0, 8.0, 2.0, 2.0, 1.0],
    }
}

const NUTRIENTS: [&str; 6] = ["N", "P", "K", "Ca", "Mg", "S"];
const EFFICIENCY: [f64; 6] = [0.6, 0.2, 0.8, 0.7, 0.6, 0.5];
/// Share of the dose at sowing, first and second side-dressing
const SPLITS: [(f64, f64, f64); 6] = [
    (0.3, 0.4, 0.3),
    (1.0, 0.0, 0.0),
    (0.5, 0.3, 0.2),
    (1.0, 0.0, 0.0),
    (1.0, 0.0, 0.0),
    (1.0, 0.0, 0.0),
];

/// Soil test values
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SoilAnalysis {
    /// pH
    #[serde(default, deserialize_with = "opt_number")]
    pub ph: Option<f64>,
    /// Organic matter (%)
    #[serde(default, deserialize_with = "opt_number")]
    pub organic_matter: Option<f64>,
    /// Available phosphorus (ppm)
    #[serde(default, alias = "available_P", deserialize_with = "opt_number")]
    pub available_p: Option<f64>,
    /// Exchangeable potassium (ppm)
    #[serde(default, alias = "exchangeable_K", deserialize_with = "opt_number")]
    pub exchangeable_k: Option<f64>,
}

const CRITICAL_PH: f64 = 6.0;
const CRITICAL_ORGANIC_MATTER: f64 = 3.0;
const CRITICAL_P: f64 = 15.0;
const CRITICAL_K: f64 = 120.0;

/// Dose of one nutrient
#[derive(Debug, Clone, Serialize)]
pub struct NutrientDose {
    /// Nutrient symbol
    pub nutrient: &'static str,
    /// Exported by the harvest (kg/ha)
    pub uptake_kg: f64,
    /// Fertilizer use efficiency
    pub efficiency: f64,
    /// Nutrient to supply (kg/ha)
    pub dose_kg: f64,
    /// At sowing (kg/ha)
    pub basal_kg: f64,
    /// First side-dressing (kg/ha)
    pub side_dressing_1_kg: f64,
    /// Second side-dressing (kg/ha)
    pub side_dressing_2_kg: f64,
}

/// Nutrient budget for a target yield
#[derive(Debug, Clone, Serialize)]
pub struct NutrientBudget {
    /// Crop
    pub crop: Crop,
    /// Target yield (kg/ha)
    pub target_yield_kg: f64,
    /// Per nutrient doses
    pub nutrients: Vec<NutrientDose>,
    /// Soil values under their critical level
    pub soil_warnings: Vec<String>,
}

/// Export-based doses, raised for P and K when the soil test is low
pub fn nutrient_budget(crop: Crop, target_yield_kg: f64, soil: Option<&SoilAnalysis>) -> NutrientBudget {
    let uptake = uptake_g_per_kg(crop);
    let boost = |level: Option<f64>, critical: f64| {
        level
            .filter(|l| *l < critical)
            .map_or(1.0, |l| 1.0 + (critical - l) / critical)
    };
    let p_boost = boost(soil.and_then(|s| s.available_p), CRITICAL_P);
    let k_boost = boost(soil.and_then(|s| s.exchangeable_k), CRITICAL_K);

    let nutrients = NUTRIENTS
        .iter()
        .enumerate()
        .map(|(i, &nutrient)| {
            let uptake_kg = target_yield_kg * uptake[i] / 1000.0;
            let boost = match nutrient {
                "P" => p_boost,
                "K" => k_boost,
                _ => 1.0,
            };
            let dose = uptake_kg / EFFICIENCY[i] * boost;
            let (basal, side1, side2) = SPLITS[i];
            NutrientDose {
                nutrient,
                uptake_kg: round1(uptake_kg),
                efficiency: EFFICIENCY[i],
                dose_kg: round1(dose),
                basal_kg: round1(dose * basal),
                side_dressing_1_kg: round1(dose * side1),
                side_dressing_2_kg: round1(dose * side2),
            }
        })
        .collect();

    let mut soil_warnings = Vec::new();
    if let Some(soil) = soil {
        if let Some(ph) = soil.ph.filter(|p| *p < CRITICAL_PH) {
            soil_warnings.push(format!("pH {ph} bas: chauler avant la fertilisation"));
        }
        if let Some(om) = soil.organic_matter.filter(|o| *o < CRITICAL_ORGANIC_MATTER) {
            soil_warnings.push(format!("matière organique {om} % faible: apporter du compost"));
        }
        if p_boost > 1.0 {
            soil_warnings.push("phosphore disponible sous le seuil critique".to_string());
        }
        if k_boost > 1.0 {
            soil_warnings.push("potassium échangeable sous le seuil critique".to_string());
        }
    }

    NutrientBudget {
        crop,
        target_yield_kg,
        nutrients,
        soil_warnings,
    }
}

#[derive(Deserialize)]
struct NutrientArgs {
    crop: Crop,
    #[serde(deserialize_with = "number")]
    target_yield_kg: f64,
    #[serde(default)]
    soil_analysis: Option<SoilAnalysis>,
}

fn nutrient_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: NutrientArgs| {
        Ok(nutrient_budget(
            args.crop,
            positive(args.target_yield_kg, "target_yield_kg")?,
            args.soil_analysis.as_ref(),
        ))
    })
}

// =============================================================================
// Amendments
// =============================================================================

/// Soil amendment product
#[derive(Debug, Clone, Serialize)]
pub struct Amendment {
    /// Name
    pub name: &'static str,
    /// What it corrects
    pub purpose: &'static str,
    /// Price (FCFA/t)
    pub price_per_t: f64,
    /// Usual rate
    pub rate: &'static str,
    /// How long the effect lasts
    pub duration: &'static str,
}

static AMENDMENTS: [Amendment; 6] = [
    Amendment {
        name: "chaux agricole",
        purpose: "correction de l'acidité",
        price_per_t: 50_000.0,
        rate: "2-4 t/ha",
        duration: "2-3 ans",
    },
    Amendment {
        name: "dolomie",
        purpose: "correction de l'acidité et apport de magnésium",
        price_per_t: 55_000.0,
        rate: "1.5-3 t/ha",
        duration: "3-4 ans",
    },
    Amendment {
        name: "compost",
        purpose: "matière organique",
        price_per_t: 10_000.0,
        rate: "10-20 t/ha",
        duration: "1-2 ans",
    },
    Amendment {
        name: "fumier décomposé",
        purpose: "matière organique",
        price_per_t: 12_000.0,
        rate: "15-25 t/ha",
        duration: "1-2 ans",
    },
    Amendment {
        name: "gypse",
        purpose: "amélioration de la structure",
        price_per_t: 30_000.0,
        rate: "2-5 t/ha",
        duration: "2-3 ans",
    },
    Amendment {
        name: "biochar",
        purpose: "matière organique stable",
        price_per_t: 80_000.0,
        rate: "5-10 t/ha",
        duration: "plus de 10 ans",
    },
];

fn amendment(name: &str) -> &'static Amendment {
    AMENDMENTS
        .iter()
        .find(|a| a.name == name)
        .unwrap_or(&AMENDMENTS[0])
}

/// Selected amendment
#[derive(Debug, Clone, Serialize)]
pub struct AmendmentChoice {
    /// Product
    pub amendment: &'static Amendment,
    /// Quantity (t/ha)
    pub quantity_t_ha: f64,
    /// Cost per hectare (FCFA)
    pub cost_fcfa: f64,
    /// When to apply
    pub timing: &'static str,
}

/// Amendment plan
#[derive(Debug, Clone, Serialize)]
pub struct AmendmentPlan {
    /// Measured pH
    pub ph: f64,
    /// Measured organic matter (%)
    pub organic_matter: f64,
    /// Constraints as given
    pub constraints: Vec<String>,
    /// Budget (FCFA/ha), when given
    pub budget: Option<f64>,
    /// Retained amendments
    pub amendments: Vec<AmendmentChoice>,
    /// Products left out by the budget
    pub deferred: Vec<&'static str>,
    /// Cost of the retained amendments (FCFA/ha)
    pub total_cost: f64,
    /// pH expected after correction
    pub ph_target: f64,
    /// Organic matter expected after correction (%)
    pub organic_matter_target: f64,
    /// Other organic sources
    pub alternatives: Vec<&'static Amendment>,
}

fn choice(name: &str, quantity: f64, timing: &'static str) -> AmendmentChoice {
    let amendment = amendment(name);
    let quantity_t_ha = round1(quantity);
    AmendmentChoice {
        amendment,
        quantity_t_ha,
        cost_fcfa: (quantity_t_ha * amendment.price_per_t).round(),
        timing,
    }
}

/// Amendments for acidity, organic matter and compaction; when over
/// budget the cheapest are kept first
pub fn soil_amendments(ph: f64, organic_matter: f64, constraints: &[String], budget: Option<f64>) -> AmendmentPlan {
    let has = |word: &str| constraints.iter().any(|c| normalize_key(c).contains(word));
    let mut selected = Vec::new();

    if ph < 5.5 {
        let lime = (6.0 - ph) * 2.0;
        if has("magnesium") {
            selected.push(choice("dolomie", lime.min(3.0), "début de saison sèche"));
        } else {
            selected.push(choice("chaux agricole", lime.min(4.0), "début de saison sèche"));
        }
    }
    if organic_matter < 3.0 {
        let compost = ((3.0 - organic_matter) * 10.0).min(20.0);
        selected.push(choice("compost", compost, "avant plantation"));
    }
    if has("compaction") || has("tasse") {
        let gypsum = choice("gypse", 3.0, "entretien annuel");
        let total: f64 = selected.iter().map(|c| c.cost_fcfa).sum();
        if budget.map_or(true, |b| total + gypsum.cost_fcfa <= b) {
            selected.push(gypsum);
        }
    }

    let mut deferred = Vec::new();
    let amendments = match budget {
        Some(budget) if selected.iter().map(|c| c.cost_fcfa).sum::<f64>() > budget => {
            selected.sort_by(|a, b| a.cost_fcfa.total_cmp(&b.cost_fcfa));
            let mut spent = 0.0;
            let mut kept = Vec::new();
            for item in selected {
                if spent + item.cost_fcfa <= budget {
                    spent += item.cost_fcfa;
                    kept.push(item);
                } else {
                    deferred.push(item.amendment.name);
                }
            }
            kept
        }
        _ => selected,
    };

    AmendmentPlan {
        ph,
        organic_matter,
        constraints: constraints.to_vec(),
        budget,
        total_cost: amendments.iter().map(|c| c.cost_fcfa).sum(),
        amendments,
        deferred,
        ph_target: if ph < 6.0 { round1((ph + 1.0).min(6.5)) } else { ph },
        organic_matter_target: if organic_matter < 3.0 {
            round1((organic_matter + 1.0).min(4.0))
        } else {
            organic_matter
        },
        alternatives: vec![amendment("fumier décomposé"), amendment("biochar")],
    }
}

#[derive(Deserialize)]
struct AmendmentArgs {
    #[serde(alias = "current_ph", deserialize_with = "number")]
    ph: f64,
    #[serde(deserialize_with = "number")]
    organic_matter: f64,
    #[serde(default, deserialize_with = "string_list")]
    constraints: Vec<String>,
    #[serde(default, deserialize_with = "opt_number")]
    budget: Option<f64>,
}

fn amendment_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: AmendmentArgs| {
        if !(0.0..=14.0).contains(&args.ph) {
            return Err(Error::InvalidInput(format!("pH hors plage: {}", args.ph)));
        }
        Ok(soil_amendments(
            args.ph,
            args.organic_matter,
            &args.constraints,
            args.budget,
        ))
    })
}

// =============================================================================
// Registration
// =============================================================================

/// Resource tools bound to `env`
pub fn tools(env: &ToolEnv) -> Vec<DomainTool> {
    let def = |name: &str, description: &str, parameters: Value| {
        ToolDefinition::new(name, description, ToolCategory::Resources).with_parameters(parameters)
    };
    vec![
        DomainTool::new(
            def(
                "analyze_soil_requirements",
                "Exigences pédologiques d'une culture comparées au sol de la région",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture"},
                        "region": {"type": "string", "description": "Région du Cameroun"},
                        "soil_type": {"type": "string", "description": "Type de sol de la parcelle"},
                        "current_ph": {"type": "number", "description": "pH mesuré"}
                    },
                    "required": ["crop", "region"]
                }),
            ),
            env.clone(),
            soil_tool,
        ),
        DomainTool::new(
            def(
                "recommend_fertilizers",
                "Plan de fertilisation selon la culture, la fertilité du sol et le budget",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture"},
                        "area_ha": {"type": "number", "description": "Superficie en hectares"},
                        "soil_fertility": {"type": "string", "description": "faible, moyenne, bonne ou élevée"},
                        "budget": {"type": "string", "description": "limité, modéré ou élevé"}
                    },
                    "required": ["crop", "area_ha"]
                }),
            ),
            env.clone(),
            fertilizer_tool,
        ),
        DomainTool::new(
            def(
                "optimize_irrigation",
                "Bilan hydrique, système d'irrigation adapté et pratiques d'économie d'eau",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture"},
                        "region": {"type": "string", "description": "Région du Cameroun"},
                        "area_ha": {"type": "number", "description": "Superficie en hectares"},
                        "water_source": {"type": "string", "description": "pluie, rivière, forage..."}
                    },
                    "required": ["crop", "region"]
                }),
            ),
            env.clone(),
            irrigation_tool,
        ),
        DomainTool::new(
            def(
                "assess_land_suitability",
                "Aptitude d'une parcelle (classes S1, S2, S3, N) selon altitude, pente, drainage, pH et exposition",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture envisagée"},
                        "region": {"type": "string", "description": "Région du Cameroun"},
                        "terrain": {
                            "type": "object",
                            "description": "Caractéristiques de la parcelle",
                            "properties": {
                                "altitude": {"type": "number"},
                                "pente": {"type": "number"},
                                "drainage": {"type": "string"},
                                "ph": {"type": "number"},
                                "exposition": {"type": "string"}
                            }
                        }
                    },
                    "required": ["crop", "region"]
                }),
            ),
            env.clone(),
            suitability_tool,
        ),
        DomainTool::new(
            def(
                "calculate_nutrient_needs",
                "Besoins en éléments nutritifs pour un rendement visé, fractionnement des apports",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture"},
                        "target_yield_kg": {"type": "number", "description": "Rendement visé (kg/ha)"},
                        "soil_analysis": {
                            "type": "object",
                            "description": "Analyse de sol",
                            "properties": {
                                "ph": {"type": "number"},
                                "organic_matter": {"type": "number"},
                                "available_p": {"type": "number"},
                                "exchangeable_k": {"type": "number"}
                            }
                        }
                    },
                    "required": ["crop", "target_yield_kg"]
                }),
            ),
            env.clone(),
            nutrient_tool,
        ),
        DomainTool::new(
            def(
                "suggest_soil_amendments",
                "Amendements (chaux, dolomie, compost, gypse) selon le pH, la matière organique et le budget",
                json!({
                    "type": "object",
                    "properties": {
                        "ph": {"type": "number", "description": "pH du sol"},
                        "organic_matter": {"type": "number", "description": "Matière organique (%)"},
                        "constraints": {"type": "array", "items": {"type": "string"}, "description": "Contraintes (compaction, carence magnésium...)"},
                        "budget": {"type": "number", "description": "Budget par hectare (FCFA)"}
                    },
                    "required": ["ph", "organic_matter"]
                }),
            ),
            env.clone(),
            amendment_tool,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cocoa_on_ferrallitic_soil_needs_lime_and_compost() {
        let result = soil_requirements(Crop::Cacao, Region::Centre, None, None);
        assert_eq!(result.ph, 4.8);
        assert_eq!(result.ph_status, "trop acide");
        assert_eq!(result.improvements.len(), 2);
        assert_eq!(result.improvements[0].quantity_t_ha, 2.4);
        assert_eq!(result.improvements[0].cost_fcfa, 120_000.0);
        assert_eq!(result.improvements[1].quantity_t_ha, 50.0);
        assert_eq!(result.overall_suitability, "moyenne");
    }

    #[test]
    fn test_maize_on_volcanic_soil_is_fine() {
        let result = soil_requirements(Crop::Mais, Region::Ouest, Some("volcanique"), None);
        assert_eq!(result.ph_status, "optimal");
        assert!(result.improvements.is_empty());
        assert_eq!(result.overall_suitability, "bonne");

        let alkaline = soil_requirements(Crop::Manioc, Region::Ouest, None, Some(7.2));
        assert_eq!(alkaline.ph_status, "trop alcalin");
    }

    #[test]
    fn test_fertilizer_plan_tops_up_compost() {
        let plan = fertilizer_plan(Crop::Mais, 1.0, "moyenne", "modéré");
        let products: Vec<&str> = plan.applications.iter().map(|a| a.product).collect();
        assert_eq!(products, vec!["Compost", "Urée (46% N)", "Phosphate naturel"]);
        assert_eq!(plan.applications[1].rate_kg_ha, 271.7);
        assert_eq!(plan.applications[2].rate_kg_ha, 107.1);
        assert_eq!(plan.mineral_share_percent, 50);
        assert_eq!(plan.local_options[0].key, "compost");
    }

    #[test]
    fn test_groundnut_on_good_soil_needs_only_compost() {
        let plan = fertilizer_plan(Crop::Arachide, 2.0, "bonne", "limité");
        assert_eq!(plan.applications.len(), 1);
        assert_eq!(plan.needs_kg_ha.n, 24.0);
        assert_eq!(plan.total_cost, 100_000.0);
        assert_eq!(plan.mineral_share_percent, 20);
    }

    #[test]
    fn test_irrigation_in_the_far_north() {
        let plan = irrigation_plan(Crop::Cacao, Region::ExtremeNord, 2.0, "pluie");
        assert_eq!(plan.deficit_mm, 1200.0);
        assert!(plan.irrigation_required);
        let system = plan.recommended_system.unwrap();
        assert_eq!(system.name, "micro-aspersion");
        assert_eq!(plan.installation_cost, 1_200_000.0);
        assert_eq!(plan.water_volume_m3, 30_000.0);
        assert!(plan.source_advice.is_some());
    }

    #[test]
    fn test_no_irrigation_when_rain_covers_need() {
        let plan = irrigation_plan(Crop::Mais, Region::Nord, 1.0, "pluie");
        assert_eq!(plan.deficit_mm, 0.0);
        assert!(!plan.irrigation_required);
        assert!(plan.recommended_system.is_none());
        assert_eq!(plan.installation_cost, 0.0);
    }

    #[test]
    fn test_ideal_cocoa_plot_is_s1() {
        let terrain = Terrain {
            altitude: Some(600.0),
            slope: Some(10.0),
            drainage: Some("bien drainé".to_string()),
            ph: Some(6.0),
            exposure: Some("mi-ombre".to_string()),
        };
        let result = land_suitability(Crop::Cacao, Region::Centre, &terrain);
        assert_eq!(result.score_percent, 100.0);
        assert_eq!(result.suitability_class, "Très apte (S1)");
        assert_eq!(result.potential, "élevé");
        assert!(result.grown_in_region);
        assert!(result.improvements.is_empty());
    }

    #[test]
    fn test_poor_coffee_plot_lists_corrections() {
        let terrain = Terrain {
            altitude: Some(300.0),
            slope: Some(50.0),
            drainage: Some("mal drainé".to_string()),
            ph: Some(5.2),
            exposure: Some("plein soleil".to_string()),
        };
        let result = land_suitability(Crop::Cafe, Region::Littoral, &terrain);
        let scores: Vec<u8> = result.criteria.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![2, 1, 1, 1, 2]);
        assert_eq!(result.suitability_class, "Marginalement apte (S3)");
        assert_eq!(result.potential, "faible");
        assert_eq!(result.improvement_cost, 250_000.0);
    }

    #[test]
    fn test_suitability_tool_reads_french_terrain_keys() {
        let env = ToolEnv::seeded(1);
        let value = suitability_tool(
            &env,
            json!({"crop": "maïs", "region": "Nord", "terrain": {"pente": "5", "drainage": "bien drainé"}}),
        )
        .unwrap();
        assert_eq!(value["score_percent"], 100.0);
        assert_eq!(value["criteria"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_nutrient_budget_for_maize() {
        let budget = nutrient_budget(Crop::Mais, 5000.0, None);
        let n = &budget.nutrients[0];
        assert_eq!(n.uptake_kg, 75.0);
        assert_eq!(n.dose_kg, 125.0);
        assert_eq!(
            (n.basal_kg, n.side_dressing_1_kg, n.side_dressing_2_kg),
            (37.5, 50.0, 37.5)
        );
        assert_eq!(budget.nutrients[1].dose_kg, 75.0);
        assert_eq!(budget.nutrients[2].dose_kg, 50.0);
        assert!(budget.soil_warnings.is_empty());
    }

    #[test]
    fn test_low_phosphorus_raises_dose() {
        let soil = SoilAnalysis {
            ph: Some(5.2),
            available_p: Some(10.0),
            ..SoilAnalysis::default()
        };
        let budget = nutrient_budget(Crop::Mais, 5000.0, Some(&soil));
        assert_eq!(budget.nutrients[1].dose_kg, 100.0);
        assert_eq!(budget.nutrients[2].dose_kg, 50.0);
        assert_eq!(budget.soil_warnings.len(), 2);
    }

    #[test]
    fn test_amendments_fit_the_budget() {
        let plan = soil_amendments(4.5, 1.5, &strings(&["compaction"]), Some(200_000.0));
        assert!(plan.total_cost <= 200_000.0);
        assert_eq!(plan.amendments.len(), 1);
        assert_eq!(plan.amendments[0].amendment.name, "chaux agricole");
        assert_eq!(plan.deferred, vec!["compost"]);
        assert_eq!(plan.ph_target, 5.5);
        assert_eq!(plan.organic_matter_target, 2.5);
    }

    #[test]
    fn test_magnesium_deficiency_uses_dolomite() {
        let plan = soil_amendments(4.8, 3.5, &strings(&["carence magnésium"]), None);
        assert_eq!(plan.amendments.len(), 1);
        assert_eq!(plan.amendments[0].amendment.name, "dolomie");
        assert_eq!(plan.amendments[0].quantity_t_ha, 2.4);
        assert_eq!(plan.total_cost, 132_000.0);
        assert!(plan.deferred.is_empty());
    }

    #[test]
    fn test_compaction_adds_gypsum_without_budget() {
        let plan = soil_amendments(6.2, 3.2, &strings(&["sol compacté", "compaction"]), None);
        let names: Vec<&str> = plan.amendments.iter().map(|a| a.amendment.name).collect();
        assert_eq!(names, vec!["gypse"]);
        assert_eq!(plan.total_cost, 90_000.0);
    }
}
