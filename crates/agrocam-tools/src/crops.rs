//! Crop management tools: planting calendar, rotation, varieties, techniques

use crate::domain::DomainTool;
use crate::env::ToolEnv;
use crate::error::Result;
use crate::input::{run, string_list};
use crate::registry::{ToolCategory, ToolDefinition};
use agrocam_data::practices::{
    associations_for, farm_tools, fertilizers, planting_windows, techniques, Association,
    FarmTool, Fertilizer, PlantingWindow, Technique,
};
use agrocam_data::utils::{estimate_maturity, season_for, seasonal_activities, MaturityEstimate};
use agrocam_data::{
    diseases_for, month_name, AgroZone, Crop, Region, Season, SoilType, Span, WaterNeed,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// =============================================================================
// Planting calendar
// =============================================================================

/// Month with its season in the region
#[derive(Debug, Clone, Serialize)]
pub struct MonthEntry {
    /// Month number
    pub month: u32,
    /// French name
    pub name: &'static str,
    /// Season in the region
    pub season: Season,
}

/// Planting calendar for a crop in a region
#[derive(Debug, Clone, Serialize)]
pub struct PlantingCalendar {
    /// Crop
    pub crop: Crop,
    /// Region
    pub region: Region,
    /// Agro-ecological zone
    pub zone: AgroZone,
    /// Whether the crop is recommended in the region
    pub recommended_in_region: bool,
    /// Sowing or planting months
    pub planting_months: Vec<MonthEntry>,
    /// Harvest months
    pub harvest_months: Vec<MonthEntry>,
    /// Zone calendar windows that list the crop
    pub zone_windows: Vec<&'static PlantingWindow>,
    /// Growth cycle (days)
    pub cycle_days: u32,
    /// Harvest estimate for the next planting window
    pub next_planting: Option<MaturityEstimate>,
    /// Season today
    pub current_season: Season,
    /// Typical work this month
    pub activities_this_month: &'static [&'static str],
}

fn window_lists(window: &PlantingWindow, crop: Crop) -> bool {
    window.crops.iter().any(|c| *c == crop.label())
}

fn window_months(windows: &[&PlantingWindow]) -> Vec<u32> {
    let mut months: Vec<u32> = windows
        .iter()
        .flat_map(|w| {
            if w.months.is_empty() {
                (1..=12).collect::<Vec<u32>>()
            } else {
                w.months.to_vec()
            }
        })
        .collect();
    months.sort_unstable();
    months.dedup();
    months
}

/// Planting calendar; savanna regions follow the zone calendar when it lists
/// the crop since the tabulated months describe the bimodal south
pub fn planting_calendar(env: &ToolEnv, crop: Crop, region: Region) -> PlantingCalendar {
    let zone = region.zone();
    let zone_windows: Vec<&'static PlantingWindow> = planting_windows(zone)
        .filter(|w| window_lists(w, crop))
        .collect();
    let cycle_days = crop.cycle_days();
    let shift = ((f64::from(cycle_days) / 30.0).round() as u32) % 12;

    let (planting, harvest): (Vec<u32>, Vec<u32>) = match crop.info() {
        Some(info) if !(zone == AgroZone::Savanna && !zone_windows.is_empty()) => {
            (info.planting_months.to_vec(), info.harvest_months.to_vec())
        }
        _ => {
            let mut planting = window_months(&zone_windows);
            if planting.is_empty() {
                planting = region.info().wet_months.to_vec();
            }
            let mut harvest: Vec<u32> = planting.iter().map(|m| (m - 1 + shift) % 12 + 1).collect();
            harvest.sort_unstable();
            harvest.dedup();
            (planting, harvest)
        }
    };

    let entry = |month: u32| MonthEntry {
        month,
        name: month_name(month),
        season: season_for(region, month),
    };

    let today = env.today();
    let next_planting = next_month_start(today, &planting)
        .map(|date| estimate_maturity(crop, date, region));

    PlantingCalendar {
        crop,
        region,
        zone,
        recommended_in_region: crop.info().map_or(false, |i| i.regions.contains(&region)),
        planting_months: planting.iter().copied().map(entry).collect(),
        harvest_months: harvest.iter().copied().map(entry).collect(),
        zone_windows,
        cycle_days,
        next_planting,
        current_season: season_for(region, today.month()),
        activities_this_month: seasonal_activities(region, today.month()),
    }
}

/// Today if the current month is listed, else the first day of the next
/// listed month
fn next_month_start(today: NaiveDate, months: &[u32]) -> Option<NaiveDate> {
    if months.contains(&today.month()) {
        return Some(today);
    }
    (1..=12).find_map(|ahead| {
        let index = today.month0() + ahead;
        let month = index % 12 + 1;
        let year = today.year() + (index / 12) as i32;
        months
            .contains(&month)
            .then(|| NaiveDate::from_ymd_opt(year, month, 1))
            .flatten()
    })
}

#[derive(Deserialize)]
struct CalendarArgs {
    crop: Crop,
    #[serde(default)]
    region: Option<Region>,
}

fn calendar_tool(env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: CalendarArgs| {
        Ok(planting_calendar(env, args.crop, env.region_or_default(args.region)))
    })
}

// =============================================================================
// Rotation
// =============================================================================

/// Candidate for the next season
#[derive(Debug, Clone, Serialize)]
pub struct RotationOption {
    /// Crop
    pub crop: Crop,
    /// Botanical family
    pub family: &'static str,
    /// Ranking score
    pub score: i32,
    /// Why it ranks there
    pub reasons: Vec<String>,
}

/// Rotation plan
#[derive(Debug, Clone, Serialize)]
pub struct RotationAdvice {
    /// Crop in the field now
    pub current_crop: Crop,
    /// Its family
    pub current_family: &'static str,
    /// Soil as given
    pub soil_type: Option<String>,
    /// Recognised crops of the field history, most recent first
    pub field_history: Vec<Crop>,
    /// Best three candidates
    pub recommendations: Vec<RotationOption>,
    /// Year-by-year sequence starting next season
    pub rotation_plan: Vec<String>,
    /// Cover crops and green manures
    pub cover_crops: &'static [&'static str],
    /// Warnings about the field history
    pub warnings: Vec<String>,
}

/// Rank annual crops of a different family; legumes follow non-legumes
pub fn rotation_advice(current: Crop, soil: Option<&str>, history: &[Crop]) -> RotationAdvice {
    let soil_type = soil.and_then(|s| s.parse::<SoilType>().ok());
    let recent: Vec<Crop> = history.iter().take(2).copied().collect();

    let mut options: Vec<RotationOption> = Crop::ALL
        .into_iter()
        .filter(|c| *c != current && !c.is_perennial() && c.family() != current.family())
        .map(|candidate| {
            let mut score = 0;
            let mut reasons = vec![format!(
                "famille différente ({} après {})",
                candidate.family(),
                current.family()
            )];
            if candidate.is_legume() && !current.is_legume() {
                score += 3;
                reasons.push("légumineuse: restitue l'azote au sol".to_string());
            }
            if recent.contains(&candidate) {
                score -= 2;
                reasons.push("déjà cultivée récemment sur la parcelle".to_string());
            } else {
                score += 2;
            }
            if history.iter().any(|h| h.family() == candidate.family()) {
                score -= 1;
            }
            if let (Some(soil), Some(info)) = (soil_type, candidate.info()) {
                if info.soils.contains(&soil) {
                    score += 1;
                    reasons.push(format!("adaptée aux sols {}", soil.name()));
                }
            }
            RotationOption {
                crop: candidate,
                family: candidate.family(),
                score,
                reasons,
            }
        })
        .collect();
    options.sort_by(|a, b| b.score.cmp(&a.score).then(a.crop.cmp(&b.crop)));

    // Consecutive years never share a family
    let mut rotation_plan = Vec::new();
    let mut previous_family = current.family();
    for option in &options {
        if rotation_plan.len() == 3 {
            break;
        }
        if option.family != previous_family {
            rotation_plan.push(format!("Année {}: {}", rotation_plan.len() + 1, option.crop));
            previous_family = option.family;
        }
    }
    options.truncate(3);

    let mut warnings = Vec::new();
    if current.is_perennial() {
        warnings.push(format!(
            "{current} est une culture pérenne: la rotation porte sur les cultures intercalaires"
        ));
    }
    let repeats = history.iter().filter(|h| **h == current).count();
    if repeats >= 2 {
        warnings.push(format!(
            "monoculture de {current} depuis {repeats} saisons: risque d'épuisement du sol et de parasites"
        ));
    }

    RotationAdvice {
        current_crop: current,
        current_family: current.family(),
        soil_type: soil.map(str::to_string),
        field_history: history.to_vec(),
        recommendations: options,
        rotation_plan,
        cover_crops: &["mucuna", "pueraria", "niébé", "crotalaire"],
        warnings,
    }
}

#[derive(Deserialize)]
struct RotationArgs {
    current_crop: Crop,
    #[serde(default)]
    soil_type: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    field_history: Vec<String>,
}

fn rotation_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: RotationArgs| {
        let history: Vec<Crop> = args
            .field_history
            .iter()
            .filter_map(|c| c.parse().ok())
            .collect();
        Ok(rotation_advice(
            args.current_crop,
            args.soil_type.as_deref(),
            &history,
        ))
    })
}

// =============================================================================
// Varieties
// =============================================================================

/// Variety selection guidance
#[derive(Debug, Clone, Serialize)]
pub struct VarietyGuidance {
    /// Crop
    pub crop: Crop,
    /// Region
    pub region: Region,
    /// Priorities as understood
    pub priorities: String,
    /// Whether the crop is recommended in the region
    pub regional_fit: bool,
    /// 0-100 agro-climatic fit, when the crop has a detailed record
    pub suitability_score: Option<u32>,
    /// Soils shared by the crop and the region
    pub soil_match: Vec<SoilType>,
    /// Water requirement
    pub water_need: Option<WaterNeed>,
    /// Growth cycle (days)
    pub cycle_days: u32,
    /// Reference yield (kg/ha)
    pub reference_yield_kg_ha: Option<u32>,
    /// What to look for in a variety
    pub selection_criteria: Vec<&'static str>,
    /// Diseases the variety should tolerate
    pub resistance_targets: Vec<&'static str>,
    /// Where to get certified seed
    pub seed_sources: &'static [&'static str],
}

fn span_overlap(a: Span<f64>, b: Span<f64>) -> f64 {
    (a.max.min(b.max) - a.min.max(b.min)).max(0.0)
}

/// Regional fit of a crop plus selection criteria derived from priorities
pub fn variety_guidance(crop: Crop, region: Region, priorities: &[String]) -> VarietyGuidance {
    let region_info = region.info();
    let info = crop.info();
    let regional_fit = info.map_or(false, |i| i.regions.contains(&region));
    let soil_match: Vec<SoilType> = info
        .map(|i| {
            i.soils
                .iter()
                .copied()
                .filter(|s| region_info.soils.contains(s))
                .collect()
        })
        .unwrap_or_default();

    let suitability_score = info.map(|i| {
        let width = (region_info.temperature_c.max - region_info.temperature_c.min).max(1.0);
        let temperature = span_overlap(region_info.temperature_c, i.temperature_c) / width;
        let mut score = 30.0 * temperature.min(1.0);
        if regional_fit {
            score += 40.0;
        }
        if !soil_match.is_empty() {
            score += 30.0;
        }
        score.round() as u32
    });

    let joined = if priorities.is_empty() {
        "rendement et adaptation locale".to_string()
    } else {
        priorities.join(", ")
    };
    let mut selection_criteria = Vec::new();
    let wants = |needles: &[&str]| needles.iter().any(|n| joined.contains(n));
    if wants(&["rendement", "productiv"]) {
        selection_criteria.push("variétés améliorées à haut rendement");
    }
    if wants(&["résist", "resist", "maladie", "tolér"]) {
        selection_criteria.push("tolérance aux maladies présentes dans la région");
    }
    if wants(&["précoc", "cycle court", "rapide"]) {
        selection_criteria.push("variétés précoces à cycle court");
    }
    if wants(&["sécheresse", "secheresse", "sec"]) {
        selection_criteria.push("tolérance à la sécheresse");
    }
    if wants(&["adaptation", "local"]) {
        selection_criteria.push("variétés locales éprouvées dans la région");
    }
    if selection_criteria.is_empty() {
        selection_criteria.push("variétés améliorées à haut rendement");
        selection_criteria.push("variétés locales éprouvées dans la région");
    }

    VarietyGuidance {
        crop,
        region,
        priorities: joined,
        regional_fit,
        suitability_score,
        soil_match,
        water_need: info.map(|i| i.water_need),
        cycle_days: crop.cycle_days(),
        reference_yield_kg_ha: info.map(|i| i.yield_kg_ha),
        selection_criteria,
        resistance_targets: diseases_for(crop).iter().map(|d| d.name).collect(),
        seed_sources: &[
            "IRAD (Institut de Recherche Agricole pour le Développement)",
            "délégations régionales du MINADER",
            "coopératives semencières agréées",
        ],
    }
}

#[derive(Deserialize)]
struct VarietyArgs {
    crop: Crop,
    #[serde(default)]
    region: Option<Region>,
    #[serde(default, deserialize_with = "string_list")]
    priorities: Vec<String>,
}

fn variety_tool(env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: VarietyArgs| {
        Ok(variety_guidance(
            args.crop,
            env.region_or_default(args.region),
            &args.priorities,
        ))
    })
}

// =============================================================================
// Cultivation techniques
// =============================================================================

/// Cultivation guide
#[derive(Debug, Clone, Serialize)]
pub struct CultivationGuide {
    /// Crop
    pub crop: Crop,
    /// Farming system as given
    pub farming_system: String,
    /// Constraints as given
    pub constraints: Vec<String>,
    /// Whether mechanised equipment is considered
    pub mechanised: bool,
    /// Field operations in order
    pub steps: Vec<&'static str>,
    /// Beneficial associations
    pub associations: Vec<&'static Association>,
    /// Traditional techniques
    pub techniques: &'static [Technique],
    /// Fertilizers compatible with the budget
    pub fertilizers: Vec<&'static Fertilizer>,
    /// Equipment for the system
    pub tools: Vec<&'static FarmTool>,
    /// Cost of the equipment list (FCFA)
    pub equipment_cost: u32,
}

/// Techniques filtered by farming system and constraints
pub fn cultivation_guide(crop: Crop, farming_system: &str, constraints: &[String]) -> CultivationGuide {
    let system = farming_system.to_lowercase();
    let mechanised = ["moderne", "mécan", "mecan", "intensif"]
        .iter()
        .any(|k| system.contains(k));
    let tight_budget = constraints
        .iter()
        .any(|c| c.contains("budget") || c.contains("limit") || c.contains("faible"));
    let short_labour = constraints
        .iter()
        .any(|c| c.contains("main d") || c.contains("main-d"));

    let fertilizers: Vec<&'static Fertilizer> = fertilizers()
        .iter()
        .filter(|f| !tight_budget || f.kind != "chimique")
        .collect();
    let tools: Vec<&'static FarmTool> = farm_tools(false)
        .chain(farm_tools(true).filter(|_| mechanised))
        .collect();
    let equipment_cost = tools.iter().map(|t| t.price).sum();

    let mut steps = if crop.is_perennial() {
        vec![
            "préparation de la parcelle et piquetage",
            "trouaison et plantation en début de saison des pluies",
            "ombrage ou tuteurage des jeunes plants",
            "désherbage et paillage au pied",
            "fertilisation organique annuelle",
            "taille sanitaire et surveillance",
        ]
    } else {
        vec![
            "défrichage sans brûlis et préparation du sol",
            "semis en ligne aux écartements recommandés",
            "sarclage à 2 et 5 semaines",
            "fertilisation de fond puis de couverture",
            "surveillance phytosanitaire hebdomadaire",
            "récolte à maturité et séchage",
        ]
    };
    if short_labour {
        steps.push("entraide ou groupement pour les pics de travail");
    }

    CultivationGuide {
        crop,
        farming_system: farming_system.to_string(),
        constraints: constraints.to_vec(),
        mechanised,
        steps,
        associations: associations_for(crop).collect(),
        techniques: techniques(),
        fertilizers,
        tools,
        equipment_cost,
    }
}

#[derive(Deserialize)]
struct TechniquesArgs {
    crop: Crop,
    #[serde(default)]
    farming_system: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    constraints: Vec<String>,
}

fn techniques_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: TechniquesArgs| {
        let system = args
            .farming_system
            .unwrap_or_else(|| "Traditionnel".to_string());
        let constraints = if args.constraints.is_empty() {
            vec!["budget limité".to_string()]
        } else {
            args.constraints
        };
        Ok(cultivation_guide(args.crop, &system, &constraints))
    })
}

// =============================================================================
// Registration
// =============================================================================

/// Crop tools bound to `env`
pub fn tools(env: &ToolEnv) -> Vec<DomainTool> {
    let def = |name: &str, description: &str, parameters: Value| {
        ToolDefinition::new(name, description, ToolCategory::Crops).with_parameters(parameters)
    };
    vec![
        DomainTool::new(
            def(
                "get_planting_calendar",
                "Calendrier de plantation et de récolte d'une culture dans une région",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture (ex: maïs, manioc, cacao)"},
                        "region": {"type": "string", "description": "Région du Cameroun"}
                    },
                    "required": ["crop", "region"]
                }),
            ),
            env.clone(),
            calendar_tool,
        ),
        DomainTool::new(
            def(
                "get_crop_rotation_advice",
                "Plan de rotation des cultures selon la culture actuelle, le sol et l'historique",
                json!({
                    "type": "object",
                    "properties": {
                        "current_crop": {"type": "string", "description": "Culture actuelle"},
                        "soil_type": {"type": "string", "description": "Type de sol"},
                        "field_history": {"type": "array", "items": {"type": "string"}, "description": "Cultures précédentes, la plus récente en premier"}
                    },
                    "required": ["current_crop", "soil_type"]
                }),
            ),
            env.clone(),
            rotation_tool,
        ),
        DomainTool::new(
            def(
                "get_variety_recommendations",
                "Critères de choix variétal et adaptation régionale d'une culture",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture"},
                        "region": {"type": "string", "description": "Région du Cameroun"},
                        "priorities": {"type": "array", "items": {"type": "string"}, "description": "Priorités (rendement, résistance, précocité)"}
                    },
                    "required": ["crop", "region"]
                }),
            ),
            env.clone(),
            variety_tool,
        ),
        DomainTool::new(
            def(
                "get_cultivation_techniques",
                "Techniques culturales adaptées au système agricole et aux contraintes",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture"},
                        "farming_system": {"type": "string", "description": "Système (traditionnel, moderne, mixte)"},
                        "constraints": {"type": "array", "items": {"type": "string"}, "description": "Contraintes (budget, main d'œuvre, équipement)"}
                    },
                    "required": ["crop"]
                }),
            ),
            env.clone(),
            techniques_tool,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_on(y: i32, m: u32, d: u32) -> ToolEnv {
        ToolEnv::seeded(1).with_today(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_calendar_uses_crop_record_in_forest_zone() {
        let calendar = planting_calendar(&env_on(2024, 2, 10), Crop::Mais, Region::Centre);
        let months: Vec<u32> = calendar.planting_months.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![3, 4, 8, 9]);
        assert!(calendar.recommended_in_region);
        assert_eq!(calendar.zone, AgroZone::Forest);
        let next = calendar.next_planting.unwrap();
        assert_eq!(next.planting_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(next.cycle_days, 120);
    }

    #[test]
    fn test_calendar_follows_savanna_windows() {
        let calendar = planting_calendar(&env_on(2024, 11, 10), Crop::Mais, Region::Nord);
        let months: Vec<u32> = calendar.planting_months.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![5, 6, 7]);
        assert!(calendar
            .planting_months
            .iter()
            .filter(|m| m.month >= 6)
            .all(|m| m.season == Season::SaisonDesPluies));
        // Next window wraps into the following year
        let next = calendar.next_planting.unwrap();
        assert_eq!(next.planting_date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
        assert_eq!(next.cycle_days, 108);
    }

    #[test]
    fn test_calendar_for_untabulated_crop_uses_wet_months() {
        let calendar = planting_calendar(&env_on(2024, 3, 5), Crop::Gombo, Region::Ouest);
        assert!(!calendar.planting_months.is_empty());
        assert!(!calendar.recommended_in_region);
        assert_eq!(
            calendar.next_planting.unwrap().planting_date,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_rotation_prefers_legume_after_cereal() {
        let advice = rotation_advice(Crop::Mais, Some("sableux"), &[]);
        assert_eq!(advice.recommendations[0].crop, Crop::Arachide);
        assert!(advice
            .recommendations
            .iter()
            .all(|r| r.family != "Poaceae" && !r.crop.is_perennial()));
        assert_eq!(advice.rotation_plan.len(), 3);
        assert!(advice.rotation_plan[0].contains("arachide"));
        assert!(advice.warnings.is_empty());
    }

    #[test]
    fn test_rotation_penalises_recent_crops_and_warns_on_monoculture() {
        let advice = rotation_advice(Crop::Manioc, None, &[Crop::Manioc, Crop::Manioc, Crop::Arachide]);
        assert!(advice.warnings.iter().any(|w| w.contains("monoculture")));
        let groundnut = advice
            .recommendations
            .iter()
            .find(|r| r.crop == Crop::Arachide);
        if let Some(option) = groundnut {
            assert!(option.score < 5);
        }
    }

    #[test]
    fn test_variety_guidance_scores_regional_fit() {
        let cafe_west = variety_guidance(Crop::Cafe, Region::Ouest, &[]);
        assert!(cafe_west.regional_fit);
        assert_eq!(cafe_west.soil_match, vec![SoilType::Volcanique, SoilType::Humifere]);
        assert!(cafe_west.suitability_score.unwrap() >= 70);

        let cacao_north = variety_guidance(Crop::Cacao, Region::ExtremeNord, &[]);
        assert!(!cacao_north.regional_fit);
        assert!(cacao_north.suitability_score.unwrap() < cafe_west.suitability_score.unwrap());
        assert_eq!(cacao_north.priorities, "rendement et adaptation locale");
        assert_eq!(cacao_north.resistance_targets.len(), 3);

        assert!(variety_guidance(Crop::Piment, Region::Centre, &[])
            .suitability_score
            .is_none());
    }

    #[test]
    fn test_variety_criteria_from_priorities() {
        let guidance = variety_guidance(
            Crop::Mais,
            Region::Centre,
            &["précocité".to_string(), "résistance".to_string()],
        );
        assert!(guidance.selection_criteria.contains(&"variétés précoces à cycle court"));
        assert!(guidance
            .selection_criteria
            .contains(&"tolérance aux maladies présentes dans la région"));
    }

    #[test]
    fn test_cultivation_guide_respects_budget_and_system() {
        let guide = cultivation_guide(Crop::Mais, "Traditionnel", &["budget limité".to_string()]);
        assert!(!guide.mechanised);
        assert!(guide.fertilizers.iter().all(|f| f.kind != "chimique"));
        assert!(guide.tools.iter().all(|t| !t.mechanised));
        assert_eq!(guide.associations[0].companion, "haricot");

        let modern = cultivation_guide(Crop::Mais, "moderne", &["main d'œuvre".to_string()]);
        assert!(modern.mechanised);
        assert!(modern.fertilizers.iter().any(|f| f.kind == "chimique"));
        assert!(modern.equipment_cost > guide.equipment_cost);
        assert!(modern.steps.last().unwrap().contains("groupement"));
    }
}
