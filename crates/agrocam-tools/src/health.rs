//! Plant health tools: diagnosis, treatment, pest identification, prevention
//!
//! Diagnosis and identification score the reference records against what
//! the farmer observed; the narration is left to the health agent.

use crate::domain::DomainTool;
use crate::env::ToolEnv;
use crate::error::{Error, Result};
use crate::input::{round1, run, string_list};
use crate::registry::{ToolCategory, ToolDefinition};
use agrocam_data::{diseases_for, pests_for, Crop, DiseaseRecord, Region};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Note returned when no record exists for the crop
const NO_RECORD: &str =
    "aucune référence pour cette culture: faire examiner un échantillon par un technicien";

// =============================================================================
// Diagnosis
// =============================================================================

/// One candidate disease
#[derive(Debug, Clone, Serialize)]
pub struct DiseaseCandidate {
    /// Disease name
    pub disease: &'static str,
    /// Causal agent
    pub agent: &'static str,
    /// Match probability (%)
    pub probability: f64,
    /// Severity label
    pub severity: &'static str,
    /// Recommended treatments
    pub treatments: &'static [&'static str],
    /// Preventive practices
    pub prevention: &'static [&'static str],
    /// Observed symptoms that matched
    pub matching_symptoms: Vec<String>,
}

/// Ranked diagnosis
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    /// Crop
    pub crop: Crop,
    /// Observed symptoms
    pub symptoms: Vec<String>,
    /// Observed affected parts
    pub affected_parts: Vec<String>,
    /// Observed conditions
    pub environmental_conditions: Option<String>,
    /// Candidates, most probable first
    pub candidates: Vec<DiseaseCandidate>,
    /// Best candidate
    pub most_likely: Option<DiseaseCandidate>,
    /// Probability of the best candidate
    pub confidence: f64,
    /// Advice when no record applies
    pub note: Option<&'static str>,
}

fn score_disease(
    disease: &'static DiseaseRecord,
    symptoms: &[String],
    parts: &[String],
    conditions: Option<&str>,
) -> DiseaseCandidate {
    let mut score = 0.0;
    let mut total = 0.0;

    let matching_symptoms: Vec<String> = symptoms
        .iter()
        .filter(|s| {
            let s = s.to_lowercase();
            disease.symptoms.iter().any(|ds| s.contains(ds))
        })
        .cloned()
        .collect();
    if !symptoms.is_empty() {
        score += matching_symptoms.len() as f64 / disease.symptoms.len() as f64 * 40.0;
        total += 40.0;
    }

    if !parts.is_empty() {
        let matches = parts
            .iter()
            .filter(|p| disease.affected_parts.contains(&p.to_lowercase().as_str()))
            .count();
        score += matches as f64 / disease.affected_parts.len() as f64 * 30.0;
        total += 30.0;
    }

    if let Some(conditions) = conditions.filter(|c| !c.trim().is_empty()) {
        let conditions = conditions.to_lowercase();
        let matches = disease
            .conditions
            .iter()
            .filter(|c| conditions.contains(*c))
            .count();
        score += matches as f64 / disease.conditions.len() as f64 * 30.0;
        total += 30.0;
    }

    let probability = if total > 0.0 {
        round1((score / total * 100.0).min(100.0))
    } else {
        0.0
    };

    DiseaseCandidate {
        disease: disease.name,
        agent: disease.agent,
        probability,
        severity: disease.severity,
        treatments: disease.treatments,
        prevention: disease.prevention,
        matching_symptoms,
    }
}

/// Score the crop's diseases: symptoms weigh 40, parts 30, conditions 30
pub fn diagnose(
    crop: Crop,
    symptoms: &[String],
    affected_parts: &[String],
    conditions: Option<&str>,
) -> Diagnosis {
    let mut candidates: Vec<DiseaseCandidate> = diseases_for(crop)
        .into_iter()
        .map(|d| score_disease(d, symptoms, affected_parts, conditions))
        .collect();
    candidates.sort_by(|a, b| b.probability.total_cmp(&a.probability));

    let most_likely = candidates.first().cloned();
    let confidence = most_likely.as_ref().map_or(0.0, |c| c.probability);
    Diagnosis {
        crop,
        symptoms: symptoms.to_vec(),
        affected_parts: affected_parts.to_vec(),
        environmental_conditions: conditions.map(str::to_string),
        note: candidates.is_empty().then_some(NO_RECORD),
        candidates,
        most_likely,
        confidence,
    }
}

#[derive(Deserialize)]
struct DiagnoseArgs {
    crop: Crop,
    #[serde(deserialize_with = "string_list")]
    symptoms: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    affected_parts: Vec<String>,
    #[serde(default)]
    environmental_conditions: Option<String>,
}

fn diagnose_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: DiagnoseArgs| {
        if args.symptoms.is_empty() {
            return Err(Error::InvalidInput(
                "au moins un symptôme est requis".to_string(),
            ));
        }
        Ok(diagnose(
            args.crop,
            &args.symptoms,
            &args.affected_parts,
            args.environmental_conditions.as_deref(),
        ))
    })
}

// =============================================================================
// Treatment
// =============================================================================

/// Treatment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TreatmentKind {
    /// Biological products
    Biologique,
    /// Traditional preparations
    Traditionnel,
    /// Synthetic products
    Chimique,
}

/// Treatment product
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Name
    pub name: &'static str,
    /// Category
    pub kind: TreatmentKind,
    /// Price (FCFA)
    pub price_fcfa: u32,
    /// Dose
    pub dose: &'static str,
    /// Efficacy (%)
    pub efficacy: u32,
}

const fn product(
    name: &'static str,
    kind: TreatmentKind,
    price_fcfa: u32,
    dose: &'static str,
    efficacy: u32,
) -> Product {
    Product {
        name,
        kind,
        price_fcfa,
        dose,
        efficacy,
    }
}

static PRODUCTS: [Product; 12] = [
    product("Trichoderma", TreatmentKind::Biologique, 5000, "5g/L", 70),
    product("Bacillus thuringiensis", TreatmentKind::Biologique, 8000, "2g/L", 65),
    product("Extrait de neem", TreatmentKind::Biologique, 3000, "10ml/L", 60),
    product("Savon noir", TreatmentKind::Biologique, 1000, "20g/L", 50),
    product("Cendre de bois", TreatmentKind::Traditionnel, 500, "100g/L", 45),
    product("Extrait ail-piment", TreatmentKind::Traditionnel, 800, "50ml/L", 55),
    product("Urine fermentée", TreatmentKind::Traditionnel, 0, "1:10", 40),
    product("Infusion feuilles papayer", TreatmentKind::Traditionnel, 200, "100g/L", 35),
    product("Mancozèbe", TreatmentKind::Chimique, 15000, "2.5g/L", 85),
    product("Lambda-cyhalothrine", TreatmentKind::Chimique, 12000, "1ml/L", 90),
    product("Oxychlorure de cuivre", TreatmentKind::Chimique, 8000, "3g/L", 80),
    product("Profénofos", TreatmentKind::Chimique, 18000, "2ml/L", 88),
];

/// Step of the treatment schedule
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleStep {
    /// When
    pub when: &'static str,
    /// What to do
    pub actions: &'static [&'static str],
}

static SCHEDULE: [ScheduleStep; 4] = [
    ScheduleStep {
        when: "immédiat",
        actions: &["Nettoyage zone affectée", "Application première dose"],
    },
    ScheduleStep {
        when: "7 jours",
        actions: &["Évaluation évolution", "Deuxième application si nécessaire"],
    },
    ScheduleStep {
        when: "14 jours",
        actions: &["Contrôle efficacité", "Troisième application si persistance"],
    },
    ScheduleStep {
        when: "21 jours",
        actions: &["Bilan traitement", "Mesures préventives"],
    },
];

/// Treatment plan
#[derive(Debug, Clone, Serialize)]
pub struct TreatmentPlan {
    /// Diagnosis as given
    pub diagnosis: String,
    /// Crop
    pub crop: Crop,
    /// Severity as given
    pub severity: String,
    /// Budget as given
    pub budget: String,
    /// Categories retained, in priority order
    pub categories: Vec<TreatmentKind>,
    /// Selected products
    pub products: Vec<Product>,
    /// Four-step schedule
    pub schedule: &'static [ScheduleStep],
    /// Sum of product prices (FCFA)
    pub estimated_cost: u32,
    /// Mean efficacy of the products (%)
    pub expected_efficacy: f64,
    /// Reference treatments when the diagnosis names a known disease
    pub reference_treatments: &'static [&'static str],
    /// Safety rules for synthetic products
    pub precautions: Vec<&'static str>,
}

/// Category order from budget, then severity
pub fn treatment_categories(severity: &str, budget: &str) -> Vec<TreatmentKind> {
    use TreatmentKind::{Biologique, Chimique, Traditionnel};
    let budget = budget.to_lowercase();
    let severity = severity.to_lowercase();
    let mut categories = if budget.contains("limit") || budget.contains("faible") {
        vec![Traditionnel, Biologique]
    } else if budget.contains("mod") {
        vec![Biologique, Chimique]
    } else {
        vec![Chimique, Biologique]
    };
    if severity.contains("critique") || severity.contains("grave") {
        // Chemical control leads, listed once
        categories.retain(|kind| *kind != Chimique);
        categories.insert(0, Chimique);
    } else if severity.contains("faible") || severity.contains("léger") {
        categories = vec![Traditionnel, Biologique];
    }
    categories
}

/// Two best products of each of the first two categories
pub fn treatment_plan(diagnosis: &str, crop: Crop, severity: &str, budget: &str) -> TreatmentPlan {
    let categories = treatment_categories(severity, budget);
    let mut products = Vec::new();
    for kind in categories.iter().take(2) {
        let mut of_kind: Vec<&Product> = PRODUCTS.iter().filter(|p| p.kind == *kind).collect();
        of_kind.sort_by(|a, b| b.efficacy.cmp(&a.efficacy));
        products.extend(of_kind.into_iter().take(2).cloned());
    }

    let estimated_cost = products.iter().map(|p| p.price_fcfa).sum();
    let expected_efficacy = if products.is_empty() {
        0.0
    } else {
        round1(products.iter().map(|p| f64::from(p.efficacy)).sum::<f64>() / products.len() as f64)
    };

    let wanted = diagnosis.to_lowercase();
    let reference_treatments = diseases_for(crop)
        .into_iter()
        .find(|d| wanted.contains(&d.name.to_lowercase()))
        .map_or(&[][..], |d| d.treatments);

    let precautions = if products.iter().any(|p| p.kind == TreatmentKind::Chimique) {
        vec![
            "porter gants, masque et bottes",
            "respecter le délai avant récolte indiqué sur l'étiquette",
            "ne pas traiter par vent fort ni avant la pluie",
        ]
    } else {
        vec!["renouveler après une forte pluie"]
    };

    TreatmentPlan {
        diagnosis: diagnosis.to_string(),
        crop,
        severity: severity.to_string(),
        budget: budget.to_string(),
        categories,
        products,
        schedule: &SCHEDULE,
        estimated_cost,
        expected_efficacy,
        reference_treatments,
        precautions,
    }
}

#[derive(Deserialize)]
struct TreatmentArgs {
    diagnosis: String,
    crop: Crop,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default, alias = "budget_constraints")]
    budget: Option<String>,
}

fn treatment_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: TreatmentArgs| {
        Ok(treatment_plan(
            &args.diagnosis,
            args.crop,
            args.severity.as_deref().unwrap_or("modérée"),
            args.budget.as_deref().unwrap_or("limité"),
        ))
    })
}

// =============================================================================
// Pest identification
// =============================================================================

/// One candidate pest
#[derive(Debug, Clone, Serialize)]
pub struct PestCandidate {
    /// Common name
    pub pest: &'static str,
    /// Scientific name
    pub scientific_name: &'static str,
    /// Raw match score
    pub probability: f64,
    /// Visual description
    pub description: &'static str,
    /// Typical damage
    pub damage_patterns: &'static [&'static str],
    /// Where it lives on the plant
    pub preferred_location: &'static [&'static str],
    /// Life cycle
    pub life_cycle: &'static str,
    /// Peak period
    pub peak_period: &'static str,
    /// Economic impact
    pub economic_impact: &'static str,
}

/// Ranked identification
#[derive(Debug, Clone, Serialize)]
pub struct PestIdentification {
    /// Crop
    pub crop: Crop,
    /// Description as given
    pub pest_description: String,
    /// Candidates, best first
    pub candidates: Vec<PestCandidate>,
    /// Best candidate
    pub most_likely: Option<PestCandidate>,
    /// Score of the best candidate
    pub confidence: f64,
    /// Advice when no record applies
    pub note: Option<&'static str>,
}

/// Description words weigh 30, damage 40, location 30
pub fn identify_pest(
    crop: Crop,
    description: &str,
    damage: Option<&str>,
    location: Option<&str>,
) -> PestIdentification {
    let description_lower = description.to_lowercase();
    let words: Vec<&str> = description_lower.split_whitespace().collect();
    let damage = damage.map(str::to_lowercase);
    let location = location.map(str::to_lowercase);

    let mut candidates: Vec<PestCandidate> = pests_for(crop)
        .into_iter()
        .map(|pest| {
            let mut score = 0.0;
            if !words.is_empty() {
                let pest_description = pest.description.to_lowercase();
                let pest_words: Vec<&str> = pest_description.split_whitespace().collect();
                let matches = words
                    .iter()
                    .filter(|w| pest_words.iter().any(|pw| w.contains(pw)))
                    .count();
                score += matches as f64 / words.len() as f64 * 30.0;
            }
            if let Some(damage) = damage.as_deref() {
                let matches = pest.damage.iter().filter(|d| damage.contains(*d)).count();
                score += matches as f64 / pest.damage.len() as f64 * 40.0;
            }
            if let Some(location) = location.as_deref() {
                let matches = pest.location.iter().filter(|l| location.contains(*l)).count();
                score += matches as f64 / pest.location.len() as f64 * 30.0;
            }
            PestCandidate {
                pest: pest.name,
                scientific_name: pest.scientific_name,
                probability: round1(score),
                description: pest.description,
                damage_patterns: pest.damage,
                preferred_location: pest.location,
                life_cycle: pest.life_cycle,
                peak_period: pest.peak_period,
                economic_impact: pest.economic_impact,
            }
        })
        .collect();
    candidates.sort_by(|a, b| b.probability.total_cmp(&a.probability));

    let most_likely = candidates.first().cloned();
    PestIdentification {
        crop,
        pest_description: description.to_string(),
        confidence: most_likely.as_ref().map_or(0.0, |c| c.probability),
        note: candidates.is_empty().then_some(NO_RECORD),
        candidates,
        most_likely,
    }
}

#[derive(Deserialize)]
struct PestArgs {
    crop: Crop,
    pest_description: String,
    #[serde(default)]
    damage_type: Option<String>,
    #[serde(default)]
    location_on_plant: Option<String>,
}

fn pest_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: PestArgs| {
        Ok(identify_pest(
            args.crop,
            &args.pest_description,
            args.damage_type.as_deref(),
            args.location_on_plant.as_deref(),
        ))
    })
}

// =============================================================================
// Prevention
// =============================================================================

/// Preventive strategy
#[derive(Debug, Clone, Serialize)]
pub struct Strategy {
    /// Name
    pub strategy: &'static str,
    /// Cost (FCFA)
    pub cost: u32,
    /// Efficacy (%)
    pub efficacy: u32,
    /// What it does
    pub description: &'static str,
}

const fn strategy(strategy: &'static str, cost: u32, efficacy: u32, description: &'static str) -> Strategy {
    Strategy {
        strategy,
        cost,
        efficacy,
        description,
    }
}

/// Group of strategies
#[derive(Debug, Clone, Serialize)]
pub struct StrategyGroup {
    /// Category name
    pub category: &'static str,
    /// Best strategies of the category
    pub strategies: Vec<Strategy>,
}

static STRATEGIES: [(&str, [Strategy; 4]); 5] = [
    (
        "culturales",
        [
            strategy("Rotation des cultures", 0, 70, "Briser le cycle des parasites"),
            strategy("Densité optimale", 5000, 60, "Réduire humidité et compétition"),
            strategy("Associations culturales", 2000, 65, "Plantes répulsives ou attractives"),
            strategy("Dates de semis", 0, 55, "Éviter les pics d'infestation"),
        ],
    ),
    (
        "biologiques",
        [
            strategy("Auxiliaires naturels", 10000, 75, "Prédateurs et parasitoïdes"),
            strategy("Plantes pièges", 3000, 60, "Concentrer les parasites"),
            strategy("Biodiversité fonctionnelle", 5000, 70, "Haies, bandes fleuries"),
            strategy("Micro-organismes bénéfiques", 8000, 65, "Mycorhizes, rhizobactéries"),
        ],
    ),
    (
        "physiques",
        [
            strategy("Paillage", 15000, 50, "Limiter mauvaises herbes et maladies du sol"),
            strategy("Filets anti-insectes", 25000, 85, "Barrière physique"),
            strategy("Pièges colorés", 8000, 60, "Capture des adultes volants"),
            strategy("Barrières végétales", 12000, 55, "Haies répulsives"),
        ],
    ),
    (
        "sanitaires",
        [
            strategy("Assainissement", 2000, 80, "Élimination des résidus infectés"),
            strategy("Désinfection outils", 1000, 70, "Éviter la propagation"),
            strategy("Quarantaine nouveaux plants", 500, 90, "Contrôle des introductions"),
            strategy("Surveillance régulière", 3000, 85, "Détection précoce"),
        ],
    ),
    (
        "nutritionnelles",
        [
            strategy("Équilibre NPK", 20000, 65, "Plantes plus résistantes"),
            strategy("Amendements organiques", 15000, 70, "Amélioration du sol et de la résistance"),
            strategy("Oligoéléments", 8000, 60, "Stimulation des défenses naturelles"),
            strategy("Compost de qualité", 10000, 68, "Nutrition équilibrée"),
        ],
    ),
];

/// Prevention plan
#[derive(Debug, Clone, Serialize)]
pub struct PreventionPlan {
    /// Crop
    pub crop: Crop,
    /// Region, when given
    pub region: Option<Region>,
    /// Threats considered
    pub main_threats: Vec<String>,
    /// Farming system as given
    pub farming_system: String,
    /// Top three strategies of each priority category
    pub strategies: Vec<StrategyGroup>,
    /// Sum of strategy costs (FCFA)
    pub implementation_cost: u32,
    /// Mean efficacy (%)
    pub expected_efficacy: f64,
    /// Two best strategies of each category
    pub priority_actions: Vec<&'static str>,
}

fn priority_categories(farming_system: &str) -> [&'static str; 3] {
    let system = farming_system.to_lowercase();
    if system.contains("tradition") {
        ["culturales", "sanitaires", "nutritionnelles"]
    } else if system.contains("bio") {
        ["biologiques", "culturales", "physiques"]
    } else {
        ["physiques", "biologiques", "nutritionnelles"]
    }
}

/// Strategies chosen by farming system; threats default to the crop's
/// known diseases and pests
pub fn prevention_plan(
    crop: Crop,
    region: Option<Region>,
    threats: &[String],
    farming_system: &str,
) -> PreventionPlan {
    let strategies: Vec<StrategyGroup> = priority_categories(farming_system)
        .into_iter()
        .filter_map(|category| {
            let (name, list) = STRATEGIES.iter().find(|entry| entry.0 == category)?;
            let mut best: Vec<Strategy> = list.to_vec();
            best.sort_by(|a, b| b.efficacy.cmp(&a.efficacy));
            best.truncate(3);
            Some(StrategyGroup {
                category: *name,
                strategies: best,
            })
        })
        .collect();

    let all: Vec<&Strategy> = strategies.iter().flat_map(|g| &g.strategies).collect();
    let implementation_cost = all.iter().map(|s| s.cost).sum();
    let expected_efficacy = if all.is_empty() {
        0.0
    } else {
        round1(all.iter().map(|s| f64::from(s.efficacy)).sum::<f64>() / all.len() as f64)
    };
    let priority_actions = strategies
        .iter()
        .flat_map(|g| g.strategies.iter().take(2).map(|s| s.strategy))
        .collect();

    let main_threats = if threats.is_empty() {
        diseases_for(crop)
            .iter()
            .map(|d| d.name.to_string())
            .chain(pests_for(crop).iter().map(|p| p.name.to_string()))
            .collect()
    } else {
        threats.to_vec()
    };

    PreventionPlan {
        crop,
        region,
        main_threats,
        farming_system: farming_system.to_string(),
        strategies,
        implementation_cost,
        expected_efficacy,
        priority_actions,
    }
}

#[derive(Deserialize)]
struct PreventionArgs {
    crop: Crop,
    #[serde(default)]
    region: Option<Region>,
    #[serde(default, deserialize_with = "string_list")]
    main_threats: Vec<String>,
    #[serde(default)]
    farming_system: Option<String>,
}

fn prevention_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: PreventionArgs| {
        Ok(prevention_plan(
            args.crop,
            args.region,
            &args.main_threats,
            args.farming_system.as_deref().unwrap_or("traditionnel"),
        ))
    })
}

// =============================================================================
// Registration
// =============================================================================

/// Plant health tools bound to `env`
pub fn tools(env: &ToolEnv) -> Vec<DomainTool> {
    let def = |name: &str, description: &str, parameters: Value| {
        ToolDefinition::new(name, description, ToolCategory::Health).with_parameters(parameters)
    };
    vec![
        DomainTool::new(
            def(
                "diagnose_plant_disease",
                "Diagnostic d'une maladie à partir des symptômes, des parties atteintes et des conditions",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture affectée"},
                        "symptoms": {"type": "array", "items": {"type": "string"}, "description": "Symptômes observés"},
                        "affected_parts": {"type": "array", "items": {"type": "string"}, "description": "Parties de la plante atteintes"},
                        "environmental_conditions": {"type": "string", "description": "Conditions (humidité, saison...)"}
                    },
                    "required": ["crop", "symptoms"]
                }),
            ),
            env.clone(),
            diagnose_tool,
        ),
        DomainTool::new(
            def(
                "get_treatment_recommendations",
                "Plan de traitement selon le diagnostic, la gravité et le budget",
                json!({
                    "type": "object",
                    "properties": {
                        "diagnosis": {"type": "string", "description": "Maladie ou ravageur diagnostiqué"},
                        "crop": {"type": "string", "description": "Culture affectée"},
                        "severity": {"type": "string", "description": "Gravité (faible, modérée, critique)"},
                        "budget": {"type": "string", "description": "Budget (limité, modéré, élevé)"}
                    },
                    "required": ["diagnosis", "crop"]
                }),
            ),
            env.clone(),
            treatment_tool,
        ),
        DomainTool::new(
            def(
                "get_pest_identification",
                "Identification d'un ravageur à partir de sa description et des dégâts",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture affectée"},
                        "pest_description": {"type": "string", "description": "Description de l'insecte observé"},
                        "damage_type": {"type": "string", "description": "Dégâts observés"},
                        "location_on_plant": {"type": "string", "description": "Localisation sur la plante"}
                    },
                    "required": ["crop", "pest_description"]
                }),
            ),
            env.clone(),
            pest_tool,
        ),
        DomainTool::new(
            def(
                "get_prevention_strategies",
                "Stratégies préventives selon la culture, les menaces et le système de culture",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture à protéger"},
                        "region": {"type": "string", "description": "Région du Cameroun"},
                        "main_threats": {"type": "array", "items": {"type": "string"}, "description": "Menaces principales"},
                        "farming_system": {"type": "string", "description": "Système (traditionnel, biologique, intensif)"}
                    },
                    "required": ["crop"]
                }),
            ),
            env.clone(),
            prevention_tool,
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
    fn test_brown_spots_on_pods_point_to_black_pod() {
        let diagnosis = diagnose(Crop::Cacao, &strings(&["taches brunes sur cabosses"]), &[], None);
        let best = diagnosis.most_likely.unwrap();
        assert_eq!(best.disease, "Pourriture brune");
        assert_eq!(best.probability, 25.0);
        assert_eq!(diagnosis.confidence, 25.0);
        assert_eq!(best.matching_symptoms, vec!["taches brunes sur cabosses"]);
    }

    #[test]
    fn test_diagnosis_combines_all_criteria() {
        let diagnosis = diagnose(
            Crop::Cacao,
            &strings(&["taches brunes", "exsudat"]),
            &strings(&["cabosses", "fruits"]),
            Some("Humidité élevée après blessures"),
        );
        let best = &diagnosis.candidates[0];
        assert_eq!(best.disease, "Pourriture brune");
        // (2/4*40 + 2/3*30 + 2/3*30) / 100
        assert_eq!(best.probability, 60.0);
        assert!(diagnosis
            .candidates
            .windows(2)
            .all(|w| w[0].probability >= w[1].probability));
    }

    #[test]
    fn test_diagnosis_without_record() {
        let diagnosis = diagnose(Crop::Gombo, &strings(&["feuilles jaunes"]), &[], None);
        assert!(diagnosis.candidates.is_empty());
        assert!(diagnosis.most_likely.is_none());
        assert_eq!(diagnosis.confidence, 0.0);
        assert!(diagnosis.note.is_some());
    }

    #[test]
    fn test_diagnose_tool_requires_symptoms() {
        let env = ToolEnv::seeded(1);
        assert!(diagnose_tool(&env, json!({"crop": "manioc", "symptoms": []})).is_err());
        let value = diagnose_tool(
            &env,
            json!({"crop": "manioc", "symptoms": "mosaïque feuilles, jaunissement"}),
        )
        .unwrap();
        assert_eq!(value["most_likely"]["disease"], "Mosaïque du manioc");
        assert_eq!(value["confidence"], 50.0);
    }

    #[test]
    fn test_treatment_categories_follow_budget_and_severity() {
        use TreatmentKind::{Biologique, Chimique, Traditionnel};
        assert_eq!(treatment_categories("modérée", "limité"), vec![Traditionnel, Biologique]);
        assert_eq!(treatment_categories("modérée", "modéré"), vec![Biologique, Chimique]);
        assert_eq!(treatment_categories("modérée", "élevé"), vec![Chimique, Biologique]);
        assert_eq!(
            treatment_categories("critique", "limité"),
            vec![Chimique, Traditionnel, Biologique]
        );
        assert_eq!(treatment_categories("faible", "élevé"), vec![Traditionnel, Biologique]);
        assert_eq!(treatment_categories("critique", "élevé"), vec![Chimique, Biologique]);
        assert_eq!(treatment_categories("grave", "modéré"), vec![Chimique, Biologique]);
    }

    #[test]
    fn test_critical_plan_with_high_budget_lists_products_once() {
        let plan = treatment_plan("Mirides", Crop::Cacao, "critique", "élevé");
        let names: Vec<&str> = plan.products.iter().map(|p| p.name).collect();
        let mut unique = names.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
        assert_eq!(plan.categories, vec![TreatmentKind::Chimique, TreatmentKind::Biologique]);
        assert_eq!(names[..2], ["Lambda-cyhalothrine", "Profénofos"]);
        assert_eq!(
            plan.estimated_cost,
            plan.products.iter().map(|p| p.price_fcfa).sum::<u32>()
        );
        assert!(plan.estimated_cost < 60000);
    }

    #[test]
    fn test_treatment_plan_costs_and_efficacy() {
        let plan = treatment_plan("Pourriture brune", Crop::Cacao, "modérée", "limité");
        let names: Vec<&str> = plan.products.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec!["Extrait ail-piment", "Cendre de bois", "Trichoderma", "Bacillus thuringiensis"]
        );
        assert_eq!(plan.estimated_cost, 800 + 500 + 5000 + 8000);
        assert_eq!(plan.expected_efficacy, 58.8);
        assert_eq!(plan.schedule.len(), 4);
        assert_eq!(plan.reference_treatments[0], "fongicides cupriques");
        assert_eq!(plan.precautions.len(), 1);

        let critical = treatment_plan("Mirides", Crop::Cacao, "critique", "limité");
        assert_eq!(critical.products[0].name, "Lambda-cyhalothrine");
        assert_eq!(critical.products[1].name, "Profénofos");
        assert!(critical.precautions.len() > 1);
    }

    #[test]
    fn test_pest_identification_ranks_fall_armyworm() {
        let identification = identify_pest(
            Crop::Mais,
            "chenille gris-brun avec rayures",
            Some("défoliation et trous feuilles"),
            Some("feuilles"),
        );
        let best = identification.most_likely.unwrap();
        assert_eq!(best.pest, "Légionnaire d'automne");
        assert!(best.probability > identification.candidates[1].probability);
        assert_eq!(identification.confidence, best.probability);
    }

    #[test]
    fn test_prevention_plan_for_traditional_system() {
        let plan = prevention_plan(Crop::Cacao, Some(Region::Sud), &[], "traditionnel");
        let categories: Vec<&str> = plan.strategies.iter().map(|g| g.category).collect();
        assert_eq!(categories, vec!["culturales", "sanitaires", "nutritionnelles"]);
        assert!(plan.strategies.iter().all(|g| g.strategies.len() == 3));
        assert_eq!(
            plan.strategies[1].strategies[0].strategy,
            "Quarantaine nouveaux plants"
        );
        assert_eq!(plan.priority_actions.len(), 6);
        assert_eq!(plan.implementation_cost, 7000 + 5500 + 45000);
        assert!(plan.main_threats.contains(&"Pourriture brune".to_string()));
    }

    #[test]
    fn test_prevention_plan_for_intensive_system() {
        let plan = prevention_plan(Crop::Mais, None, &strings(&["foreur"]), "intensif");
        assert_eq!(plan.strategies[0].category, "physiques");
        assert_eq!(plan.main_threats, vec!["foreur"]);
    }
}
