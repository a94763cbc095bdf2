//! Weather tools: forecasts, irrigation advice, climate alerts and rainfall
//!
//! Forecasts and rainfall history are simulated around regional
//! baselines; the RNG comes from [`ToolEnv`].

use crate::domain::DomainTool;
use crate::env::ToolEnv;
use crate::error::Result;
use crate::input::{opt_number, round1, run};
use crate::registry::{ToolCategory, ToolDefinition};
use agrocam_data::utils::season_for;
use agrocam_data::{month_name, Crop, Region, Season, SoilType, WaterNeed};
use chrono::{Datelike, Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Longest forecast horizon (days)
pub const MAX_FORECAST_DAYS: u32 = 14;

/// Months treated as rainy by the simulators
const RAINY_MONTHS: [u32; 6] = [3, 4, 5, 9, 10, 11];

fn base_temperatures(region: Region) -> (i32, i32) {
    match region {
        Region::Nord => (22, 38),
        Region::Littoral => (23, 31),
        Region::Ouest => (15, 25),
        Region::Sud => (22, 29),
        _ => (19, 28),
    }
}

// =============================================================================
// Forecast
// =============================================================================

/// One simulated day
#[derive(Debug, Clone, Serialize)]
pub struct DailyForecast {
    /// Day
    pub date: NaiveDate,
    /// Minimum temperature (°C)
    pub temperature_min: i32,
    /// Maximum temperature (°C)
    pub temperature_max: i32,
    /// Relative humidity (%)
    pub humidity: u32,
    /// Chance of rain (%)
    pub rain_probability: u32,
    /// Wind speed (km/h)
    pub wind_speed_kmh: u32,
    /// Sky summary
    pub conditions: &'static str,
}

/// Forecast for a region
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    /// Region
    pub region: Region,
    /// Days
    pub forecast: Vec<DailyForecast>,
    /// Days with more than 50 % chance of rain
    pub rainy_days: usize,
    /// Data origin
    pub source: &'static str,
}

/// Simulated forecast of `days` days (clamped to 1..=14) starting today
pub fn forecast(env: &ToolEnv, region: Region, days: u32) -> Forecast {
    let (base_min, base_max) = base_temperatures(region);
    let today = env.today();
    let forecast: Vec<DailyForecast> = (0..days.clamp(1, MAX_FORECAST_DAYS))
        .map(|offset| {
            let date = today + Duration::days(i64::from(offset));
            env.with_rng(|rng| {
                let rain_probability = if RAINY_MONTHS.contains(&date.month()) {
                    rng.gen_range(40..=80)
                } else {
                    rng.gen_range(10..=30)
                };
                DailyForecast {
                    date,
                    temperature_min: base_min + rng.gen_range(-2..=2),
                    temperature_max: base_max + rng.gen_range(-2..=2),
                    humidity: rng.gen_range(60..=85),
                    rain_probability,
                    wind_speed_kmh: rng.gen_range(5..=20),
                    conditions: if rain_probability > 50 {
                        "Pluvieux"
                    } else {
                        "Partiellement nuageux"
                    },
                }
            })
        })
        .collect();
    let rainy_days = forecast.iter().filter(|d| d.rain_probability > 50).count();
    Forecast {
        region,
        forecast,
        rainy_days,
        source: "simulation",
    }
}

#[derive(Deserialize)]
struct ForecastArgs {
    #[serde(default)]
    region: Option<Region>,
    #[serde(default, deserialize_with = "opt_number")]
    days: Option<f64>,
}

fn forecast_tool(env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: ForecastArgs| {
        let days = args.days.map_or(7, |d| d.max(1.0) as u32);
        Ok(forecast(env, env.region_or_default(args.region), days))
    })
}

// =============================================================================
// Irrigation advice
// =============================================================================

/// Signs of bad watering
#[derive(Debug, Clone, Serialize)]
pub struct WateringSigns {
    /// Too much water
    pub over_irrigation: &'static [&'static str],
    /// Too little water
    pub under_irrigation: &'static [&'static str],
}

/// Irrigation advice for a crop on a soil
#[derive(Debug, Clone, Serialize)]
pub struct IrrigationAdvice {
    /// Crop
    pub crop: Crop,
    /// Soil as given
    pub soil_type: String,
    /// Crop water need
    pub water_need: WaterNeed,
    /// Soil retention class
    pub soil_retention: &'static str,
    /// Region used for the season
    pub region: Region,
    /// Current season
    pub season: Season,
    /// Whether watering is needed now
    pub irrigation_needed: bool,
    /// Recommended frequency
    pub frequency: &'static str,
    /// Water per application (mm)
    pub amount_mm: u32,
    /// Time of day
    pub best_time: &'static str,
    /// Water-saving practices
    pub water_saving: Vec<&'static str>,
    /// What to watch for
    pub signs: WateringSigns,
}

/// Irrigation advice; `conditions` is free text describing the weather
pub fn irrigation_advice(
    env: &ToolEnv,
    crop: Crop,
    soil: &str,
    region: Region,
    conditions: &str,
) -> IrrigationAdvice {
    let water_need = crop.info().map_or(WaterNeed::Moyen, |i| i.water_need);
    let soil_retention = soil
        .parse::<SoilType>()
        .map_or("moyenne", |s| s.water_retention());
    let season = season_for(region, env.month());
    let conditions = conditions.to_lowercase();
    let hot_or_dry = ["sec", "sèche", "chaud", "chaleur", "canicule"]
        .iter()
        .any(|w| conditions.contains(w));
    let irrigation_needed = season.is_dry() || hot_or_dry;

    let frequency = match (irrigation_needed, soil_retention) {
        (false, _) => "irrigation d'appoint seulement, après 7 jours sans pluie",
        (true, "faible") => "tous les 2 jours",
        (true, "moyenne") => "tous les 3-4 jours",
        (true, _) => "tous les 5-7 jours",
    };
    let base_mm: f64 = match water_need {
        WaterNeed::Faible => 15.0,
        WaterNeed::Moyen => 25.0,
        WaterNeed::Eleve => 35.0,
    };
    let soil_factor = match soil_retention {
        "faible" => 0.6,
        "élevée" => 1.2,
        _ => 1.0,
    };

    let mut water_saving = vec!["paillage du sol", "arrosage au pied des plants"];
    if soil_retention == "faible" {
        water_saving.push("apport de compost pour retenir l'eau");
    }
    if matches!(water_need, WaterNeed::Eleve) {
        water_saving.push("goutte-à-goutte ou micro-aspersion");
    }

    IrrigationAdvice {
        crop,
        soil_type: soil.to_string(),
        water_need,
        soil_retention,
        region,
        season,
        irrigation_needed,
        frequency,
        amount_mm: (base_mm * soil_factor).round() as u32,
        best_time: "tôt le matin ou en fin d'après-midi",
        water_saving,
        signs: WateringSigns {
            over_irrigation: &["feuilles jaunes et molles", "sol détrempé", "pourriture des racines"],
            under_irrigation: &["flétrissement aux heures chaudes", "feuilles enroulées", "sol fissuré"],
        },
    }
}

#[derive(Deserialize)]
struct IrrigationArgs {
    crop: Crop,
    soil_type: String,
    #[serde(default)]
    current_conditions: Option<Value>,
    #[serde(default)]
    region: Option<Region>,
}

fn irrigation_tool(env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: IrrigationArgs| {
        let conditions = match args.current_conditions {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        Ok(irrigation_advice(
            env,
            args.crop,
            &args.soil_type,
            env.region_or_default(args.region),
            &conditions,
        ))
    })
}

// =============================================================================
// Climate alerts
// =============================================================================

/// Weather alert
#[derive(Debug, Clone, Serialize)]
pub struct ClimateAlert {
    /// Kind of event
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Severity label
    pub severity: &'static str,
    /// What is expected
    pub description: &'static str,
    /// What to do
    pub recommendations: &'static str,
}

static ALERTS: [ClimateAlert; 3] = [
    ClimateAlert {
        kind: "Fortes pluies",
        severity: "Modérée",
        description: "Risque d'inondations dans les zones basses",
        recommendations: "Drainer les champs, protéger les récoltes",
    },
    ClimateAlert {
        kind: "Sécheresse",
        severity: "Élevée",
        description: "Période de sécheresse prolongée prévue",
        recommendations: "Conserver l'eau, irrigation goutte-à-goutte",
    },
    ClimateAlert {
        kind: "Vents violents",
        severity: "Faible",
        description: "Rafales jusqu'à 60 km/h possibles",
        recommendations: "Tutorer les plantes hautes, sécuriser les serres",
    },
];

/// Active alerts for a region
#[derive(Debug, Clone, Serialize)]
pub struct ClimateAlerts {
    /// Region
    pub region: Region,
    /// Day of the bulletin
    pub date: NaiveDate,
    /// Alerts (possibly none)
    pub alerts: Vec<ClimateAlert>,
    /// "Vigilance requise" or "Conditions normales"
    pub general_status: &'static str,
}

/// 30 % chance of one or two alerts
pub fn climate_alerts(env: &ToolEnv, region: Region) -> ClimateAlerts {
    let alerts: Vec<ClimateAlert> = env.with_rng(|rng| {
        if rng.gen::<f64>() > 0.7 {
            let count = rng.gen_range(1..=2);
            ALERTS.choose_multiple(rng, count).cloned().collect()
        } else {
            Vec::new()
        }
    });
    let general_status = if alerts.is_empty() {
        "Conditions normales"
    } else {
        "Vigilance requise"
    };
    ClimateAlerts {
        region,
        date: env.today(),
        alerts,
        general_status,
    }
}

#[derive(Deserialize)]
struct RegionArgs {
    #[serde(default)]
    region: Option<Region>,
}

fn alerts_tool(env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: RegionArgs| {
        Ok(climate_alerts(env, env.region_or_default(args.region)))
    })
}

// =============================================================================
// Rainfall patterns
// =============================================================================

/// Rainfall of one month
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyRainfall {
    /// `YYYY-MM`
    pub month: String,
    /// French label, e.g. "avril 2024"
    pub label: String,
    /// Rainfall (mm)
    pub rainfall_mm: u32,
    /// Rainy days
    pub days_with_rain: u32,
}

/// Rainfall history and its summary
#[derive(Debug, Clone, Serialize)]
pub struct RainfallAnalysis {
    /// Region
    pub region: Region,
    /// Period label
    pub period: String,
    /// Most recent month first
    pub monthly: Vec<MonthlyRainfall>,
    /// Total (mm)
    pub total_mm: u32,
    /// Monthly average (mm)
    pub average_mm: f64,
    /// Month with the most rain
    pub wettest_month: Option<String>,
    /// Recent half against older half: hausse, baisse or stable
    pub trend: &'static str,
}

/// Simulated rainfall for the last `months` months (clamped to 1..=24)
pub fn rainfall_patterns(env: &ToolEnv, region: Region, months: u32) -> RainfallAnalysis {
    let months = months.clamp(1, 24);
    let today = env.today();
    let monthly: Vec<MonthlyRainfall> = (0..months)
        .map(|i| {
            let date = today - Duration::days(i64::from(i) * 30);
            env.with_rng(|rng| {
                let rainfall_mm = if RAINY_MONTHS.contains(&date.month()) {
                    rng.gen_range(150..=300)
                } else {
                    rng.gen_range(20..=80)
                };
                MonthlyRainfall {
                    month: date.format("%Y-%m").to_string(),
                    label: format!("{} {}", month_name(date.month()), date.year()),
                    rainfall_mm,
                    days_with_rain: rng.gen_range(5..=20),
                }
            })
        })
        .collect();

    let total_mm: u32 = monthly.iter().map(|m| m.rainfall_mm).sum();
    let average_mm = round1(f64::from(total_mm) / monthly.len() as f64);
    let wettest_month = monthly
        .iter()
        .max_by_key(|m| m.rainfall_mm)
        .map(|m| m.label.clone());

    let half = monthly.len() / 2;
    let trend = if half == 0 {
        "stable"
    } else {
        let mean = |slice: &[MonthlyRainfall]| {
            slice.iter().map(|m| f64::from(m.rainfall_mm)).sum::<f64>() / slice.len() as f64
        };
        let recent = mean(&monthly[..half]);
        let older = mean(&monthly[half..]);
        if recent > older * 1.1 {
            "hausse"
        } else if recent < older * 0.9 {
            "baisse"
        } else {
            "stable"
        }
    };

    RainfallAnalysis {
        region,
        period: format!("{months} derniers mois"),
        monthly,
        total_mm,
        average_mm,
        wettest_month,
        trend,
    }
}

#[derive(Deserialize)]
struct RainfallArgs {
    #[serde(default)]
    region: Option<Region>,
    #[serde(default, deserialize_with = "opt_number")]
    period_months: Option<f64>,
}

fn rainfall_tool(env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: RainfallArgs| {
        let months = args.period_months.map_or(6, |m| m.max(1.0) as u32);
        Ok(rainfall_patterns(env, env.region_or_default(args.region), months))
    })
}

// =============================================================================
// Registration
// =============================================================================

/// Weather tools bound to `env`
pub fn tools(env: &ToolEnv) -> Vec<DomainTool> {
    let def = |name: &str, description: &str, parameters: Value| {
        ToolDefinition::new(name, description, ToolCategory::Weather).with_parameters(parameters)
    };
    vec![
        DomainTool::new(
            def(
                "get_weather_forecast",
                "Prévisions météo agricoles (température, pluie, humidité, vent) pour une région du Cameroun",
                json!({
                    "type": "object",
                    "properties": {
                        "region": {"type": "string", "description": "Région du Cameroun (ex: Centre, Nord, Littoral)"},
                        "days": {"type": "integer", "description": "Nombre de jours de prévision (max 14)"}
                    },
                    "required": ["region"]
                }),
            ),
            env.clone(),
            forecast_tool,
        ),
        DomainTool::new(
            def(
                "get_irrigation_advice",
                "Conseils d'irrigation selon la culture, le type de sol et les conditions actuelles",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture (ex: maïs, cacao)"},
                        "soil_type": {"type": "string", "description": "Type de sol (argileux, sableux, limoneux...)"},
                        "current_conditions": {"type": "string", "description": "Conditions météo actuelles"},
                        "region": {"type": "string", "description": "Région du Cameroun"}
                    },
                    "required": ["crop", "soil_type"]
                }),
            ),
            env.clone(),
            irrigation_tool,
        ),
        DomainTool::new(
            def(
                "get_climate_alerts",
                "Alertes climatiques actives pour une région",
                json!({
                    "type": "object",
                    "properties": {
                        "region": {"type": "string", "description": "Région du Cameroun"}
                    },
                    "required": ["region"]
                }),
            ),
            env.clone(),
            alerts_tool,
        ),
        DomainTool::new(
            def(
                "analyze_rainfall_patterns",
                "Analyse des précipitations des derniers mois pour une région",
                json!({
                    "type": "object",
                    "properties": {
                        "region": {"type": "string", "description": "Région du Cameroun"},
                        "period_months": {"type": "integer", "description": "Période d'analyse en mois (défaut 6)"}
                    },
                    "required": ["region"]
                }),
            ),
            env.clone(),
            rainfall_tool,
        ),
    ]
}
