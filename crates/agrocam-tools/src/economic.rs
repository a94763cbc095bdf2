//! Economic tools: prices, profitability, trends, sales, costs, opportunities

use crate::domain::DomainTool;
use crate::env::ToolEnv;
use crate::error::{Error, Result};
use crate::input::{number, opt_number, positive, round1, run};
use crate::registry::{ToolCategory, ToolDefinition};
use agrocam_data::utils::format_fcfa;
use agrocam_data::{market_price, Crop, Region, CURRENCY};
use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Crops followed by the trend tool when none is given
const TRACKED_CROPS: [Crop; 5] = [
    Crop::Cacao,
    Crop::Cafe,
    Crop::Manioc,
    Crop::Mais,
    Crop::Plantain,
];

/// Yield used for crops without a record (kg/ha)
const DEFAULT_YIELD_KG_HA: f64 = 1000.0;

fn reference_yield(crop: Crop) -> f64 {
    crop.info()
        .map_or(DEFAULT_YIELD_KG_HA, |i| f64::from(i.yield_kg_ha))
}

// =============================================================================
// Market prices
// =============================================================================

/// Point of sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// Farm gate
    Producteur,
    /// Wholesale
    Gros,
    /// Retail
    #[serde(rename = "détail")]
    Detail,
    /// Export
    Export,
}

impl MarketType {
    /// Lenient parse, defaulting to wholesale
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("prod") || text.contains("champ") || text.contains("ferme") {
            Self::Producteur
        } else if text.contains("détail") || text.contains("detail") {
            Self::Detail
        } else if text.contains("export") {
            Self::Export
        } else {
            Self::Gros
        }
    }

    /// Price multiplier relative to wholesale
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Producteur => 0.7,
            Self::Gros => 1.0,
            Self::Detail => 1.4,
            Self::Export => 1.2,
        }
    }
}

/// Seasonal price factor: lean season up, harvest season down
#[must_use]
pub fn seasonal_factor(month: u32) -> f64 {
    match month {
        6..=8 => 1.2,
        11 | 12 | 1 => 0.9,
        _ => 1.0,
    }
}

/// One month of simulated history
#[derive(Debug, Clone, Serialize)]
pub struct PricePoint {
    /// Observation date
    pub date: NaiveDate,
    /// Price (FCFA/kg)
    pub price: u32,
    /// Traded volume (kg)
    pub volume_kg: u32,
}

/// Current prices for a crop
#[derive(Debug, Clone, Serialize)]
pub struct MarketPrices {
    /// Crop
    pub crop: Crop,
    /// Region, when given
    pub region: Option<Region>,
    /// Point of sale
    pub market_type: MarketType,
    /// Current price (FCFA/kg)
    pub current_price: u32,
    /// Lowest price at this point of sale
    pub min_price: u32,
    /// Highest price at this point of sale
    pub max_price: u32,
    /// Currency
    pub currency: &'static str,
    /// Unit of sale
    pub unit: &'static str,
    /// Factor applied for the month
    pub seasonal_factor: f64,
    /// hausse, baisse or stable
    pub trend: &'static str,
    /// Last twelve months, newest first
    pub history: Vec<PricePoint>,
    /// Human-readable current price
    pub formatted: String,
    /// Whether the crop has a reference band
    pub tabulated: bool,
}

/// Prices for `crop` at a point of sale this month
pub fn market_prices(
    env: &ToolEnv,
    crop: Crop,
    market_type: MarketType,
    region: Option<Region>,
) -> MarketPrices {
    let band = market_price(crop);
    let seasonal = seasonal_factor(env.month());
    let scale =
        |value: u32| (f64::from(value) * market_type.multiplier() * seasonal).round() as u32;
    let current_price = scale(band.avg);

    let today = env.today();
    let history = (0..12)
        .map(|i| {
            env.with_rng(|rng| PricePoint {
                date: today - Duration::days(30 * i),
                price: (f64::from(band.avg) * (0.8 + rng.gen::<f64>() * 0.4)) as u32,
                volume_kg: rng.gen_range(100..=1000),
            })
        })
        .collect();

    let trend = if seasonal > 1.0 {
        "hausse"
    } else if seasonal < 1.0 {
        "baisse"
    } else {
        "stable"
    };

    MarketPrices {
        crop,
        region,
        market_type,
        current_price,
        min_price: scale(band.min),
        max_price: scale(band.max),
        currency: CURRENCY,
        unit: band.unit,
        seasonal_factor: seasonal,
        trend,
        history,
        formatted: format!("{}/{}", format_fcfa(f64::from(current_price)), band.unit),
        tabulated: band.tabulated,
    }
}

#[derive(Deserialize)]
struct PriceArgs {
    crop: Crop,
    #[serde(default)]
    market_type: Option<String>,
    #[serde(default)]
    region: Option<Region>,
}

fn prices_tool(env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: PriceArgs| {
        let market_type = args
            .market_type
            .as_deref()
            .map_or(MarketType::Gros, MarketType::parse);
        Ok(market_prices(env, args.crop, market_type, args.region))
    })
}

// =============================================================================
// Profitability
// =============================================================================

/// Production system intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductionSystem {
    /// Few inputs
    Traditionnel,
    /// Improved seed and some fertilizer
    #[serde(rename = "amélioré")]
    Ameliore,
    /// High input
    Intensif,
}

impl ProductionSystem {
    /// Lenient parse, defaulting to improved
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("tradition") {
            Self::Traditionnel
        } else if text.contains("intensi") || text.contains("moderne") {
            Self::Intensif
        } else {
            Self::Ameliore
        }
    }

    fn yield_factor(&self) -> f64 {
        match self {
            Self::Traditionnel => 0.7,
            Self::Ameliore => 1.0,
            Self::Intensif => 1.4,
        }
    }

    /// Multipliers on (fertilizer, pesticide) costs
    fn input_factors(&self) -> (f64, f64) {
        match self {
            Self::Traditionnel => (0.5, 0.3),
            Self::Ameliore => (1.0, 1.0),
            Self::Intensif => (1.5, 1.3),
        }
    }
}

/// Costs per hectare (FCFA)
#[derive(Debug, Clone, Serialize)]
pub struct CostBreakdown {
    /// Seed
    pub semences: f64,
    /// Fertilizer
    pub engrais: f64,
    /// Pesticides
    pub pesticides: f64,
    /// Labour
    pub main_oeuvre: f64,
    /// Transport
    pub transport: f64,
    /// Other
    pub divers: f64,
}

impl CostBreakdown {
    fn for_system(system: ProductionSystem) -> Self {
        let (fertilizer, pesticide) = system.input_factors();
        Self {
            semences: 25_000.0,
            engrais: 45_000.0 * fertilizer,
            pesticides: 20_000.0 * pesticide,
            main_oeuvre: 80_000.0,
            transport: 15_000.0,
            divers: 10_000.0,
        }
    }

    /// Sum of all items
    #[must_use]
    pub fn total(&self) -> f64 {
        self.semences
            + self.engrais
            + self.pesticides
            + self.main_oeuvre
            + self.transport
            + self.divers
    }
}

/// Profitability of a season
#[derive(Debug, Clone, Serialize)]
pub struct Profitability {
    /// Crop
    pub crop: Crop,
    /// Area (ha)
    pub area_ha: f64,
    /// Production system
    pub production_system: ProductionSystem,
    /// Expected yield (kg/ha)
    pub yield_kg_ha: f64,
    /// Expected harvest (kg)
    pub total_production_kg: f64,
    /// Selling price (FCFA/kg)
    pub price_per_kg: u32,
    /// Gross revenue (FCFA)
    pub gross_revenue: f64,
    /// Costs per hectare
    pub costs_per_ha: CostBreakdown,
    /// Total costs (FCFA)
    pub total_costs: f64,
    /// Net profit (FCFA)
    pub net_profit: f64,
    /// Net margin on revenue (%)
    pub margin_percent: f64,
    /// Return on costs (%)
    pub roi_percent: f64,
    /// Harvest needed to cover the costs (kg)
    pub break_even_kg: f64,
    /// Whether the season makes money
    pub profitable: bool,
    /// Human-readable net profit
    pub net_profit_formatted: String,
}

/// Revenue, costs and returns of `area_ha` hectares
pub fn profitability(crop: Crop, area_ha: f64, system: ProductionSystem) -> Profitability {
    let yield_kg_ha = reference_yield(crop) * system.yield_factor();
    let total_production_kg = yield_kg_ha * area_ha;
    let price_per_kg = market_price(crop).avg;
    let price = f64::from(price_per_kg);
    let gross_revenue = total_production_kg * price;

    let costs_per_ha = CostBreakdown::for_system(system);
    let total_costs = costs_per_ha.total() * area_ha;
    let net_profit = gross_revenue - total_costs;
    let margin_percent = if gross_revenue > 0.0 {
        round1(net_profit / gross_revenue * 100.0)
    } else {
        0.0
    };
    let roi_percent = if total_costs > 0.0 {
        round1(net_profit / total_costs * 100.0)
    } else {
        0.0
    };

    Profitability {
        crop,
        area_ha,
        production_system: system,
        yield_kg_ha,
        total_production_kg,
        price_per_kg,
        gross_revenue,
        costs_per_ha,
        total_costs,
        net_profit,
        margin_percent,
        roi_percent,
        break_even_kg: round1(total_costs / price),
        profitable: net_profit > 0.0,
        net_profit_formatted: format_fcfa(net_profit),
    }
}

#[derive(Deserialize)]
struct ProfitabilityArgs {
    crop: Crop,
    #[serde(deserialize_with = "number")]
    area_ha: f64,
    #[serde(default, alias = "farming_system")]
    production_system: Option<String>,
}

fn profitability_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: ProfitabilityArgs| {
        let system = args
            .production_system
            .as_deref()
            .map_or(ProductionSystem::Traditionnel, ProductionSystem::parse);
        Ok(profitability(args.crop, positive(args.area_ha, "area_ha")?, system))
    })
}

// =============================================================================
// Trends
// =============================================================================

const TREND_FACTORS: [&str; 5] = [
    "Conditions climatiques",
    "Demande d'exportation",
    "Politique gouvernementale",
    "Coûts de transport",
    "Concurrence régionale",
];
const DEMAND_LEVELS: [&str; 4] = ["faible", "modérée", "forte", "très forte"];
const SUPPLY_LEVELS: [&str; 3] = ["déficit", "équilibre", "excédent"];

/// Simulated outlook for one crop
#[derive(Debug, Clone, Serialize)]
pub struct CropTrend {
    /// Crop
    pub crop: Crop,
    /// hausse, baisse or stable
    pub trend: &'static str,
    /// Expected price variation over the period (%)
    pub variation_percent: i32,
    /// Main drivers
    pub factors: Vec<&'static str>,
    /// Demand level
    pub demand: &'static str,
    /// Supply level
    pub supply: &'static str,
}

/// Outlook over a period
#[derive(Debug, Clone, Serialize)]
pub struct MarketTrends {
    /// Horizon (months)
    pub period_months: u32,
    /// Per crop outlook
    pub trends: Vec<CropTrend>,
    /// Crops expected to gain more than 10 %
    pub recommended: Vec<Crop>,
}

/// Simulated trend for `crop`, or for the main cash and food crops
pub fn market_trends(env: &ToolEnv, crop: Option<Crop>, period_months: u32) -> MarketTrends {
    let crops = crop.map_or_else(|| TRACKED_CROPS.to_vec(), |c| vec![c]);
    let trends: Vec<CropTrend> = crops
        .into_iter()
        .map(|crop| {
            env.with_rng(|rng| {
                let variation_percent = rng.gen_range(-15..=25);
                let trend = match variation_percent {
                    v if v > 5 => "hausse",
                    v if v < -5 => "baisse",
                    _ => "stable",
                };
                CropTrend {
                    crop,
                    trend,
                    variation_percent,
                    factors: TREND_FACTORS.choose_multiple(rng, 3).copied().collect(),
                    demand: DEMAND_LEVELS.choose(rng).copied().unwrap_or("modérée"),
                    supply: SUPPLY_LEVELS.choose(rng).copied().unwrap_or("équilibre"),
                }
            })
        })
        .collect();
    let recommended = trends
        .iter()
        .filter(|t| t.variation_percent > 10)
        .map(|t| t.crop)
        .collect();
    MarketTrends {
        period_months: period_months.clamp(1, 60),
        trends,
        recommended,
    }
}

#[derive(Deserialize)]
struct TrendArgs {
    #[serde(default)]
    crop: Option<Crop>,
    #[serde(default, deserialize_with = "opt_number")]
    period_months: Option<f64>,
}

fn trends_tool(env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: TrendArgs| {
        let months = args.period_months.map_or(12, |m| m.max(1.0) as u32);
        Ok(market_trends(env, args.crop, months))
    })
}

// =============================================================================
// Sales strategy
// =============================================================================

/// Sales channel
#[derive(Debug, Clone, Serialize)]
pub struct Channel {
    /// Key
    pub name: &'static str,
    /// Price relative to the reference average
    pub relative_price: f64,
    /// Payment delay (days)
    pub payment_delay_days: u32,
    /// Transport cost as a share of the reference price, per kg
    pub transport_share: f64,
    /// Strengths
    pub advantages: &'static [&'static str],
    /// Weaknesses
    pub drawbacks: &'static [&'static str],
}

static CHANNELS: [Channel; 4] = [
    Channel {
        name: "marché_local",
        relative_price: 0.8,
        payment_delay_days: 1,
        transport_share: 0.02,
        advantages: &["Paiement immédiat", "Pas d'intermédiaire"],
        drawbacks: &["Prix plus bas", "Quantités limitées"],
    },
    Channel {
        name: "coopérative",
        relative_price: 0.9,
        payment_delay_days: 7,
        transport_share: 0.01,
        advantages: &["Prix négocié", "Soutien technique"],
        drawbacks: &["Délai de paiement", "Conditions qualité"],
    },
    Channel {
        name: "grossiste",
        relative_price: 0.85,
        payment_delay_days: 3,
        transport_share: 0.03,
        advantages: &["Gros volumes", "Régularité"],
        drawbacks: &["Négociation difficile", "Dépendance"],
    },
    Channel {
        name: "export",
        relative_price: 1.2,
        payment_delay_days: 30,
        transport_share: 0.08,
        advantages: &["Prix élevé", "Devise"],
        drawbacks: &["Exigences qualité", "Procédures complexes"],
    },
];

/// Channel priced for a quantity
#[derive(Debug, Clone, Serialize)]
pub struct ChannelOption {
    /// Channel
    #[serde(flatten)]
    pub channel: Channel,
    /// Price obtained (FCFA/kg)
    pub price_per_kg: f64,
    /// Transport cost (FCFA)
    pub transport_cost: f64,
    /// Revenue after transport (FCFA)
    pub net_revenue: f64,
}

/// Recommended sales channels
#[derive(Debug, Clone, Serialize)]
pub struct SalesStrategy {
    /// Crop
    pub crop: Crop,
    /// Quantity to sell (kg)
    pub quantity_kg: f64,
    /// Urgency as given
    pub urgency: String,
    /// Reference average price (FCFA/kg)
    pub reference_price: u32,
    /// Channels considered
    pub options: Vec<ChannelOption>,
    /// Channel with the best net revenue
    pub best_channel: Option<&'static str>,
    /// General advice
    pub advice: Vec<&'static str>,
}

fn channels_for(urgency: &str, quantity_kg: f64) -> [&'static str; 2] {
    let urgency = urgency.to_lowercase();
    if urgency.contains("urgent") || urgency.contains("rapide") {
        ["marché_local", "grossiste"]
    } else if urgency.contains("patient") || urgency.contains("attendre") {
        if quantity_kg > 1000.0 {
            ["export", "coopérative"]
        } else {
            ["coopérative", "grossiste"]
        }
    } else {
        ["coopérative", "grossiste"]
    }
}

/// Channels chosen by urgency and volume, ranked by net revenue
pub fn sales_strategy(crop: Crop, quantity_kg: f64, urgency: &str) -> SalesStrategy {
    let reference_price = market_price(crop).avg;
    let base = f64::from(reference_price);

    let options: Vec<ChannelOption> = channels_for(urgency, quantity_kg)
        .into_iter()
        .filter_map(|name| CHANNELS.iter().find(|c| c.name == name))
        .map(|channel| {
            let price_per_kg = (base * channel.relative_price).round();
            let transport_cost = (quantity_kg * channel.transport_share * base).round();
            ChannelOption {
                channel: channel.clone(),
                price_per_kg,
                transport_cost,
                net_revenue: quantity_kg * price_per_kg - transport_cost,
            }
        })
        .collect();

    let best_channel = options
        .iter()
        .max_by(|a, b| a.net_revenue.total_cmp(&b.net_revenue))
        .map(|o| o.channel.name);

    SalesStrategy {
        crop,
        quantity_kg,
        urgency: urgency.to_string(),
        reference_price,
        options,
        best_channel,
        advice: vec![
            "trier et sécher le produit avant la vente",
            "comparer les prix de plusieurs marchés",
            "vendre en groupe pour négocier",
        ],
    }
}

#[derive(Deserialize)]
struct SalesArgs {
    crop: Crop,
    #[serde(deserialize_with = "number")]
    quantity_kg: f64,
    #[serde(default)]
    urgency: Option<String>,
}

fn sales_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: SalesArgs| {
        Ok(sales_strategy(
            args.crop,
            positive(args.quantity_kg, "quantity_kg")?,
            args.urgency.as_deref().unwrap_or("normal"),
        ))
    })
}

// =============================================================================
// Production costs
// =============================================================================

static COST_TABLE: [(&str, &[(&str, f64)]); 6] = [
    (
        "préparation_sol",
        &[("labour", 30_000.0), ("hersage", 15_000.0), ("billonnage", 10_000.0)],
    ),
    (
        "semences_plants",
        &[("semences", 25_000.0), ("transport_semences", 2_000.0)],
    ),
    (
        "fertilisation",
        &[
            ("engrais_organique", 20_000.0),
            ("engrais_minéral", 35_000.0),
            ("amendements", 8_000.0),
        ],
    ),
    (
        "protection_cultures",
        &[("herbicides", 15_000.0), ("insecticides", 12_000.0), ("fongicides", 8_000.0)],
    ),
    (
        "main_oeuvre",
        &[("plantation", 25_000.0), ("entretien", 40_000.0), ("récolte", 35_000.0)],
    ),
    (
        "autres",
        &[("transport_intrants", 8_000.0), ("stockage", 5_000.0), ("divers", 7_000.0)],
    ),
];

/// Input intensity factor
fn level_factor(level: &str) -> f64 {
    let level = level.to_lowercase();
    if level.contains("minim") || level.contains("faible") {
        0.6
    } else if level.contains("intensi") || level.contains("élev") {
        1.5
    } else {
        1.0
    }
}

/// Cost line (FCFA per ha)
#[derive(Debug, Clone, Serialize)]
pub struct CostItem {
    /// Item
    pub item: &'static str,
    /// Amount per hectare
    pub amount: f64,
}

/// Cost category
#[derive(Debug, Clone, Serialize)]
pub struct CostCategory {
    /// Category
    pub category: &'static str,
    /// Lines
    pub items: Vec<CostItem>,
    /// Category total per hectare
    pub total: f64,
}

/// Production cost estimate
#[derive(Debug, Clone, Serialize)]
pub struct ProductionCosts {
    /// Crop
    pub crop: Crop,
    /// Area (ha)
    pub area_ha: f64,
    /// Input level as given
    pub input_level: String,
    /// Cost categories per hectare
    pub categories: Vec<CostCategory>,
    /// Total per hectare
    pub cost_per_ha: f64,
    /// Total over the area
    pub total_cost: f64,
    /// Cost of one kg at the reference yield
    pub cost_per_kg: f64,
    /// Three most expensive lines
    pub main_drivers: Vec<CostItem>,
    /// Human-readable total
    pub total_formatted: String,
}

/// Six cost categories scaled by input level
pub fn production_costs(crop: Crop, area_ha: f64, input_level: &str) -> ProductionCosts {
    let factor = level_factor(input_level);
    let categories: Vec<CostCategory> = COST_TABLE
        .iter()
        .map(|&(category, items)| {
            let items: Vec<CostItem> = items
                .iter()
                .map(|&(item, amount)| CostItem {
                    item,
                    amount: amount * factor,
                })
                .collect();
            CostCategory {
                category,
                total: items.iter().map(|i| i.amount).sum(),
                items,
            }
        })
        .collect();

    let cost_per_ha: f64 = categories.iter().map(|c| c.total).sum();
    let total_cost = cost_per_ha * area_ha;

    let mut main_drivers: Vec<CostItem> = categories
        .iter()
        .flat_map(|c| c.items.iter().cloned())
        .collect();
    main_drivers.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    main_drivers.truncate(3);

    ProductionCosts {
        crop,
        area_ha,
        input_level: input_level.to_string(),
        categories,
        cost_per_ha,
        total_cost,
        cost_per_kg: round1(cost_per_ha / reference_yield(crop)),
        main_drivers,
        total_formatted: format_fcfa(total_cost),
    }
}

#[derive(Deserialize)]
struct CostArgs {
    crop: Crop,
    #[serde(deserialize_with = "number")]
    area_ha: f64,
    #[serde(default)]
    input_level: Option<String>,
}

fn costs_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: CostArgs| {
        Ok(production_costs(
            args.crop,
            positive(args.area_ha, "area_ha")?,
            args.input_level.as_deref().unwrap_or("standard"),
        ))
    })
}

// =============================================================================
// Opportunities
// =============================================================================

/// Investment opportunity
#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    /// Name
    pub name: &'static str,
    /// Sector
    pub sector: &'static str,
    /// Market potential
    pub potential: &'static str,
    /// Minimum investment (FCFA)
    pub min_investment: u32,
    /// Expected return range
    pub roi: &'static str,
    /// Target markets
    pub markets: &'static [&'static str],
}

impl Opportunity {
    fn roi_low(&self) -> f64 {
        self.roi
            .split(['-', '%'])
            .next()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0.0)
    }

    /// roi_low / 20 plus a potential bonus
    #[must_use]
    pub fn score(&self) -> f64 {
        let potential = match self.potential {
            "très élevé" => 5.0,
            "élevé" => 4.0,
            "modéré" => 3.0,
            _ => 2.0,
        };
        self.roi_low() / 20.0 + potential
    }
}

static OPPORTUNITIES: [Opportunity; 7] = [
    Opportunity {
        name: "moringa",
        sector: "cultures émergentes",
        potential: "très élevé",
        min_investment: 200_000,
        roi: "200-300%",
        markets: &["export", "nutrition"],
    },
    Opportunity {
        name: "avocat",
        sector: "cultures émergentes",
        potential: "élevé",
        min_investment: 500_000,
        roi: "150-200%",
        markets: &["urbain", "export"],
    },
    Opportunity {
        name: "spiruline",
        sector: "cultures émergentes",
        potential: "élevé",
        min_investment: 1_000_000,
        roi: "300-400%",
        markets: &["santé", "export"],
    },
    Opportunity {
        name: "farine de manioc",
        sector: "transformation",
        potential: "très élevé",
        min_investment: 300_000,
        roi: "100-150%",
        markets: &["boulangerie", "export"],
    },
    Opportunity {
        name: "huile de palme artisanale",
        sector: "transformation",
        potential: "élevé",
        min_investment: 150_000,
        roi: "80-120%",
        markets: &["local", "régional"],
    },
    Opportunity {
        name: "location d'équipement",
        sector: "services",
        potential: "élevé",
        min_investment: 800_000,
        roi: "60-100%",
        markets: &["petits agriculteurs"],
    },
    Opportunity {
        name: "formation et conseil",
        sector: "services",
        potential: "modéré",
        min_investment: 50_000,
        roi: "50-80%",
        markets: &["agriculteurs", "coopératives"],
    },
];

/// Opportunity with its score
#[derive(Debug, Clone, Serialize)]
pub struct ScoredOpportunity {
    /// Opportunity
    #[serde(flatten)]
    pub opportunity: Opportunity,
    /// Ranking score
    pub score: f64,
}

/// Ranked opportunities
#[derive(Debug, Clone, Serialize)]
pub struct Opportunities {
    /// Region, when given
    pub region: Option<Region>,
    /// Budget (FCFA), when given
    pub investment_budget: Option<f64>,
    /// Best five within budget
    pub opportunities: Vec<ScoredOpportunity>,
}

/// Opportunities affordable with `budget`, best five by score
pub fn market_opportunities(region: Option<Region>, budget: Option<f64>) -> Opportunities {
    let mut opportunities: Vec<ScoredOpportunity> = OPPORTUNITIES
        .iter()
        .filter(|o| budget.map_or(true, |b| f64::from(o.min_investment) <= b))
        .map(|o| ScoredOpportunity {
            opportunity: o.clone(),
            score: round1(o.score()),
        })
        .collect();
    opportunities.sort_by(|a, b| b.score.total_cmp(&a.score));
    opportunities.truncate(5);
    Opportunities {
        region,
        investment_budget: budget,
        opportunities,
    }
}

#[derive(Deserialize)]
struct OpportunityArgs {
    #[serde(default)]
    region: Option<Region>,
    #[serde(default, alias = "budget", deserialize_with = "opt_number")]
    investment_budget: Option<f64>,
}

fn opportunities_tool(_env: &ToolEnv, input: Value) -> Result<Value> {
    run(input, |args: OpportunityArgs| {
        Ok(market_opportunities(args.region, args.investment_budget))
    })
}

// =============================================================================
// Registration
// =============================================================================

/// Economic tools bound to `env`
pub fn tools(env: &ToolEnv) -> Vec<DomainTool> {
    let def = |name: &str, description: &str, parameters: Value| {
        ToolDefinition::new(name, description, ToolCategory::Economic).with_parameters(parameters)
    };
    vec![
        DomainTool::new(
            def(
                "get_market_prices",
                "Prix actuels d'une culture selon le type de marché, avec historique sur 12 mois",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture"},
                        "market_type": {"type": "string", "description": "producteur, gros, détail ou export"},
                        "region": {"type": "string", "description": "Région du Cameroun"}
                    },
                    "required": ["crop"]
                }),
            ),
            env.clone(),
            prices_tool,
        ),
        DomainTool::new(
            def(
                "analyze_profitability",
                "Rentabilité d'une culture: revenus, coûts, marge, retour sur investissement",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture"},
                        "area_ha": {"type": "number", "description": "Superficie en hectares"},
                        "production_system": {"type": "string", "description": "traditionnel, amélioré ou intensif"}
                    },
                    "required": ["crop", "area_ha"]
                }),
            ),
            env.clone(),
            profitability_tool,
        ),
        DomainTool::new(
            def(
                "get_market_trends",
                "Tendances du marché, facteurs d'influence et cultures porteuses",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture (toutes les principales si absent)"},
                        "period_months": {"type": "integer", "description": "Horizon en mois"}
                    }
                }),
            ),
            env.clone(),
            trends_tool,
        ),
        DomainTool::new(
            def(
                "recommend_sales_strategy",
                "Canaux de vente recommandés et revenu net selon la quantité et l'urgence",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture"},
                        "quantity_kg": {"type": "number", "description": "Quantité à vendre (kg)"},
                        "urgency": {"type": "string", "description": "urgent, normal ou patient"}
                    },
                    "required": ["crop", "quantity_kg"]
                }),
            ),
            env.clone(),
            sales_tool,
        ),
        DomainTool::new(
            def(
                "calculate_production_costs",
                "Coûts de production détaillés par catégorie et par hectare",
                json!({
                    "type": "object",
                    "properties": {
                        "crop": {"type": "string", "description": "Culture"},
                        "area_ha": {"type": "number", "description": "Superficie en hectares"},
                        "input_level": {"type": "string", "description": "minimal, standard ou intensif"}
                    },
                    "required": ["crop", "area_ha"]
                }),
            ),
            env.clone(),
            costs_tool,
        ),
        DomainTool::new(
            def(
                "analyze_market_opportunities",
                "Opportunités d'investissement agricole classées selon le budget",
                json!({
                    "type": "object",
                    "properties": {
                        "region": {"type": "string", "description": "Région du Cameroun"},
                        "investment_budget": {"type": "number", "description": "Budget disponible (FCFA)"}
                    }
                }),
            ),
            env.clone(),
            opportunities_tool,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn env_on(year: i32, month: u32, day: u32) -> ToolEnv {
        ToolEnv::seeded(3).with_today(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    #[test]
    fn test_prices_follow_market_and_season() {
        let july = env_on(2024, 7, 15);
        let retail = market_prices(&july, Crop::Cacao, MarketType::Detail, None);
        // 1200 * 1.4 * 1.2
        assert_eq!(retail.current_price, 2016);
        assert_eq!(retail.trend, "hausse");
        assert_eq!(retail.history.len(), 12);
        assert_eq!(retail.history[1].date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert!(retail.history.iter().all(|p| (960..=1440).contains(&p.price)));

        let april = env_on(2024, 4, 1);
        let farm_gate = market_prices(&april, Crop::Mais, MarketType::Producteur, None);
        assert_eq!(farm_gate.current_price, 210);
        assert_eq!((farm_gate.min_price, farm_gate.max_price), (140, 280));
        assert_eq!(farm_gate.trend, "stable");

        let december = env_on(2024, 12, 1);
        assert_eq!(market_prices(&december, Crop::Cafe, MarketType::Gros, None).trend, "baisse");
    }

    #[test]
    fn test_market_type_parsing() {
        assert_eq!(MarketType::parse("bord champ"), MarketType::Producteur);
        assert_eq!(MarketType::parse("Détail"), MarketType::Detail);
        assert_eq!(MarketType::parse("export"), MarketType::Export);
        assert_eq!(MarketType::parse("marché de gros"), MarketType::Gros);
    }

    #[test]
    fn test_traditional_maize_profitability() {
        let result = profitability(Crop::Mais, 1.0, ProductionSystem::Traditionnel);
        assert!(close(result.yield_kg_ha, 1750.0));
        assert!(close(result.gross_revenue, 525_000.0));
        assert!(close(result.total_costs, 158_500.0));
        assert!(close(result.net_profit, 366_500.0));
        assert_eq!(result.margin_percent, 69.8);
        assert_eq!(result.roi_percent, 231.2);
        assert_eq!(result.break_even_kg, 528.3);
        assert!(result.profitable);
    }

    #[test]
    fn test_intensive_costs_scale_with_area() {
        let result = profitability(Crop::Cacao, 2.0, ProductionSystem::Intensif);
        assert!(close(result.total_production_kg, 1680.0));
        assert!(close(result.total_costs, 447_000.0));
        assert!(close(result.net_profit, 2_016_000.0 - 447_000.0));
    }

    #[test]
    fn test_profitability_tool_rejects_zero_area() {
        let env = ToolEnv::seeded(1);
        let err = profitability_tool(&env, json!({"crop": "maïs", "area_ha": 0})).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        let ok = profitability_tool(&env, json!({"crop": "maïs", "area_ha": "1,5 ha"})).unwrap();
        assert_eq!(ok["area_ha"], 1.5);
        assert_eq!(ok["production_system"], "traditionnel");
    }

    #[test]
    fn test_trends_recommend_strong_gainers() {
        let env = ToolEnv::seeded(11);
        let trends = market_trends(&env, None, 12);
        assert_eq!(trends.trends.len(), 5);
        for trend in &trends.trends {
            assert!((-15..=25).contains(&trend.variation_percent));
            assert_eq!(trend.factors.len(), 3);
            assert_eq!(
                trends.recommended.contains(&trend.crop),
                trend.variation_percent > 10
            );
        }
        assert_eq!(market_trends(&env, Some(Crop::Arachide), 6).trends.len(), 1);
    }

    #[test]
    fn test_patient_seller_with_large_volume_exports() {
        let strategy = sales_strategy(Crop::Cacao, 2000.0, "patient");
        let names: Vec<&str> = strategy.options.iter().map(|o| o.channel.name).collect();
        assert_eq!(names, vec!["export", "coopérative"]);
        assert_eq!(strategy.options[0].net_revenue, 2_880_000.0 - 192_000.0);
        assert_eq!(strategy.best_channel, Some("export"));
    }

    #[test]
    fn test_urgent_seller_uses_fast_channels() {
        let strategy = sales_strategy(Crop::Cacao, 2000.0, "urgent");
        assert_eq!(strategy.options[0].channel.name, "marché_local");
        assert_eq!(strategy.best_channel, Some("grossiste"));
        let small = sales_strategy(Crop::Manioc, 200.0, "patient");
        assert_eq!(small.options[0].channel.name, "coopérative");
    }

    #[test]
    fn test_production_costs_by_level() {
        let standard = production_costs(Crop::Mais, 2.0, "standard");
        assert_eq!(standard.categories.len(), 6);
        assert_eq!(standard.cost_per_ha, 300_000.0);
        assert_eq!(standard.total_cost, 600_000.0);
        assert_eq!(standard.cost_per_kg, 120.0);
        let drivers: Vec<&str> = standard.main_drivers.iter().map(|d| d.item).collect();
        assert_eq!(drivers, vec!["entretien", "engrais_minéral", "récolte"]);

        let minimal = production_costs(Crop::Mais, 1.0, "minimal");
        assert!(close(minimal.cost_per_ha, 180_000.0));
    }

    #[test]
    fn test_opportunities_within_budget() {
        let result = market_opportunities(None, Some(300_000.0));
        let names: Vec<&str> = result.opportunities.iter().map(|o| o.opportunity.name).collect();
        assert_eq!(
            names,
            vec!["moringa", "farine de manioc", "huile de palme artisanale", "formation et conseil"]
        );
        assert_eq!(result.opportunities[0].score, 15.0);

        let unlimited = market_opportunities(Some(Region::Ouest), None);
        assert_eq!(unlimited.opportunities.len(), 5);
        assert_eq!(unlimited.opportunities[0].opportunity.name, "spiruline");
    }
}
