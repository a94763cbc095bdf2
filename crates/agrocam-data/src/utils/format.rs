//! Formatting, input hygiene and small financial helpers

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Maximum characters kept from a user query
pub const MAX_INPUT_CHARS: usize = 1000;

static PHONE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"^\+237[26][0-9]{8}$").expect("phone regex is a compile-time constant"),
        Regex::new(r"^237[26][0-9]{8}$").expect("phone regex is a compile-time constant"),
        Regex::new(r"^[26][0-9]{8}$").expect("phone regex is a compile-time constant"),
    ]
});

/// Format an amount as `1 234 567 FCFA`
#[must_use]
pub fn format_fcfa(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}{grouped} FCFA")
}

/// Format a surface given in m² in the requested unit
#[must_use]
pub fn format_area(square_meters: f64, unit: &str) -> String {
    match unit {
        "ha" if square_meters >= 10_000.0 => format!("{:.2} ha", square_meters / 10_000.0),
        "acre" => format!("{:.2} acres", square_meters / 4047.0),
        _ => format!("{square_meters:.0} m²"),
    }
}

/// Strip markup characters, cap length and collapse whitespace
#[must_use]
pub fn sanitize_input(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | ';'))
        .take(MAX_INPUT_CHARS)
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `phone` is a Cameroonian mobile or landline number
#[must_use]
pub fn validate_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_PATTERNS.iter().any(|re| re.is_match(&compact))
}

/// Return on investment summary
#[derive(Debug, Clone, Serialize)]
pub struct RoiSummary {
    /// Cumulated return
    pub total_return: f64,
    /// Total ROI (%)
    pub roi_percent: f64,
    /// Years to recover the investment (`None` if never)
    pub payback_years: Option<f64>,
    /// Yearly ROI (%)
    pub annual_roi_percent: f64,
}

/// ROI of an investment over `years`
#[must_use]
pub fn roi(investment: f64, annual_return: f64, years: u32) -> RoiSummary {
    let years = f64::from(years.max(1));
    let total_return = annual_return * years;
    let roi_percent = if investment > 0.0 {
        total_return / investment * 100.0
    } else {
        0.0
    };
    RoiSummary {
        total_return,
        roi_percent,
        payback_years: (annual_return > 0.0).then(|| investment / annual_return),
        annual_roi_percent: roi_percent / years,
    }
}
