//! Unit conversion for areas, masses and volumes

use crate::error::{Error, Result};
use crate::text::normalize_key;

const FACTORS: &[(&str, &str, f64)] = &[
    ("ha", "m2", 10_000.0),
    ("ha", "acre", 2.47105),
    ("m2", "ha", 0.0001),
    ("acre", "ha", 0.404686),
    ("kg", "t", 0.001),
    ("t", "kg", 1000.0),
    ("kg", "lb", 2.20462),
    ("lb", "kg", 0.453592),
    ("l", "m3", 0.001),
    ("m3", "l", 1000.0),
    ("gal", "l", 3.78541),
];

fn canonical(unit: &str) -> String {
    match normalize_key(unit).as_str() {
        "hectare" | "hectares" => "ha".to_string(),
        "m²" | "metre carre" | "metres carres" => "m2".to_string(),
        "acres" => "acre".to_string(),
        "tonne" | "tonnes" => "t".to_string(),
        "litre" | "litres" => "l".to_string(),
        "m³" => "m3".to_string(),
        other => other.to_string(),
    }
}

/// Convert `value` between units; uses the inverse factor when only the
/// reverse pair is tabulated
pub fn convert_units(value: f64, from: &str, to: &str) -> Result<f64> {
    let (src, dst) = (canonical(from), canonical(to));
    if src == dst {
        return Ok(value);
    }
    if let Some((_, _, factor)) = FACTORS.iter().find(|(f, t, _)| *f == src && *t == dst) {
        return Ok(value * factor);
    }
    if let Some((_, _, factor)) = FACTORS.iter().find(|(f, t, _)| *f == dst && *t == src) {
        return Ok(value / factor);
    }
    Err(Error::UnsupportedConversion {
        from: from.to_string(),
        to: to.to_string(),
    })
}
