//! Lenient argument decoding
//!
//! Models sometimes send numbers as strings ("2,5") and lists as a single
//! comma-separated string; both shapes are accepted.

use crate::error::{Error, Result};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Decode tool arguments, run `f`, encode its output
pub(crate) fn run<I, O>(input: Value, f: impl FnOnce(I) -> Result<O>) -> Result<Value>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let args: I = serde_json::from_value(input).map_err(|e| Error::InvalidInput(e.to_string()))?;
    let output = f(args)?;
    serde_json::to_value(output).map_err(|e| Error::Execution(e.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn parse_number<E: serde::de::Error>(raw: NumberOrText) -> std::result::Result<f64, E> {
    match raw {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => {
            let cleaned: String = s
                .trim()
                .replace(',', ".")
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned
                .parse()
                .map_err(|_| E::custom(format!("nombre invalide: {s}")))
        }
    }
}

pub(crate) fn number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    parse_number(NumberOrText::deserialize(d)?)
}

pub(crate) fn opt_number<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<f64>, D::Error> {
    Option::<NumberOrText>::deserialize(d)?
        .map(parse_number)
        .transpose()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrText {
    List(Vec<String>),
    Text(String),
}

pub(crate) fn string_list<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Vec<String>, D::Error> {
    let items = match Option::<ListOrText>::deserialize(d)? {
        None => Vec::new(),
        Some(ListOrText::List(items)) => items,
        Some(ListOrText::Text(text)) => text.split([',', ';']).map(str::to_string).collect(),
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect())
}

/// `value` when finite and above zero
pub(crate) fn positive(value: f64, field: &str) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!(
            "{field} doit être positif (reçu {value})"
        )))
    }
}

/// Round to one decimal
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Args {
        #[serde(deserialize_with = "number")]
        area: f64,
        #[serde(default, deserialize_with = "opt_number")]
        budget: Option<f64>,
        #[serde(default, deserialize_with = "string_list")]
        symptoms: Vec<String>,
    }

    #[test]
    fn test_numbers_as_text() {
        let args: Args = serde_json::from_value(json!({"area": "2,5 ha", "budget": "150000"})).unwrap();
        assert_eq!(args.area, 2.5);
        assert_eq!(args.budget, Some(150_000.0));
        assert!(args.symptoms.is_empty());
    }

    #[test]
    fn test_list_as_text() {
        let args: Args =
            serde_json::from_value(json!({"area": 1, "symptoms": "Taches brunes; exsudat"})).unwrap();
        assert_eq!(args.symptoms, vec!["taches brunes", "exsudat"]);
    }

    #[test]
    fn test_bad_number() {
        assert!(serde_json::from_value::<Args>(json!({"area": "beaucoup"})).is_err());
    }

    #[test]
    fn test_positive() {
        assert_eq!(positive(2.5, "area_ha").unwrap(), 2.5);
        let err = positive(0.0, "area_ha").unwrap_err();
        assert!(err.to_string().contains("area_ha doit être positif"));
        assert!(positive(-1.0, "budget").is_err());
        assert!(positive(f64::NAN, "budget").is_err());
        assert!(positive(f64::INFINITY, "budget").is_err());
    }
}
