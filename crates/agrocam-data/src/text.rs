//! Lookup-key normalisation
//!
//! Farmers type "Extreme nord", "extrême-nord" or "EXTREME_NORD" for the same
//! region; every table lookup goes through [`normalize_key`].

/// Lowercase, fold French accents, and collapse separators to single spaces
#[must_use]
pub fn normalize_key(input: &str) -> String {
    let folded: String = input
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            '-' | '_' | '\'' | '’' => ' ',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Extrême-Nord"), "extreme nord");
        assert_eq!(normalize_key("  EXTREME_NORD "), "extreme nord");
        assert_eq!(normalize_key("palmier_à_huile"), "palmier a huile");
        assert_eq!(normalize_key("Maïs"), "mais");
    }
}
