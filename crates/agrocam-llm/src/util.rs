//! Helpers shared by providers and callers

/// Minimum key length to display partial key
const MIN_KEY_LENGTH_FOR_PARTIAL_DISPLAY: usize = 8;

/// Number of characters to show at start/end of masked key
const KEY_MASK_VISIBLE_CHARS: usize = 4;

/// Sensitive patterns to filter from error messages
const SENSITIVE_PATTERNS: &[&str] = &[
    "api_key",
    "api-key",
    "apikey",
    "key=",
    "authorization",
    "bearer",
    "token",
    "secret",
    "credential",
];

/// Mask API key for safe display in logs
///
/// ```
/// use agrocam_llm::util::mask_api_key;
/// assert_eq!(mask_api_key("AIzaSy1234567890abcd"), "AIza...abcd");
/// assert_eq!(mask_api_key("short"), "****");
/// ```
#[must_use]
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= MIN_KEY_LENGTH_FOR_PARTIAL_DISPLAY {
        return "****".to_string();
    }
    let head: String = chars[..KEY_MASK_VISIBLE_CHARS].iter().collect();
    let tail: String = chars[chars.len() - KEY_MASK_VISIBLE_CHARS..].iter().collect();
    format!("{head}...{tail}")
}

/// Replace messages that mention credentials with a generic one
#[must_use]
pub fn sanitize_error_for_user(error: &str) -> String {
    let lower = error.to_lowercase();
    if SENSITIVE_PATTERNS.iter().any(|p| lower.contains(p)) {
        return "Une erreur du service d'IA est survenue. Veuillez réessayer.".to_string();
    }
    error.to_string()
}

/// Validate API key is not empty and has minimum length
///
/// Returns an error message if validation fails, None if valid.
#[must_use]
pub fn validate_api_key(key: &str, provider_name: &str) -> Option<String> {
    if key.trim().is_empty() {
        return Some(format!("{provider_name} API key is required"));
    }
    if key.len() < MIN_KEY_LENGTH_FOR_PARTIAL_DISPLAY {
        return Some(format!(
            "{provider_name} API key appears to be invalid (too short)"
        ));
    }
    None
}

/// Truncate to at most `max_chars` characters without splitting a code point
#[must_use]
pub fn truncate_safe(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
