//! Error message scrubbing for Gemini responses

/// Maximum characters of upstream error text kept in our errors
const MAX_ERROR_CHARS: usize = 300;

/// Sanitize Gemini API error messages so keys and quota internals never leak
pub(crate) fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("invalid key")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
        || lower.contains("permission denied")
    {
        return "API authentication error. Please check your API key configuration.".to_string();
    }

    if lower.contains("rate limit")
        || lower.contains("quota")
        || lower.contains("resource_exhausted")
    {
        return "API rate limit exceeded. Please try again later.".to_string();
    }

    if lower.contains("internal") || lower.contains("server error") {
        return "API server error. Please try again later.".to_string();
    }

    if error.chars().count() > MAX_ERROR_CHARS {
        format!(
            "{}...(truncated)",
            crate::util::truncate_safe(error, MAX_ERROR_CHARS)
        )
    } else {
        error.to_string()
    }
}
