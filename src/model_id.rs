//! Model identifier normalization
//!
//! Maps raw vendor-supplied model strings to the canonical `vendor/model`
//! form (models.dev convention). Pure, total, and idempotent: strings that
//! already carry a vendor separator pass through, unknown prefixes degrade to
//! passthrough rather than failing.

/// Known model-name prefixes and the vendor they imply
const VENDOR_PREFIXES: &[(&str, &str)] = &[
    ("claude", "anthropic"),
    ("gpt", "openai"),
    ("o1", "openai"),
    ("o3", "openai"),
    ("gemini", "google"),
];

/// Normalize a raw model identifier to `vendor/model` form.
///
/// Inputs that already contain a `/` are returned unchanged (after trimming
/// whitespace). Inputs with no recognizable vendor prefix are returned as-is.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains('/') {
        return trimmed.to_string();
    }
    for (prefix, vendor) in VENDOR_PREFIXES {
        if trimmed.starts_with(prefix) {
            return format!("{vendor}/{trimmed}");
        }
    }
    trimmed.to_string()
}

/// Normalize an optional model identifier.
///
/// `None` and strings that trim to empty map to `None`.
pub fn normalize_opt(raw: Option<&str>) -> Option<String> {
    match raw {
        Some(model) if !model.trim().is_empty() => Some(normalize(model)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_normalized_unchanged() {
        assert_eq!(
            normalize("anthropic/claude-opus-4-5-20251101"),
            "anthropic/claude-opus-4-5-20251101"
        );
    }

    #[test]
    fn test_claude_prefix() {
        assert_eq!(
            normalize("claude-sonnet-4-20250514"),
            "anthropic/claude-sonnet-4-20250514"
        );
    }

    #[test]
    fn test_gpt_prefix() {
        assert_eq!(normalize("gpt-4o"), "openai/gpt-4o");
    }

    #[test]
    fn test_o1_prefix() {
        assert_eq!(normalize("o1-preview"), "openai/o1-preview");
    }

    #[test]
    fn test_o3_prefix() {
        assert_eq!(normalize("o3-mini"), "openai/o3-mini");
    }

    #[test]
    fn test_gemini_prefix() {
        assert_eq!(normalize("gemini-pro"), "google/gemini-pro");
    }

    #[test]
    fn test_unknown_model_passthrough() {
        assert_eq!(normalize("some-other-model"), "some-other-model");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(normalize("  gpt-4o  "), "openai/gpt-4o");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["claude-opus-4", "gpt-4o", "gemini-pro", "mystery", ""] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_normalize_opt() {
        assert_eq!(normalize_opt(None), None);
        assert_eq!(normalize_opt(Some("")), None);
        assert_eq!(normalize_opt(Some("   ")), None);
        assert_eq!(normalize_opt(Some("gpt-4o")), Some("openai/gpt-4o".into()));
    }
}
