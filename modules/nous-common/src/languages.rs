//! Static language-code lookups.
//!
//! Two vocabularies meet here: the language detector emits human-readable
//! labels ("english", "korean"), and the MT model wants its own tags
//! ("en_XX", "ko_KR"). Everything in between is normalized ISO-639-1.

pub const DEFAULT_LANG: &str = "en";

/// Map a raw detector label to an ISO-639-1 code.
/// Callers apply their configured default on `None`.
pub fn detector_label_to_iso(label: &str) -> Option<&'static str> {
    match label {
        "english" | "en" => Some("en"),
        "french" | "fr" => Some("fr"),
        "german" | "de" => Some("de"),
        "spanish" | "es" => Some("es"),
        "italian" | "it" => Some("it"),
        "portuguese" | "pt" => Some("pt"),
        "dutch" | "nl" => Some("nl"),
        "russian" | "ru" => Some("ru"),
        "polish" | "pl" => Some("pl"),
        "turkish" | "tr" => Some("tr"),
        "arabic" | "ar" => Some("ar"),
        "hindi" | "hi" => Some("hi"),
        "korean" | "ko" => Some("ko"),
        "japanese" | "ja" => Some("ja"),
        "chinese" | "zh" => Some("zh"),
        "vietnamese" | "vi" => Some("vi"),
        "ukrainian" | "uk" => Some("uk"),
        "swedish" | "sv" => Some("sv"),
        "finnish" | "fi" => Some("fi"),
        _ => None,
    }
}

/// Resolve an ISO-639-1 code to the MT model's internal language tag.
/// Unsupported codes fall back to the default language's tag so the
/// translator never receives an invalid tag.
pub fn mt_lang_tag(iso: &str) -> &'static str {
    match iso {
        "en" => "en_XX",
        "fr" => "fr_XX",
        "de" => "de_DE",
        "es" => "es_XX",
        "it" => "it_IT",
        "pt" => "pt_XX",
        "nl" => "nl_XX",
        "ru" => "ru_RU",
        "pl" => "pl_PL",
        "tr" => "tr_TR",
        "ar" => "ar_AR",
        "hi" => "hi_IN",
        "ko" => "ko_KR",
        "ja" => "ja_XX",
        "zh" => "zh_CN",
        "vi" => "vi_VN",
        "uk" => "uk_UA",
        "sv" => "sv_SE",
        "fi" => "fi_FI",
        _ => "en_XX",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detector_labels_resolve() {
        assert_eq!(detector_label_to_iso("english"), Some("en"));
        assert_eq!(detector_label_to_iso("ko"), Some("ko"));
        assert_eq!(detector_label_to_iso("klingon"), None);
    }

    #[test]
    fn mt_tags_resolve_with_fallback() {
        assert_eq!(mt_lang_tag("en"), "en_XX");
        assert_eq!(mt_lang_tag("ko"), "ko_KR");
        assert_eq!(mt_lang_tag("xx"), "en_XX");
    }
}
