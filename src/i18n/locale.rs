//! Locale and direction resolution, plus detection of a visitor's preferred
//! language from environment-provided language tags.

use crate::i18n::{Direction, LanguageCode, LanguageRegistry};

/// Region-qualified locale tag used for date and number formatting.
pub fn locale_tag(code: LanguageCode) -> &'static str {
    match code {
        LanguageCode::En => "en-US",
        LanguageCode::Ar => "ar-SA",
        LanguageCode::De => "de-DE",
        LanguageCode::Fr => "fr-FR",
    }
}

/// Open Graph expects underscores (`en_US`).
pub fn og_locale(code: LanguageCode) -> &'static str {
    match code {
        LanguageCode::En => "en_US",
        LanguageCode::Ar => "ar_SA",
        LanguageCode::De => "de_DE",
        LanguageCode::Fr => "fr_FR",
    }
}

/// Layout direction. Arabic is the only right-to-left language we ship.
pub fn direction(code: LanguageCode) -> Direction {
    match code {
        LanguageCode::Ar => Direction::Rtl,
        LanguageCode::En | LanguageCode::De | LanguageCode::Fr => Direction::Ltr,
    }
}

/// Map a language tag such as `ar-EG`, `de_AT.UTF-8` or `FR` to a code by
/// its primary subtag.
pub fn primary_language(tag: &str) -> Option<LanguageCode> {
    let primary = tag
        .trim()
        .split(['-', '_', '.', '@'])
        .next()
        .unwrap_or("");
    if primary.is_empty() {
        return None;
    }
    primary.parse().ok()
}

/// Pick the first tag that names a language enabled in the registry.
///
/// `tags` is in preference order, e.g. the browser's language list or the
/// result of [`parse_accept_language`].
pub fn detect_preferred<S: AsRef<str>>(
    tags: &[S],
    registry: &LanguageRegistry,
) -> Option<LanguageCode> {
    tags.iter()
        .filter_map(|tag| primary_language(tag.as_ref()))
        .find(|code| registry.is_enabled(*code))
}

/// Parse an `Accept-Language` header into tags ordered by quality.
///
/// Entries with equal quality keep their header order. `q=0` entries and
/// the `*` wildcard are dropped.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut weighted: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let quality = pieces
                .filter_map(|p| p.trim().strip_prefix("q="))
                .next()
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            if quality <= 0.0 {
                return None;
            }
            Some((tag.to_string(), quality))
        })
        .collect();

    // sort_by is stable, so ties keep header order
    weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    weighted.into_iter().map(|(tag, _)| tag).collect()
}

/// Language tags from the POSIX locale environment, most specific first.
pub fn system_languages() -> Vec<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .filter(|value| !value.is_empty() && value != "C" && value != "POSIX")
        .map(|value| {
            value
                .split(['.', '@'])
                .next()
                .unwrap_or("")
                .replace('_', "-")
        })
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serial_test::serial;

    // ==================== Resolver Tests ====================

    #[test]
    fn test_locale_tags() {
        assert_eq!(locale_tag(LanguageCode::En), "en-US");
        assert_eq!(locale_tag(LanguageCode::Ar), "ar-SA");
        assert_eq!(locale_tag(LanguageCode::De), "de-DE");
        assert_eq!(locale_tag(LanguageCode::Fr), "fr-FR");
    }

    #[test]
    fn test_only_arabic_is_rtl() {
        for code in LanguageCode::ALL {
            assert_eq!(direction(code).is_rtl(), code == LanguageCode::Ar);
        }
    }

    #[test]
    fn test_og_locale_mirrors_locale_tag() {
        for code in LanguageCode::ALL {
            assert_eq!(og_locale(code).replace('_', "-"), locale_tag(code));
        }
    }

    proptest! {
        #[test]
        fn prop_locale_tag_starts_with_code(idx in 0usize..4) {
            let code = LanguageCode::ALL[idx];
            let prefix = format!("{}-", code);
            prop_assert!(locale_tag(code).starts_with(&prefix));
        }

        #[test]
        fn prop_primary_language_ignores_region(region in "[A-Z]{2}") {
            let tag = format!("de-{}", region);
            prop_assert_eq!(primary_language(&tag), Some(LanguageCode::De));
        }
    }

    // ==================== Detection Tests ====================

    #[test]
    fn test_primary_language_variants() {
        assert_eq!(primary_language("ar-EG"), Some(LanguageCode::Ar));
        assert_eq!(primary_language("fr_CA.UTF-8"), Some(LanguageCode::Fr));
        assert_eq!(primary_language("EN"), Some(LanguageCode::En));
        assert_eq!(primary_language("es-ES"), None);
        assert_eq!(primary_language(""), None);
    }

    #[test]
    fn test_detect_preferred_skips_unsupported() {
        let registry = LanguageRegistry::builtin();
        let tags = ["es-MX", "ar-EG", "en-US"];
        assert_eq!(detect_preferred(&tags, &registry), Some(LanguageCode::Ar));
    }

    #[test]
    fn test_detect_preferred_skips_disabled() {
        let registry =
            LanguageRegistry::with_enabled(&[LanguageCode::En, LanguageCode::De], LanguageCode::En)
                .unwrap();
        let tags = ["ar", "de-CH"];
        assert_eq!(detect_preferred(&tags, &registry), Some(LanguageCode::De));
    }

    #[test]
    fn test_detect_preferred_none() {
        let registry = LanguageRegistry::builtin();
        let tags: [&str; 0] = [];
        assert_eq!(detect_preferred(&tags, &registry), None);
    }

    #[test]
    fn test_parse_accept_language_orders_by_quality() {
        let tags = parse_accept_language("de;q=0.7, ar-SA, fr;q=0.9, en;q=0.7");
        assert_eq!(tags, vec!["ar-SA", "fr", "de", "en"]);
    }

    #[test]
    fn test_parse_accept_language_drops_zero_and_wildcard() {
        let tags = parse_accept_language("fr;q=0, *;q=0.5, en");
        assert_eq!(tags, vec!["en"]);
    }

    #[test]
    fn test_parse_accept_language_empty() {
        assert!(parse_accept_language("").is_empty());
    }

    #[test]
    #[serial]
    fn test_system_languages_from_lang() {
        std::env::remove_var("LC_ALL");
        std::env::remove_var("LC_MESSAGES");
        std::env::set_var("LANG", "ar_EG.UTF-8");

        assert_eq!(system_languages(), vec!["ar-EG"]);

        std::env::remove_var("LANG");
    }

    #[test]
    #[serial]
    fn test_system_languages_ignores_posix() {
        std::env::remove_var("LC_ALL");
        std::env::remove_var("LC_MESSAGES");
        std::env::set_var("LANG", "C");

        assert!(system_languages().is_empty());

        std::env::remove_var("LANG");
    }
}
