//! Language registry: the ordered list of languages offered on the site.
//!
//! The registry is built once when the application root is constructed and
//! shared by `Arc` with every component that needs it. It is never mutated
//! afterwards.

use crate::error::LanguageError;
use crate::i18n::{locale, Direction, LanguageCode};
use serde::Serialize;

/// Metadata for one supported language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageOption {
    /// Language code (e.g., "en", "ar")
    pub code: LanguageCode,

    /// English name of the language (e.g., "Arabic")
    pub name: &'static str,

    /// Native name of the language (e.g., "العربية")
    pub native_name: &'static str,

    /// Text direction
    pub direction: Direction,

    /// Region-qualified locale tag (e.g., "ar-SA")
    pub locale: &'static str,

    /// Whether this language is offered to visitors
    pub enabled: bool,
}

impl LanguageOption {
    fn builtin(code: LanguageCode) -> Self {
        let (name, native_name) = match code {
            LanguageCode::En => ("English", "English"),
            LanguageCode::Ar => ("Arabic", "العربية"),
            LanguageCode::De => ("German", "Deutsch"),
            LanguageCode::Fr => ("French", "Français"),
        };
        Self {
            code,
            name,
            native_name,
            direction: locale::direction(code),
            locale: locale::locale_tag(code),
            enabled: true,
        }
    }
}

/// Ordered, read-only collection of language options plus the default.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageOption>,
    default: LanguageCode,
}

impl LanguageRegistry {
    /// Registry with every built-in language enabled and English as default.
    pub fn builtin() -> Self {
        Self {
            languages: LanguageCode::ALL
                .into_iter()
                .map(LanguageOption::builtin)
                .collect(),
            default: LanguageCode::En,
        }
    }

    /// Registry offering only `enabled` (registry order is kept).
    ///
    /// # Errors
    /// Fails when nothing is enabled or the default is not among `enabled`.
    pub fn with_enabled(
        enabled: &[LanguageCode],
        default: LanguageCode,
    ) -> Result<Self, LanguageError> {
        let languages = LanguageCode::ALL
            .into_iter()
            .map(|code| LanguageOption {
                enabled: enabled.contains(&code),
                ..LanguageOption::builtin(code)
            })
            .collect();
        Self::new(languages, default)
    }

    /// Build a registry from explicit options.
    pub fn new(languages: Vec<LanguageOption>, default: LanguageCode) -> Result<Self, LanguageError> {
        if !languages.iter().any(|lang| lang.enabled) {
            return Err(LanguageError::EmptyRegistry);
        }
        let registry = Self { languages, default };
        if !registry.is_enabled(default) {
            return Err(LanguageError::UnknownDefault(default));
        }
        Ok(registry)
    }

    /// Get a language option by its code.
    pub fn get(&self, code: LanguageCode) -> Option<&LanguageOption> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Options offered to visitors, in registry order.
    pub fn list_enabled(&self) -> Vec<&LanguageOption> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get all languages (including disabled ones).
    pub fn list_all(&self) -> Vec<&LanguageOption> {
        self.languages.iter().collect()
    }

    /// The language used when nothing else applies.
    pub fn default_language(&self) -> LanguageCode {
        self.default
    }

    pub fn default_option(&self) -> &LanguageOption {
        self.get(self.default)
            .unwrap_or_else(|| unreachable!("default is validated at construction"))
    }

    pub fn is_enabled(&self, code: LanguageCode) -> bool {
        self.get(code).map(|lang| lang.enabled).unwrap_or(false)
    }

    /// Parse a raw code and check that it is offered.
    pub fn resolve(&self, raw: &str) -> Result<LanguageCode, LanguageError> {
        let code: LanguageCode = raw.parse()?;
        if self.is_enabled(code) {
            Ok(code)
        } else {
            Err(LanguageError::Unsupported(raw.to_string()))
        }
    }

    /// The enabled language after `code`, wrapping to the first.
    pub fn next_after(&self, code: LanguageCode) -> LanguageCode {
        let enabled = self.list_enabled();
        let position = enabled.iter().position(|lang| lang.code == code);
        match position {
            Some(idx) => enabled[(idx + 1) % enabled.len()].code,
            None => self.default,
        }
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
