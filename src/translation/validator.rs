//! Translation coverage validation.
//!
//! Compares a language's dictionary with the default-language dictionary:
//! keys missing from the translation are errors, while extra keys and
//! placeholder mismatches are warnings.

use crate::translation::dictionary::{placeholders, Dictionary};

/// Validation report containing errors and warnings about a dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Keys present in the reference but absent from the translation
    pub errors: Vec<String>,

    /// Non-critical findings (extra keys, placeholder drift)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

pub struct TranslationValidator;

impl TranslationValidator {
    /// Validate `translation` against `reference`.
    ///
    /// Findings are sorted by key so reports are stable.
    pub fn validate(reference: &Dictionary, translation: &Dictionary) -> ValidationReport {
        let mut report = ValidationReport::new();

        let mut reference_keys: Vec<&str> = reference.iter().map(|(k, _)| k).collect();
        reference_keys.sort_unstable();

        for key in reference_keys {
            let Some(translated) = translation.get(key) else {
                report.errors.push(format!("Missing key: {}", key));
                continue;
            };
            let expected = placeholders(reference.get(key).unwrap_or_default());
            let actual = placeholders(translated);
            if expected != actual {
                report.warnings.push(format!(
                    "Placeholder mismatch for {}: expected {:?}, found {:?}",
                    key, expected, actual
                ));
            }
        }

        let mut extra: Vec<&str> = translation
            .iter()
            .map(|(k, _)| k)
            .filter(|k| !reference.contains_key(k))
            .collect();
        extra.sort_unstable();
        for key in extra {
            report.warnings.push(format!("Unknown key: {}", key));
        }

        report
    }
}
