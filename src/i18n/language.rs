//! Language type: the closed set of UI languages the site ships with.
//!
//! The set is fixed at build time. Which of these codes are actually offered
//! to visitors is decided by the `LanguageRegistry`.

use crate::error::LanguageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A UI language code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    En,
    Ar,
    De,
    Fr,
}

impl LanguageCode {
    /// Every code known to the build, in registry order.
    pub const ALL: [LanguageCode; 4] = [
        LanguageCode::En,
        LanguageCode::Ar,
        LanguageCode::De,
        LanguageCode::Fr,
    ];

    /// Get the ISO 639-1 code (e.g., "en", "ar").
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Ar => "ar",
            LanguageCode::De => "de",
            LanguageCode::Fr => "fr",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageCode {
    type Err = LanguageError;

    /// Parse an exact language code. Surrounding whitespace and case are
    /// ignored; region-qualified tags like "ar-EG" are rejected here and
    /// handled by the detection helpers in `locale`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        LanguageCode::ALL
            .into_iter()
            .find(|c| c.as_str() == code)
            .ok_or_else(|| LanguageError::Unsupported(s.to_string()))
    }
}

/// Text layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Left-to-right (English, German, French)
    Ltr,
    /// Right-to-left (Arabic)
    Rtl,
}

impl Direction {
    /// Returns the HTML `dir` attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Direction::Rtl)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
