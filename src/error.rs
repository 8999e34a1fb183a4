//! Error types for the localization subsystem.
//!
//! None of these are fatal to the application: callers recover by falling
//! back to the default language, session-only selection, or untranslated keys.

use crate::i18n::LanguageCode;
use thiserror::Error;

/// Errors raised while validating language codes or building the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageError {
    #[error("Unsupported language code: '{0}'")]
    Unsupported(String),

    #[error("Default language '{0}' is not enabled in the registry")]
    UnknownDefault(LanguageCode),

    #[error("Language registry has no enabled languages")]
    EmptyRegistry,
}

/// Errors from a durable key/value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contents are not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Why a translation file could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be built, usually a relative or malformed URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The server answered with a non-success status.
    #[error("unexpected status")]
    Status,

    /// The body was not a JSON object.
    #[error("invalid dictionary: {0}")]
    Parse(String),

    /// Reading from disk failed.
    #[error("read failed: {0}")]
    Io(String),

    /// The loader has no dictionary for this language.
    #[error("no dictionary available")]
    Missing,
}

/// A translation dictionary failed to load.
///
/// Carries the language that was requested, the HTTP-like status when one
/// was received, and the location the dictionary was requested from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load '{code}' translations from {url} (status {status:?}): {reason}")]
pub struct TranslationLoadError {
    pub code: LanguageCode,
    pub status: Option<u16>,
    pub url: String,
    pub reason: LoadFailure,
}

impl TranslationLoadError {
    pub fn new(code: LanguageCode, url: impl Into<String>, reason: LoadFailure) -> Self {
        Self {
            code,
            status: None,
            url: url.into(),
            reason,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Network failures, rate limiting and server errors are worth another
    /// attempt; a 404 or a malformed file is not.
    pub fn is_retryable(&self) -> bool {
        match (&self.reason, self.status) {
            (LoadFailure::Network(_), _) => true,
            (LoadFailure::Status, Some(status)) => status == 429 || (500..600).contains(&status),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message_contains_code() {
        let err = LanguageError::Unsupported("xx".to_string());
        assert!(err.to_string().contains("'xx'"));
    }

    #[test]
    fn test_load_error_display_carries_context() {
        let err = TranslationLoadError::new(LanguageCode::De, "/assets/i18n/de.json", LoadFailure::Status)
            .with_status(404);
        let msg = err.to_string();
        assert!(msg.contains("'de'"));
        assert!(msg.contains("/assets/i18n/de.json"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn test_retryable_classification() {
        let url = "/assets/i18n/fr.json";
        let server = TranslationLoadError::new(LanguageCode::Fr, url, LoadFailure::Status).with_status(503);
        let limited = TranslationLoadError::new(LanguageCode::Fr, url, LoadFailure::Status).with_status(429);
        let not_found = TranslationLoadError::new(LanguageCode::Fr, url, LoadFailure::Status).with_status(404);
        let network = TranslationLoadError::new(LanguageCode::Fr, url, LoadFailure::Network("reset".into()));
        let parse = TranslationLoadError::new(LanguageCode::Fr, url, LoadFailure::Parse("eof".into()));
        let invalid = TranslationLoadError::new(LanguageCode::Fr, url, LoadFailure::InvalidUrl("builder error".into()));

        assert!(server.is_retryable());
        assert!(limited.is_retryable());
        assert!(network.is_retryable());
        assert!(!not_found.is_retryable());
        assert!(!parse.is_retryable());
        assert!(!invalid.is_retryable());
    }

    #[test]
    fn test_load_failure_messages() {
        assert_eq!(LoadFailure::Network("reset".into()).to_string(), "network error: reset");
        assert_eq!(
            LoadFailure::InvalidUrl("relative URL without a base".into()).to_string(),
            "invalid request URL: relative URL without a base"
        );
        assert_eq!(LoadFailure::Missing.to_string(), "no dictionary available");
    }
}
