//! Sources of translation dictionaries.

use crate::error::{LoadFailure, TranslationLoadError};
use crate::i18n::LanguageCode;
use crate::retry::RetryConfig;
use crate::translation::Dictionary;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Default location of the translation files, relative to the site root.
///
/// Resolve it against the page URL before handing it to [`HttpLoader`].
pub const DEFAULT_BASE_PATH: &str = "/assets/i18n";

/// Loads the dictionary for one language.
pub trait TranslationLoader: Send + Sync {
    fn load(&self, code: LanguageCode) -> BoxFuture<'_, Result<Dictionary, TranslationLoadError>>;

    /// Where the dictionary for `code` comes from (URL or path).
    fn location(&self, code: LanguageCode) -> String;
}

/// Fetches `{base_url}/{code}.json` over HTTP.
///
/// `base_url` must be absolute; a relative one fails every request with
/// [`LoadFailure::InvalidUrl`].
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpLoader {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            retry: RetryConfig::none(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_once(&self, code: LanguageCode) -> Result<Dictionary, TranslationLoadError> {
        let url = self.location(code);
        debug!("Fetching translations from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_builder() {
                    LoadFailure::InvalidUrl(e.to_string())
                } else {
                    LoadFailure::Network(e.to_string())
                };
                TranslationLoadError::new(code, &url, reason)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationLoadError::new(code, &url, LoadFailure::Status)
                .with_status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            TranslationLoadError::new(code, &url, LoadFailure::Network(e.to_string()))
                .with_status(status.as_u16())
        })?;

        Dictionary::from_json(&body).map_err(|e| {
            TranslationLoadError::new(code, &url, LoadFailure::Parse(e.to_string()))
                .with_status(status.as_u16())
        })
    }
}

impl TranslationLoader for HttpLoader {
    fn load(&self, code: LanguageCode) -> BoxFuture<'_, Result<Dictionary, TranslationLoadError>> {
        async move {
            let url = self.location(code);
            self.retry
                .run(&url, || self.fetch_once(code), TranslationLoadError::is_retryable)
                .await
        }
        .boxed()
    }

    fn location(&self, code: LanguageCode) -> String {
        format!("{}/{}.json", self.base_url.trim_end_matches('/'), code)
    }
}

/// Reads `{dir}/{code}.json` from disk.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TranslationLoader for DirectoryLoader {
    fn load(&self, code: LanguageCode) -> BoxFuture<'_, Result<Dictionary, TranslationLoadError>> {
        async move {
            let path = self.location(code);
            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(
                        TranslationLoadError::new(code, &path, LoadFailure::Missing).with_status(404)
                    );
                }
                Err(e) => {
                    return Err(TranslationLoadError::new(code, &path, LoadFailure::Io(e.to_string())));
                }
            };
            Dictionary::from_json(&raw)
                .map_err(|e| TranslationLoadError::new(code, &path, LoadFailure::Parse(e.to_string())))
        }
        .boxed()
    }

    fn location(&self, code: LanguageCode) -> String {
        self.dir
            .join(format!("{}.json", code))
            .to_string_lossy()
            .into_owned()
    }
}

/// Serves dictionaries that are already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    dictionaries: HashMap<LanguageCode, Dictionary>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, code: LanguageCode, dictionary: Dictionary) -> Self {
        self.dictionaries.insert(code, dictionary);
        self
    }
}

impl TranslationLoader for StaticLoader {
    fn load(&self, code: LanguageCode) -> BoxFuture<'_, Result<Dictionary, TranslationLoadError>> {
        let result = self.dictionaries.get(&code).cloned().ok_or_else(|| {
            TranslationLoadError::new(code, self.location(code), LoadFailure::Missing).with_status(404)
        });
        futures::future::ready(result).boxed()
    }

    fn location(&self, code: LanguageCode) -> String {
        format!("static:{}", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_http_location_joins_base() {
        let loader = HttpLoader::new(reqwest::Client::new(), "https://example.com/assets/i18n/");
        assert_eq!(
            loader.location(LanguageCode::Ar),
            "https://example.com/assets/i18n/ar.json"
        );
    }

    #[tokio::test]
    async fn test_relative_base_is_not_retried() {
        let loader = HttpLoader::new(reqwest::Client::new(), DEFAULT_BASE_PATH)
            .with_retry(RetryConfig::translation_fetch(3));

        let err = loader.load(LanguageCode::En).await.unwrap_err();

        assert!(matches!(err.reason, LoadFailure::InvalidUrl(_)));
        assert_eq!(err.url, "/assets/i18n/en.json");
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_static_loader() {
        let dict: Dictionary = [("nav.home", "Accueil")].into_iter().collect();
        let loader = StaticLoader::new().with(LanguageCode::Fr, dict.clone());

        assert_eq!(loader.load(LanguageCode::Fr).await.unwrap(), dict);

        let err = loader.load(LanguageCode::De).await.unwrap_err();
        assert_eq!(err.code, LanguageCode::De);
        assert_eq!(err.status, Some(404));
        assert_eq!(err.reason, LoadFailure::Missing);
    }

    #[tokio::test]
    async fn test_directory_loader_reads_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("de.json"), r#"{"nav": {"home": "Startseite"}}"#).unwrap();

        let loader = DirectoryLoader::new(dir.path());
        let dict = loader.load(LanguageCode::De).await.unwrap();

        assert_eq!(dict.get("nav.home"), Some("Startseite"));
    }

    #[tokio::test]
    async fn test_directory_loader_missing_file() {
        let dir = TempDir::new().unwrap();
        let loader = DirectoryLoader::new(dir.path());

        let err = loader.load(LanguageCode::Ar).await.unwrap_err();
        assert_eq!(err.status, Some(404));
        assert!(err.url.ends_with("ar.json"));
    }

    #[tokio::test]
    async fn test_directory_loader_invalid_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("fr.json"), "[1, 2, 3]").unwrap();

        let loader = DirectoryLoader::new(dir.path());
        let err = loader.load(LanguageCode::Fr).await.unwrap_err();
        assert!(matches!(err.reason, LoadFailure::Parse(_)));
    }
}
